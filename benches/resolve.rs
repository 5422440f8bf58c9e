//! Removal resolution and screen creation benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use buttonsettingsd::{
    compute_removals, non_indexable_keys, ButtonSettings, ConfiguredActivities, DeviceCapabilities,
    HwKey, KeyMask, MemoryHardware, MemoryStore, Services,
};

// =============================================================================
// Test Data Generation
// =============================================================================

fn caps_for(keys: &[HwKey]) -> DeviceCapabilities {
    DeviceCapabilities {
        device_keys: KeyMask::from_keys(keys),
        wake_keys: KeyMask::from_keys(&keys[..keys.len() / 2]),
        hw_keys_pref_configurable: true,
        button_backlight_supported: true,
        ..Default::default()
    }
}

fn services() -> Services {
    Services {
        settings: Box::new(MemoryStore::new()),
        prefs: Box::new(MemoryStore::new()),
        hardware: Box::new(MemoryHardware::default()),
        activities: Box::new(ConfiguredActivities::default()),
    }
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_compute_removals(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_removals");

    for count in [0usize, 3, HwKey::ALL.len()] {
        let caps = caps_for(&HwKey::ALL[..count]);
        group.bench_with_input(BenchmarkId::from_parameter(count), &caps, |b, caps| {
            b.iter(|| black_box(compute_removals(black_box(caps))))
        });
    }

    group.finish();
}

fn bench_non_indexable_keys(c: &mut Criterion) {
    let caps = caps_for(&[HwKey::Home, HwKey::Back]);
    c.bench_function("non_indexable_keys", |b| {
        b.iter(|| black_box(non_indexable_keys(black_box(&caps))))
    });
}

fn bench_screen_create(c: &mut Criterion) {
    let caps = caps_for(&HwKey::ALL);
    c.bench_function("screen_create", |b| {
        b.iter(|| black_box(ButtonSettings::create(caps.clone(), services()).descriptors()))
    });
}

criterion_group!(
    benches,
    bench_compute_removals,
    bench_non_indexable_keys,
    bench_screen_create
);
criterion_main!(benches);
