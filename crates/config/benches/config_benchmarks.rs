//! Benchmarks for reading and writing the seek and resume settings
//!
//! Run with: cargo bench --package vidshell-config

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;
use tempfile::TempDir;
use vidshell_config::{Config, ConfigManager};

/// A hand-edited file that only touches the seek and resume fields
const SPARSE_PLAYER_FILE: &str = r#"
[player]
left_key_speed = 1.5
right_key_speed = 3.0
tap_seek_secs = 10
long_press_ms = 400
repeat_interval_ms = 80
resume_offer_secs = 5
"#;

fn manager_in(temp_dir: &TempDir) -> ConfigManager {
    ConfigManager::with_directory(temp_dir.path().join("config"))
        .expect("Failed to create manager")
}

fn bench_sparse_file_parse_and_validate(c: &mut Criterion) {
    c.bench_function("player_sparse_parse_validate", |b| {
        b.iter(|| {
            let config: Config = toml::from_str(black_box(SPARSE_PLAYER_FILE))
                .expect("Failed to parse player section");
            black_box(config.validate().is_ok())
        });
    });
}

fn bench_speed_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate_key_speeds");
    for (label, left, right) in [
        ("defaults", 2.0, 2.0),
        ("bounds", 0.5, 3.0),
        ("rejected", 0.0, 7.5),
        ("non_finite", f64::NAN, f64::INFINITY),
    ] {
        let mut config = Config::default();
        config.player.left_key_speed = left;
        config.player.right_key_speed = right;

        group.bench_with_input(BenchmarkId::from_parameter(label), &config, |b, config| {
            b.iter(|| black_box(config.validate()));
        });
    }
    group.finish();
}

fn bench_set_speeds_then_reload(c: &mut Criterion) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let manager = manager_in(&temp_dir);
    manager.initialize().expect("Failed to initialize");

    let mut toggle = false;
    c.bench_function("set_speeds_then_reload", |b| {
        b.iter(|| {
            toggle = !toggle;
            let speed = if toggle { 1.5 } else { 2.5 };
            manager
                .update(|config| {
                    config.player.left_key_speed = speed;
                    config.player.right_key_speed = speed;
                })
                .expect("Failed to update");
            black_box(manager.load().expect("Failed to load").player.left_key_speed)
        });
    });
}

fn bench_startup_load(c: &mut Criterion) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let manager = manager_in(&temp_dir);
    manager.initialize().expect("Failed to initialize");

    c.bench_function("startup_load_with_env_overrides", |b| {
        b.iter(|| {
            let config = manager
                .load_with_env_overrides()
                .expect("Failed to load");
            black_box(manager.resume_file_path(&config))
        });
    });
}

criterion_group!(
    benches,
    bench_sparse_file_parse_and_validate,
    bench_speed_validation,
    bench_set_speeds_then_reload,
    bench_startup_load
);

criterion_main!(benches);
