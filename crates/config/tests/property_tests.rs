//! Property tests for configuration validation and persistence

use tempfile::TempDir;
use vidshell_config::{Config, ConfigManager, PLAYBACK_RATES};

#[test]
fn property_default_always_valid() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn property_load_save_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;

    manager.save(&Config::default())?;
    let loaded = manager.load()?;
    manager.save(&loaded)?;
    let loaded2 = manager.load()?;
    assert_eq!(loaded, loaded2);
    Ok(())
}

#[test]
fn property_every_preset_rate_is_valid() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;

    for &rate in PLAYBACK_RATES {
        let mut config = Config::default();
        config.player.playback_rate = rate;
        assert!(config.validate().is_ok(), "rate {} rejected", rate);

        manager.save(&config)?;
        assert_eq!(manager.load()?.player.playback_rate, rate);
    }
    Ok(())
}

#[test]
fn property_presets_are_quarter_steps() {
    assert_eq!(PLAYBACK_RATES.first(), Some(&0.5));
    assert_eq!(PLAYBACK_RATES.last(), Some(&3.0));
    for pair in PLAYBACK_RATES.windows(2) {
        assert_eq!(pair[1] - pair[0], 0.25);
    }
}

#[test]
fn property_all_valid_volumes() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;

    for volume in 0..=100u8 {
        let mut config = Config::default();
        config.player.volume = volume;

        assert!(config.validate().is_ok());
        manager.save(&config)?;

        let loaded = manager.load()?;
        assert_eq!(loaded.player.volume, volume);
    }

    Ok(())
}

#[test]
fn property_speed_bounds() {
    let cases = [
        (0.5, true),
        (1.0, true),
        (3.0, true),
        (0.49, false),
        (3.01, false),
        (0.0, false),
        (-2.0, false),
        (f64::NAN, false),
        (f64::NEG_INFINITY, false),
    ];

    for (speed, valid) in cases {
        let mut config = Config::default();
        config.player.left_key_speed = speed;
        assert_eq!(config.validate().is_ok(), valid, "left speed {}", speed);

        let mut config = Config::default();
        config.player.right_key_speed = speed;
        assert_eq!(config.validate().is_ok(), valid, "right speed {}", speed);
    }
}

#[test]
fn property_invalid_configs_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;

    for &volume in &[101u8, 150, 200, 255] {
        let mut config = Config::default();
        config.player.volume = volume;

        assert!(config.validate().is_err());
        assert!(manager.save(&config).is_err());
    }

    Ok(())
}

#[test]
fn property_concurrent_reads_safe() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let config_dir = temp_dir.path().to_path_buf();
    let manager = ConfigManager::with_directory(config_dir.clone())?;

    manager.initialize()?;

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let dir = config_dir.clone();
            std::thread::spawn(move || {
                if let Ok(mgr) = ConfigManager::with_directory(dir) {
                    for _ in 0..10 {
                        let _ = mgr.load();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().is_ok());
    }

    Ok(())
}

#[test]
fn property_update_never_corrupts() -> Result<(), Box<dyn std::error::Error>> {
    let temp_dir = TempDir::new()?;
    let manager = ConfigManager::with_directory(temp_dir.path().to_path_buf())?;

    manager.initialize()?;

    for i in 0..20u64 {
        let interval = 10 + i * 60;
        let result = manager.update(|config| {
            config.player.repeat_interval_ms = interval;
        });

        assert_eq!(result.is_ok(), (16..=1000).contains(&interval));
        assert!(manager.load().is_ok());
    }

    Ok(())
}
