// FILE: crates/cli/src/commands.rs

use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};
use vidshell_config::{Config, ConfigManager};
use vidshell_core::{format_clock, SUPPORTED_EXTENSIONS};
use vidshell_session::{
    ContentId, FileSystem, JsonResumeStore, LocalFileSystem, ResumeStore, SeekSpeeds,
};

/// Config manager plus the configuration loaded at startup
pub struct CliContext {
    manager: ConfigManager,
    config: Config,
}

impl CliContext {
    pub fn new(manager: ConfigManager, config: Config) -> Self {
        Self { manager, config }
    }

    pub fn manager(&self) -> &ConfigManager {
        &self.manager
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn resume_path(&self) -> PathBuf {
        self.manager.resume_file_path(&self.config)
    }

    fn open_store(&self) -> Result<JsonResumeStore> {
        let path = self.resume_path();
        JsonResumeStore::open(&path)
            .with_context(|| format!("Failed to open resume positions at {}", path.display()))
    }
}

/// A video found by `scan`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    pub path: PathBuf,
    pub resume_ms: Option<i64>,
}

/// Lists the supported videos of `folder` with their saved positions
pub fn scan_folder(ctx: &CliContext, folder: &Path) -> Result<Vec<ScanEntry>> {
    let fs = LocalFileSystem::new();
    let files = fs
        .list_directory(folder, SUPPORTED_EXTENSIONS)
        .with_context(|| format!("Failed to list {}", folder.display()))?;
    let store = ctx.open_store()?;

    Ok(files
        .into_iter()
        .map(|path| {
            let resume_ms = ContentId::compute(&fs, &path)
                .ok()
                .and_then(|id| store.get(&id))
                .filter(|&ms| ms > 0);
            ScanEntry { path, resume_ms }
        })
        .collect())
}

pub fn scan(ctx: &CliContext, folder: &Path) -> Result<()> {
    let entries = scan_folder(ctx, folder)?;

    if entries.is_empty() {
        println!("No supported videos in {}", folder.display());
        return Ok(());
    }

    println!(
        "\n{} videos in {}",
        style(entries.len()).bold().cyan(),
        folder.display()
    );
    println!("{}", "=".repeat(60));
    for (i, entry) in entries.iter().enumerate() {
        let name = entry
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| entry.path.display().to_string());
        match entry.resume_ms {
            Some(ms) => println!(
                "{:>3}. {}  {}",
                i + 1,
                name,
                style(format!("[resume {}]", format_clock(ms))).dim()
            ),
            None => println!("{:>3}. {}", i + 1, name),
        }
    }
    Ok(())
}

fn content_id(file: &Path) -> Result<ContentId> {
    ContentId::compute(&LocalFileSystem::new(), file)
        .with_context(|| format!("Cannot identify {}", file.display()))
}

pub fn show_id(file: &Path) -> Result<()> {
    println!("{}", content_id(file)?);
    Ok(())
}

/// Saved position of `file`, if one deserves a resume prompt
pub fn resume_position(ctx: &CliContext, file: &Path) -> Result<Option<i64>> {
    let id = content_id(file)?;
    let store = ctx.open_store()?;
    Ok(store.get(&id).filter(|&ms| ms > 0))
}

pub fn describe_position(position: Option<i64>) -> String {
    match position {
        Some(ms) => format_clock(ms),
        None => "none".to_string(),
    }
}

pub fn show_resume(ctx: &CliContext, file: &Path) -> Result<()> {
    println!("{}", describe_position(resume_position(ctx, file)?));
    Ok(())
}

/// Removes the saved position of `file`, returning whether there was one
pub fn forget_position(ctx: &CliContext, file: &Path) -> Result<bool> {
    let id = content_id(file)?;
    let mut store = ctx.open_store()?;
    store
        .remove(&id)
        .context("Failed to update resume positions")
}

pub fn forget(ctx: &CliContext, file: &Path) -> Result<()> {
    if forget_position(ctx, file)? {
        println!("{} Forgot position of {}", style("✓").green().bold(), file.display());
    } else {
        println!("No saved position for {}", file.display());
    }
    Ok(())
}

pub fn config_init(ctx: &CliContext) -> Result<()> {
    let path = ctx.manager().config_path();
    if ctx
        .manager()
        .initialize()
        .context("Failed to write default config")?
    {
        println!("{} Created {}", style("✓").green().bold(), path.display());
    } else {
        println!("Config already exists at {}", path.display());
    }
    Ok(())
}

pub fn config_show(ctx: &CliContext) -> Result<()> {
    let rendered = toml::to_string_pretty(ctx.config()).context("Failed to render config")?;
    println!("# {}", ctx.manager().config_path().display());
    print!("{}", rendered);

    if let Err(errors) = ctx.config().validate() {
        println!();
        for error in errors {
            println!("{} {}", style("warning:").yellow().bold(), error);
        }
    }
    Ok(())
}

/// Validates and stores new long-press speeds
pub fn update_speeds(ctx: &CliContext, left: f64, right: f64) -> Result<()> {
    let speeds = SeekSpeeds::new(left, right).context("Invalid seek speeds")?;
    ctx.manager()
        .update(|config| {
            config.player.left_key_speed = speeds.backward();
            config.player.right_key_speed = speeds.forward();
        })
        .context("Failed to save seek speeds")
}

pub fn set_speeds(ctx: &CliContext, left: f64, right: f64) -> Result<()> {
    update_speeds(ctx, left, right)?;
    println!(
        "{} Seek speeds set to {}x backward, {}x forward",
        style("✓").green().bold(),
        left,
        right
    );
    Ok(())
}
