//! 配置管理命令
//!
//! 默认配置文件：`<config_dir>/antenna-range/config.toml`，可用 `--config` 覆盖。
//! 文件不存在时使用出厂配置。

use antenna_sdk::RangeConfig;
use anyhow::{Context, Result};
use clap::Subcommand;
use std::path::{Path, PathBuf};

/// 默认配置文件路径
pub fn default_config_path() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine config directory"))?;
    path.push("antenna-range");
    path.push("config.toml");
    Ok(path)
}

fn resolve(path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_path(),
    }
}

/// 加载配置（文件不存在时返回出厂配置）
pub fn load(path: Option<&Path>) -> Result<RangeConfig> {
    let path = resolve(path)?;
    if !path.exists() {
        tracing::debug!("No config at {}, using defaults", path.display());
        return Ok(RangeConfig::default());
    }
    RangeConfig::load_from_file(&path).with_context(|| format!("Failed to load config {}", path.display()))
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 显示当前生效的配置
    Show,

    /// 写入出厂配置
    Init {
        /// 覆盖已有文件
        #[arg(long)]
        force: bool,
    },

    /// 显示配置文件路径
    Path,
}

impl ConfigCommand {
    pub fn execute(self, path: Option<&Path>) -> Result<()> {
        match self {
            ConfigCommand::Show => Self::show(path),
            ConfigCommand::Init { force } => Self::init(path, force),
            ConfigCommand::Path => {
                println!("{}", resolve(path)?.display());
                Ok(())
            },
        }
    }

    fn show(path: Option<&Path>) -> Result<()> {
        let file = resolve(path)?;
        let config = load(Some(&file))?;
        if file.exists() {
            println!("# {}", file.display());
        } else {
            println!("# {} (not found, defaults)", file.display());
        }
        print!("{}", config.to_toml_string()?);
        Ok(())
    }

    fn init(path: Option<&Path>, force: bool) -> Result<()> {
        let file = resolve(path)?;
        if file.exists() && !force {
            anyhow::bail!("{} already exists (use --force to overwrite)", file.display());
        }
        RangeConfig::default()
            .save_to_file(&file)
            .with_context(|| format!("Failed to write {}", file.display()))?;
        println!("✅ Wrote default config to {}", file.display());
        Ok(())
    }
}
