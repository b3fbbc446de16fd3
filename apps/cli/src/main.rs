//! # Antenna CLI
//!
//! 天线测试场仪器的控制台工具（默认使用模拟设备）。
//!
//! ```bash
//! # 写入出厂配置
//! antenna-cli config init
//!
//! # 扫描所有角色的设备
//! antenna-cli scan --json
//!
//! # 按脚本演练一个设备
//! antenna-cli exercise generator
//!
//! # 开环扫描（Ctrl-C 停止），闭环移动
//! antenna-cli sweep --axis el --reverse
//! antenna-cli move --az 30 --el -10
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod console;

use commands::{ConfigCommand, ExerciseCommand, MoveCommand, ScanCommand, SweepCommand};

/// Antenna CLI - 天线测试场控制台工具
#[derive(Parser, Debug)]
#[command(name = "antenna-cli")]
#[command(about = "Console harness for antenna test-range instruments", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件（默认 <config_dir>/antenna-range/config.toml）
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 输出设备层调试日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 扫描设备
    Scan {
        #[command(flatten)]
        args: ScanCommand,
    },

    /// 按脚本演练一个设备
    Exercise {
        #[command(flatten)]
        args: ExerciseCommand,
    },

    /// 开环扫描（Ctrl-C 停止）
    Sweep {
        #[command(flatten)]
        args: SweepCommand,
    },

    /// 闭环移动到目标角度
    Move {
        #[command(flatten)]
        args: MoveCommand,
    },
}

fn init_logging(verbose: bool) -> Result<()> {
    let mut filter = EnvFilter::from_default_env().add_directive("antenna_cli=info".parse()?);
    if verbose {
        filter = filter
            .add_directive("antenna_devices=debug".parse()?)
            .add_directive("antenna_driver=debug".parse()?);
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Config(cmd) => cmd.execute(config_path),
        Commands::Scan { args } => args.execute(&commands::config::load(config_path)?),
        Commands::Exercise { args } => args.execute(&commands::config::load(config_path)?),
        Commands::Sweep { args } => args.execute(&commands::config::load(config_path)?),
        Commands::Move { args } => args.execute(&commands::config::load(config_path)?),
    }
}
