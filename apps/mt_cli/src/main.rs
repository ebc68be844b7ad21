// apps/mt_cli/src/main.rs

//! MariTec 命令行界面
//!
//! MIKE21 非结构网格流场批量转换为 Tecplot 文件。
//!
//! ```text
//! mt_cli run --config config.yaml [文件...] [--summary summary.json]
//! mt_cli validate --config config.yaml
//! mt_cli info data/case01.json
//! ```

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mt_config::ConverterConfig;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::FmtSubscriber;

/// MariTec MIKE21 → Tecplot 转换工具
#[derive(Parser)]
#[command(name = "mt_cli")]
#[command(author = "MariTec Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "MIKE21 flow field to Tecplot converter", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)，缺省时由配置的 verbose 决定
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// 日志文件（同时输出到控制台）
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 批量转换
    Run(commands::run::RunArgs),
    /// 验证配置与区域几何
    Validate(commands::validate::ValidateArgs),
    /// 显示输入文件信息
    Info(commands::info::InfoArgs),
}

impl Commands {
    fn config_path(&self) -> Option<&Path> {
        match self {
            Self::Run(args) => Some(args.config.as_path()),
            Self::Validate(args) => Some(args.config.as_path()),
            Self::Info(_) => None,
        }
    }
}

fn parse_level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// 初始化日志
///
/// 命令行参数优先；否则读取配置中的 `verbose` 与 `log_file`。
/// 配置读取失败时使用默认值，错误由命令本身报告。
fn init_logging(cli: &Cli) -> Result<()> {
    let config = cli
        .command
        .config_path()
        .and_then(|path| ConverterConfig::from_file(path).ok());

    let level = match (&cli.log_level, &config) {
        (Some(name), _) => parse_level(name),
        (None, Some(config)) if !config.processing.verbose => Level::WARN,
        _ => Level::INFO,
    };
    let log_file = cli
        .log_file
        .clone()
        .or_else(|| config.and_then(|c| c.processing.log_file));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("无法打开日志文件 {}", path.display()))?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_target(false)
                .with_ansi(false)
                .with_writer(std::io::stdout.and(Mutex::new(file)))
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        None => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_target(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    init_logging(&cli)?;

    // 执行命令
    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Info(args) => commands::info::execute(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_with_files() {
        let cli = Cli::try_parse_from([
            "mt_cli",
            "--log-level",
            "debug",
            "run",
            "--config",
            "c.yaml",
            "a.json",
            "b.json",
            "--summary",
            "s.json",
        ])
        .unwrap();
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config, PathBuf::from("c.yaml"));
                assert_eq!(args.files.len(), 2);
                assert_eq!(args.summary, Some(PathBuf::from("s.json")));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("WARN"), Level::WARN);
        assert_eq!(parse_level("unknown"), Level::INFO);
    }
}
