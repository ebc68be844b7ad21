// apps/mt_cli/src/commands/run.rs

//! 批量转换命令

use anyhow::{bail, Context, Result};
use clap::Args;
use mt_config::ConverterConfig;
use mt_workflow::{BatchSummary, EventDispatcher, Mike21Converter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// 转换参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径 (YAML)
    #[arg(short, long)]
    pub config: PathBuf,

    /// 输入文件；缺省时扫描配置中的输入目录
    pub files: Vec<PathBuf>,

    /// 汇总结果写入的 JSON 文件
    #[arg(short, long)]
    pub summary: Option<PathBuf>,

    /// 工作线程数（覆盖配置）
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// 强制单线程处理
    #[arg(long)]
    pub sequential: bool,
}

/// 加载配置并应用命令行覆盖
pub fn load_config(args: &RunArgs) -> Result<ConverterConfig> {
    let mut config = ConverterConfig::from_file(&args.config)
        .with_context(|| format!("无法加载配置文件 {}", args.config.display()))?;
    if let Some(workers) = args.workers {
        config.processing.parallel_workers = Some(workers);
    }
    if args.sequential {
        config.processing.enable_parallel = false;
    }
    config.validate().context("配置无效")?;
    Ok(config)
}

fn write_summary(path: &Path, summary: &BatchSummary) -> Result<()> {
    let text = summary.to_json_pretty().context("汇总序列化失败")?;
    std::fs::write(path, text)
        .with_context(|| format!("无法写入汇总文件 {}", path.display()))?;
    info!("汇总已写入: {}", path.display());
    Ok(())
}

/// 执行转换命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== MariTec 批量转换 ===");

    let config = load_config(&args)?;
    info!(
        "输入目录: {}, 输出目录: {}, 区域数: {}",
        config.paths.input_dir.display(),
        config.paths.output_dir.display(),
        config.regions.len()
    );

    let start = Instant::now();
    let converter = Mike21Converter::new(config, Arc::new(EventDispatcher::logging()));
    let summary = converter.run(&args.files);
    info!("耗时: {:.2} s", start.elapsed().as_secs_f64());

    if let Some(path) = &args.summary {
        write_summary(path, &summary)?;
    }

    if !summary.success {
        bail!(
            "{}",
            summary.message.as_deref().unwrap_or("批处理未执行")
        );
    }
    if summary.failed_files() > 0 {
        bail!(
            "{}/{} 个文件处理失败",
            summary.failed_files(),
            summary.total_files
        );
    }
    Ok(())
}
