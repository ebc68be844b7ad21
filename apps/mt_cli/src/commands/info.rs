// apps/mt_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示一个输入文件的网格规模、时间步与数据项。

use anyhow::{Context, Result};
use clap::Args;
use mt_io::{JsonMeshSource, MeshInfo, MeshSource};
use std::path::PathBuf;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 输入文件
    pub file: PathBuf,

    /// 以 JSON 输出
    #[arg(long)]
    pub json: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    let handle = JsonMeshSource::new()
        .open(&args.file)
        .with_context(|| format!("无法打开输入文件 {}", args.file.display()))?;
    let info = handle.info();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        print_info(&args.file, &info);
    }
    Ok(())
}

fn print_info(path: &std::path::Path, info: &MeshInfo) {
    println!("=== {} ===", path.display());
    println!("节点数: {}", info.n_nodes);
    println!("单元数: {}", info.n_elements);
    println!("时间步数: {}", info.n_frames);
    if let (Some(first), Some(last)) = (info.times.first(), info.times.last()) {
        let fmt = |t: &Option<f64>| t.map_or_else(|| "-".to_string(), |t| format!("{t}"));
        println!("时间范围: {} .. {}", fmt(first), fmt(last));
    }
    println!("数据项:");
    for item in &info.items {
        println!("  - {}", item);
    }
}
