// apps/mt_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 加载并校验配置文件，逐个读取区域的边界与轴线几何。

use anyhow::{bail, Context, Result};
use clap::Args;
use mt_config::ConverterConfig;
use mt_io::DxfLoader;
use mt_workflow::discover_inputs;
use std::path::PathBuf;
use tracing::info;

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径 (YAML)
    #[arg(short, long)]
    pub config: PathBuf,

    /// 严格模式（警告也视为错误）
    #[arg(long)]
    pub strict: bool,
}

/// 验证结果
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    fn is_ok_strict(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== MariTec 配置验证 ===");

    let config = ConverterConfig::from_file(&args.config)
        .with_context(|| format!("无法加载配置文件 {}", args.config.display()))?;
    let result = check(&config);
    print_validation_result(&result, args.strict)
}

fn check(config: &ConverterConfig) -> ValidationResult {
    let mut result = ValidationResult::default();

    if let Err(e) = config.validate() {
        result.add_error(e.to_string());
    }

    let input_dir = &config.paths.input_dir;
    if !input_dir.is_dir() {
        result.add_warning(format!("输入目录不存在: {}", input_dir.display()));
    } else {
        let n = discover_inputs(input_dir, &config.paths.input_extension).len();
        if n == 0 {
            result.add_warning(format!(
                "输入目录中没有 .{} 文件: {}",
                config.paths.input_extension,
                input_dir.display()
            ));
        } else {
            println!("  ✓ 输入文件: {} 个", n);
        }
    }

    if config.regions.is_empty() && config.output_settings.export_regions {
        result.add_warning("未定义任何区域");
    }

    for (name, region) in &config.regions {
        match DxfLoader::load_region(&region.region_geometry_path) {
            Ok(polygon) => println!(
                "  ✓ 区域 {} 边界: {} 个顶点",
                name,
                polygon.vertices().len()
            ),
            Err(e) => result.add_error(format!("区域 {} 边界: {}", name, e)),
        }
        match DxfLoader::load_axis(&region.axis_geometry_path) {
            Ok(axis) => println!("  ✓ 区域 {} 轴线: 长度 {:.3}", name, axis.length()),
            Err(e) => result.add_error(format!("区域 {} 轴线: {}", name, e)),
        }
    }

    result
}

fn print_validation_result(result: &ValidationResult, strict: bool) -> Result<()> {
    println!();

    for warning in &result.warnings {
        println!("  ⚠ 警告: {}", warning);
    }
    for error in &result.errors {
        println!("  ✗ 错误: {}", error);
    }

    let passed = if strict {
        result.is_ok_strict()
    } else {
        result.is_ok()
    };

    if passed {
        println!("\n验证通过 ({} 个警告)", result.warnings.len());
        Ok(())
    } else {
        bail!(
            "验证失败: {} 个错误, {} 个警告",
            result.errors.len(),
            result.warnings.len()
        )
    }
}
