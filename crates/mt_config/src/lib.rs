// crates/mt_config/src/lib.rs

//! MariTec 配置层
//!
//! 转换器的 YAML 配置，加载后验证一次，运行期间只读。
//!
//! # 模块概览
//!
//! - [`converter_config`]: ConverterConfig 及其各段落
//! - [`error`]: 配置错误类型
//!
//! # 示例
//!
//! ```
//! use mt_config::ConverterConfig;
//!
//! let config = ConverterConfig::from_yaml_str("output_settings:\n  precision: 3\n").unwrap();
//! assert_eq!(config.output_settings.precision, 3);
//! assert!(config.output_settings.export_regions);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod converter_config;
pub mod error;

// 重导出核心类型
pub use converter_config::{
    ConverterConfig, CoordinateTransform, OutputSettings, PathsConfig, ProcessingConfig,
    RegionConfig, TimeSettings, MAX_PRECISION,
};
pub use error::ConfigError;
