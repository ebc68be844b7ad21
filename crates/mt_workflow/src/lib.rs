// crates/mt_workflow/src/lib.rs

//! MariTec 批处理模块
//!
//! 把一批 MIKE21 网格文件转换为 Tecplot 文件。
//!
//! # 模块
//!
//! - [`discovery`]: 输入文件枚举
//! - [`runner`]: 顺序/并行运行器，单文件失败隔离
//! - [`converter`]: 单文件处理流程（全场 + 各区域）
//! - [`events`]: 进度事件与日志监听器
//! - [`summary`]: 批处理汇总（可序列化为 JSON）
//!
//! # 示例
//!
//! ```no_run
//! use std::sync::Arc;
//! use mt_config::ConverterConfig;
//! use mt_workflow::{EventDispatcher, Mike21Converter};
//!
//! let config = ConverterConfig::from_file("config.yaml").unwrap();
//! let converter = Mike21Converter::new(config, Arc::new(EventDispatcher::logging()));
//! let summary = converter.run(&[]);
//! println!("{}/{}", summary.successful_files, summary.total_files);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod converter;
pub mod discovery;
pub mod error;
pub mod events;
pub mod runner;
pub mod summary;

// 重导出常用类型
pub use converter::{LoadedRegion, Mike21Converter};
pub use discovery::{discover_inputs, explicit_inputs};
pub use error::WorkflowError;
pub use events::{ConvertEvent, EventDispatcher, EventListener, FnListener, LoggingListener};
pub use runner::{BatchDriver, RunnerConfig, StopHandle};
pub use summary::{BatchSummary, ConvertedFile, FileDetail, FileResult, ProcessingMode};
