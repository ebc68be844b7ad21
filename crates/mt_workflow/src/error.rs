// crates/mt_workflow/src/error.rs

//! 单文件处理错误
//!
//! 只有使整个文件失败的错误才在这里出现；全场与区域的错误
//! 在各自的边界处被记录为 `false`，不会向上传播。

use mt_io::IoError;
use std::path::PathBuf;
use thiserror::Error;

/// 单文件处理错误
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// 无法创建输出目录
    #[error("无法创建输出目录 {path}: {source}")]
    OutputDir {
        /// 目录
        path: PathBuf,
        /// 底层 IO 错误
        source: std::io::Error,
    },

    /// 网格读取失败
    #[error(transparent)]
    Source(#[from] IoError),

    /// 处理过程中发生 panic
    #[error("处理线程异常: {0}")]
    Panicked(String),
}
