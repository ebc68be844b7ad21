// crates/mt_workflow/src/summary.rs

//! 批处理汇总
//!
//! 序列化为 JSON 时的形状:
//!
//! ```text
//! { "success": true, "total_files": 2, "successful_files": 1,
//!   "processing_mode": "parallel", "max_workers": 2,
//!   "results": [
//!     { "file": "a.json", "success": true, "full_field": true, "regions": { "bend": false } },
//!     { "file": "b.json", "success": false, "error": "..." } ] }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// 文件列表为空时的提示
pub const NO_INPUT_MESSAGE: &str = "未找到任何输入文件";

/// 取消时写入结果的错误信息
pub const CANCELLED: &str = "cancelled";

/// 处理模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// 调用线程内顺序处理
    Sequential,
    /// 工作线程池并行处理
    Parallel,
}

impl std::fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "单线程"),
            Self::Parallel => write!(f, "并行"),
        }
    }
}

/// 单个文件的转换结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConvertedFile {
    /// 全场是否成功写出
    pub full_field: bool,
    /// 各区域是否成功写出
    pub regions: BTreeMap<String, bool>,
}

/// 结果详情
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileDetail {
    /// 文件处理完成
    Converted(ConvertedFile),
    /// 文件处理失败
    Error {
        /// 错误信息
        error: String,
    },
}

/// 一条文件结果记录
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileResult {
    /// 文件名
    pub file: String,
    /// 是否成功
    pub success: bool,
    /// 详情
    #[serde(flatten)]
    pub detail: FileDetail,
}

impl FileResult {
    /// 成功记录
    pub fn converted(file: impl Into<String>, converted: ConvertedFile) -> Self {
        Self {
            file: file.into(),
            success: true,
            detail: FileDetail::Converted(converted),
        }
    }

    /// 失败记录
    pub fn failed(file: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            success: false,
            detail: FileDetail::Error {
                error: error.into(),
            },
        }
    }

    /// 取消记录
    pub fn cancelled(file: impl Into<String>) -> Self {
        Self::failed(file, CANCELLED)
    }

    /// 错误信息（成功时为 `None`）
    pub fn error(&self) -> Option<&str> {
        match &self.detail {
            FileDetail::Error { error } => Some(error.as_str()),
            FileDetail::Converted(_) => None,
        }
    }

    /// 转换结果（失败时为 `None`）
    pub fn converted_detail(&self) -> Option<&ConvertedFile> {
        match &self.detail {
            FileDetail::Converted(c) => Some(c),
            FileDetail::Error { .. } => None,
        }
    }
}

/// 文件路径对应的记录名（文件名部分）
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// 批处理汇总
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    /// 批处理是否执行（没有输入文件时为 false）
    pub success: bool,
    /// 文件总数
    pub total_files: usize,
    /// 成功文件数
    pub successful_files: usize,
    /// 处理模式
    pub processing_mode: ProcessingMode,
    /// 实际使用的线程数（顺序模式为 1）
    pub max_workers: usize,
    /// 附加信息
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// 各文件结果
    pub results: Vec<FileResult>,
}

impl BatchSummary {
    /// 由结果列表汇总
    pub fn from_results(mode: ProcessingMode, workers: usize, results: Vec<FileResult>) -> Self {
        Self {
            success: true,
            total_files: results.len(),
            successful_files: results.iter().filter(|r| r.success).count(),
            processing_mode: mode,
            max_workers: match mode {
                ProcessingMode::Sequential => 1,
                ProcessingMode::Parallel => workers,
            },
            message: None,
            results,
        }
    }

    /// 没有找到输入文件
    pub fn no_input() -> Self {
        Self {
            success: false,
            total_files: 0,
            successful_files: 0,
            processing_mode: ProcessingMode::Sequential,
            max_workers: 0,
            message: Some(NO_INPUT_MESSAGE.to_string()),
            results: Vec::new(),
        }
    }

    /// 结果按文件名排序后的副本
    pub fn sorted(&self) -> Self {
        let mut out = self.clone();
        out.results.sort();
        out
    }

    /// 失败文件数
    pub fn failed_files(&self) -> usize {
        self.total_files - self.successful_files
    }

    /// 序列化为带缩进的 JSON
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
