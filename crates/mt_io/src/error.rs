// crates/mt_io/src/error.rs
//! IO 错误类型定义
//!
//! 读取网格、加载几何、写出 Tecplot 文件的统一错误枚举。

use std::path::Path;
use thiserror::Error;

/// IO 模块结果类型别名
pub type IoResult<T> = Result<T, IoError>;

/// IO 错误枚举
#[derive(Error, Debug)]
pub enum IoError {
    /// 网格文件无法读取、格式错误或时间索引越界
    #[error("网格文件读取失败: {path}, {reason}")]
    SourceRead {
        /// 文件路径
        path: String,
        /// 原因
        reason: String,
    },

    /// 几何文件无法读取、格式错误或缺少所需图元
    #[error("几何文件加载失败: {path}, {reason}")]
    Geometry {
        /// 文件路径
        path: String,
        /// 原因
        reason: String,
    },

    /// 输出文件写入失败
    #[error("写入失败: {path}")]
    Write {
        /// 文件路径
        path: String,
        /// 底层 IO 错误
        #[source]
        source: std::io::Error,
    },

    /// 输出数据中出现 NaN 或无穷大
    #[error("非有限数值: 第 {row} 行第 {column} 列")]
    NonFinite {
        /// 数据行（0 起）
        row: usize,
        /// 列（0 起）
        column: usize,
    },

    /// 输出区块的数据不一致
    #[error("输出区块无效: {0}")]
    InvalidZone(String),
}

impl IoError {
    /// 网格读取错误
    pub fn source_read(path: &Path, reason: impl std::fmt::Display) -> Self {
        Self::SourceRead {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// 几何加载错误
    pub fn geometry(path: &Path, reason: impl std::fmt::Display) -> Self {
        Self::Geometry {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    /// 写入错误
    pub fn write(path: &Path, source: std::io::Error) -> Self {
        Self::Write {
            path: path.display().to_string(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IoError::geometry(Path::new("a.dxf"), "no closed ring");
        assert_eq!(err.to_string(), "几何文件加载失败: a.dxf, no closed ring");

        let err = IoError::NonFinite { row: 2, column: 4 };
        assert!(err.to_string().contains("第 2 行"));
    }
}
