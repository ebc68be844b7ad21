// crates/mt_io/src/source/mod.rs

//! 网格数据源
//!
//! 读取一个时间片的网格与流速场。读取器通过 [`MeshSource`] 打开文件，
//! 得到独占文件数据的 [`MeshHandle`]，句柄在任何路径上离开作用域即释放。
//!
//! # 时间选择
//!
//! - [`TimeSelector::Index`]: 单个时间步，负数从末尾计数（`-1` 为最后一步）
//! - [`TimeSelector::Latest`]: 等同于 `Index(-1)`
//! - [`TimeSelector::All`]: 读取全部时间步并逐点取算术平均

pub mod json;

pub use json::JsonMeshSource;

use crate::error::{IoError, IoResult};
use mt_mesh::{FieldFrame, Mesh};
use serde::Serialize;
use std::path::Path;

/// 时间步选择方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeSelector {
    /// 全部时间步取平均
    All,
    /// 指定时间步，支持负索引
    Index(i64),
    /// 最后一个时间步
    #[default]
    Latest,
}

impl TimeSelector {
    /// 由配置中的可选索引构造，`None` 表示全部时间步
    pub fn from_index(index: Option<i64>) -> Self {
        match index {
            None => Self::All,
            Some(i) => Self::Index(i),
        }
    }

    /// 解析为具体的帧序号，越界返回 `None`
    pub fn resolve(&self, n_frames: usize) -> Option<Vec<usize>> {
        if n_frames == 0 {
            return None;
        }
        match *self {
            Self::All => Some((0..n_frames).collect()),
            Self::Latest => Some(vec![n_frames - 1]),
            Self::Index(i) => {
                let n = n_frames as i64;
                let idx = if i < 0 { n + i } else { i };
                (0..n).contains(&idx).then(|| vec![idx as usize])
            }
        }
    }
}

impl std::fmt::Display for TimeSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "全部时间步平均"),
            Self::Index(i) => write!(f, "时间步 {i}"),
            Self::Latest => write!(f, "最后时间步"),
        }
    }
}

/// 网格文件概要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeshInfo {
    /// 节点数
    pub n_nodes: usize,
    /// 三角形单元数
    pub n_elements: usize,
    /// 时间步数
    pub n_frames: usize,
    /// 各时间步时间（未知时为 `None`）
    pub times: Vec<Option<f64>>,
    /// 数据项名称
    pub items: Vec<String>,
}

/// 网格数据源
pub trait MeshSource: Send + Sync {
    /// 打开网格文件
    fn open(&self, path: &Path) -> IoResult<Box<dyn MeshHandle>>;

    /// 数据源名称
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// 已打开的网格文件
pub trait MeshHandle: Send {
    /// 文件路径
    fn path(&self) -> &Path;

    /// 时间步数
    fn n_frames(&self) -> usize;

    /// 数据项名称
    fn item_names(&self) -> Vec<String>;

    /// 文件概要
    fn info(&self) -> MeshInfo;

    /// 读取网格与选定时间步的场
    fn read(&mut self, selector: TimeSelector) -> IoResult<(Mesh, FieldFrame)>;
}

/// 按时间选择从帧序列中取出（或平均出）一帧
pub fn select_frame(
    path: &Path,
    frames: &[FieldFrame],
    selector: TimeSelector,
) -> IoResult<FieldFrame> {
    if frames.is_empty() {
        return Err(IoError::source_read(path, "文件不含任何时间步"));
    }
    let indices = selector.resolve(frames.len()).ok_or_else(|| {
        IoError::source_read(
            path,
            format!("{selector} 越界 (共 {} 个时间步)", frames.len()),
        )
    })?;

    match indices.as_slice() {
        [single] => Ok(frames[*single].clone()),
        _ => FieldFrame::mean(frames).map_err(|e| IoError::source_read(path, e)),
    }
}
