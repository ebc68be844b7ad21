// crates/mt_mesh/src/error.rs

//! 网格错误类型

use thiserror::Error;

/// 网格模块结果类型
pub type MeshResult<T> = Result<T, MeshError>;

/// 网格错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// 单元引用了不存在的节点
    #[error("单元 {element} 引用了无效节点 {node} (节点总数 {n_nodes})")]
    InvalidNodeIndex {
        /// 单元序号
        element: usize,
        /// 无效的节点编号
        node: usize,
        /// 节点总数
        n_nodes: usize,
    },

    /// 同一帧内的场长度不一致
    #[error("场 '{name}' 长度为 {actual}, 与同帧其他场的长度 {expected} 不一致")]
    MixedCardinality {
        /// 场名称
        name: String,
        /// 期望长度
        expected: usize,
        /// 实际长度
        actual: usize,
    },

    /// 掩码长度与单元数不一致
    #[error("掩码长度 {mask_len} 与单元数 {n_elements} 不一致")]
    MaskLengthMismatch {
        /// 掩码长度
        mask_len: usize,
        /// 单元数
        n_elements: usize,
    },

    /// 参与平均的数组长度不正确
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },
}
