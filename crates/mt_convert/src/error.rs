// crates/mt_convert/src/error.rs

//! 转换错误类型

use mt_io::IoError;
use mt_mesh::MeshError;
use thiserror::Error;

/// 转换结果类型
pub type ConvertResult<T> = Result<T, ConvertError>;

/// 转换错误
#[derive(Error, Debug)]
pub enum ConvertError {
    /// 缺少必需的场
    #[error("缺少数据项: {name}")]
    MissingField {
        /// 场名称
        name: String,
    },

    /// 场长度既不等于节点数也不等于单元数（区域投影要求等于单元数）
    #[error("数据维度不匹配: 节点数{n_nodes}, 单元数{n_elements}, 速度场长度{field_len}")]
    DimensionMismatch {
        /// 场长度
        field_len: usize,
        /// 节点数
        n_nodes: usize,
        /// 单元数
        n_elements: usize,
    },

    /// 区域内没有任何单元
    #[error("区域 {region} 内无单元")]
    EmptyRegion {
        /// 区域名
        region: String,
    },

    /// IO 错误
    #[error(transparent)]
    Io(#[from] IoError),

    /// 网格错误
    #[error(transparent)]
    Mesh(#[from] MeshError),
}

impl ConvertError {
    /// 是否只需警告（不视为失败原因）
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::EmptyRegion { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_severity() {
        let err = ConvertError::DimensionMismatch {
            field_len: 50,
            n_nodes: 100,
            n_elements: 180,
        };
        assert_eq!(
            err.to_string(),
            "数据维度不匹配: 节点数100, 单元数180, 速度场长度50"
        );
        assert!(!err.is_warning());
        assert!(ConvertError::EmptyRegion { region: "a".into() }.is_warning());
    }
}
