// crates/mt_geo/src/error.rs

//! 几何错误类型
//!
//! 多边形、轴线构造时的验证错误。

use thiserror::Error;

/// Geo 模块结果类型
pub type GeoResult<T> = Result<T, GeoError>;

/// 几何错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    /// 顶点数量不足
    #[error("{shape} 顶点数不足: 至少需要 {required} 个, 实际 {actual} 个")]
    TooFewVertices {
        /// 几何类型（"多边形"、"多段线"）
        shape: &'static str,
        /// 最少顶点数
        required: usize,
        /// 实际顶点数
        actual: usize,
    },

    /// 坐标不是有限数
    #[error("{shape} 第 {index} 个顶点坐标无效 (NaN 或 Inf)")]
    NonFiniteVertex {
        /// 几何类型
        shape: &'static str,
        /// 顶点序号
        index: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GeoError::TooFewVertices {
            shape: "多边形",
            required: 3,
            actual: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("多边形"));
        assert!(msg.contains('3'));
        assert!(msg.contains('2'));
    }
}
