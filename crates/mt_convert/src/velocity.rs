// crates/mt_convert/src/velocity.rs

//! 流速分量与输出列的公共处理

use crate::error::{ConvertError, ConvertResult};
use mt_geo::Point2D;
use mt_mesh::{FieldFrame, Mesh, U_VELOCITY, V_VELOCITY, W_VELOCITY};

/// 一帧中的三个流速分量及流速大小
#[derive(Debug, Clone, PartialEq)]
pub struct VelocityField {
    /// U 分量
    pub u: Vec<f64>,
    /// V 分量
    pub v: Vec<f64>,
    /// W 分量（缺省为 0）
    pub w: Vec<f64>,
    /// 流速大小 sqrt(u² + v² + w²)
    pub speed: Vec<f64>,
}

impl VelocityField {
    /// 从场数据帧中取出流速，缺少 W 分量时补零
    pub fn from_frame(frame: &FieldFrame) -> ConvertResult<Self> {
        let u = required(frame, U_VELOCITY)?;
        let v = required(frame, V_VELOCITY)?;
        let w = frame
            .get(W_VELOCITY)
            .map_or_else(|| vec![0.0; u.len()], <[f64]>::to_vec);

        let speed = u
            .iter()
            .zip(&v)
            .zip(&w)
            .map(|((a, b), c)| (a * a + b * b + c * c).sqrt())
            .collect();

        Ok(Self { u, v, w, speed })
    }

    /// 数据长度
    pub fn len(&self) -> usize {
        self.u.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.u.is_empty()
    }

    /// 维度不匹配错误
    pub fn mismatch(&self, mesh: &Mesh) -> ConvertError {
        ConvertError::DimensionMismatch {
            field_len: self.len(),
            n_nodes: mesh.n_nodes(),
            n_elements: mesh.n_elements(),
        }
    }
}

fn required(frame: &FieldFrame, name: &str) -> ConvertResult<Vec<f64>> {
    frame
        .get(name)
        .map(<[f64]>::to_vec)
        .ok_or_else(|| ConvertError::MissingField {
            name: name.to_string(),
        })
}

/// 将 NaN 与 ±Inf 替换为 0
pub fn sanitize(values: &mut [f64]) {
    for v in values.iter_mut().filter(|v| !v.is_finite()) {
        *v = 0.0;
    }
}

/// 平移后的坐标列 (X, Y)
pub fn shifted_columns(points: &[Point2D], shift: Point2D) -> (Vec<f64>, Vec<f64>) {
    points.iter().map(|p| (p.x - shift.x, p.y - shift.y)).unzip()
}
