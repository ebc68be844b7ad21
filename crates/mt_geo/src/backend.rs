// crates/mt_geo/src/backend.rs

//! 几何后端
//!
//! 区域投影只依赖两种几何操作：
//!
//! - `contains(polygon, point)`: 点是否位于区域内
//! - `project_and_frame(polyline, point)`: 点在轴线上的最近位置及该处的局部坐标系
//!
//! 将它们抽象为 [`GeometryBackend`]，可替换实现而不影响上层投影流程。

use crate::geometry::Point2D;
use crate::shapes::{Polygon, Polyline};

/// 切向差分步长（沿弧长）[m]
pub const DEFAULT_TANGENT_STEP: f64 = 1e-6;

/// 轴线上的局部坐标系
///
/// `tangent` 为轴线前进方向的单位向量，`normal` 为其逆时针旋转 90° 所得，
/// 二者构成右手系。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    /// 轴线上的最近点
    pub origin: Point2D,
    /// 最近点的弧长坐标
    pub station: f64,
    /// 切向单位向量
    pub tangent: Point2D,
    /// 法向单位向量
    pub normal: Point2D,
}

impl LocalFrame {
    /// 退化时使用的全局坐标系 (1,0)/(0,1)
    pub fn fallback(origin: Point2D, station: f64) -> Self {
        Self {
            origin,
            station,
            tangent: Point2D::UNIT_X,
            normal: Point2D::UNIT_Y,
        }
    }

    /// 由切向量构造，切向量长度为零时退化为全局坐标系
    pub fn from_tangent(origin: Point2D, station: f64, tangent: Point2D) -> Self {
        match tangent.normalize() {
            Some(t) => Self {
                origin,
                station,
                tangent: t,
                normal: t.perpendicular(),
            },
            None => Self::fallback(origin, station),
        }
    }

    /// 将速度 (u, v) 分解为（切向, 法向）分量
    #[inline]
    #[must_use]
    pub fn project(&self, u: f64, v: f64) -> (f64, f64) {
        let vel = Point2D::new(u, v);
        (vel.dot(&self.tangent), vel.dot(&self.normal))
    }
}

/// 几何后端 trait
pub trait GeometryBackend: Send + Sync {
    /// 点是否严格位于多边形内部
    fn contains(&self, polygon: &Polygon, point: Point2D) -> bool;

    /// 点在轴线上的最近位置与局部坐标系
    fn project_and_frame(&self, axis: &Polyline, point: Point2D) -> LocalFrame;

    /// 后端名称（用于日志）
    fn name(&self) -> &str {
        "anonymous"
    }
}

/// 平面欧氏几何后端
///
/// 切向量由弧长方向的前向差分估计：`P(s + h) - P(s)`，
/// 其中 `P` 在轴线端点处截断，因此最近点恰好在轴线终点时退化为全局坐标系。
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarGeometry;

impl GeometryBackend for PlanarGeometry {
    fn contains(&self, polygon: &Polygon, point: Point2D) -> bool {
        polygon.contains(&point)
    }

    fn project_and_frame(&self, axis: &Polyline, point: Point2D) -> LocalFrame {
        let station = axis.project(&point);
        let origin = axis.point_at(station);
        let ahead = axis.point_at(station + DEFAULT_TANGENT_STEP);
        LocalFrame::from_tangent(origin, station, ahead - origin)
    }

    fn name(&self) -> &str {
        "planar"
    }
}
