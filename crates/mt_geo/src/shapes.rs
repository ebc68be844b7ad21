// crates/mt_geo/src/shapes.rs

//! 区域多边形与轴线多段线
//!
//! - [`Polygon`]: 闭合环，用于筛选网格单元
//! - [`Polyline`]: 开放多段线，按弧长参数化，用于构造局部坐标系
//! - [`BoundingBox`]: 轴对齐边界框，用作包含判断的快速预检

use crate::error::{GeoError, GeoResult};
use crate::geometry::Point2D;
use serde::{Deserialize, Serialize};

/// 点落在多边形边上的判定距离 [m]
pub const BOUNDARY_TOLERANCE: f64 = 1e-9;

// ============================================================================
// BoundingBox
// ============================================================================

/// 边界框
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// 最小 x
    pub min_x: f64,
    /// 最小 y
    pub min_y: f64,
    /// 最大 x
    pub max_x: f64,
    /// 最大 y
    pub max_y: f64,
}

impl BoundingBox {
    /// 创建新的边界框
    #[must_use]
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// 包围一组点，空集合返回 `None`
    #[must_use]
    pub fn from_points(points: &[Point2D]) -> Option<Self> {
        let first = points.first()?;
        let (lo, hi) = points
            .iter()
            .skip(1)
            .fold((*first, *first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(Self::new(lo.x, lo.y, hi.x, hi.y))
    }

    /// 检查点是否在边界框内（含边界）
    #[must_use]
    pub fn contains_point(&self, point: &Point2D) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }

    /// 计算宽度
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }
}

// ============================================================================
// Polygon
// ============================================================================

/// 闭合多边形（区域）
///
/// 顶点按环的顺序存储，不重复首点；若输入的最后一个顶点与首点重合则去掉。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polygon {
    vertices: Vec<Point2D>,
    bbox: BoundingBox,
}

impl Polygon {
    /// 由顶点环创建多边形
    pub fn new(mut vertices: Vec<Point2D>) -> GeoResult<Self> {
        if vertices.len() > 1 && vertices.first() == vertices.last() {
            vertices.pop();
        }
        if vertices.len() < 3 {
            return Err(GeoError::TooFewVertices {
                shape: "多边形",
                required: 3,
                actual: vertices.len(),
            });
        }
        if let Some(index) = vertices.iter().position(|p| !p.is_finite()) {
            return Err(GeoError::NonFiniteVertex {
                shape: "多边形",
                index,
            });
        }
        let bbox = BoundingBox::from_points(&vertices).ok_or(GeoError::TooFewVertices {
            shape: "多边形",
            required: 3,
            actual: 0,
        })?;
        Ok(Self { vertices, bbox })
    }

    /// 顶点
    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }

    /// 边界框
    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    /// 边迭代器（含闭合边）
    pub fn edges(&self) -> impl Iterator<Item = (Point2D, Point2D)> + '_ {
        let n = self.vertices.len();
        (0..n).map(move |i| (self.vertices[i], self.vertices[(i + 1) % n]))
    }

    /// 有向面积（逆时针为正）
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        0.5 * self.edges().map(|(a, b)| a.cross(&b)).sum::<f64>()
    }

    /// 点是否落在边上（距离不超过 [`BOUNDARY_TOLERANCE`]）
    #[must_use]
    pub fn on_boundary(&self, point: &Point2D) -> bool {
        self.edges()
            .any(|(a, b)| distance_to_segment(point, &a, &b) <= BOUNDARY_TOLERANCE)
    }

    /// 严格包含判断，边界上的点视为不包含
    #[must_use]
    pub fn contains(&self, point: &Point2D) -> bool {
        if !self.bbox.contains_point(point) || self.on_boundary(point) {
            return false;
        }
        crossing_number_inside(point, &self.vertices)
    }
}

/// 射线法判断点是否在多边形内
fn crossing_number_inside(point: &Point2D, vertices: &[Point2D]) -> bool {
    let n = vertices.len();
    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let vi = &vertices[i];
        let vj = &vertices[j];

        if ((vi.y > point.y) != (vj.y > point.y))
            && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }

        j = i;
    }

    inside
}

/// 点到线段的距离
fn distance_to_segment(p: &Point2D, a: &Point2D, b: &Point2D) -> f64 {
    let (q, _) = closest_on_segment(p, a, b);
    p.distance_to(&q)
}

/// 线段上离 `p` 最近的点及其参数 t ∈ [0, 1]
fn closest_on_segment(p: &Point2D, a: &Point2D, b: &Point2D) -> (Point2D, f64) {
    let d = *b - *a;
    let len2 = d.length_squared();
    if len2 == 0.0 {
        return (*a, 0.0);
    }
    let t = ((*p - *a).dot(&d) / len2).clamp(0.0, 1.0);
    (a.lerp(b, t), t)
}

// ============================================================================
// Polyline
// ============================================================================

/// 开放多段线（轴线），按弧长参数化
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polyline {
    vertices: Vec<Point2D>,
    /// 每个顶点处的累计弧长，`stations[0] == 0`
    stations: Vec<f64>,
}

impl Polyline {
    /// 由顶点序列创建多段线
    pub fn new(vertices: Vec<Point2D>) -> GeoResult<Self> {
        if vertices.len() < 2 {
            return Err(GeoError::TooFewVertices {
                shape: "多段线",
                required: 2,
                actual: vertices.len(),
            });
        }
        if let Some(index) = vertices.iter().position(|p| !p.is_finite()) {
            return Err(GeoError::NonFiniteVertex {
                shape: "多段线",
                index,
            });
        }

        let mut stations = Vec::with_capacity(vertices.len());
        let mut acc = 0.0;
        stations.push(acc);
        for w in vertices.windows(2) {
            acc += w[0].distance_to(&w[1]);
            stations.push(acc);
        }

        Ok(Self { vertices, stations })
    }

    /// 顶点
    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }

    /// 总长度
    #[must_use]
    pub fn length(&self) -> f64 {
        self.stations.last().copied().unwrap_or(0.0)
    }

    /// 按弧长取点，超出范围时截断到端点
    #[must_use]
    pub fn point_at(&self, station: f64) -> Point2D {
        let last = self.vertices.len() - 1;
        if station <= 0.0 {
            return self.vertices[0];
        }
        if station >= self.length() {
            return self.vertices[last];
        }

        // 最后一个累计弧长不超过 station 的顶点
        let i = (self.stations.partition_point(|&s| s <= station) - 1).min(last - 1);
        let seg_len = self.stations[i + 1] - self.stations[i];
        if seg_len == 0.0 {
            return self.vertices[i];
        }
        let t = (station - self.stations[i]) / seg_len;
        self.vertices[i].lerp(&self.vertices[i + 1], t)
    }

    /// 最近点的弧长坐标，距离相等时取靠前的线段
    #[must_use]
    pub fn project(&self, point: &Point2D) -> f64 {
        let mut best_dist2 = f64::INFINITY;
        let mut best_station = 0.0;

        for (i, w) in self.vertices.windows(2).enumerate() {
            let (q, t) = closest_on_segment(point, &w[0], &w[1]);
            let dist2 = point.distance_squared_to(&q);
            if dist2 < best_dist2 {
                best_dist2 = dist2;
                best_station = self.stations[i] + t * (self.stations[i + 1] - self.stations[i]);
            }
        }

        best_station
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square() -> Polygon {
        Polygon::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(0.0, 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_polygon_drops_closing_vertex() {
        let poly = Polygon::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(0.0, 1.0),
            Point2D::new(0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(poly.vertices().len(), 3);
        assert_relative_eq!(poly.signed_area(), 0.5);
    }

    #[test]
    fn test_polygon_too_few_vertices() {
        let err = Polygon::new(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)]).unwrap_err();
        assert!(matches!(err, GeoError::TooFewVertices { required: 3, .. }));
    }

    #[test]
    fn test_polygon_rejects_nan() {
        let err = Polygon::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(f64::NAN, 0.0),
            Point2D::new(0.0, 1.0),
        ])
        .unwrap_err();
        assert_eq!(err, GeoError::NonFiniteVertex { shape: "多边形", index: 1 });
    }

    #[test]
    fn test_contains_inside_outside() {
        let sq = unit_square();
        assert!(sq.contains(&Point2D::new(0.5, 0.5)));
        assert!(sq.contains(&Point2D::new(0.999, 0.001)));
        assert!(!sq.contains(&Point2D::new(1.5, 0.5)));
        assert!(!sq.contains(&Point2D::new(-0.1, 0.5)));
    }

    #[test]
    fn test_boundary_excluded_consistently() {
        let sq = unit_square();
        let edge_points = [
            Point2D::new(0.0, 0.5),
            Point2D::new(1.0, 0.5),
            Point2D::new(0.5, 0.0),
            Point2D::new(0.5, 1.0),
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 1.0),
        ];
        for _ in 0..3 {
            for p in &edge_points {
                assert!(sq.on_boundary(p));
                assert!(!sq.contains(p));
            }
        }
    }

    #[test]
    fn test_contains_concave() {
        // L 形
        let poly = Polygon::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(2.0, 0.0),
            Point2D::new(2.0, 1.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(1.0, 2.0),
            Point2D::new(0.0, 2.0),
        ])
        .unwrap();
        assert!(poly.contains(&Point2D::new(0.5, 1.5)));
        assert!(poly.contains(&Point2D::new(1.5, 0.5)));
        assert!(!poly.contains(&Point2D::new(1.5, 1.5)));
    }

    #[test]
    fn test_polyline_length_and_point_at() {
        let line = Polyline::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(3.0, 0.0),
            Point2D::new(3.0, 4.0),
        ])
        .unwrap();
        assert_relative_eq!(line.length(), 7.0);
        assert_eq!(line.point_at(-1.0), Point2D::new(0.0, 0.0));
        assert_eq!(line.point_at(10.0), Point2D::new(3.0, 4.0));

        let p = line.point_at(1.5);
        assert_relative_eq!(p.x, 1.5);
        assert_relative_eq!(p.y, 0.0);

        let p = line.point_at(5.0);
        assert_relative_eq!(p.x, 3.0);
        assert_relative_eq!(p.y, 2.0);
    }

    #[test]
    fn test_polyline_project() {
        let line = Polyline::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(3.0, 0.0),
            Point2D::new(3.0, 4.0),
        ])
        .unwrap();
        assert_relative_eq!(line.project(&Point2D::new(1.0, 0.5)), 1.0);
        assert_relative_eq!(line.project(&Point2D::new(4.0, 2.0)), 5.0);
        assert_relative_eq!(line.project(&Point2D::new(-2.0, -2.0)), 0.0);
        assert_relative_eq!(line.project(&Point2D::new(10.0, 10.0)), 7.0);
    }

    #[test]
    fn test_polyline_too_short() {
        assert!(Polyline::new(vec![Point2D::new(0.0, 0.0)]).is_err());
    }

    #[test]
    fn test_bbox_from_points() {
        let bbox = BoundingBox::from_points(&[
            Point2D::new(1.0, 5.0),
            Point2D::new(-2.0, 3.0),
            Point2D::new(4.0, -1.0),
        ])
        .unwrap();
        assert_eq!(bbox, BoundingBox::new(-2.0, -1.0, 4.0, 5.0));
        assert_relative_eq!(bbox.width(), 6.0);
        assert!(BoundingBox::from_points(&[]).is_none());
    }
}
