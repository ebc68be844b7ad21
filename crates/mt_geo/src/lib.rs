// crates/mt_geo/src/lib.rs

//! MariTec 平面几何模块
//!
//! 为区域筛选和流速投影提供几何基础。
//!
//! # 模块
//!
//! - `geometry`: 平面点/向量类型 (Point2D)
//! - `shapes`: 闭合多边形、轴线多段线、边界框
//! - `backend`: 几何后端 trait（包含判断、轴线投影与局部坐标系）
//!
//! # 示例
//!
//! ```
//! use mt_geo::prelude::*;
//!
//! let square = Polygon::new(vec![
//!     Point2D::new(0.0, 0.0),
//!     Point2D::new(1.0, 0.0),
//!     Point2D::new(1.0, 1.0),
//!     Point2D::new(0.0, 1.0),
//! ]).unwrap();
//! let axis = Polyline::new(vec![Point2D::new(0.0, 0.5), Point2D::new(1.0, 0.5)]).unwrap();
//!
//! let backend = PlanarGeometry::default();
//! assert!(backend.contains(&square, Point2D::new(0.5, 0.5)));
//!
//! let frame = backend.project_and_frame(&axis, Point2D::new(0.3, 0.9));
//! let (vt, vn) = frame.project(1.0, 0.0);
//! assert!((vt - 1.0).abs() < 1e-9 && vn.abs() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod geometry;
pub mod shapes;

/// 预导入模块
pub mod prelude {
    pub use crate::backend::{GeometryBackend, LocalFrame, PlanarGeometry};
    pub use crate::geometry::Point2D;
    pub use crate::shapes::{BoundingBox, Polygon, Polyline};
}

// 重导出常用类型
pub use backend::{GeometryBackend, LocalFrame, PlanarGeometry};
pub use error::{GeoError, GeoResult};
pub use geometry::Point2D;
pub use shapes::{BoundingBox, Polygon, Polyline};
