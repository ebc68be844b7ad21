// crates/mt_mesh/src/lib.rs

//! MariTec 网格模块
//!
//! 一个时间片内的非结构三角形网格及其标量场。
//!
//! # 模块
//!
//! - [`mesh`]: 节点坐标与三角形单元表
//! - [`fields`]: 按名称索引的标量场（节点或单元中心）
//! - [`compact`]: 单元掩码与网格压缩（节点重编号）
//! - [`error`]: 网格错误类型
//!
//! # 示例
//!
//! ```
//! use mt_geo::Point2D;
//! use mt_mesh::{Mesh, Mask, CompactedMesh};
//!
//! let mesh = Mesh::new(
//!     vec![
//!         Point2D::new(0.0, 0.0),
//!         Point2D::new(1.0, 0.0),
//!         Point2D::new(1.0, 1.0),
//!         Point2D::new(0.0, 1.0),
//!     ],
//!     vec![[0, 1, 2], [0, 2, 3]],
//! ).unwrap();
//!
//! let mask = Mask::from_bools(vec![false, true]);
//! let compacted = CompactedMesh::build(&mesh, &mask).unwrap();
//! assert_eq!(compacted.n_nodes(), 3);
//! assert_eq!(compacted.elements(), &[[0, 1, 2]]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compact;
pub mod error;
pub mod fields;
pub mod mesh;

// 重导出常用类型
pub use compact::{CompactedMesh, Mask};
pub use error::{MeshError, MeshResult};
pub use fields::{FieldFrame, FieldLocation, U_VELOCITY, V_VELOCITY, W_VELOCITY};
pub use mesh::{Mesh, Triangle};
