// crates/mt_convert/src/lib.rs

//! MariTec 转换模块
//!
//! 单个时间片的两类输出:
//!
//! - [`full_field`]: 全场导出（节点数据 → 有限元区块，单元中心数据 → 点云）
//! - [`region`]: 区域投影（多边形筛选、轴线坐标系分解、网格压缩、节点平均）
//!
//! 二者共享 [`velocity`] 中的流速提取、坐标平移与非有限值处理。
//!
//! # 示例
//!
//! ```rust,ignore
//! use mt_convert::{FullFieldExporter, Region, RegionProjector};
//! use mt_io::TecplotWriter;
//!
//! let writer = TecplotWriter::new(6);
//! let shift = Point2D::new(500000.0, 3000000.0);
//! FullFieldExporter::new(writer, shift).export(&mesh, &frame, out_dir, "case")?;
//!
//! let region = Region::from_dxf("bend", "bend_region.dxf".as_ref(), "bend_axis.dxf".as_ref())?;
//! RegionProjector::planar(writer, shift).export(&mesh, &frame, &region, out_dir, "case")?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod full_field;
pub mod region;
pub mod velocity;

// 重导出常用类型
pub use error::{ConvertError, ConvertResult};
pub use full_field::{full_field_file_name, ExportReport, FullFieldExporter};
pub use region::{region_file_name, Region, RegionProjector};
pub use velocity::{sanitize, VelocityField};
