// crates/mt_io/src/lib.rs

//! MariTec IO 模块
//!
//! 提供数据输入输出功能。
//!
//! # 模块
//!
//! - [`source`]: 网格数据源（时间片读取）
//! - [`dxf`]: DXF 多段线加载（区域边界、轴线）
//! - [`exporters`]: Tecplot ASCII 导出
//! - [`error`]: IO 错误类型
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use mt_io::source::{JsonMeshSource, MeshSource, TimeSelector};
//! use mt_io::exporters::TecplotWriter;
//!
//! let mut handle = JsonMeshSource::new().open(Path::new("case.json"))?;
//! let (mesh, frame) = handle.read(TimeSelector::Latest)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dxf;
pub mod error;
pub mod exporters;
pub mod source;

// 重导出常用类型
pub use dxf::{DxfLoader, DxfPolyline};
pub use error::{IoError, IoResult};
pub use exporters::{OutputZone, TecplotWriter, ZoneLayout};
pub use source::{JsonMeshSource, MeshHandle, MeshInfo, MeshSource, TimeSelector};
