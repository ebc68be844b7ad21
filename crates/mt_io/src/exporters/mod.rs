// crates/mt_io/src/exporters/mod.rs

//! 数据导出模块
//!
//! 提供导出 Tecplot ASCII 格式的功能。

pub mod tecplot;

// 重导出
pub use tecplot::{
    OutputZone, TecplotWriter, ZoneLayout, BASE_VARIABLES, DEFAULT_PRECISION, PROJECTED_VARIABLES,
};
