// crates/mt_io/src/exporters/tecplot.rs

//! Tecplot ASCII 导出器
//!
//! 两种区块布局:
//!
//! - 点云: `ZONE I=<n>, DATAPACKING=POINT`，每行一个点
//! - 有限元: `ZONE N=<n>, E=<e>, F=FEPOINT, ET=TRIANGLE`，
//!   先逐行写节点数据，再逐行写 1 起编号的三角形连接表
//!
//! 数值以固定小数位输出，单个空格分隔，行尾为 `\n`。
//! 整个文件先在内存中生成，再一次写出。
//!
//! # 示例
//!
//! ```
//! use mt_io::exporters::{OutputZone, TecplotWriter, BASE_VARIABLES};
//!
//! let columns = vec![vec![0.0], vec![1.0], vec![0.5], vec![0.0], vec![0.0], vec![0.5]];
//! let zone = OutputZone::point_cloud("demo", &BASE_VARIABLES, columns).unwrap();
//! let text = TecplotWriter::new(2).render(&zone).unwrap();
//! assert!(text.ends_with("0.00 1.00 0.50 0.00 0.00 0.50\n"));
//! ```

use crate::error::{IoError, IoResult};
use mt_mesh::Triangle;
use std::fmt::Write as _;
use std::path::Path;
use tracing::debug;

/// 默认小数位数
pub const DEFAULT_PRECISION: usize = 6;

/// 基本变量列
pub const BASE_VARIABLES: [&str; 6] = ["X", "Y", "u", "v", "w", "velocity"];

/// 带轴线投影分量的变量列
pub const PROJECTED_VARIABLES: [&str; 8] = ["X", "Y", "u", "v", "w", "velocity", "Vx", "Vy"];

/// 区块布局
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZoneLayout {
    /// 点云（无连接关系）
    PointCloud,
    /// 三角形有限元，连接表为 0 起编号
    FiniteElement {
        /// 三角形连接表
        connectivity: Vec<Triangle>,
    },
}

impl ZoneLayout {
    /// 布局名称
    pub fn name(&self) -> &'static str {
        match self {
            Self::PointCloud => "point",
            Self::FiniteElement { .. } => "fe",
        }
    }
}

/// 一个输出区块
#[derive(Debug, Clone, PartialEq)]
pub struct OutputZone {
    title: String,
    variables: Vec<String>,
    columns: Vec<Vec<f64>>,
    layout: ZoneLayout,
}

impl OutputZone {
    /// 创建点云区块
    pub fn point_cloud(
        title: impl Into<String>,
        variables: &[&str],
        columns: Vec<Vec<f64>>,
    ) -> IoResult<Self> {
        Self::build(title.into(), variables, columns, ZoneLayout::PointCloud)
    }

    /// 创建三角形有限元区块
    pub fn finite_element(
        title: impl Into<String>,
        variables: &[&str],
        columns: Vec<Vec<f64>>,
        connectivity: Vec<Triangle>,
    ) -> IoResult<Self> {
        Self::build(
            title.into(),
            variables,
            columns,
            ZoneLayout::FiniteElement { connectivity },
        )
    }

    fn build(
        title: String,
        variables: &[&str],
        columns: Vec<Vec<f64>>,
        layout: ZoneLayout,
    ) -> IoResult<Self> {
        if variables.len() != columns.len() {
            return Err(IoError::InvalidZone(format!(
                "变量 {} 个, 数据列 {} 列",
                variables.len(),
                columns.len()
            )));
        }
        let n_points = columns.first().map_or(0, Vec::len);
        if let Some((i, col)) = columns.iter().enumerate().find(|(_, c)| c.len() != n_points) {
            return Err(IoError::InvalidZone(format!(
                "第 {i} 列长度 {} 与首列长度 {n_points} 不一致",
                col.len()
            )));
        }
        if let ZoneLayout::FiniteElement { connectivity } = &layout {
            if let Some(tri) = connectivity.iter().find(|t| t.iter().any(|&n| n >= n_points)) {
                return Err(IoError::InvalidZone(format!(
                    "连接表 {tri:?} 超出节点数 {n_points}"
                )));
            }
        }

        Ok(Self {
            title,
            variables: variables.iter().map(|v| v.to_string()).collect(),
            columns,
            layout,
        })
    }

    /// 标题
    pub fn title(&self) -> &str {
        &self.title
    }

    /// 变量名
    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// 布局
    pub fn layout(&self) -> &ZoneLayout {
        &self.layout
    }

    /// 数据点数
    pub fn n_points(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// 单元数（点云为 0）
    pub fn n_elements(&self) -> usize {
        match &self.layout {
            ZoneLayout::PointCloud => 0,
            ZoneLayout::FiniteElement { connectivity } => connectivity.len(),
        }
    }
}

/// Tecplot ASCII 写出器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TecplotWriter {
    precision: usize,
}

impl Default for TecplotWriter {
    fn default() -> Self {
        Self::new(DEFAULT_PRECISION)
    }
}

impl TecplotWriter {
    /// 创建写出器
    pub fn new(precision: usize) -> Self {
        Self { precision }
    }

    /// 小数位数
    pub fn precision(&self) -> usize {
        self.precision
    }

    /// 生成完整文件内容
    pub fn render(&self, zone: &OutputZone) -> IoResult<String> {
        let n = zone.n_points();
        // 每个数值大约 precision + 8 个字符
        let mut out =
            String::with_capacity(128 + n * zone.columns.len() * (self.precision + 8));

        let _ = writeln!(out, "TITLE = \"{}\"", zone.title);
        let names: Vec<String> = zone.variables.iter().map(|v| format!("\"{v}\"")).collect();
        let _ = writeln!(out, "VARIABLES = {}", names.join(", "));
        match &zone.layout {
            ZoneLayout::PointCloud => {
                let _ = writeln!(out, "ZONE I={n}, DATAPACKING=POINT");
            }
            ZoneLayout::FiniteElement { connectivity } => {
                let _ = writeln!(
                    out,
                    "ZONE N={n}, E={}, F=FEPOINT, ET=TRIANGLE",
                    connectivity.len()
                );
            }
        }

        for row in 0..n {
            for (column, values) in zone.columns.iter().enumerate() {
                let v = values[row];
                if !v.is_finite() {
                    return Err(IoError::NonFinite { row, column });
                }
                if column > 0 {
                    out.push(' ');
                }
                let _ = write!(out, "{:.*}", self.precision, v);
            }
            out.push('\n');
        }

        if let ZoneLayout::FiniteElement { connectivity } = &zone.layout {
            for [a, b, c] in connectivity {
                let _ = writeln!(out, "{} {} {}", a + 1, b + 1, c + 1);
            }
        }

        Ok(out)
    }

    /// 生成并写出文件
    pub fn write<P: AsRef<Path>>(&self, path: P, zone: &OutputZone) -> IoResult<()> {
        let path = path.as_ref();
        let text = self.render(zone)?;
        std::fs::write(path, text).map_err(|e| IoError::write(path, e))?;
        debug!(
            "写出 {}: {} 个点, {} 个单元",
            path.display(),
            zone.n_points(),
            zone.n_elements()
        );
        Ok(())
    }
}
