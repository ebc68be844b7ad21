// crates/mt_convert/src/full_field.rs

//! 全场导出
//!
//! 按场数组长度判断数据位置（先比较单元数）:
//!
//! - 单元中心数据: 单元形心作为点云输出
//! - 节点数据: 节点坐标 + 完整连接表作为有限元区块输出
//!
//! 坐标先减去平移量，非有限数值写出前置 0。

use crate::error::ConvertResult;
use crate::velocity::{sanitize, shifted_columns, VelocityField};
use mt_geo::Point2D;
use mt_io::exporters::{OutputZone, TecplotWriter, ZoneLayout, BASE_VARIABLES};
use mt_mesh::{FieldFrame, FieldLocation, Mesh};
use std::path::{Path, PathBuf};
use tracing::debug;

/// 节点数据的区块标题
pub const NODE_TITLE: &str = "MIKE21 全场流速矢量(节点)";
/// 单元中心数据的区块标题
pub const ELEMENT_TITLE: &str = "MIKE21 全场流速矢量(单元中心)";

/// 全场输出文件名
pub fn full_field_file_name(stem: &str) -> String {
    format!("{stem}_allfield.dat")
}

/// 一次导出的结果
#[derive(Debug, Clone, PartialEq)]
pub struct ExportReport {
    /// 输出文件
    pub path: PathBuf,
    /// 区块布局名称（"point" / "fe"）
    pub layout: &'static str,
    /// 数据点数
    pub points: usize,
    /// 单元数（点云为 0）
    pub elements: usize,
}

impl ExportReport {
    fn new(path: PathBuf, zone: &OutputZone) -> Self {
        Self {
            path,
            layout: zone.layout().name(),
            points: zone.n_points(),
            elements: zone.n_elements(),
        }
    }
}

/// 全场导出器
#[derive(Debug, Clone, Copy)]
pub struct FullFieldExporter {
    writer: TecplotWriter,
    shift: Point2D,
}

impl FullFieldExporter {
    /// 创建导出器，`shift` 为坐标平移量
    pub fn new(writer: TecplotWriter, shift: Point2D) -> Self {
        Self { writer, shift }
    }

    /// 构建输出区块，同时返回数据位置
    pub fn build_zone(
        &self,
        mesh: &Mesh,
        frame: &FieldFrame,
    ) -> ConvertResult<(OutputZone, FieldLocation)> {
        let vel = VelocityField::from_frame(frame)?;
        let location = FieldLocation::detect(vel.len(), mesh).ok_or_else(|| vel.mismatch(mesh))?;

        let (xs, ys) = match location {
            FieldLocation::Element => shifted_columns(&mesh.centroids(), self.shift),
            FieldLocation::Node => shifted_columns(mesh.nodes(), self.shift),
        };

        let VelocityField { u, v, w, speed } = vel;
        let mut columns = vec![xs, ys, u, v, w, speed];
        columns.iter_mut().for_each(|c| sanitize(c));

        let zone = match location {
            FieldLocation::Element => {
                OutputZone::point_cloud(ELEMENT_TITLE, &BASE_VARIABLES, columns)?
            }
            FieldLocation::Node => OutputZone::finite_element(
                NODE_TITLE,
                &BASE_VARIABLES,
                columns,
                mesh.elements().to_vec(),
            )?,
        };
        Ok((zone, location))
    }

    /// 导出 `<out_dir>/<stem>_allfield.dat`
    pub fn export(
        &self,
        mesh: &Mesh,
        frame: &FieldFrame,
        out_dir: &Path,
        stem: &str,
    ) -> ConvertResult<ExportReport> {
        let (zone, location) = self.build_zone(mesh, frame)?;
        let path = out_dir.join(full_field_file_name(stem));
        self.writer.write(&path, &zone)?;

        let report = ExportReport::new(path, &zone);
        match zone.layout() {
            ZoneLayout::PointCloud => debug!(
                "全场输出({}): {}, 数据点数: {}",
                location.label(),
                file_name(&report.path),
                report.points
            ),
            ZoneLayout::FiniteElement { .. } => debug!(
                "全场输出({}): {}, 节点数: {}, 单元数: {}",
                location.label(),
                file_name(&report.path),
                report.points,
                report.elements
            ),
        }
        Ok(report)
    }
}

pub(crate) fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
