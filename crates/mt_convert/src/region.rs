// crates/mt_convert/src/region.rs

//! 区域投影
//!
//! 对一个区域:
//!
//! 1. 单元形心严格位于区域多边形内的单元被选中（边界上的不选）
//! 2. 选中单元的流速沿轴线分解为切向 `Vx` 与法向 `Vy`
//! 3. 网格压缩，只保留被选中单元引用的节点
//! 4. 每个节点取其关联选中单元的平均值
//! 5. 以三角形有限元区块写出 `<stem>_<区域名>.dat`
//!
//! 区域投影要求流速为单元中心数据。

use crate::error::{ConvertError, ConvertResult};
use crate::full_field::{file_name, ExportReport};
use crate::velocity::{sanitize, shifted_columns, VelocityField};
use mt_geo::{GeometryBackend, PlanarGeometry, Point2D, Polygon, Polyline};
use mt_io::dxf::DxfLoader;
use mt_io::exporters::{OutputZone, TecplotWriter, PROJECTED_VARIABLES};
use mt_mesh::{CompactedMesh, FieldFrame, Mask, Mesh};
use rayon::prelude::*;
use std::path::Path;
use tracing::debug;

/// 区域输出文件名
pub fn region_file_name(stem: &str, region: &str) -> String {
    format!("{stem}_{region}.dat")
}

/// 区域：边界多边形 + 轴线
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// 区域名（用于文件名）
    pub name: String,
    /// 边界多边形
    pub polygon: Polygon,
    /// 轴线
    pub axis: Polyline,
    /// 描述（用于标题）
    pub description: String,
}

impl Region {
    /// 创建区域，描述默认为区域名
    pub fn new(name: impl Into<String>, polygon: Polygon, axis: Polyline) -> Self {
        let name = name.into();
        Self {
            description: name.clone(),
            name,
            polygon,
            axis,
        }
    }

    /// 设置描述
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// 从两个 DXF 文件加载
    pub fn from_dxf(
        name: impl Into<String>,
        region_path: &Path,
        axis_path: &Path,
    ) -> ConvertResult<Self> {
        let polygon = DxfLoader::load_region(region_path)?;
        let axis = DxfLoader::load_axis(axis_path)?;
        Ok(Self::new(name, polygon, axis))
    }

    /// 输出区块标题
    pub fn title(&self) -> String {
        format!("MIKE21 区域: {}", self.description)
    }
}

/// 区域投影器
#[derive(Debug, Clone, Copy)]
pub struct RegionProjector<G: GeometryBackend = PlanarGeometry> {
    backend: G,
    writer: TecplotWriter,
    shift: Point2D,
}

impl RegionProjector<PlanarGeometry> {
    /// 使用平面几何后端
    pub fn planar(writer: TecplotWriter, shift: Point2D) -> Self {
        Self::new(PlanarGeometry::default(), writer, shift)
    }
}

impl<G: GeometryBackend> RegionProjector<G> {
    /// 创建投影器
    pub fn new(backend: G, writer: TecplotWriter, shift: Point2D) -> Self {
        Self {
            backend,
            writer,
            shift,
        }
    }

    /// 几何后端
    pub fn backend(&self) -> &G {
        &self.backend
    }

    /// 单元掩码：形心严格在多边形内
    pub fn mask(&self, centroids: &[Point2D], polygon: &Polygon) -> Mask {
        let bbox = polygon.bbox();
        let bits = centroids
            .par_iter()
            .map(|c| bbox.contains_point(c) && self.backend.contains(polygon, *c))
            .collect();
        Mask::from_bools(bits)
    }

    /// 沿轴线分解流速，返回（切向, 法向）
    pub fn project(
        &self,
        axis: &Polyline,
        points: &[Point2D],
        u: &[f64],
        v: &[f64],
    ) -> (Vec<f64>, Vec<f64>) {
        points
            .par_iter()
            .zip(u.par_iter().zip(v.par_iter()))
            .map(|(p, (&uu, &vv))| self.backend.project_and_frame(axis, *p).project(uu, vv))
            .unzip()
    }

    /// 构建区域输出区块
    pub fn build_zone(
        &self,
        mesh: &Mesh,
        frame: &FieldFrame,
        region: &Region,
    ) -> ConvertResult<OutputZone> {
        let vel = VelocityField::from_frame(frame)?;
        if vel.len() != mesh.n_elements() {
            return Err(vel.mismatch(mesh));
        }

        let centroids = mesh.centroids();
        let mask = self.mask(&centroids, &region.polygon);
        if !mask.any() {
            return Err(ConvertError::EmptyRegion {
                region: region.name.clone(),
            });
        }
        debug!(
            "区域 {}: 选中 {}/{} 个单元 (几何后端 {})",
            region.name,
            mask.count_selected(),
            mesh.n_elements(),
            self.backend.name()
        );

        let points = mask.select(&centroids)?;
        let u = mask.select(&vel.u)?;
        let v = mask.select(&vel.v)?;
        let w = mask.select(&vel.w)?;
        let speed = mask.select(&vel.speed)?;
        let (vt, vn) = self.project(&region.axis, &points, &u, &v);

        let compacted = CompactedMesh::build(mesh, &mask)?;
        let (xs, ys) = shifted_columns(compacted.nodes(), self.shift);

        let mut columns = vec![xs, ys];
        for values in [&u, &v, &w, &speed, &vt, &vn] {
            columns.push(compacted.node_mean(values)?);
        }
        columns.iter_mut().for_each(|c| sanitize(c));

        let zone = OutputZone::finite_element(
            region.title(),
            &PROJECTED_VARIABLES,
            columns,
            compacted.elements().to_vec(),
        )?;
        Ok(zone)
    }

    /// 导出 `<out_dir>/<stem>_<区域名>.dat`
    pub fn export(
        &self,
        mesh: &Mesh,
        frame: &FieldFrame,
        region: &Region,
        out_dir: &Path,
        stem: &str,
    ) -> ConvertResult<ExportReport> {
        let zone = self.build_zone(mesh, frame, region)?;
        let path = out_dir.join(region_file_name(stem, &region.name));
        self.writer.write(&path, &zone)?;

        debug!(
            "区域 {} 输出: {}, 节点数: {}, 单元数: {}",
            region.name,
            file_name(&path),
            zone.n_points(),
            zone.n_elements()
        );
        Ok(ExportReport {
            path,
            layout: zone.layout().name(),
            points: zone.n_points(),
            elements: zone.n_elements(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mt_geo::LocalFrame;
    use mt_mesh::{U_VELOCITY, V_VELOCITY};

    fn grid(n: usize) -> Mesh {
        let mut nodes = Vec::new();
        for j in 0..n {
            for i in 0..n {
                nodes.push(Point2D::new(i as f64, j as f64));
            }
        }
        let mut elements = Vec::new();
        for j in 0..n - 1 {
            for i in 0..n - 1 {
                let n0 = j * n + i;
                elements.push([n0, n0 + 1, n0 + n + 1]);
                elements.push([n0, n0 + n + 1, n0 + n]);
            }
        }
        Mesh::new(nodes, elements).unwrap()
    }

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
        Polygon::new(vec![
            Point2D::new(x0, y0),
            Point2D::new(x1, y0),
            Point2D::new(x1, y1),
            Point2D::new(x0, y1),
        ])
        .unwrap()
    }

    fn x_axis() -> Polyline {
        Polyline::new(vec![Point2D::new(-100.0, 0.0), Point2D::new(100.0, 0.0)]).unwrap()
    }

    fn uniform(len: usize, u: f64, v: f64) -> FieldFrame {
        FieldFrame::new(None)
            .with_field(U_VELOCITY, vec![u; len])
            .unwrap()
            .with_field(V_VELOCITY, vec![v; len])
            .unwrap()
    }

    #[test]
    fn test_mask_strict_interior() {
        let projector = RegionProjector::planar(TecplotWriter::default(), Point2D::ZERO);
        let polygon = rect(0.0, 0.0, 2.0, 2.0);
        let points = [
            Point2D::new(1.0, 1.0),
            Point2D::new(3.0, 1.0),
            Point2D::new(2.0, 1.0),
            Point2D::new(0.0, 0.0),
            Point2D::new(1.999, 0.001),
        ];
        let expected = vec![true, false, false, false, true];
        for _ in 0..3 {
            let mask = projector.mask(&points, &polygon);
            assert_eq!(mask, Mask::from_bools(expected.clone()));
        }
    }

    #[test]
    fn test_mask_matches_half_planes_of_rotated_hexagon() {
        let projector = RegionProjector::planar(TecplotWriter::default(), Point2D::ZERO);
        let (cx, cy, radius, phase) = (0.1, -0.2, 1.5, 0.3_f64);
        let corners: Vec<Point2D> = (0..6)
            .map(|k| {
                let a = phase + k as f64 * std::f64::consts::FRAC_PI_3;
                Point2D::new(cx + radius * a.cos(), cy + radius * a.sin())
            })
            .collect();
        let polygon = Polygon::new(corners.clone()).unwrap();

        // 逆时针顶点序：各边有向距离均为正即在内部
        let signed_distances = |p: &Point2D| -> Vec<f64> {
            (0..6)
                .map(|k| {
                    let a = corners[k];
                    let b = corners[(k + 1) % 6];
                    let (ex, ey) = (b.x - a.x, b.y - a.y);
                    (ex * (p.y - a.y) - ey * (p.x - a.x)) / ex.hypot(ey)
                })
                .collect()
        };

        let mut points = Vec::new();
        for j in 0..41 {
            for i in 0..41 {
                points.push(Point2D::new(-2.0 + 0.1 * i as f64, -2.0 + 0.1 * j as f64));
            }
        }
        let mask = projector.mask(&points, &polygon);

        let mut inside = 0;
        let mut checked = 0;
        for (i, p) in points.iter().enumerate() {
            let d = signed_distances(p);
            if d.iter().any(|s| s.abs() < 1e-6) {
                continue;
            }
            let expected = d.iter().all(|&s| s > 0.0);
            assert_eq!(mask.is_selected(i), expected, "点 ({}, {})", p.x, p.y);
            checked += 1;
            inside += usize::from(expected);
        }
        assert!(checked > 1600);
        assert!(inside > 100 && inside < checked);
    }

    #[test]
    fn test_projection_along_diagonal_axis() {
        let projector = RegionProjector::planar(TecplotWriter::default(), Point2D::ZERO);
        let axis = Polyline::new(vec![Point2D::new(0.0, 0.0), Point2D::new(10.0, 10.0)]).unwrap();
        let (vt, vn) = projector.project(&axis, &[Point2D::new(3.0, 5.0)], &[1.0], &[1.0]);
        assert_relative_eq!(vt[0], 2.0_f64.sqrt(), epsilon = 1e-6);
        assert_relative_eq!(vn[0], 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_region_zone_and_node_means() {
        let mesh = grid(5);
        let mut frame = uniform(mesh.n_elements(), 1.0, 0.0);
        let u: Vec<f64> = (0..mesh.n_elements()).map(|e| e as f64).collect();
        frame.insert(U_VELOCITY, u).unwrap();

        // 左下角一格: 单元 0 [0,1,6]、单元 1 [0,6,5]
        let region = Region::new("corner", rect(0.0, 0.0, 1.0, 1.0), x_axis())
            .with_description("左下角");
        let projector = RegionProjector::planar(TecplotWriter::default(), Point2D::new(0.5, 0.0));
        let zone = projector.build_zone(&mesh, &frame, &region).unwrap();

        assert_eq!(zone.title(), "MIKE21 区域: 左下角");
        assert_eq!(zone.n_points(), 4);
        assert_eq!(zone.n_elements(), 2);

        let text = TecplotWriter::new(2).render(&zone).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        // 节点 0 属于两个单元: u = (0 + 1) / 2; 沿 x 轴 Vx = u, Vy = 0
        assert_eq!(lines[3], "-0.50 0.00 0.50 0.00 0.00 0.50 0.50 0.00");
        // 节点 1 只属于单元 0
        assert_eq!(lines[4], "0.50 0.00 0.00 0.00 0.00 0.00 0.00 0.00");
        assert_eq!(lines[7], "1 2 3");
        assert_eq!(lines[8], "1 3 4");
    }

    #[test]
    fn test_empty_region() {
        let mesh = grid(5);
        let region = Region::new("far", rect(50.0, 50.0, 60.0, 60.0), x_axis());
        let projector = RegionProjector::planar(TecplotWriter::default(), Point2D::ZERO);
        let dir = tempfile::tempdir().unwrap();
        let err = projector
            .export(&mesh, &uniform(mesh.n_elements(), 1.0, 1.0), &region, dir.path(), "c")
            .unwrap_err();
        assert!(matches!(err, ConvertError::EmptyRegion { ref region } if region == "far"));
        assert!(!dir.path().join("c_far.dat").exists());
    }

    #[test]
    fn test_node_data_rejected() {
        let mesh = grid(5);
        let region = Region::new("all", rect(-1.0, -1.0, 10.0, 10.0), x_axis());
        let projector = RegionProjector::planar(TecplotWriter::default(), Point2D::ZERO);
        let err = projector
            .build_zone(&mesh, &uniform(mesh.n_nodes(), 1.0, 1.0), &region)
            .unwrap_err();
        assert!(matches!(err, ConvertError::DimensionMismatch { field_len: 25, .. }));
    }

    /// 固定返回 y 方向切向量的后端
    struct NorthBackend;

    impl GeometryBackend for NorthBackend {
        fn contains(&self, polygon: &Polygon, point: Point2D) -> bool {
            polygon.contains(&point)
        }

        fn project_and_frame(&self, _axis: &Polyline, point: Point2D) -> LocalFrame {
            LocalFrame::from_tangent(point, 0.0, Point2D::UNIT_Y)
        }
    }

    #[test]
    fn test_custom_backend() {
        let mesh = grid(3);
        let region = Region::new("all", rect(-1.0, -1.0, 5.0, 5.0), x_axis());
        let projector = RegionProjector::new(NorthBackend, TecplotWriter::new(1), Point2D::ZERO);
        let zone = projector
            .build_zone(&mesh, &uniform(mesh.n_elements(), 2.0, 3.0), &region)
            .unwrap();
        let text = TecplotWriter::new(1).render(&zone).unwrap();
        // 切向 = v, 法向 = -u
        assert!(text.lines().nth(3).unwrap().ends_with("3.0 -2.0"));
        assert_eq!(projector.backend().name(), "anonymous");
    }

    #[test]
    fn test_region_from_dxf() {
        use mt_io::dxf::DxfPolyline;

        let dir = tempfile::tempdir().unwrap();
        let region_path = dir.path().join("r.dxf");
        let axis_path = dir.path().join("a.dxf");
        DxfLoader::save(
            &region_path,
            &[DxfPolyline::new(rect(0.0, 0.0, 2.0, 2.0).vertices().to_vec(), true)],
        )
        .unwrap();
        DxfLoader::save(&axis_path, &[DxfPolyline::new(x_axis().vertices().to_vec(), false)])
            .unwrap();

        let region = Region::from_dxf("r1", &region_path, &axis_path).unwrap();
        assert_eq!(region.description, "r1");
        assert_eq!(region.polygon.vertices().len(), 4);

        let err = Region::from_dxf("r1", &axis_path, &axis_path).unwrap_err();
        assert!(matches!(err, ConvertError::Io(mt_io::IoError::Geometry { .. })));
    }
}
