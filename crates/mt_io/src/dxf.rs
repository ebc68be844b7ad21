// crates/mt_io/src/dxf.rs

//! DXF 几何加载
//!
//! 读取 ASCII DXF 中 ENTITIES 段的多段线，用作区域边界和轴线。
//!
//! 支持的图元:
//! - `LWPOLYLINE`: 组码 70 的第 1 位表示闭合，顶点由组码 10/20 给出
//! - `POLYLINE` + `VERTEX` ... `SEQEND`: 旧式多段线，闭合标志同上
//!
//! 其余图元被忽略。
//!
//! # 示例
//!
//! ```ignore
//! use mt_io::dxf::DxfLoader;
//!
//! let polygon = DxfLoader::load_region("region.dxf")?;
//! let axis = DxfLoader::load_axis("axis.dxf")?;
//! ```

use crate::error::{IoError, IoResult};
use mt_geo::{Point2D, Polygon, Polyline};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// 组码 70 中表示闭合的标志位
const CLOSED_FLAG: i64 = 1;

/// DXF 中读出的一条多段线
#[derive(Debug, Clone, PartialEq)]
pub struct DxfPolyline {
    /// 顶点（只取 X/Y）
    pub vertices: Vec<Point2D>,
    /// 是否闭合
    pub closed: bool,
}

impl DxfPolyline {
    /// 创建多段线
    pub fn new(vertices: Vec<Point2D>, closed: bool) -> Self {
        Self { vertices, closed }
    }
}

/// DXF 几何加载器
pub struct DxfLoader;

impl DxfLoader {
    /// 加载区域多边形：第一条闭合多段线
    pub fn load_region<P: AsRef<Path>>(path: P) -> IoResult<Polygon> {
        let path = path.as_ref();
        let ring = Self::load(path)?
            .into_iter()
            .find(|p| p.closed)
            .ok_or_else(|| IoError::geometry(path, "no closed ring"))?;
        Polygon::new(ring.vertices).map_err(|e| IoError::geometry(path, e))
    }

    /// 加载轴线：第一条多段线（闭合与否均可）
    pub fn load_axis<P: AsRef<Path>>(path: P) -> IoResult<Polyline> {
        let path = path.as_ref();
        let line = Self::load(path)?
            .into_iter()
            .next()
            .ok_or_else(|| IoError::geometry(path, "no linear feature"))?;
        Polyline::new(line.vertices).map_err(|e| IoError::geometry(path, e))
    }

    /// 读取文件中的全部多段线
    pub fn load<P: AsRef<Path>>(path: P) -> IoResult<Vec<DxfPolyline>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| IoError::geometry(path, e))?;
        Self::load_from_reader(path, BufReader::new(file))
    }

    /// 从 reader 读取多段线，`path` 仅用于错误信息
    pub fn load_from_reader<R: BufRead>(path: &Path, reader: R) -> IoResult<Vec<DxfPolyline>> {
        let pairs = read_pairs(path, reader)?;
        let entities = entities_section(&pairs)
            .ok_or_else(|| IoError::geometry(path, "缺少 ENTITIES 段"))?;
        parse_entities(path, entities)
    }

    /// 将多段线写为最小的 ASCII DXF 文本（仅 ENTITIES 段）
    pub fn to_dxf_string(polylines: &[DxfPolyline]) -> String {
        let mut out = String::from("0\nSECTION\n2\nENTITIES\n");
        for pl in polylines {
            let _ = write!(
                out,
                "0\nLWPOLYLINE\n8\n0\n90\n{}\n70\n{}\n",
                pl.vertices.len(),
                if pl.closed { CLOSED_FLAG } else { 0 }
            );
            for v in &pl.vertices {
                let _ = write!(out, "10\n{}\n20\n{}\n", v.x, v.y);
            }
        }
        out.push_str("0\nENDSEC\n0\nEOF\n");
        out
    }

    /// 写出 DXF 文件
    pub fn save<P: AsRef<Path>>(path: P, polylines: &[DxfPolyline]) -> IoResult<()> {
        let path = path.as_ref();
        std::fs::write(path, Self::to_dxf_string(polylines)).map_err(|e| IoError::write(path, e))
    }
}

/// 组码/值对
type Pair = (i32, String);

/// 读取全部组码/值对
fn read_pairs<R: BufRead>(path: &Path, reader: R) -> IoResult<Vec<Pair>> {
    let lines: Vec<String> = reader
        .lines()
        .collect::<Result<_, _>>()
        .map_err(|e| IoError::geometry(path, e))?;

    // 去掉文件末尾的空行
    let mut end = lines.len();
    while end > 0 && lines[end - 1].trim().is_empty() {
        end -= 1;
    }
    if end % 2 != 0 {
        return Err(IoError::geometry(path, "组码与值不成对"));
    }

    lines[..end]
        .chunks_exact(2)
        .enumerate()
        .map(|(i, chunk)| {
            let code = chunk[0].trim().parse::<i32>().map_err(|_| {
                IoError::geometry(path, format!("第 {} 行组码无效: {}", 2 * i + 1, chunk[0].trim()))
            })?;
            Ok((code, chunk[1].trim().to_string()))
        })
        .collect()
}

/// 截取 ENTITIES 段（不含 SECTION 头与 ENDSEC）
fn entities_section(pairs: &[Pair]) -> Option<&[Pair]> {
    let start = pairs.windows(2).position(|w| {
        w[0].0 == 0 && w[0].1 == "SECTION" && w[1].0 == 2 && w[1].1 == "ENTITIES"
    })? + 2;
    let len = pairs[start..]
        .iter()
        .position(|(c, v)| *c == 0 && v == "ENDSEC")
        .unwrap_or(pairs.len() - start);
    Some(&pairs[start..start + len])
}

/// 多段线收集状态
#[derive(Default)]
struct Builder {
    vertices: Vec<Point2D>,
    closed: bool,
}

impl Builder {
    fn finish(self) -> DxfPolyline {
        DxfPolyline::new(self.vertices, self.closed)
    }
}

/// 解析 ENTITIES 段中的多段线
fn parse_entities(path: &Path, pairs: &[Pair]) -> IoResult<Vec<DxfPolyline>> {
    let mut out = Vec::new();
    // 当前 LWPOLYLINE
    let mut lw: Option<Builder> = None;
    // 当前旧式 POLYLINE 及是否在其 VERTEX 中
    let mut classic: Option<Builder> = None;
    let mut in_vertex = false;
    // 当前 VERTEX 坐标
    let mut vertex: Option<(Option<f64>, Option<f64>)> = None;

    for (code, value) in pairs {
        if *code == 0 {
            if let Some(b) = lw.take() {
                out.push(b.finish());
            }
            if let Some((x, y)) = vertex.take() {
                push_vertex(path, classic.as_mut(), x, y)?;
            }
            in_vertex = false;

            match value.as_str() {
                "LWPOLYLINE" => lw = Some(Builder::default()),
                "POLYLINE" => {
                    if let Some(b) = classic.take() {
                        out.push(b.finish());
                    }
                    classic = Some(Builder::default());
                }
                "VERTEX" if classic.is_some() => {
                    in_vertex = true;
                    vertex = Some((None, None));
                }
                "SEQEND" => {
                    if let Some(b) = classic.take() {
                        out.push(b.finish());
                    }
                }
                _ => {}
            }
            continue;
        }

        if let Some(b) = lw.as_mut() {
            match code {
                70 => b.closed = parse_flag(path, value)? & CLOSED_FLAG != 0,
                10 => b.vertices.push(Point2D::new(parse_coord(path, value)?, f64::NAN)),
                20 => {
                    let y = parse_coord(path, value)?;
                    match b.vertices.last_mut() {
                        Some(p) if p.y.is_nan() => p.y = y,
                        _ => return Err(IoError::geometry(path, "组码 20 之前缺少组码 10")),
                    }
                }
                _ => {}
            }
        } else if in_vertex {
            if let Some((x, y)) = vertex.as_mut() {
                match code {
                    10 => *x = Some(parse_coord(path, value)?),
                    20 => *y = Some(parse_coord(path, value)?),
                    _ => {}
                }
            }
        } else if let Some(b) = classic.as_mut() {
            if *code == 70 {
                b.closed = parse_flag(path, value)? & CLOSED_FLAG != 0;
            }
        }
    }

    if let Some(b) = lw.take() {
        out.push(b.finish());
    }
    if let Some((x, y)) = vertex.take() {
        push_vertex(path, classic.as_mut(), x, y)?;
    }
    if let Some(b) = classic.take() {
        out.push(b.finish());
    }

    for pl in &out {
        if pl.vertices.iter().any(|p| !p.is_finite()) {
            return Err(IoError::geometry(path, "顶点坐标不完整"));
        }
    }
    Ok(out)
}

fn push_vertex(
    path: &Path,
    classic: Option<&mut Builder>,
    x: Option<f64>,
    y: Option<f64>,
) -> IoResult<()> {
    let (Some(b), Some(x), Some(y)) = (classic, x, y) else {
        return Err(IoError::geometry(path, "VERTEX 缺少坐标"));
    };
    b.vertices.push(Point2D::new(x, y));
    Ok(())
}

fn parse_coord(path: &Path, value: &str) -> IoResult<f64> {
    value
        .parse::<f64>()
        .map_err(|_| IoError::geometry(path, format!("坐标无法解析: {value}")))
}

fn parse_flag(path: &Path, value: &str) -> IoResult<i64> {
    value
        .parse::<i64>()
        .map_err(|_| IoError::geometry(path, format!("标志无法解析: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse(text: &str) -> IoResult<Vec<DxfPolyline>> {
        DxfLoader::load_from_reader(Path::new("mem.dxf"), text.as_bytes())
    }

    const MIXED: &str = "0\nSECTION\n2\nHEADER\n9\n$ACADVER\n1\nAC1015\n0\nENDSEC\n\
        0\nSECTION\n2\nENTITIES\n\
        0\nLINE\n8\n0\n10\n0.0\n20\n0.0\n11\n5.0\n21\n5.0\n\
        0\nLWPOLYLINE\n8\n0\n90\n2\n70\n0\n10\n0.0\n20\n0.5\n10\n2.0\n20\n0.5\n\
        0\nLWPOLYLINE\n8\n0\n90\n4\n70\n1\n10\n0.0\n20\n0.0\n10\n2.0\n20\n0.0\n10\n2.0\n20\n1.0\n10\n0.0\n20\n1.0\n\
        0\nENDSEC\n0\nEOF\n";

    #[test]
    fn test_lwpolyline_open_and_closed() {
        let polylines = parse(MIXED).unwrap();
        assert_eq!(polylines.len(), 2);
        assert!(!polylines[0].closed);
        assert!(polylines[1].closed);
        assert_eq!(polylines[1].vertices.len(), 4);
        assert_relative_eq!(polylines[0].vertices[1].x, 2.0);
    }

    #[test]
    fn test_region_and_axis_selection() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.dxf");
        std::fs::write(&path, MIXED).unwrap();

        let region = DxfLoader::load_region(&path).unwrap();
        assert_eq!(region.vertices().len(), 4);
        assert!(region.contains(&Point2D::new(1.0, 0.5)));

        // 轴线取第一条多段线，不要求闭合
        let axis = DxfLoader::load_axis(&path).unwrap();
        assert_relative_eq!(axis.length(), 2.0);
    }

    #[test]
    fn test_classic_polyline() {
        let text = "0\nSECTION\n2\nENTITIES\n\
            0\nPOLYLINE\n8\n0\n66\n1\n70\n1\n\
            0\nVERTEX\n8\n0\n10\n0\n20\n0\n\
            0\nVERTEX\n8\n0\n10\n4\n20\n0\n\
            0\nVERTEX\n8\n0\n10\n4\n20\n4\n\
            0\nSEQEND\n0\nENDSEC\n0\nEOF\n";
        let polylines = parse(text).unwrap();
        assert_eq!(polylines.len(), 1);
        assert!(polylines[0].closed);
        assert_eq!(polylines[0].vertices[2], Point2D::new(4.0, 4.0));
    }

    #[test]
    fn test_missing_features() {
        let dir = tempfile::tempdir().unwrap();
        let open_only = dir.path().join("open.dxf");
        DxfLoader::save(
            &open_only,
            &[DxfPolyline::new(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 1.0)], false)],
        )
        .unwrap();
        let err = DxfLoader::load_region(&open_only).unwrap_err();
        assert!(err.to_string().contains("no closed ring"));

        let empty = dir.path().join("empty.dxf");
        DxfLoader::save(&empty, &[]).unwrap();
        let err = DxfLoader::load_axis(&empty).unwrap_err();
        assert!(err.to_string().contains("no linear feature"));
    }

    #[test]
    fn test_malformed_files() {
        assert!(parse("0\nSECTION\n2\n").is_err());
        assert!(parse("0\nSECTION\n2\nENTITIES\n0\nLWPOLYLINE\n10\nabc\n20\n1\n0\nENDSEC\n").is_err());
        assert!(parse("zero\nSECTION\n").is_err());
        assert!(parse("0\nSECTION\n2\nHEADER\n0\nENDSEC\n").is_err());
        assert!(matches!(
            DxfLoader::load_axis("/nonexistent/axis.dxf"),
            Err(IoError::Geometry { .. })
        ));
    }

    #[test]
    fn test_round_trip_through_writer() {
        let ring = DxfPolyline::new(
            vec![Point2D::new(0.0, 0.0), Point2D::new(3.0, 0.0), Point2D::new(0.0, 3.0)],
            true,
        );
        let text = DxfLoader::to_dxf_string(std::slice::from_ref(&ring));
        assert_eq!(parse(&text).unwrap(), vec![ring]);
    }
}
