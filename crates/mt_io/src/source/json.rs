// crates/mt_io/src/source/json.rs

//! JSON 网格容器读取
//!
//! 文件结构:
//!
//! ```text
//! {
//!   "nodes":    [[x, y], [x, y, z], ...],
//!   "elements": [[n0, n1, n2], [n0, n1, n2, n3], ...],
//!   "items":    ["U velocity", "V velocity"],
//!   "frames":   [{ "time": 0.0, "values": { "U velocity": [1.0, null] } }]
//! }
//! ```
//!
//! 节点编号从 0 开始，`null` 读为 NaN。非三角形单元被剔除，
//! 按单元排列的场数组同步剔除以保持对齐。

use super::{select_frame, MeshHandle, MeshInfo, MeshSource, TimeSelector};
use crate::error::{IoError, IoResult};
use mt_geo::Point2D;
use mt_mesh::{FieldFrame, Mesh, Triangle};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
struct RawContainer {
    nodes: Vec<Vec<f64>>,
    elements: Vec<Vec<usize>>,
    #[serde(default)]
    items: Option<Vec<String>>,
    #[serde(default)]
    frames: Vec<RawFrame>,
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    #[serde(default)]
    time: Option<f64>,
    values: BTreeMap<String, Vec<Option<f64>>>,
}

/// JSON 网格容器数据源
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonMeshSource;

impl JsonMeshSource {
    /// 创建数据源
    pub fn new() -> Self {
        Self
    }

    /// 从 reader 解析，`path` 仅用于错误信息
    pub fn parse<R: Read>(path: &Path, reader: R) -> IoResult<JsonMeshHandle> {
        let raw: RawContainer = serde_json::from_reader(reader)
            .map_err(|e| IoError::source_read(path, format!("JSON 解析失败: {e}")))?;

        let nodes = raw
            .nodes
            .iter()
            .enumerate()
            .map(|(i, xyz)| match xyz.as_slice() {
                [x, y] | [x, y, _] => Ok(Point2D::new(*x, *y)),
                _ => Err(IoError::source_read(
                    path,
                    format!("节点 {i} 的坐标个数为 {}", xyz.len()),
                )),
            })
            .collect::<IoResult<Vec<_>>>()?;

        // 只保留三角形单元
        let n_raw_elements = raw.elements.len();
        let keep: Vec<bool> = raw.elements.iter().map(|e| e.len() == 3).collect();
        let triangles: Vec<Triangle> = raw
            .elements
            .iter()
            .filter(|e| e.len() == 3)
            .map(|e| [e[0], e[1], e[2]])
            .collect();
        let filtered = triangles.len() != n_raw_elements;
        if filtered {
            debug!(
                "{}: 剔除 {} 个非三角形单元",
                path.display(),
                n_raw_elements - triangles.len()
            );
        }

        let mesh = Mesh::new(nodes, triangles).map_err(|e| IoError::source_read(path, e))?;

        let mut frames = Vec::with_capacity(raw.frames.len());
        for raw_frame in raw.frames {
            let mut frame = FieldFrame::new(raw_frame.time);
            for (name, values) in raw_frame.values {
                let values: Vec<f64> = if filtered && values.len() == n_raw_elements {
                    values
                        .iter()
                        .zip(&keep)
                        .filter(|(_, &k)| k)
                        .map(|(v, _)| v.unwrap_or(f64::NAN))
                        .collect()
                } else {
                    values.iter().map(|v| v.unwrap_or(f64::NAN)).collect()
                };
                frame
                    .insert(name, values)
                    .map_err(|e| IoError::source_read(path, e))?;
            }
            frames.push(frame);
        }

        let items = match raw.items {
            Some(items) => items,
            None => frames
                .first()
                .map(|f| f.names().map(str::to_owned).collect())
                .unwrap_or_default(),
        };

        Ok(JsonMeshHandle {
            path: path.to_path_buf(),
            mesh,
            frames,
            items,
        })
    }
}

impl MeshSource for JsonMeshSource {
    fn open(&self, path: &Path) -> IoResult<Box<dyn MeshHandle>> {
        let file = File::open(path).map_err(|e| IoError::source_read(path, e))?;
        let handle = Self::parse(path, BufReader::new(file))?;
        Ok(Box::new(handle))
    }

    fn name(&self) -> &str {
        "json"
    }
}

/// 已解析的 JSON 网格文件
#[derive(Debug, Clone)]
pub struct JsonMeshHandle {
    path: PathBuf,
    mesh: Mesh,
    frames: Vec<FieldFrame>,
    items: Vec<String>,
}

impl MeshHandle for JsonMeshHandle {
    fn path(&self) -> &Path {
        &self.path
    }

    fn n_frames(&self) -> usize {
        self.frames.len()
    }

    fn item_names(&self) -> Vec<String> {
        self.items.clone()
    }

    fn info(&self) -> MeshInfo {
        MeshInfo {
            n_nodes: self.mesh.n_nodes(),
            n_elements: self.mesh.n_elements(),
            n_frames: self.frames.len(),
            times: self.frames.iter().map(|f| f.time).collect(),
            items: self.items.clone(),
        }
    }

    fn read(&mut self, selector: TimeSelector) -> IoResult<(Mesh, FieldFrame)> {
        let frame = select_frame(&self.path, &self.frames, selector)?;
        Ok((self.mesh.clone(), frame))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mt_mesh::{U_VELOCITY, V_VELOCITY};
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "nodes": [[0, 0], [1, 0, -2.5], [1, 1], [0, 1]],
        "elements": [[0, 1, 2], [0, 1, 2, 3], [0, 2, 3]],
        "frames": [
            { "time": 0.0, "values": { "U velocity": [1.0, 9.0, null], "V velocity": [0.5, 9.0, 0.5] } },
            { "time": 60.0, "values": { "U velocity": [3.0, 9.0, 2.0], "V velocity": [1.5, 9.0, 1.5] } }
        ]
    }"#;

    #[test]
    fn test_parse_filters_non_triangles() {
        let mut handle = JsonMeshSource::parse(Path::new("mem.json"), SAMPLE.as_bytes()).unwrap();
        assert_eq!(handle.n_frames(), 2);
        assert_eq!(handle.item_names(), vec![U_VELOCITY, V_VELOCITY]);

        let (mesh, frame) = handle.read(TimeSelector::Index(0)).unwrap();
        assert_eq!(mesh.n_nodes(), 4);
        assert_eq!(mesh.elements(), &[[0, 1, 2], [0, 2, 3]]);

        let u = frame.get(U_VELOCITY).unwrap();
        assert_eq!(u.len(), 2);
        assert_eq!(u[0], 1.0);
        assert!(u[1].is_nan());
    }

    #[test]
    fn test_read_time_average() {
        let mut handle = JsonMeshSource::parse(Path::new("mem.json"), SAMPLE.as_bytes()).unwrap();
        let (_, frame) = handle.read(TimeSelector::All).unwrap();
        assert_eq!(frame.time, Some(30.0));
        assert_eq!(frame.get(V_VELOCITY), Some(&[1.0, 1.0][..]));
    }

    #[test]
    fn test_out_of_range_index() {
        let mut handle = JsonMeshSource::parse(Path::new("mem.json"), SAMPLE.as_bytes()).unwrap();
        assert!(matches!(
            handle.read(TimeSelector::Index(2)),
            Err(IoError::SourceRead { .. })
        ));
    }

    #[test]
    fn test_malformed_inputs() {
        let bad_json = JsonMeshSource::parse(Path::new("a.json"), "{ nodes".as_bytes());
        assert!(matches!(bad_json, Err(IoError::SourceRead { .. })));

        let bad_node = r#"{ "nodes": [[0]], "elements": [] }"#;
        assert!(JsonMeshSource::parse(Path::new("b.json"), bad_node.as_bytes()).is_err());

        let bad_index = r#"{ "nodes": [[0,0],[1,0],[0,1]], "elements": [[0,1,5]] }"#;
        assert!(JsonMeshSource::parse(Path::new("c.json"), bad_index.as_bytes()).is_err());
    }

    #[test]
    fn test_open_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("case.json");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(SAMPLE.as_bytes())
            .unwrap();

        let source = JsonMeshSource::new();
        let handle = source.open(&path).unwrap();
        let info = handle.info();
        assert_eq!(info.n_elements, 2);
        assert_eq!(info.times, vec![Some(0.0), Some(60.0)]);

        let missing = source.open(&dir.path().join("missing.json"));
        assert!(matches!(missing, Err(IoError::SourceRead { .. })));
    }
}
