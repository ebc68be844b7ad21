// crates/mt_mesh/src/fields.rs

//! 场数据帧
//!
//! 一个时间步内按名称索引的标量数组。同一帧内所有数组长度相同，
//! 等于节点数（节点数据）或单元数（单元中心数据）。

use crate::error::{MeshError, MeshResult};
use crate::mesh::Mesh;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// U 方向流速场名
pub const U_VELOCITY: &str = "U velocity";
/// V 方向流速场名
pub const V_VELOCITY: &str = "V velocity";
/// W 方向流速场名
pub const W_VELOCITY: &str = "W velocity";

/// 场数据的存储位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldLocation {
    /// 单元中心
    Element,
    /// 网格节点
    Node,
}

impl FieldLocation {
    /// 根据数组长度判断存储位置，先比较单元数
    pub fn detect(len: usize, mesh: &Mesh) -> Option<Self> {
        if len == mesh.n_elements() {
            Some(Self::Element)
        } else if len == mesh.n_nodes() {
            Some(Self::Node)
        } else {
            None
        }
    }

    /// 中文名称（用于日志与标题）
    pub fn label(&self) -> &'static str {
        match self {
            Self::Element => "单元中心",
            Self::Node => "节点",
        }
    }
}

/// 场数据帧
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldFrame {
    /// 时间（秒），未知时为 `None`
    pub time: Option<f64>,
    values: BTreeMap<String, Vec<f64>>,
}

impl FieldFrame {
    /// 创建空帧
    pub fn new(time: Option<f64>) -> Self {
        Self {
            time,
            values: BTreeMap::new(),
        }
    }

    /// 添加或替换一个场，长度必须与已有场一致
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) -> MeshResult<()> {
        let name = name.into();
        let others = self.values.iter().find(|(k, _)| **k != name);
        if let Some((_, existing)) = others {
            let expected = existing.len();
            if values.len() != expected {
                return Err(MeshError::MixedCardinality {
                    name,
                    expected,
                    actual: values.len(),
                });
            }
        }
        self.values.insert(name, values);
        Ok(())
    }

    /// 链式添加
    pub fn with_field(mut self, name: impl Into<String>, values: Vec<f64>) -> MeshResult<Self> {
        self.insert(name, values)?;
        Ok(self)
    }

    /// 按名称获取场
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.values.get(name).map(Vec::as_slice)
    }

    /// 是否包含某个场
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// 场的公共长度，空帧返回 `None`
    pub fn len(&self) -> Option<usize> {
        self.values.values().next().map(Vec::len)
    }

    /// 是否没有任何场
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 场名称（按字典序）
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// 场的存储位置
    pub fn location(&self, mesh: &Mesh) -> Option<FieldLocation> {
        self.len().and_then(|len| FieldLocation::detect(len, mesh))
    }

    /// 多帧逐点求算术平均，时间取各帧时间的平均
    ///
    /// 所有帧必须包含相同的场且长度一致。
    pub fn mean(frames: &[FieldFrame]) -> MeshResult<FieldFrame> {
        let Some(first) = frames.first() else {
            return Ok(FieldFrame::default());
        };
        let n = frames.len() as f64;

        let times: Option<Vec<f64>> = frames.iter().map(|f| f.time).collect();
        let mut out = FieldFrame::new(times.map(|t| t.iter().sum::<f64>() / n));

        for (name, base) in &first.values {
            let mut acc = vec![0.0; base.len()];
            for frame in frames {
                let values = frame.get(name).ok_or_else(|| MeshError::MixedCardinality {
                    name: name.clone(),
                    expected: base.len(),
                    actual: 0,
                })?;
                if values.len() != base.len() {
                    return Err(MeshError::MixedCardinality {
                        name: name.clone(),
                        expected: base.len(),
                        actual: values.len(),
                    });
                }
                for (a, v) in acc.iter_mut().zip(values) {
                    *a += v;
                }
            }
            acc.iter_mut().for_each(|a| *a /= n);
            out.insert(name.clone(), acc)?;
        }

        Ok(out)
    }
}
