// crates/mt_mesh/src/compact.rs

//! 单元掩码与网格压缩
//!
//! 按掩码保留一部分单元后，只保留被这些单元引用的节点，
//! 并重新编号为连续的 `0..n`。
//!
//! # 编号规则
//!
//! 按单元顺序遍历被选中的单元，每个单元内按 `[i0, i1, i2]` 顺序，
//! 节点第一次出现时分配下一个新编号。
//!
//! # 节点平均
//!
//! 压缩时同时建立 节点 → 单元 的关联表（CSR 格式），
//! [`CompactedMesh::node_mean`] 据此把单元量平均到节点上。
//! 同一单元重复引用同一节点时只计一次。

use crate::error::{MeshError, MeshResult};
use crate::mesh::{Mesh, Triangle};
use mt_geo::Point2D;

/// 单元掩码，与单元表一一对应
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mask {
    bits: Vec<bool>,
}

impl Mask {
    /// 从布尔数组创建
    pub fn from_bools(bits: Vec<bool>) -> Self {
        Self { bits }
    }

    /// 掩码长度
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// 掩码是否为空数组
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// 第 `i` 个单元是否被选中
    #[inline]
    pub fn is_selected(&self, i: usize) -> bool {
        self.bits.get(i).copied().unwrap_or(false)
    }

    /// 被选中的单元数
    pub fn count_selected(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// 是否至少选中一个单元
    pub fn any(&self) -> bool {
        self.bits.iter().any(|&b| b)
    }

    /// 被选中单元的原编号（升序）
    pub fn selected_indices(&self) -> Vec<usize> {
        self.bits
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| b.then_some(i))
            .collect()
    }

    /// 按掩码抽取数组元素
    pub fn select<T: Copy>(&self, values: &[T]) -> MeshResult<Vec<T>> {
        if values.len() != self.bits.len() {
            return Err(MeshError::MaskLengthMismatch {
                mask_len: self.bits.len(),
                n_elements: values.len(),
            });
        }
        Ok(values
            .iter()
            .zip(&self.bits)
            .filter_map(|(v, &b)| b.then_some(*v))
            .collect())
    }
}

/// 压缩后的网格
#[derive(Debug, Clone, PartialEq)]
pub struct CompactedMesh {
    /// 新编号 → 原编号
    old_ids: Vec<usize>,
    /// 节点坐标（新编号顺序）
    nodes: Vec<Point2D>,
    /// 单元表（新编号）
    elements: Vec<Triangle>,
    /// 每个压缩单元对应的原单元编号
    source_elements: Vec<usize>,
    /// 节点关联单元的偏移（长度 n_nodes + 1）
    incidence_offsets: Vec<usize>,
    /// 节点关联单元（压缩单元编号）
    incidence: Vec<usize>,
}

impl CompactedMesh {
    /// 按掩码压缩网格
    pub fn build(mesh: &Mesh, mask: &Mask) -> MeshResult<Self> {
        if mask.len() != mesh.n_elements() {
            return Err(MeshError::MaskLengthMismatch {
                mask_len: mask.len(),
                n_elements: mesh.n_elements(),
            });
        }

        let mut new_ids: Vec<Option<usize>> = vec![None; mesh.n_nodes()];
        let mut old_ids = Vec::new();
        let mut elements = Vec::with_capacity(mask.count_selected());
        let mut source_elements = Vec::with_capacity(elements.capacity());

        for (e, tri) in mesh.elements().iter().enumerate() {
            if !mask.is_selected(e) {
                continue;
            }
            let mut renumbered = [0usize; 3];
            for (slot, &old) in renumbered.iter_mut().zip(tri) {
                *slot = *new_ids[old].get_or_insert_with(|| {
                    old_ids.push(old);
                    old_ids.len() - 1
                });
            }
            elements.push(renumbered);
            source_elements.push(e);
        }

        let nodes = old_ids.iter().map(|&old| mesh.nodes()[old]).collect();
        let (incidence_offsets, incidence) = build_incidence(old_ids.len(), &elements);

        Ok(Self {
            old_ids,
            nodes,
            elements,
            source_elements,
            incidence_offsets,
            incidence,
        })
    }

    /// 保留的节点数
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// 保留的单元数
    #[inline]
    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    /// 节点坐标（新编号顺序）
    pub fn nodes(&self) -> &[Point2D] {
        &self.nodes
    }

    /// 单元表（新编号）
    pub fn elements(&self) -> &[Triangle] {
        &self.elements
    }

    /// 新编号 → 原编号
    pub fn old_ids(&self) -> &[usize] {
        &self.old_ids
    }

    /// 压缩单元对应的原单元编号
    pub fn source_elements(&self) -> &[usize] {
        &self.source_elements
    }

    /// 与节点 `node`（新编号）关联的压缩单元
    pub fn incident_elements(&self, node: usize) -> &[usize] {
        &self.incidence[self.incidence_offsets[node]..self.incidence_offsets[node + 1]]
    }

    /// 将压缩单元上的量平均到节点
    ///
    /// `values` 按压缩单元顺序排列；返回值按新节点编号排列。
    pub fn node_mean(&self, values: &[f64]) -> MeshResult<Vec<f64>> {
        if values.len() != self.n_elements() {
            return Err(MeshError::SizeMismatch {
                name: "单元平均输入",
                expected: self.n_elements(),
                actual: values.len(),
            });
        }
        Ok((0..self.n_nodes())
            .map(|node| {
                let incident = self.incident_elements(node);
                let sum: f64 = incident.iter().map(|&e| values[e]).sum();
                sum / incident.len() as f64
            })
            .collect())
    }
}

/// 建立 节点 → 单元 关联表（CSR）
fn build_incidence(n_nodes: usize, elements: &[Triangle]) -> (Vec<usize>, Vec<usize>) {
    let mut counts = vec![0usize; n_nodes];
    for tri in elements {
        for (k, &n) in tri.iter().enumerate() {
            if !tri[..k].contains(&n) {
                counts[n] += 1;
            }
        }
    }

    let mut offsets = Vec::with_capacity(n_nodes + 1);
    offsets.push(0);
    for c in &counts {
        offsets.push(offsets[offsets.len() - 1] + c);
    }

    let mut cursor = offsets[..n_nodes].to_vec();
    let mut incidence = vec![0usize; offsets[n_nodes]];
    for (e, tri) in elements.iter().enumerate() {
        for (k, &n) in tri.iter().enumerate() {
            if !tri[..k].contains(&n) {
                incidence[cursor[n]] = e;
                cursor[n] += 1;
            }
        }
    }

    (offsets, incidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// 3x3 节点的方格，8 个三角形
    fn grid_mesh() -> Mesh {
        let mut nodes = Vec::new();
        for j in 0..3 {
            for i in 0..3 {
                nodes.push(Point2D::new(i as f64, j as f64));
            }
        }
        let mut elements = Vec::new();
        for j in 0..2 {
            for i in 0..2 {
                let n0 = j * 3 + i;
                elements.push([n0, n0 + 1, n0 + 4]);
                elements.push([n0, n0 + 4, n0 + 3]);
            }
        }
        Mesh::new(nodes, elements).unwrap()
    }

    fn assert_sound(c: &CompactedMesh) {
        let mut used = vec![false; c.n_nodes()];
        for tri in c.elements() {
            for &n in tri {
                assert!(n < c.n_nodes(), "悬空编号 {n}");
                used[n] = true;
            }
        }
        assert!(used.iter().all(|&u| u), "存在未被引用的节点");
    }

    #[test]
    fn test_first_appearance_order() {
        let mesh = grid_mesh();
        // 选中第 2、3 个单元: [1,2,5], [1,5,4]
        let mask = Mask::from_bools(vec![false, false, true, true, false, false, false, false]);
        let c = CompactedMesh::build(&mesh, &mask).unwrap();

        assert_eq!(c.old_ids(), &[1, 2, 5, 4]);
        assert_eq!(c.elements(), &[[0, 1, 2], [0, 2, 3]]);
        assert_eq!(c.source_elements(), &[2, 3]);
        assert_eq!(c.nodes()[3], Point2D::new(1.0, 1.0));
        assert_sound(&c);
    }

    #[test]
    fn test_compaction_sound_for_all_masks() {
        let mesh = grid_mesh();
        for bits in 0u32..(1 << 8) {
            let mask = Mask::from_bools((0..8).map(|i| bits & (1 << i) != 0).collect());
            let c = CompactedMesh::build(&mesh, &mask).unwrap();
            assert_eq!(c.n_elements(), mask.count_selected());
            assert_sound(&c);
            for node in 0..c.n_nodes() {
                assert!(!c.incident_elements(node).is_empty());
            }
        }
    }

    #[test]
    fn test_node_mean_matches_linear_scan() {
        let mesh = grid_mesh();
        let mask = Mask::from_bools(vec![true, true, false, true, true, false, true, false]);
        let c = CompactedMesh::build(&mesh, &mask).unwrap();
        let values: Vec<f64> = (0..c.n_elements()).map(|e| (e * e) as f64 + 0.5).collect();

        let means = c.node_mean(&values).unwrap();
        for (node, &old) in c.old_ids().iter().enumerate() {
            let hits: Vec<f64> = c
                .source_elements()
                .iter()
                .enumerate()
                .filter(|(_, &src)| mesh.elements()[src].contains(&old))
                .map(|(e, _)| values[e])
                .collect();
            let expected = hits.iter().sum::<f64>() / hits.len() as f64;
            assert_relative_eq!(means[node], expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_repeated_node_counted_once() {
        let mesh = Mesh::new(
            vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0), Point2D::new(0.0, 1.0)],
            vec![[0, 0, 1], [0, 1, 2]],
        )
        .unwrap();
        let c = CompactedMesh::build(&mesh, &Mask::from_bools(vec![true, true])).unwrap();
        assert_eq!(c.incident_elements(0), &[0, 1]);

        let means = c.node_mean(&[2.0, 4.0]).unwrap();
        assert_relative_eq!(means[0], 3.0);
        assert_relative_eq!(means[2], 4.0);
    }

    #[test]
    fn test_empty_mask() {
        let mesh = grid_mesh();
        let mask = Mask::from_bools(vec![false; 8]);
        assert!(!mask.any());
        let c = CompactedMesh::build(&mesh, &mask).unwrap();
        assert_eq!(c.n_nodes(), 0);
        assert_eq!(c.n_elements(), 0);
    }

    #[test]
    fn test_mask_length_mismatch() {
        let mesh = grid_mesh();
        let err = CompactedMesh::build(&mesh, &Mask::from_bools(vec![true; 3])).unwrap_err();
        assert!(matches!(err, MeshError::MaskLengthMismatch { mask_len: 3, n_elements: 8 }));
    }

    #[test]
    fn test_mask_select() {
        let mask = Mask::from_bools(vec![true, false, true]);
        assert_eq!(mask.select(&[1.0, 2.0, 3.0]).unwrap(), vec![1.0, 3.0]);
        assert_eq!(mask.selected_indices(), vec![0, 2]);
        assert!(mask.select(&[1.0]).is_err());
    }
}
