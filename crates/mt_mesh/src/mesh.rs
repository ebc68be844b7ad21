// crates/mt_mesh/src/mesh.rs

//! 三角形网格
//!
//! 节点编号即其在 `nodes` 中的下标（0 起），单元顺序保持读入顺序。

use crate::error::{MeshError, MeshResult};
use mt_geo::{BoundingBox, Point2D};
use serde::Serialize;

/// 三角形单元（三个节点编号）
pub type Triangle = [usize; 3];

/// 非结构三角形网格
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mesh {
    nodes: Vec<Point2D>,
    elements: Vec<Triangle>,
}

impl Mesh {
    /// 创建网格并检查单元的节点编号
    pub fn new(nodes: Vec<Point2D>, elements: Vec<Triangle>) -> MeshResult<Self> {
        let n_nodes = nodes.len();
        for (element, tri) in elements.iter().enumerate() {
            if let Some(&node) = tri.iter().find(|&&n| n >= n_nodes) {
                return Err(MeshError::InvalidNodeIndex {
                    element,
                    node,
                    n_nodes,
                });
            }
        }
        Ok(Self { nodes, elements })
    }

    /// 节点数
    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// 单元数
    #[inline]
    pub fn n_elements(&self) -> usize {
        self.elements.len()
    }

    /// 节点坐标
    #[inline]
    pub fn nodes(&self) -> &[Point2D] {
        &self.nodes
    }

    /// 单元表
    #[inline]
    pub fn elements(&self) -> &[Triangle] {
        &self.elements
    }

    /// 单元形心
    #[inline]
    pub fn centroid(&self, element: usize) -> Point2D {
        let [a, b, c] = self.elements[element];
        Point2D::centroid3(&self.nodes[a], &self.nodes[b], &self.nodes[c])
    }

    /// 全部单元形心
    pub fn centroids(&self) -> Vec<Point2D> {
        (0..self.n_elements()).map(|e| self.centroid(e)).collect()
    }

    /// 节点边界框，空网格返回 `None`
    pub fn bbox(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(&self.nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_invalid_node_index() {
        let err = Mesh::new(
            vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0), Point2D::new(0.0, 1.0)],
            vec![[0, 1, 2], [1, 2, 3]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            MeshError::InvalidNodeIndex {
                element: 1,
                node: 3,
                n_nodes: 3
            }
        );
    }

    #[test]
    fn test_centroids() {
        let mesh = Mesh::new(
            vec![
                Point2D::new(0.0, 0.0),
                Point2D::new(3.0, 0.0),
                Point2D::new(3.0, 3.0),
                Point2D::new(0.0, 3.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap();

        let c = mesh.centroids();
        assert_eq!(c.len(), 2);
        assert_relative_eq!(c[0].x, 2.0);
        assert_relative_eq!(c[0].y, 1.0);
        assert_relative_eq!(c[1].x, 1.0);
        assert_relative_eq!(c[1].y, 2.0);

        let bbox = mesh.bbox().unwrap();
        assert_relative_eq!(bbox.max_x, 3.0);
    }
}
