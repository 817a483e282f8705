use glam::{Mat4, Vec3};

use super::compose::{chain, LocalTransform};
use super::orbit::Orbit;

/// Index of a node inside a `SceneGraph`, in declaration order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// How a node's local matrix is produced each frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum NodeMotion {
    /// Static scale / rotation / translation.
    Fixed(LocalTransform),
    /// Time-driven orbit arm around the parent origin.
    Orbit(Orbit),
}

impl NodeMotion {
    pub fn local_matrix(&self, total: f32) -> Mat4 {
        match self {
            NodeMotion::Fixed(local) => local.matrix(),
            NodeMotion::Orbit(orbit) => orbit.local_matrix(total),
        }
    }
}

impl From<LocalTransform> for NodeMotion {
    fn from(local: LocalTransform) -> Self {
        NodeMotion::Fixed(local)
    }
}

impl From<Orbit> for NodeMotion {
    fn from(orbit: Orbit) -> Self {
        NodeMotion::Orbit(orbit)
    }
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    motion: NodeMotion,
    body_scale: Vec3,
}

/// Parent-chained set of nodes evaluated from scratch every frame.
///
/// Nodes are stored in declaration order and a parent always precedes its
/// children, so a single forward pass sees each parent's world matrix before
/// any child needs it. Each child composes with its direct parent's world
/// matrix only.
///
/// `body_scale` sizes what is drawn for a node without being inherited by its
/// children: a moon orbiting a large earth keeps its own orbit radius.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node without a parent.
    pub fn add_root(&mut self, motion: impl Into<NodeMotion>) -> NodeId {
        self.push(None, motion.into())
    }

    /// Adds a node parented to `parent`.
    ///
    /// # Panics
    /// If `parent` was not issued by this graph.
    pub fn add_child(&mut self, parent: NodeId, motion: impl Into<NodeMotion>) -> NodeId {
        assert!(
            parent.0 < self.nodes.len(),
            "parent {parent:?} does not belong to this graph"
        );
        self.push(Some(parent), motion.into())
    }

    /// Sets the non-inherited display scale of `node`.
    pub fn set_body_scale(&mut self, node: NodeId, scale: Vec3) {
        if let Some(n) = self.nodes.get_mut(node.0) {
            n.body_scale = scale;
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// World matrices at `total` seconds, in declaration order.
    pub fn world_matrices(&self, total: f32) -> Vec<Mat4> {
        let mut worlds: Vec<Mat4> = Vec::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let parent_world = node.parent.map(|p| worlds[p.0]);
            worlds.push(chain(node.motion.local_matrix(total), parent_world));
        }
        worlds
    }

    /// World matrices with each node's body scale applied, in declaration order.
    pub fn draw_matrices(&self, total: f32) -> Vec<Mat4> {
        self.world_matrices(total)
            .into_iter()
            .zip(&self.nodes)
            .map(|(world, node)| world * Mat4::from_scale(node.body_scale))
            .collect()
    }

    fn push(&mut self, parent: Option<NodeId>, motion: NodeMotion) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            motion,
            body_scale: Vec3::ONE,
        });
        id
    }
}

/// Packs matrices into one contiguous column-major block, preserving order.
///
/// The result is laid out for a single storage/uniform buffer indexed by
/// instance in an instanced draw.
pub fn pack_matrices(matrices: &[Mat4]) -> Vec<[[f32; 4]; 4]> {
    matrices.iter().map(Mat4::to_cols_array_2d).collect()
}
