//! Tiny scene hierarchy: dense node arrays with local transforms and
//! optional parents.

use corelib::{Transform, Vector3};

/// Node id (dense, index into the node arrays).
pub type NodeId = u32;

/// Dense parallel arrays; spawn may allocate to grow capacity.
#[derive(Default)]
pub struct SceneGraph {
    locals: Vec<Transform>,
    parents: Vec<Option<NodeId>>,
    alive: Vec<bool>,
    len: u32,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a node. A parent that is not alive is ignored and the node
    /// becomes a root.
    pub fn spawn(&mut self, local: Transform, parent: Option<NodeId>) -> NodeId {
        let parent = match parent {
            Some(p) if !self.is_alive(p) => {
                log::warn!("spawn: parent {p} is not alive, spawning as root");
                None
            }
            other => other,
        };

        let id = self.len;
        let idx = id as usize;
        self.len += 1;

        if idx >= self.locals.len() {
            // grow all arrays equally
            let new_len = (idx + 1).next_power_of_two().max(8);
            self.locals.resize(new_len, Transform::identity());
            self.parents.resize(new_len, None);
            self.alive.resize(new_len, false);
        }

        self.locals[idx] = local;
        self.parents[idx] = parent;
        self.alive[idx] = true;
        id
    }

    /// Marks the node dead. Children keep their slot and act as roots.
    pub fn despawn(&mut self, node: NodeId) -> bool {
        if !self.is_alive(node) {
            return false;
        }
        self.alive[node as usize] = false;
        true
    }

    #[inline]
    pub fn is_alive(&self, node: NodeId) -> bool {
        let i = node as usize;
        i < self.alive.len() && self.alive[i]
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.alive[..self.len as usize].iter().filter(|a| **a).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn local(&self, node: NodeId) -> Option<&Transform> {
        self.is_alive(node).then(|| &self.locals[node as usize])
    }

    /// Mutable access to a local transform (for animation).
    #[inline]
    pub fn local_mut(&mut self, node: NodeId) -> Option<&mut Transform> {
        if self.is_alive(node) {
            Some(&mut self.locals[node as usize])
        } else {
            None
        }
    }

    /// Local transform followed by every live ancestor's.
    pub fn world_matrix(&self, node: NodeId) -> Option<Transform> {
        if !self.is_alive(node) {
            return None;
        }
        let mut world = self.locals[node as usize];
        let mut cur = self.parents[node as usize];
        while let Some(p) = cur {
            if !self.is_alive(p) {
                break;
            }
            world.mul_right(&self.locals[p as usize]);
            cur = self.parents[p as usize];
        }
        Some(world)
    }

    /// Iterate over `(node, world matrix)` for live nodes.
    pub fn iter_world(&self) -> impl Iterator<Item = (NodeId, Transform)> + '_ {
        (0..self.len).filter_map(move |id| self.world_matrix(id).map(|w| (id, w)))
    }

    /// Spin every live node in place by `degrees_per_sec * dt` (fixed-axis
    /// Euler, Z then Y then X). Translation is untouched.
    pub fn system_spin(&mut self, dt: f32, degrees_per_sec: Vector3) {
        let mut step = Transform::identity();
        step.apply_rotation_euler(degrees_per_sec * dt);
        for i in 0..(self.len as usize) {
            if self.alive[i] {
                self.locals[i].mul_left(&step);
            }
        }
    }
}
