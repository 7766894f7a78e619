use crate::graphics::Graphics;

/// Handle into the [`SceneGraph`] arena. Stale handles (removed nodes whose slot was
/// reused) resolve to `None` thanks to the generation counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale: f64,
    pub alpha: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, rotation: 0.0, scale: 1.0, alpha: 1.0 }
    }
}

/// A visual object: transform, own primitives, ordered children.
#[derive(Debug, Clone)]
pub struct Node {
    pub label: &'static str,
    pub transform: Transform,
    pub graphics: Graphics,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            transform: Transform::default(),
            graphics: Graphics::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_graphics(mut self, graphics: Graphics) -> Self {
        self.graphics = graphics;
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.transform.x = x;
        self.transform.y = y;
        self
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[cfg(test)]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    live: usize,
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut graph = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId { index: 0, generation: 0 },
            live: 0,
        };
        graph.root = graph.alloc(Node::new("stage"));
        graph
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    #[cfg(test)]
    pub fn transform(&self, id: NodeId) -> Option<&Transform> {
        self.node(id).map(|n| &n.transform)
    }

    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform> {
        self.node_mut(id).map(|n| &mut n.transform)
    }

    #[cfg(test)]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Attach `node` as the last child of `parent`. Returns `None` when the parent is gone.
    pub fn spawn(&mut self, parent: NodeId, mut node: Node) -> Option<NodeId> {
        if !self.contains(parent) {
            return None;
        }
        node.parent = Some(parent);
        node.children.clear();
        let id = self.alloc(node);
        if let Some(p) = self.node_mut(parent) {
            p.children.push(id);
        }
        Some(id)
    }

    /// Detach `id` from its parent and free its whole subtree. The root is never freed.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root {
            self.clear_children(id);
            return false;
        }
        let parent = match self.node(id) {
            Some(n) => n.parent,
            None => return false,
        };
        if let Some(p) = parent.and_then(|p| self.node_mut(p)) {
            p.children.retain(|c| *c != id);
        }
        self.free_subtree(id);
        true
    }

    pub fn clear_children(&mut self, id: NodeId) {
        let children = match self.node_mut(id) {
            Some(n) => std::mem::take(&mut n.children),
            None => return,
        };
        for child in children {
            self.free_subtree(child);
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId { index, generation: slot.generation };
        }
        self.slots.push(Slot { generation: 0, node: Some(node) });
        NodeId { index: (self.slots.len() - 1) as u32, generation: 0 }
    }

    fn free_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let slot = match self.slots.get_mut(current.index as usize) {
                Some(slot) if slot.generation == current.generation => slot,
                _ => continue,
            };
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                self.live -= 1;
                stack.extend(node.children);
            }
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_links_parent_and_child() {
        let mut g = SceneGraph::new();
        let root = g.root();
        let a = g.spawn(root, Node::new("a").at(3.0, 4.0)).unwrap();
        assert_eq!(g.children(root), &[a]);
        assert_eq!(g.node(a).unwrap().parent(), Some(root));
        assert_eq!(g.transform(a).unwrap().x, 3.0);
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn test_remove_frees_subtree() {
        let mut g = SceneGraph::new();
        let root = g.root();
        let rocket = g.spawn(root, Node::new("rocket")).unwrap();
        let trail = g.spawn(rocket, Node::new("trail")).unwrap();
        let particle = g.spawn(trail, Node::new("particle")).unwrap();

        assert!(g.remove(rocket));
        assert!(!g.contains(rocket));
        assert!(!g.contains(trail));
        assert!(!g.contains(particle));
        assert!(g.children(root).is_empty());
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn test_stale_handle_after_slot_reuse() {
        let mut g = SceneGraph::new();
        let root = g.root();
        let old = g.spawn(root, Node::new("old")).unwrap();
        g.remove(old);
        let new = g.spawn(root, Node::new("new")).unwrap();
        assert!(g.node(old).is_none());
        assert!(!g.remove(old));
        assert_eq!(g.node(new).unwrap().label, "new");
    }

    #[test]
    fn test_spawn_under_dead_parent_fails() {
        let mut g = SceneGraph::new();
        let root = g.root();
        let parent = g.spawn(root, Node::new("p")).unwrap();
        g.remove(parent);
        assert!(g.spawn(parent, Node::new("orphan")).is_none());
    }

    #[test]
    fn test_root_survives_remove() {
        let mut g = SceneGraph::new();
        let root = g.root();
        g.spawn(root, Node::new("a"));
        g.spawn(root, Node::new("b"));
        assert!(!g.remove(root));
        assert!(g.contains(root));
        assert!(g.children(root).is_empty());
        assert_eq!(g.len(), 1);
    }
}
