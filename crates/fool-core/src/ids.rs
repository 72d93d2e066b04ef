//! Identifier types for AST nodes.
//!
//! Semantic passes never mutate the tree. Everything they learn about a node
//! is stored in side tables keyed by the node's [`NodeId`].

use std::fmt;

/// Identifies a single AST node.
///
/// Ids are handed out sequentially by the AST builder and are unique within
/// one tree.
///
/// # Example
///
/// ```
/// use fool_core::NodeId;
///
/// let id = NodeId::new(3);
/// assert_eq!(id.index(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Create a new node ID with the given index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Get the underlying index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(index: u32) -> Self {
        Self::new(index)
    }
}

impl From<NodeId> for u32 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_display() {
        assert_eq!(format!("{}", NodeId::new(5)), "node_5");
    }

    #[test]
    fn node_id_conversions() {
        let id: NodeId = 10.into();
        assert_eq!(id.index(), 10);
        let raw: u32 = id.into();
        assert_eq!(raw, 10);
    }

    #[test]
    fn node_ids_order_by_index() {
        assert!(NodeId::new(1) < NodeId::new(2));
        assert_ne!(NodeId::new(1), NodeId::new(2));
    }
}
