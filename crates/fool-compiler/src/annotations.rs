//! Side tables produced by the symbol-table pass.
//!
//! The tree itself is immutable. Everything the symbol-table pass learns
//! about a node is recorded here, keyed by [`NodeId`], and read back by the
//! type checker and the code generator. Tests can build an `Annotations`
//! by hand to drive a later pass in isolation.

use std::rc::Rc;

use fool_core::NodeId;
use rustc_hash::FxHashMap;

use crate::types::{ClassType, Type};

// ============================================================================
// Entries
// ============================================================================

/// A resolved declaration: where it lives and what it is.
#[derive(Debug, Clone, PartialEq)]
pub struct StEntry {
    /// Lexical depth of the declaration (global scope is 0).
    pub nesting_level: u32,
    /// Declared type.
    pub ty: Type,
    /// Slot in the activation record or virtual table.
    pub offset: i32,
}

impl StEntry {
    pub fn new(nesting_level: u32, ty: Type, offset: i32) -> Self {
        Self {
            nesting_level,
            ty,
            offset,
        }
    }
}

/// Handle to an [`StEntry`] stored in [`Annotations`].
///
/// Entries are shared: every use of a declaration refers to the same id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryId(u32);

impl EntryId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Member name -> entry, for one class.
pub type VirtualTable = FxHashMap<String, EntryId>;

// ============================================================================
// Annotations
// ============================================================================

/// Everything the symbol-table pass attaches to the tree.
#[derive(Debug, Default, Clone)]
pub struct Annotations {
    entries: Vec<StEntry>,
    /// Declaration node -> its own entry; use node -> the entry it refers to.
    bindings: FxHashMap<NodeId, EntryId>,
    /// Use node -> nesting level at the point of use.
    use_levels: FxHashMap<NodeId, u32>,
    /// Method-call node -> entry of the invoked member.
    method_bindings: FxHashMap<NodeId, EntryId>,
    /// Class declaration node -> final member layout.
    class_layouts: FxHashMap<NodeId, Rc<ClassType>>,
    /// Class declaration node -> entry of its superclass.
    superclasses: FxHashMap<NodeId, EntryId>,
    /// Class name -> virtual table.
    class_table: FxHashMap<String, VirtualTable>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new entry.
    pub fn add_entry(&mut self, entry: StEntry) -> EntryId {
        let id = EntryId(self.entries.len() as u32);
        self.entries.push(entry);
        id
    }

    pub fn entry(&self, id: EntryId) -> &StEntry {
        &self.entries[id.index()]
    }

    pub fn entry_mut(&mut self, id: EntryId) -> &mut StEntry {
        &mut self.entries[id.index()]
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    // ========================================================================
    // Bindings
    // ========================================================================

    /// Attach `entry` to a declaration node.
    pub fn bind(&mut self, node: NodeId, entry: EntryId) {
        self.bindings.insert(node, entry);
    }

    /// Attach `entry` to a use node seen at nesting level `level`.
    pub fn bind_use(&mut self, node: NodeId, entry: EntryId, level: u32) {
        self.bindings.insert(node, entry);
        self.use_levels.insert(node, level);
    }

    /// Attach the invoked member to a method-call node.
    pub fn bind_method(&mut self, node: NodeId, entry: EntryId) {
        self.method_bindings.insert(node, entry);
    }

    pub fn binding(&self, node: NodeId) -> Option<EntryId> {
        self.bindings.get(&node).copied()
    }

    /// Entry attached to `node`, if it was resolved.
    pub fn resolved(&self, node: NodeId) -> Option<&StEntry> {
        self.binding(node).map(|id| self.entry(id))
    }

    pub fn use_level(&self, node: NodeId) -> Option<u32> {
        self.use_levels.get(&node).copied()
    }

    /// Member entry attached to a method-call node.
    pub fn method_entry(&self, node: NodeId) -> Option<&StEntry> {
        self.method_bindings.get(&node).map(|id| self.entry(*id))
    }

    // ========================================================================
    // Classes
    // ========================================================================

    pub fn set_class_layout(&mut self, node: NodeId, layout: Rc<ClassType>) {
        self.class_layouts.insert(node, layout);
    }

    pub fn class_layout(&self, node: NodeId) -> Option<&Rc<ClassType>> {
        self.class_layouts.get(&node)
    }

    pub fn bind_superclass(&mut self, node: NodeId, entry: EntryId) {
        self.superclasses.insert(node, entry);
    }

    pub fn superclass_entry(&self, node: NodeId) -> Option<&StEntry> {
        self.superclasses.get(&node).map(|id| self.entry(*id))
    }

    pub fn set_class_table(&mut self, table: FxHashMap<String, VirtualTable>) {
        self.class_table = table;
    }

    pub fn class_table(&self) -> &FxHashMap<String, VirtualTable> {
        &self.class_table
    }

    pub fn virtual_table(&self, class: &str) -> Option<&VirtualTable> {
        self.class_table.get(class)
    }

    pub fn is_class(&self, name: &str) -> bool {
        self.class_table.contains_key(name)
    }
}
