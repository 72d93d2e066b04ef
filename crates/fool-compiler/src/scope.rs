//! Lexical scope management for the symbol-table pass.
//!
//! This module provides [`ScopeStack`], which handles:
//! - One frame per open scope (global, function, class, method)
//! - Innermost-out lookup with shadowing
//! - The class table (class name -> virtual table)
//!
//! A class body does not get a fresh map: its frame *is* the class's
//! virtual table in the class table, so members declared while the class
//! is open land directly in it.

use rustc_hash::FxHashMap;

use crate::annotations::{EntryId, VirtualTable};

// ============================================================================
// Types
// ============================================================================

#[derive(Debug)]
enum Frame {
    /// Names declared in a program, function or method scope.
    Local(FxHashMap<String, EntryId>),
    /// The virtual table of the named class.
    Class(String),
}

/// Stack of open scopes plus the class table.
#[derive(Debug, Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
    class_table: FxHashMap<String, VirtualTable>,
}

// ============================================================================
// ScopeStack
// ============================================================================

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a fresh local scope.
    pub fn push_scope(&mut self) {
        self.frames.push(Frame::Local(FxHashMap::default()));
    }

    /// Open the body of `class`, whose virtual table must already be in the
    /// class table.
    pub fn push_class_scope(&mut self, class: &str) {
        self.frames.push(Frame::Class(class.to_string()));
    }

    /// Close the innermost scope.
    pub fn pop_scope(&mut self) {
        self.frames.pop();
    }

    /// Lexical depth of the innermost scope; the global scope is 0.
    pub fn nesting_level(&self) -> u32 {
        self.frames.len().saturating_sub(1) as u32
    }

    fn frame_map<'a>(&'a self, frame: &'a Frame) -> Option<&'a FxHashMap<String, EntryId>> {
        match frame {
            Frame::Local(map) => Some(map),
            Frame::Class(class) => self.class_table.get(class),
        }
    }

    fn frame_map_mut(&mut self, index: usize) -> Option<&mut FxHashMap<String, EntryId>> {
        match self.frames.get_mut(index)? {
            Frame::Local(map) => Some(map),
            Frame::Class(class) => self.class_table.get_mut(class.as_str()),
        }
    }

    /// Declare `name` in the innermost scope.
    ///
    /// Returns the entry previously bound to `name` in that scope. The new
    /// binding replaces it either way.
    pub fn insert(&mut self, name: &str, entry: EntryId) -> Option<EntryId> {
        let index = self.frames.len().checked_sub(1)?;
        self.insert_at(index, name, entry)
    }

    /// Declare `name` in the global scope.
    pub fn insert_global(&mut self, name: &str, entry: EntryId) -> Option<EntryId> {
        self.insert_at(0, name, entry)
    }

    fn insert_at(&mut self, index: usize, name: &str, entry: EntryId) -> Option<EntryId> {
        self.frame_map_mut(index)?.insert(name.to_string(), entry)
    }

    /// Look `name` up in the innermost scope only.
    pub fn lookup_local(&self, name: &str) -> Option<EntryId> {
        let frame = self.frames.last()?;
        self.frame_map(frame)?.get(name).copied()
    }

    /// Look `name` up in the global scope only.
    pub fn lookup_global(&self, name: &str) -> Option<EntryId> {
        let frame = self.frames.first()?;
        self.frame_map(frame)?.get(name).copied()
    }

    /// Look `name` up from the innermost scope outward.
    pub fn lookup(&self, name: &str) -> Option<EntryId> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| self.frame_map(frame)?.get(name).copied())
    }

    // ========================================================================
    // Class table
    // ========================================================================

    /// Register the virtual table of `class`, replacing any earlier one.
    pub fn declare_class(&mut self, class: &str, vtable: VirtualTable) {
        self.class_table.insert(class.to_string(), vtable);
    }

    pub fn virtual_table(&self, class: &str) -> Option<&VirtualTable> {
        self.class_table.get(class)
    }

    pub fn is_class(&self, class: &str) -> bool {
        self.class_table.contains_key(class)
    }

    /// Hand the class table over once the traversal is done.
    pub fn into_class_table(self) -> FxHashMap<String, VirtualTable> {
        self.class_table
    }
}
