//! CompilationSession - state shared by the passes of a compilation.

use crate::type_rels::TypeRelations;

/// Memory size of the target stack machine.
pub const DEFAULT_MEMORY_SIZE: i32 = 10000;

/// Settings that affect code generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Number of words of memory of the target machine. The stack grows down
    /// from here, so global slots are addressed relative to it.
    pub memory_size: i32,
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self {
            memory_size: DEFAULT_MEMORY_SIZE,
        }
    }

    pub fn with_memory_size(mut self, memory_size: i32) -> Self {
        self.memory_size = memory_size;
        self
    }
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Owns the configuration and the class hierarchy of a compilation.
#[derive(Debug, Default)]
pub struct CompilationSession {
    config: CompilerConfig,
    type_rels: TypeRelations,
}

impl CompilationSession {
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            config,
            type_rels: TypeRelations::new(),
        }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    pub fn type_rels(&self) -> &TypeRelations {
        &self.type_rels
    }

    pub fn type_rels_mut(&mut self) -> &mut TypeRelations {
        &mut self.type_rels
    }

    /// Forget the class hierarchy of previous compilations.
    pub fn reset(&mut self) {
        self.type_rels.clear();
    }
}
