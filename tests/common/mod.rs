//! Shared helpers for the integration tests.

#![allow(dead_code)]

pub mod svm;

use fool::prelude::*;

/// Compile `program` with the default configuration, failing the test on
/// any error.
pub fn compile_ok(program: &Program<'_>) -> CompilationResult {
    let result = fool::compile(program, CompilerConfig::default());
    assert!(result.is_success(), "unexpected errors: {:?}", result.errors());
    result
}

/// Compile and run `program`, returning what the machine left behind.
pub fn execute(program: &Program<'_>) -> svm::Outcome {
    let result = compile_ok(program);
    let code = result.bytecode.expect("successful compilation has code");
    svm::run(&code, DEFAULT_MEMORY_SIZE as usize)
}

/// Messages of the type errors of a result.
pub fn type_messages(result: &CompilationResult) -> Vec<String> {
    result
        .type_errors
        .iter()
        .map(|error| match error {
            TypeError::Mismatch { message, .. } => message.clone(),
            TypeError::Incomplete { .. } => String::from("<incomplete>"),
        })
        .collect()
}
