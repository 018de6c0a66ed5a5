// satori-vm - Bytecode compiler and virtual machine for the Satori programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Bytecode compiler: transforms the Satori AST to bytecode in one pass.

pub mod codegen;
pub mod types;

pub use codegen::{MAX_LOCALS, compile};
pub use types::{CompileError, Local, LoopContext, Result};
