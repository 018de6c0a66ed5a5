// satori-vm - Bytecode compiler and virtual machine for the Satori programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! # satori-vm
//!
//! Single-pass bytecode compiler and stack-based virtual machine for the
//! Satori programming language. A parsed program compiles to a [`Chunk`]
//! (opcode bytes plus constant pool) which a [`VM`] executes to completion.

pub mod chunk;
pub mod compiler;
pub mod debug;
pub mod opcode;
pub mod vm;

pub use chunk::{Chunk, LineInfo};
pub use compiler::{CompileError, compile};
pub use debug::disassemble;
pub use opcode::OpCode;
pub use vm::{RuntimeError, VM};
