// satori-vm - Bytecode compiler and virtual machine for the Satori programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Chunk disassembly, for the `--bytecode` dump and for debugging.

use std::fmt::Write;

use crate::chunk::Chunk;
use crate::opcode::OpCode;

/// Render a whole chunk as one instruction per line.
pub fn disassemble(chunk: &Chunk, name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", name);

    let mut offset = 0;
    while offset < chunk.code.len() {
        offset = disassemble_instruction(chunk, offset, &mut out);
    }
    out
}

/// Render the instruction at `offset`; returns the offset of the next one.
fn disassemble_instruction(chunk: &Chunk, offset: usize, out: &mut String) -> usize {
    let _ = write!(out, "{:04} ", offset);

    let byte = chunk.code[offset];
    let Some(op) = OpCode::from_byte(byte) else {
        let _ = writeln!(out, "???? ({})", byte);
        return offset + 1;
    };

    match op.operand_width() {
        0 => {
            let _ = writeln!(out, "{:?}", op);
        }
        1 => {
            let operand = chunk.code[offset + 1];
            match op {
                // Pool-indexed operands show the referenced constant
                OpCode::Constant | OpCode::GetGlobal | OpCode::Import => {
                    let rendered = chunk
                        .constants
                        .get(operand as usize)
                        .map(|value| value.to_string())
                        .unwrap_or_else(|| "<out of range>".to_string());
                    let _ = writeln!(out, "{:?} {} '{}'", op, operand, rendered);
                }
                _ => {
                    let _ = writeln!(out, "{:?} {}", op, operand);
                }
            }
        }
        _ => {
            let distance =
                u16::from_be_bytes([chunk.code[offset + 1], chunk.code[offset + 2]]) as usize;
            let after = offset + 3;
            let target = if op == OpCode::Loop {
                after.wrapping_sub(distance)
            } else {
                after + distance
            };
            let _ = writeln!(out, "{:?} {} -> {:04}", op, distance, target);
        }
    }

    offset + 1 + op.operand_width()
}

// ============================================================================
// Tests
// ============================================================================
