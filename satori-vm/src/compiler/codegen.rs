// satori-vm - Bytecode compiler and virtual machine for the Satori programming language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Code generation: a single-pass walk from the program root, emitting
//! opcodes into a chunk.
//!
//! Locals are flat slots resolved at compile time. `if` branches and loop
//! bodies open a scope; closing a scope truncates the compile-time locals
//! list so slots are reused, with no runtime effect. Jumps are emitted
//! with a two-byte placeholder and patched once the target is known.

use satori_parser::ast::{AstKind, AstNode, BinaryOp, UnaryOp};

use satori_core::Value;

use crate::chunk::{Chunk, LineInfo};
use crate::opcode::OpCode;

use super::types::{CompileError, Local, LoopContext, Result};

/// Capacity of the VM's local-slot array.
pub const MAX_LOCALS: usize = 256;

/// The bytecode compiler.
pub struct Compiler {
    chunk: Chunk,
    locals: Vec<Local>,
    scope_depth: usize,
    loops: Vec<LoopContext>,
    current_line: LineInfo,
}

/// Compile a program node into a chunk ending in `Halt`.
pub fn compile(program: &AstNode) -> Result<Chunk> {
    let mut compiler = Compiler::new();
    compiler.compile_stmt(program)?;
    compiler.emit(OpCode::Halt);
    Ok(compiler.chunk)
}

impl Compiler {
    fn new() -> Self {
        Self {
            chunk: Chunk::new(),
            locals: Vec::new(),
            scope_depth: 0,
            loops: Vec::new(),
            current_line: LineInfo::default(),
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn compile_stmt(&mut self, node: &AstNode) -> Result<()> {
        self.current_line = LineInfo::new(node.line, node.column);

        match &node.kind {
            AstKind::Program(statements) | AstKind::Block(statements) => {
                for statement in statements {
                    self.compile_stmt(statement)?;
                }
                Ok(())
            }

            AstKind::Import(name) => {
                let index = self.make_constant(Value::string(name.as_str()))?;
                self.emit_with_operand(OpCode::Import, index);
                Ok(())
            }

            AstKind::Let { name, value } => {
                // The initialiser leaves its value on the stack; SetLocal
                // pops it into the fresh slot
                self.compile_expr(value)?;
                let slot = self.add_local(name)?;
                self.emit_with_operand(OpCode::SetLocal, slot);
                Ok(())
            }

            AstKind::Assignment { name, value } => {
                self.compile_expr(value)?;
                let slot = self
                    .resolve_local(name)
                    .ok_or_else(|| CompileError::UndefinedVariable(name.clone()))?;
                self.emit_with_operand(OpCode::SetLocal, slot);
                Ok(())
            }

            AstKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.compile_expr(condition)?;

                // The condition stays on the stack across the jump; each
                // branch pops it exactly once
                let else_jump = self.emit_jump(OpCode::JumpIfFalse);
                self.emit(OpCode::Pop);

                self.begin_scope();
                self.compile_stmt(then_branch)?;
                self.end_scope();

                let end_jump = self.emit_jump(OpCode::Jump);

                self.patch_jump(else_jump)?;
                self.emit(OpCode::Pop);

                if let Some(else_branch) = else_branch {
                    self.begin_scope();
                    self.compile_stmt(else_branch)?;
                    self.end_scope();
                }

                self.patch_jump(end_jump)
            }

            AstKind::While { condition, body } => {
                let loop_start = self.chunk.current_offset();

                self.compile_expr(condition)?;
                let exit_jump = self.emit_jump(OpCode::JumpIfFalse);
                self.emit(OpCode::Pop);

                self.loops.push(LoopContext {
                    start: loop_start,
                    break_sites: Vec::new(),
                });
                self.begin_scope();
                self.compile_stmt(body)?;
                self.end_scope();
                let context = self.loops.pop().unwrap_or_default();

                self.emit_loop(loop_start)?;

                self.patch_jump(exit_jump)?;
                self.emit(OpCode::Pop);

                // break lands after the exit-path Pop: the condition was
                // already popped on entry to the body
                for site in context.break_sites {
                    self.patch_jump(site)?;
                }
                Ok(())
            }

            AstKind::Loop { body } => {
                let loop_start = self.chunk.current_offset();

                self.loops.push(LoopContext {
                    start: loop_start,
                    break_sites: Vec::new(),
                });
                self.begin_scope();
                self.compile_stmt(body)?;
                self.end_scope();
                let context = self.loops.pop().unwrap_or_default();

                self.emit_loop(loop_start)?;

                for site in context.break_sites {
                    self.patch_jump(site)?;
                }
                Ok(())
            }

            AstKind::Break => {
                if self.loops.is_empty() {
                    return Err(CompileError::BreakOutsideLoop);
                }
                let site = self.emit_jump(OpCode::Jump);
                if let Some(context) = self.loops.last_mut() {
                    context.break_sites.push(site);
                }
                Ok(())
            }

            AstKind::Continue => {
                let start = match self.loops.last() {
                    Some(context) => context.start,
                    None => return Err(CompileError::ContinueOutsideLoop),
                };
                self.emit_loop(start)
            }

            AstKind::Call { .. } => self.compile_call(node),

            AstKind::MemberAccess { .. } => Err(CompileError::MemberOutsideCall),

            // Expression statement: evaluate, then discard the value so the
            // stack is balanced at every statement boundary
            _ => {
                self.compile_expr(node)?;
                self.emit(OpCode::Pop);
                Ok(())
            }
        }
    }

    /// Compile a `module.member arg, ...` call statement.
    ///
    /// The qualified name is interned as a string constant and resolved
    /// through the globals table at run time; any other callee shape has no
    /// meaning in the current language.
    fn compile_call(&mut self, node: &AstNode) -> Result<()> {
        let AstKind::Call { callee, args } = &node.kind else {
            return Err(CompileError::Internal("compile_call on a non-call node"));
        };

        let AstKind::MemberAccess { object, member } = &callee.kind else {
            return Err(CompileError::UnknownCall);
        };
        let AstKind::Identifier(module) = &object.kind else {
            return Err(CompileError::UnknownCall);
        };

        let qualified = format!("{}.{}", module, member);
        let name_index = self.make_constant(Value::string(qualified))?;
        self.emit_with_operand(OpCode::GetGlobal, name_index);

        if args.len() > u8::MAX as usize {
            return Err(CompileError::TooManyArguments);
        }
        for arg in args {
            self.compile_expr(arg)?;
        }

        self.emit_with_operand(OpCode::CallNative, args.len() as u8);

        // Calls compile only as statements; discard the returned value
        self.emit(OpCode::Pop);
        Ok(())
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn compile_expr(&mut self, node: &AstNode) -> Result<()> {
        self.current_line = LineInfo::new(node.line, node.column);

        match &node.kind {
            AstKind::Binary { op, left, right } => {
                self.compile_expr(left)?;
                self.compile_expr(right)?;
                self.emit(binary_opcode(*op));
                Ok(())
            }

            AstKind::Unary { op, operand } => {
                self.compile_expr(operand)?;
                self.emit(match op {
                    UnaryOp::Negate => OpCode::Negate,
                    UnaryOp::Not => OpCode::Not,
                });
                Ok(())
            }

            AstKind::Identifier(name) => {
                let slot = self
                    .resolve_local(name)
                    .ok_or_else(|| CompileError::UndefinedVariable(name.clone()))?;
                self.emit_with_operand(OpCode::GetLocal, slot);
                Ok(())
            }

            AstKind::StringLit(value) => {
                let index = self.make_constant(Value::string(value.as_str()))?;
                self.emit_with_operand(OpCode::Constant, index);
                Ok(())
            }

            AstKind::IntLit(value) => {
                let index = self.make_constant(Value::Int(*value))?;
                self.emit_with_operand(OpCode::Constant, index);
                Ok(())
            }

            AstKind::FloatLit(value) => {
                let index = self.make_constant(Value::Float(*value))?;
                self.emit_with_operand(OpCode::Constant, index);
                Ok(())
            }

            AstKind::Call { .. } => Err(CompileError::CallInExpression),

            AstKind::MemberAccess { .. } => Err(CompileError::MemberOutsideCall),

            _ => Err(CompileError::Internal("statement node in expression position")),
        }
    }

    // ========================================================================
    // Emission helpers
    // ========================================================================

    fn emit(&mut self, op: OpCode) {
        self.chunk.write(op as u8, self.current_line);
    }

    fn emit_with_operand(&mut self, op: OpCode, operand: u8) {
        self.emit(op);
        self.chunk.write(operand, self.current_line);
    }

    /// Append a value to the constant pool, enforcing the one-byte index
    /// encoding.
    fn make_constant(&mut self, value: Value) -> Result<u8> {
        let index = self.chunk.add_constant(value);
        if index > u8::MAX as usize {
            return Err(CompileError::TooManyConstants);
        }
        Ok(index as u8)
    }

    /// Emit a jump with a two-byte placeholder; returns the patch site.
    fn emit_jump(&mut self, op: OpCode) -> usize {
        self.emit(op);
        self.chunk.write(0xff, self.current_line);
        self.chunk.write(0xff, self.current_line);
        self.chunk.current_offset() - 2
    }

    /// Resolve a forward jump to the current offset.
    fn patch_jump(&mut self, site: usize) -> Result<()> {
        // -2 adjusts for the operand bytes read before the jump executes
        let distance = self.chunk.current_offset() - site - 2;
        if distance > u16::MAX as usize {
            return Err(CompileError::JumpTooLarge);
        }
        self.chunk.patch_short(site, distance as u16);
        Ok(())
    }

    /// Emit a backward jump to `target`.
    fn emit_loop(&mut self, target: usize) -> Result<()> {
        self.emit(OpCode::Loop);

        // +2 skips the operand bytes still ahead of the ip when it jumps
        let distance = self.chunk.current_offset() - target + 2;
        if distance > u16::MAX as usize {
            return Err(CompileError::LoopTooLarge);
        }
        self.chunk.write((distance >> 8) as u8, self.current_line);
        self.chunk.write((distance & 0xff) as u8, self.current_line);
        Ok(())
    }

    // ========================================================================
    // Locals
    // ========================================================================

    fn add_local(&mut self, name: &str) -> Result<u8> {
        if self.locals.len() >= MAX_LOCALS {
            return Err(CompileError::TooManyLocals);
        }
        let slot = self.locals.len() as u8;
        self.locals.push(Local {
            name: name.to_string(),
            depth: self.scope_depth,
            slot,
        });
        Ok(slot)
    }

    /// Newest declaration wins, so a redeclaration shadows.
    fn resolve_local(&self, name: &str) -> Option<u8> {
        self.locals
            .iter()
            .rev()
            .find(|local| local.name == name)
            .map(|local| local.slot)
    }

    fn begin_scope(&mut self) {
        self.scope_depth += 1;
    }

    fn end_scope(&mut self) {
        self.scope_depth -= 1;
        // Dropping the compile-time entries frees their slots for reuse;
        // there is nothing to emit since locals do not live on the stack
        self.locals.retain(|local| local.depth <= self.scope_depth);
    }
}

fn binary_opcode(op: BinaryOp) -> OpCode {
    match op {
        BinaryOp::Add => OpCode::Add,
        BinaryOp::Sub => OpCode::Subtract,
        BinaryOp::Mul => OpCode::Multiply,
        BinaryOp::Div => OpCode::Divide,
        BinaryOp::Mod => OpCode::Modulo,
        BinaryOp::Eq => OpCode::Equal,
        BinaryOp::Neq => OpCode::NotEqual,
        BinaryOp::Lt => OpCode::Less,
        BinaryOp::Lte => OpCode::LessEqual,
        BinaryOp::Gt => OpCode::Greater,
        BinaryOp::Gte => OpCode::GreaterEqual,
    }
}

// ============================================================================
// Tests
// ============================================================================
