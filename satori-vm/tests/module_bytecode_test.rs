// satori-vm - Hand-assembled bytecode tests for the module system
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Drives the VM with manually built chunks, below the compiler:
//! importing a module, fetching a binding from globals, and calling it
//! through the native calling convention.

use satori_core::Value;
use satori_vm::{Chunk, LineInfo, OpCode, VM};

struct Assembler {
    chunk: Chunk,
}

impl Assembler {
    fn new() -> Self {
        Self {
            chunk: Chunk::new(),
        }
    }

    fn op(&mut self, op: OpCode) -> &mut Self {
        self.chunk.write(op as u8, LineInfo::default());
        self
    }

    fn byte(&mut self, byte: u8) -> &mut Self {
        self.chunk.write(byte, LineInfo::default());
        self
    }

    fn constant(&mut self, value: Value) -> u8 {
        self.chunk.add_constant(value) as u8
    }
}

#[test]
fn import_then_call_println_twice() {
    // import io
    // io.println "Hello, World!"
    // io.println "Number: {}", 42
    let mut asm = Assembler::new();

    let io_name = asm.constant(Value::string("io"));
    let println_name = asm.constant(Value::string("io.println"));
    let hello = asm.constant(Value::string("Hello, World!"));
    let format = asm.constant(Value::string("Number: {}"));
    let number = asm.constant(Value::Int(42));

    asm.op(OpCode::Import).byte(io_name);

    asm.op(OpCode::GetGlobal).byte(println_name);
    asm.op(OpCode::Constant).byte(hello);
    asm.op(OpCode::CallNative).byte(1);
    asm.op(OpCode::Pop);

    // The name constant is reused for the second call
    asm.op(OpCode::GetGlobal).byte(println_name);
    asm.op(OpCode::Constant).byte(format);
    asm.op(OpCode::Constant).byte(number);
    asm.op(OpCode::CallNative).byte(2);
    asm.op(OpCode::Pop);

    asm.op(OpCode::Halt);

    let mut vm = VM::new();
    vm.run(asm.chunk).unwrap();

    assert!(vm.loaded_modules().get("io").is_some());
    assert!(matches!(
        vm.globals().get("io.println"),
        Some(Value::NativeFn(_))
    ));
}

#[test]
fn get_global_before_import_fails() {
    let mut asm = Assembler::new();
    let println_name = asm.constant(Value::string("io.println"));

    asm.op(OpCode::GetGlobal).byte(println_name);
    asm.op(OpCode::Pop);
    asm.op(OpCode::Halt);

    let mut vm = VM::new();
    let err = vm.run(asm.chunk).unwrap_err();
    assert_eq!(err.to_string(), "Undefined global 'io.println'");
}

#[test]
fn string_module_result_flows_into_a_nested_call() {
    use std::cell::RefCell;

    thread_local! {
        static SEEN: RefCell<Option<Value>> = const { RefCell::new(None) };
    }

    fn capture(args: &[Value]) -> satori_core::Result<Value> {
        SEEN.with(|seen| *seen.borrow_mut() = args.first().cloned());
        Ok(Value::Nil)
    }

    // capture(to_upper("hello world")): the inner call's result replaces
    // its callee and argument, becoming the outer call's argument
    let mut asm = Assembler::new();
    let string_name = asm.constant(Value::string("string"));
    let capture_name = asm.constant(Value::string("test.capture"));
    let to_upper_name = asm.constant(Value::string("string.to_upper"));
    let input = asm.constant(Value::string("hello world"));

    asm.op(OpCode::Import).byte(string_name);
    asm.op(OpCode::GetGlobal).byte(capture_name);
    asm.op(OpCode::GetGlobal).byte(to_upper_name);
    asm.op(OpCode::Constant).byte(input);
    asm.op(OpCode::CallNative).byte(1);
    asm.op(OpCode::CallNative).byte(1);
    asm.op(OpCode::Pop);
    asm.op(OpCode::Halt);

    let mut vm = VM::new();
    vm.register_native("test.capture", capture);
    vm.run(asm.chunk).unwrap();

    SEEN.with(|seen| {
        assert_eq!(seen.borrow().clone(), Some(Value::string("HELLO WORLD")));
    });
}
