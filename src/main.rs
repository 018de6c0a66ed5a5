// satori - A small statically-oriented scripting language
// Copyright (c) 2025 Tom Waddington. MIT licensed.

use std::env;
use std::fs;
use std::process;

use satori_parser::{Lexer, Parser, TokenKind};
use satori_vm::{VM, compile, disassemble};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        process::exit(1);
    }

    let mut dump_tokens_only = false;
    let mut dump_ast_only = false;
    let mut dump_bytecode_only = false;
    let mut file_path: Option<&str> = None;

    // Parse arguments
    for arg in &args[1..] {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage(&args[0]);
                return;
            }
            "-v" | "--version" => {
                print_version();
                return;
            }
            "-t" | "--tokens" => dump_tokens_only = true,
            "-a" | "--ast" => dump_ast_only = true,
            "-b" | "--bytecode" => dump_bytecode_only = true,
            "-i" | "--interpret" => {
                // Default mode
            }
            arg if !arg.starts_with('-') => file_path = Some(arg),
            other => {
                eprintln!("Unknown option: {}", other);
                print_usage(&args[0]);
                process::exit(1);
            }
        }
    }

    let Some(file_path) = file_path else {
        eprintln!("error: no input file specified");
        print_usage(&args[0]);
        process::exit(1);
    };

    let source = match fs::read_to_string(file_path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("error: could not read '{}': {}", file_path, e);
            process::exit(1);
        }
    };

    if dump_tokens_only {
        dump_tokens(&source);
        return;
    }

    if dump_ast_only {
        process::exit(dump_ast(&source, file_path));
    }

    if dump_bytecode_only {
        process::exit(dump_bytecode(&source, file_path));
    }

    process::exit(run(&source, file_path));
}

fn print_usage(program: &str) {
    println!("Usage: {} [options] <file>", program);
    println!("Options:");
    println!("  -h, --help       Show this help message");
    println!("  -v, --version    Show version");
    println!("  -t, --tokens     Dump tokens only");
    println!("  -a, --ast        Dump AST only");
    println!("  -b, --bytecode   Dump compiled bytecode only");
    println!("  -i, --interpret  Interpret mode (default)");
    println!();
}

fn print_version() {
    println!("satori {}", env!("CARGO_PKG_VERSION"));
}

fn dump_tokens(source: &str) {
    let mut lexer = Lexer::new(source);
    loop {
        let token = lexer.next_token();
        println!("{}", token);
        if token.kind == TokenKind::Eof {
            break;
        }
    }
}

fn dump_ast(source: &str, file_path: &str) -> i32 {
    match Parser::new(source).parse() {
        Ok(program) => {
            print!("{}", program.tree());
            0
        }
        Err(errors) => {
            report_parse_errors(&errors, file_path);
            1
        }
    }
}

fn dump_bytecode(source: &str, file_path: &str) -> i32 {
    let program = match Parser::new(source).parse() {
        Ok(program) => program,
        Err(errors) => {
            report_parse_errors(&errors, file_path);
            return 1;
        }
    };

    match compile(&program) {
        Ok(chunk) => {
            print!("{}", disassemble(&chunk, file_path));
            0
        }
        Err(e) => {
            eprintln!("error: {}", e);
            1
        }
    }
}

fn run(source: &str, file_path: &str) -> i32 {
    let program = match Parser::new(source).parse() {
        Ok(program) => program,
        Err(errors) => {
            report_parse_errors(&errors, file_path);
            return 1;
        }
    };

    let chunk = match compile(&program) {
        Ok(chunk) => chunk,
        Err(e) => {
            eprintln!("error: {}", e);
            return 1;
        }
    };

    let mut vm = VM::new();
    match vm.run(chunk) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {}", e);
            1
        }
    }
}

fn report_parse_errors(errors: &[satori_parser::ParseError], file_path: &str) {
    for error in errors {
        eprintln!("error: {}:{}", file_path, error);
    }
}
