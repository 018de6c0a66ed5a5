// satori-core - I/O built-in module for the Satori runtime
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The `io` module: `io.println` and `io.print`.
//!
//! Both take a value, or a format string with `{}` interpolation points
//! filled from the remaining arguments:
//!
//! ```text
//! io.println "text"
//! io.println "x = {}", x
//! io.println "x = {}, y = {}", x, y
//! ```

use crate::error::Result;
use crate::modules::register_native;
use crate::table::Table;
use crate::value::Value;

/// Register the io exports. Called by the module registry.
pub fn init(globals: &mut Table) {
    register_native(globals, "io.println", native_println);
    register_native(globals, "io.print", native_print);
}

/// Render one call's arguments to a string, without a line terminator.
///
/// If the first argument is a string and more follow, it is treated as a
/// format string: each `{}` pair is replaced by the next remaining argument
/// in order. Surplus `{}` render as nothing; surplus arguments are ignored.
fn render(args: &[Value]) -> String {
    match args {
        [] => String::new(),
        [Value::Str(format)] => format.to_string(),
        [Value::Str(format), rest @ ..] => interpolate(format, rest),
        [value, ..] => value.to_string(),
    }
}

fn interpolate(format: &str, args: &[Value]) -> String {
    let mut out = String::new();
    let mut next = args.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '{' && chars.peek() == Some(&'}') {
            chars.next(); // Skip the '}'
            if let Some(value) = next.next() {
                out.push_str(&value.to_string());
            }
        } else {
            out.push(c);
        }
    }

    out
}

fn native_println(args: &[Value]) -> Result<Value> {
    println!("{}", render(args));
    Ok(Value::Nil)
}

fn native_print(args: &[Value]) -> Result<Value> {
    print!("{}", render(args));
    Ok(Value::Nil)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain_string() {
        assert_eq!(render(&[Value::string("Hello, World!")]), "Hello, World!");
    }

    #[test]
    fn test_render_no_arguments() {
        assert_eq!(render(&[]), "");
    }

    #[test]
    fn test_render_non_string_value() {
        assert_eq!(render(&[Value::Int(14)]), "14");
        assert_eq!(render(&[Value::Bool(true)]), "true");
        assert_eq!(render(&[Value::Nil]), "nil");
    }

    #[test]
    fn test_interpolation_single() {
        assert_eq!(
            render(&[Value::string("{}"), Value::Int(14)]),
            "14"
        );
    }

    #[test]
    fn test_interpolation_in_order() {
        assert_eq!(
            render(&[
                Value::string("{} < {} = {}"),
                Value::Int(7),
                Value::Int(10),
                Value::Bool(true),
            ]),
            "7 < 10 = true"
        );
    }

    #[test]
    fn test_interpolation_surplus_placeholders_render_empty() {
        assert_eq!(
            render(&[Value::string("a={} b={}"), Value::Int(1)]),
            "a=1 b="
        );
    }

    #[test]
    fn test_interpolation_surplus_arguments_ignored() {
        assert_eq!(
            render(&[Value::string("a={}"), Value::Int(1), Value::Int(2)]),
            "a=1"
        );
    }

    #[test]
    fn test_lone_braces_pass_through() {
        assert_eq!(
            render(&[Value::string("{a} {"), Value::Int(1)]),
            "{a} {"
        );
    }

    #[test]
    fn test_format_string_with_string_argument() {
        assert_eq!(
            render(&[Value::string("hi {}"), Value::string("there")]),
            "hi there"
        );
    }

    #[test]
    fn test_natives_return_nil() {
        assert_eq!(native_print(&[]).unwrap(), Value::Nil);
        assert_eq!(native_println(&[Value::Int(1)]).unwrap(), Value::Nil);
    }
}
