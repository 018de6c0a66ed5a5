// satori-core - String built-in module for the Satori runtime
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! The `string` module: case conversion operations.

use crate::error::{Error, Result};
use crate::modules::register_native;
use crate::table::Table;
use crate::value::Value;

/// Register the string exports. Called by the module registry.
pub fn init(globals: &mut Table) {
    register_native(globals, "string.to_upper", native_to_upper);
    register_native(globals, "string.to_lower", native_to_lower);
}

fn expect_one_string<'a>(name: &'static str, args: &'a [Value]) -> Result<&'a str> {
    if args.len() != 1 {
        return Err(Error::arity(name, 1, args.len()));
    }
    match &args[0] {
        Value::Str(s) => Ok(s),
        other => Err(Error::type_error(name, "string", other.type_name())),
    }
}

fn native_to_upper(args: &[Value]) -> Result<Value> {
    let input = expect_one_string("string.to_upper", args)?;
    Ok(Value::string(input.to_uppercase()))
}

fn native_to_lower(args: &[Value]) -> Result<Value> {
    let input = expect_one_string("string.to_lower", args)?;
    Ok(Value::string(input.to_lowercase()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_upper() {
        let result = native_to_upper(&[Value::string("hello world")]).unwrap();
        assert_eq!(result, Value::string("HELLO WORLD"));
    }

    #[test]
    fn test_to_lower() {
        let result = native_to_lower(&[Value::string("Hello World")]).unwrap();
        assert_eq!(result, Value::string("hello world"));
    }

    #[test]
    fn test_round_trip_leaves_lowercase_fixed() {
        let upper = native_to_upper(&[Value::string("abc123")]).unwrap();
        let back = native_to_lower(&[upper]).unwrap();
        assert_eq!(back, Value::string("abc123"));
    }

    #[test]
    fn test_wrong_arity() {
        let err = native_to_upper(&[]).unwrap_err();
        assert!(err.to_string().contains("expected 1, got 0"));

        let err = native_to_lower(&[Value::string("a"), Value::string("b")]).unwrap_err();
        assert!(err.to_string().contains("expected 1, got 2"));
    }

    #[test]
    fn test_wrong_type() {
        let err = native_to_upper(&[Value::Int(1)]).unwrap_err();
        assert!(err.to_string().contains("expected string, got int"));
    }
}
