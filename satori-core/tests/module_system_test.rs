// satori-core - Module system tests
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Direct tests of module loading and native function binding:
//! registration of the built-in exports, idempotent loading, and calling
//! natives through their registered values.

use satori_core::modules;
use satori_core::{Table, Value};

fn fresh_tables() -> (Table, Table) {
    (Table::new(), Table::new())
}

#[test]
fn load_io_registers_exports() {
    let (mut globals, mut loaded) = fresh_tables();
    modules::load("io", &mut globals, &mut loaded).unwrap();

    assert!(matches!(globals.get("io.println"), Some(Value::NativeFn(_))));
    assert!(matches!(globals.get("io.print"), Some(Value::NativeFn(_))));
    assert!(loaded.get("io").is_some());
}

#[test]
fn load_string_registers_exports() {
    let (mut globals, mut loaded) = fresh_tables();
    modules::load("string", &mut globals, &mut loaded).unwrap();

    assert!(matches!(
        globals.get("string.to_upper"),
        Some(Value::NativeFn(_))
    ));
    assert!(matches!(
        globals.get("string.to_lower"),
        Some(Value::NativeFn(_))
    ));
}

#[test]
fn load_is_idempotent() {
    let (mut globals, mut loaded) = fresh_tables();
    modules::load("io", &mut globals, &mut loaded).unwrap();
    let globals_after_first = globals.len();

    // Re-loading must neither fail nor register anything twice
    modules::load("io", &mut globals, &mut loaded).unwrap();
    assert_eq!(globals.len(), globals_after_first);
    assert_eq!(loaded.len(), 1);
}

#[test]
fn modules_are_independent() {
    let (mut globals, mut loaded) = fresh_tables();
    modules::load("io", &mut globals, &mut loaded).unwrap();
    modules::load("string", &mut globals, &mut loaded).unwrap();

    assert_eq!(loaded.len(), 2);
    assert!(globals.get("io.println").is_some());
    assert!(globals.get("string.to_upper").is_some());
}

#[test]
fn unknown_module_fails_and_registers_nothing() {
    let (mut globals, mut loaded) = fresh_tables();
    let err = modules::load("math", &mut globals, &mut loaded).unwrap_err();

    assert!(err.to_string().contains("math"));
    assert!(globals.is_empty());
    assert!(loaded.is_empty());
}

#[test]
fn registered_native_is_callable() {
    let (mut globals, mut loaded) = fresh_tables();
    modules::load("string", &mut globals, &mut loaded).unwrap();

    let Some(Value::NativeFn(to_upper)) = globals.get("string.to_upper") else {
        panic!("string.to_upper not registered");
    };

    let result = to_upper(&[Value::string("satori")]).unwrap();
    assert_eq!(result, Value::string("SATORI"));
}
