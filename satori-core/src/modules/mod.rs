// satori-core - Built-in module registry for the Satori runtime
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Module registration, loading, and native function binding.
//!
//! Modules define what they export; this module handles how. The registry
//! is a static table of built-ins; loading is idempotent through the
//! caller's loaded-modules table.

pub mod io;
pub mod string;

use crate::error::{Error, Result};
use crate::table::Table;
use crate::value::{NativeFn, Value};

/// A module initialiser: called once per VM to populate the globals table.
pub type ModuleInitFn = fn(&mut Table);

/// Registry of all built-in modules.
const BUILTIN_MODULES: &[(&str, ModuleInitFn)] = &[("io", io::init), ("string", string::init)];

/// Load the named module into `globals`, recording it in `loaded`.
///
/// Loading twice is a no-op; the initialiser runs at most once per
/// `loaded` table.
pub fn load(name: &str, globals: &mut Table, loaded: &mut Table) -> Result<()> {
    // Check if already loaded
    if loaded.get(name).is_some() {
        return Ok(());
    }

    for (module, init) in BUILTIN_MODULES {
        if *module == name {
            init(globals);
            loaded.set(name, Value::Bool(true));
            return Ok(());
        }
    }

    Err(Error::UnknownModule(name.to_string()))
}

/// Bind a qualified name (`module.member`) to a native function.
pub fn register_native(globals: &mut Table, name: &str, function: NativeFn) {
    globals.set(name, Value::native(function));
}
