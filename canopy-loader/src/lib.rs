//! Runtime bootstrapping for canopy: locating the runtime directory,
//! reading the grammar configuration, and populating the process-wide
//! language registry.

pub mod config;
pub mod registry;

use std::path::PathBuf;

#[cfg(unix)]
const DYLIB_EXTENSION: &str = "so";

#[cfg(windows)]
const DYLIB_EXTENSION: &str = "dll";

const RT_DIR: &str = "runtime";

/// Locate the runtime directory holding grammar libraries and configuration.
///
/// Resolution order: the `CANOPY_RUNTIME` environment variable, a `runtime`
/// directory at the workspace root when running under cargo, then one next
/// to the executable.
pub fn runtime_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CANOPY_RUNTIME") {
        return dir.into();
    }

    if let Ok(dir) = std::env::var("CARGO_MANIFEST_DIR") {
        // this is the directory of the crate being run by cargo, we need the
        // workspace path so we take the parent
        return PathBuf::from(dir).parent().unwrap().join(RT_DIR);
    }

    // fallback to location of the executable being run
    std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(|path| path.to_path_buf().join(RT_DIR)))
        .unwrap()
}

/// The directory grammar shared libraries are loaded from.
pub fn grammar_dir() -> PathBuf {
    runtime_dir().join("grammars")
}

/// The grammar configuration file (see [`config::Configuration`]).
pub fn config_file() -> PathBuf {
    runtime_dir().join("grammars.toml")
}

/// Path of the shared library expected to provide the grammar named `name`.
pub fn grammar_dylib_path(name: &str) -> PathBuf {
    let mut path = grammar_dir().join(name);
    path.set_extension(DYLIB_EXTENSION);
    path
}
