use std::collections::HashMap;

use anyhow::{Context, Result};
use canopy_syntax::Grammar;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::config::Configuration;
use crate::grammar_dylib_path;

// Populated lazily, then read-only: entries are inserted once and never
// replaced, so handles can be copied out and shared freely.
static LANGUAGES: Lazy<RwLock<HashMap<String, Grammar>>> = Lazy::new(Default::default);

/// Look up the grammar for `name`, loading its shared library on first use.
///
/// A missing or corrupt grammar means no parse of that language can ever
/// succeed, so callers resolving languages at startup should treat an error
/// as fatal rather than retrying.
pub fn language(name: &str) -> Result<Grammar> {
    if let Some(grammar) = LANGUAGES.read().get(name) {
        return Ok(*grammar);
    }
    let path = grammar_dylib_path(name);
    let grammar = Grammar::new(name, &path)
        .with_context(|| format!("failed to load the grammar for {name}"))?;
    log::info!("loaded grammar {name} from {}", path.display());
    // if two threads raced here, the first insert wins; both handles alias
    // the same process-lived grammar
    Ok(*LANGUAGES.write().entry(name.to_owned()).or_insert(grammar))
}

/// Load every grammar named by `config`, at startup.
///
/// Returns the first failure with full context. No grammar is unloaded on
/// error; the caller decides whether a partially populated registry is
/// usable (for a fixed language set it is not, and the error should abort
/// initialization).
pub fn preload(config: &Configuration) -> Result<()> {
    for entry in &config.grammar {
        if LANGUAGES.read().contains_key(&entry.name) {
            continue;
        }
        let path = match &entry.library {
            Some(library) => library.clone(),
            None => grammar_dylib_path(&entry.name),
        };
        let grammar = Grammar::new(&entry.name, &path)
            .with_context(|| format!("failed to load the grammar for {}", entry.name))?;
        log::info!("loaded grammar {} from {}", entry.name, path.display());
        LANGUAGES
            .write()
            .entry(entry.name.clone())
            .or_insert(grammar);
    }
    log::debug!("{} grammars registered", LANGUAGES.read().len());
    Ok(())
}
