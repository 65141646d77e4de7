use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use libloading::{Library, Symbol};

/// Newest grammar ABI version the linked engine understands.
pub const LANGUAGE_VERSION: u32 = 15;
/// Oldest grammar ABI version the linked engine still accepts.
pub const MIN_COMPATIBLE_LANGUAGE_VERSION: u32 = 13;

// opaque data
pub enum GrammarData {}

/// A compiled grammar handle.
///
/// Grammars are immutable and shared: one handle drives any number of parsers
/// and queries. There is no unload operation — parsers, queries and nodes all
/// keep grammar pointers, so a loaded grammar stays alive for the rest of the
/// process.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Grammar {
    ptr: NonNull<GrammarData>,
}

unsafe impl Send for Grammar {}
unsafe impl Sync for Grammar {}

impl Grammar {
    /// Wrap a grammar pointer obtained from a statically linked
    /// `tree_sitter_<name>` constructor.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a valid grammar that stays alive for the rest of
    /// the process.
    pub unsafe fn from_raw(ptr: NonNull<GrammarData>) -> Result<Grammar, IncompatibleGrammarError> {
        let grammar = Grammar { ptr };
        let version = grammar.version();
        if (MIN_COMPATIBLE_LANGUAGE_VERSION..=LANGUAGE_VERSION).contains(&version) {
            Ok(grammar)
        } else {
            Err(IncompatibleGrammarError { version })
        }
    }

    /// Load the grammar named `name` from the shared library at
    /// `library_path` by resolving its `tree_sitter_<name>` constructor.
    ///
    /// The library handle is deliberately leaked: unloading would invalidate
    /// every parser, query and node still holding the grammar pointer.
    pub fn new(name: &str, library_path: &Path) -> Result<Grammar, GrammarLoadError> {
        let library =
            unsafe { Library::new(library_path) }.map_err(|error| GrammarLoadError::Library {
                path: library_path.to_owned(),
                error,
            })?;
        let symbol = format!("tree_sitter_{}", name.replace('-', "_"));
        let raw = unsafe {
            let constructor: Symbol<unsafe extern "C" fn() -> *mut GrammarData> = library
                .get(symbol.as_bytes())
                .map_err(|error| GrammarLoadError::Symbol {
                    symbol: symbol.clone(),
                    error,
                })?;
            constructor()
        };
        std::mem::forget(library);
        let ptr = NonNull::new(raw).ok_or(GrammarLoadError::NullGrammar { symbol })?;
        log::debug!("loaded grammar {name} from {}", library_path.display());
        unsafe { Grammar::from_raw(ptr) }.map_err(GrammarLoadError::IncompatibleVersion)
    }

    /// The ABI version this grammar was generated with.
    pub fn version(self) -> u32 {
        unsafe { ts_language_version(self) }
    }
}

/// The grammar was generated with an ABI the linked engine does not support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error(
    "grammar ABI version {version} is outside the supported range \
     {MIN_COMPATIBLE_LANGUAGE_VERSION}..={LANGUAGE_VERSION}"
)]
pub struct IncompatibleGrammarError {
    pub version: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarLoadError {
    #[error("failed to open grammar library {path:?}")]
    Library {
        path: PathBuf,
        #[source]
        error: libloading::Error,
    },
    #[error("failed to resolve grammar constructor {symbol}")]
    Symbol {
        symbol: String,
        #[source]
        error: libloading::Error,
    },
    #[error("grammar constructor {symbol} returned a null pointer")]
    NullGrammar { symbol: String },
    #[error(transparent)]
    IncompatibleVersion(IncompatibleGrammarError),
}

extern "C" {
    /// Get the ABI version number that indicates which version of the
    /// Tree-sitter CLI a grammar was generated with.
    fn ts_language_version(grammar: Grammar) -> u32;
}
