use std::env;
use std::path::PathBuf;

// The engine itself is external: either compile a source checkout pointed at
// by TREE_SITTER_RUNTIME_DIR, or link whatever the system provides.
fn main() {
    println!("cargo:rerun-if-env-changed=TREE_SITTER_RUNTIME_DIR");
    match env::var("TREE_SITTER_RUNTIME_DIR") {
        Ok(dir) => {
            let dir = PathBuf::from(dir);
            println!("cargo:rerun-if-changed={}", dir.join("lib/src").display());
            cc::Build::new()
                .include(dir.join("lib/include"))
                .include(dir.join("lib/src"))
                .file(dir.join("lib/src/lib.c"))
                .warnings(false)
                .compile("tree-sitter");
        }
        Err(_) => {
            println!("cargo:rustc-link-lib=dylib=tree-sitter");
        }
    }
}
