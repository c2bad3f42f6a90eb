// README-to-rustdoc helpers shared by every qsync crate.
// Pulled into each build.rs with: include!("../build_common.rs");
//
// The including file must import:
//   use std::env;
//   use std::fs;
//   use std::path::Path;

/// Copy the crate README into `OUT_DIR/README_GENERATED.md`, turning links to
/// source files (`src/keys.rs`, `src/ports/mod.rs`) into intra-doc paths
/// (`crate::keys`, `crate::ports`).
fn process_readme_for_rustdoc(crate_dir: &str) {
    println!("cargo:rerun-if-changed=README.md");

    let readme_path = Path::new(crate_dir).join("README.md");
    let Ok(content) = fs::read_to_string(&readme_path) else {
        return;
    };

    let out_dir = env::var("OUT_DIR").unwrap();
    let dest_path = Path::new(&out_dir).join("README_GENERATED.md");
    fs::write(dest_path, rewrite_source_links(&content)).unwrap();
}

fn rewrite_source_links(content: &str) -> String {
    const OPEN: &str = "](src/";

    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(start) = rest.find(OPEN) {
        let target_start = start + OPEN.len();
        let Some(len) = rest[target_start..].find(')') else {
            break;
        };
        let target = &rest[target_start..target_start + len];

        out.push_str(&rest[..start]);
        out.push_str("](");
        out.push_str(&module_path(target));
        rest = &rest[target_start + len..];
    }
    out.push_str(rest);
    out
}

/// `repositories/sqlite_cache_store.rs` -> `crate::repositories::sqlite_cache_store`
fn module_path(file: &str) -> String {
    let file = file.strip_suffix(".rs").unwrap_or(file);
    let file = file.strip_suffix("/mod").unwrap_or(file);
    let file = if file == "lib" || file == "main" { "" } else { file };
    if file.is_empty() {
        "crate".to_string()
    } else {
        format!("crate::{}", file.replace('/', "::"))
    }
}
