// SPDX-License-Identifier: MIT OR Apache-2.0
//! Definition-library discovery and loading.
//!
//! A definition library is a directory tree of `.mtlx` files containing
//! `<nodedef>` elements. The standard library root is the `libraries`
//! directory shipping the stdlib namespaces; it is discovered from an
//! environment override or by recursive search under caller-provided
//! roots.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::nodedef::NodeDef;
use crate::xml::{parse_nodedefs, DocumentError};

/// Namespace folders that identify a standard-library `libraries` root.
pub const STDLIB_NAMESPACES: [&str; 5] = ["bxdf", "lights", "pbrlib", "stdlib", "targets"];

/// Environment variable listing library search paths (platform path
/// separator), checked before any filesystem discovery.
pub const STDLIB_SEARCH_PATHS_ENV: &str = "MATFORGE_STDLIB_SEARCH_PATHS";

/// Error locating or loading a definition library.
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    /// No search path yielded a recognizable library root. Fatal at
    /// startup: the editor cannot proceed without a base definition set.
    #[error("could not find the MaterialX standard definition library")]
    StdlibNotFound,

    /// A library file could not be read or parsed
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Resolve the list of definition search paths.
///
/// Order: the [`STDLIB_SEARCH_PATHS_ENV`] override (split, deduplicated),
/// then recursive discovery of a `libraries` root under each provided
/// root. Callers with a known library location can pass it directly to
/// [`load_library`] and skip discovery.
pub fn stdlib_search_paths(search_roots: &[PathBuf]) -> Result<Vec<PathBuf>, LibraryError> {
    if let Ok(env) = std::env::var(STDLIB_SEARCH_PATHS_ENV) {
        let mut paths: Vec<PathBuf> = Vec::new();
        for part in std::env::split_paths(&env) {
            if !part.as_os_str().is_empty() && !paths.contains(&part) {
                paths.push(part);
            }
        }
        if !paths.is_empty() {
            return Ok(paths);
        }
    }

    for root in search_roots {
        if let Some(found) = find_library_root(root) {
            return Ok(vec![found]);
        }
    }

    Err(LibraryError::StdlibNotFound)
}

/// Recursively search `root` for a `libraries` directory containing the
/// stdlib namespace folders.
pub fn find_library_root(root: &Path) -> Option<PathBuf> {
    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_dir())
    {
        if entry.file_name() != "libraries" {
            continue;
        }

        let has_namespaces = STDLIB_NAMESPACES
            .iter()
            .all(|ns| entry.path().join(ns).is_dir());
        if has_namespaces {
            return Some(entry.path().to_path_buf());
        }
    }
    None
}

/// Load every node definition under `search_path`.
///
/// When `library_folders` is non-empty, only those immediate
/// subdirectories are scanned. Files that fail to parse are skipped with
/// a warning; deduplication against already-loaded definitions is the
/// caller's concern.
pub fn load_library(
    search_path: &Path,
    library_folders: &[String],
) -> Result<Vec<NodeDef>, LibraryError> {
    let roots: Vec<PathBuf> = if library_folders.is_empty() {
        vec![search_path.to_path_buf()]
    } else {
        library_folders
            .iter()
            .map(|folder| search_path.join(folder))
            .filter(|path| path.is_dir())
            .collect()
    };

    let mut defs = Vec::new();
    for root in roots {
        for entry in WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            if entry.path().extension() != Some(std::ffi::OsStr::new("mtlx")) {
                continue;
            }

            let text = match std::fs::read_to_string(entry.path()) {
                Ok(text) => text,
                Err(err) => {
                    warn!(path = %entry.path().display(), %err, "skipping unreadable library file");
                    continue;
                }
            };
            match parse_nodedefs(&text) {
                Ok(mut file_defs) => defs.append(&mut file_defs),
                Err(err) => {
                    warn!(path = %entry.path().display(), %err, "skipping unparsable library file");
                }
            }
        }
    }

    debug!(path = %search_path.display(), count = defs.len(), "loaded node definitions");
    Ok(defs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_library(dir: &Path) {
        let libraries = dir.join("deep").join("libraries");
        for ns in STDLIB_NAMESPACES {
            std::fs::create_dir_all(libraries.join(ns)).unwrap();
        }
        std::fs::write(
            libraries.join("stdlib").join("stdlib_defs.mtlx"),
            r#"<?xml version="1.0"?>
<materialx version="1.38">
  <nodedef name="ND_constant_float" node="constant" nodegroup="procedural">
    <input name="value" type="float" value="0"/>
    <output name="out" type="float"/>
  </nodedef>
</materialx>
"#,
        )
        .unwrap();
    }

    #[test]
    fn discovers_library_root_recursively() {
        let dir = tempfile::tempdir().unwrap();
        write_library(dir.path());
        let found = find_library_root(dir.path()).unwrap();
        assert_eq!(found, dir.path().join("deep").join("libraries"));
    }

    #[test]
    fn discovery_failure_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = stdlib_search_paths(&[dir.path().to_path_buf()]).unwrap_err();
        assert!(matches!(err, LibraryError::StdlibNotFound));
    }

    #[test]
    fn loads_definitions_from_folders() {
        let dir = tempfile::tempdir().unwrap();
        write_library(dir.path());
        let root = find_library_root(dir.path()).unwrap();

        let defs = load_library(&root, &[]).unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].category, "constant");

        let defs = load_library(&root, &["targets".to_string()]).unwrap();
        assert!(defs.is_empty());
    }
}
