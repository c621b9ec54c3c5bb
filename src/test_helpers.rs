//! Shared test utilities: fixture builders for playground chapters and book
//! manifests, plus small extractors for asserting on directory contents.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! write_single_page_chapter(tmp.path(), "Intro", "print(1)\n");
//! write_multi_page_chapter(tmp.path(), "Loops", &[("While", ""), ("For", "")]);
//! let manifest = write_manifest(tmp.path(), "name: Sample\nchapters: [Intro, Loops]\n");
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// =========================================================================
// Fixture builders
// =========================================================================

/// Write `content` to `path`, creating parent directories.
pub fn write_file(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// `contents.xcplayground` listing `pages` in order.
pub fn toc_xml(pages: &[&str]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
         <playground version='6.0' target-platform='ios'>\n    <pages>\n",
    );
    for page in pages {
        xml.push_str(&format!("        <page name='{page}'/>\n"));
    }
    xml.push_str("    </pages>\n</playground>\n");
    xml
}

/// Create `<id>.playground` with a `Contents.swift` and empty asset directories.
pub fn write_single_page_chapter(base: &Path, id: &str, content: &str) -> PathBuf {
    let dir = base.join(format!("{id}.playground"));
    write_file(&dir.join("Contents.swift"), content);
    fs::create_dir_all(dir.join("Sources")).unwrap();
    fs::create_dir_all(dir.join("Resources")).unwrap();
    dir
}

/// Create a multi-page `<id>.playground` whose table of contents lists
/// `pages` in the given order.
pub fn write_multi_page_chapter(base: &Path, id: &str, pages: &[(&str, &str)]) -> PathBuf {
    let dir = base.join(format!("{id}.playground"));
    let names: Vec<&str> = pages.iter().map(|(name, _)| *name).collect();
    write_file(&dir.join("contents.xcplayground"), &toc_xml(&names));
    for (name, content) in pages {
        let page_dir = dir.join(format!("Pages/{name}.xcplaygroundpage"));
        write_file(&page_dir.join("Contents.swift"), content);
    }
    dir
}

/// Write `book.yml` into `base` and return its path.
pub fn write_manifest(base: &Path, yaml: &str) -> PathBuf {
    let path = base.join("book.yml");
    write_file(&path, yaml);
    path
}

// =========================================================================
// Extractors
// =========================================================================

/// File names of a path set, in set order.
pub fn file_names(paths: &BTreeSet<PathBuf>) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect()
}

/// Sorted entry names directly under `dir`.
pub fn dir_file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

/// Every file under `root` keyed by relative path, with its bytes.
pub fn snapshot_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    WalkDir::new(root)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
            (rel, fs::read(e.path()).unwrap())
        })
        .collect()
}
