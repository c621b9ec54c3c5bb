//! Chapter collation.
//!
//! Writes one normalized chapter into the book's `Contents/Chapters/`:
//!
//! ```text
//! Chapters/Loops/
//! ├── Manifest.plist                  # Name, Pages (in order), Version
//! ├── Sources/                        # chapter + page sources, flattened
//! ├── Resources/                      # chapter + page resources, flattened
//! └── Pages/
//!     ├── While.playgroundpage/
//!     │   ├── Contents.swift          # import header + page content
//!     │   └── Manifest.plist
//!     └── For.playgroundpage/
//! ```
//!
//! The import header is a hidden-code block, one `import` per entry:
//!
//! ```text
//! //#-hidden-code
//! import Foundation
//! //#-end-hidden-code
//! ```
//!
//! An empty import list writes no header at all. Directories are created with
//! [`ensure_dir`] and never wiped, so collating the same chapter twice yields
//! the same bytes.

use crate::assets::{copy_into, ensure_dir};
use crate::config::RenderConfig;
use crate::layout::{PAGES_DIR, RESOURCES_DIR, SOURCES_DIR};
use crate::parse::{PageSpec, ParsedChapter};
use crate::plist::{Plist, write_plist};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const MANIFEST_FILE: &str = "Manifest.plist";
const MANIFEST_VERSION: &str = "1.0";

/// Where a collated chapter ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollatedChapter {
    pub dir: PathBuf,
    pub page_dirs: Vec<PathBuf>,
}

/// Output directory name for a page, e.g. `While.playgroundpage`.
pub fn page_dir_name(page: &str) -> String {
    format!("{page}.playgroundpage")
}

/// Write `chapter` under `<chapters_dir>/<chapter_id>/`.
///
/// `imports` is already resolved; it is written verbatim into every page.
pub fn collate(
    chapter_id: &str,
    chapter: &ParsedChapter,
    imports: &[String],
    chapters_dir: &Path,
    config: &RenderConfig,
) -> io::Result<CollatedChapter> {
    let dir = chapters_dir.join(chapter_id);
    ensure_dir(&dir)?;
    tracing::info!(chapter = chapter_id, pages = chapter.pages.len(), "collating chapter");

    let manifest = Plist::Dict(vec![
        ("Name".into(), Plist::string(chapter_id)),
        (
            "Pages".into(),
            Plist::strings(chapter.pages.iter().map(|p| page_dir_name(&p.name))),
        ),
        ("Version".into(), Plist::string(MANIFEST_VERSION)),
    ]);
    write_plist(&dir.join(MANIFEST_FILE), &manifest)?;

    let pages_dir = dir.join(PAGES_DIR);
    ensure_dir(&pages_dir)?;
    let header = import_header(imports);
    let mut page_dirs = Vec::with_capacity(chapter.pages.len());
    for page in &chapter.pages {
        page_dirs.push(write_page(&pages_dir, page, &header, config)?);
    }

    let sources_dir = dir.join(SOURCES_DIR);
    let resources_dir = dir.join(RESOURCES_DIR);
    ensure_dir(&sources_dir)?;
    ensure_dir(&resources_dir)?;

    // Chapter-level first, then pages in order: a later same-named file wins.
    let sources = chapter
        .sources
        .iter()
        .chain(chapter.pages.iter().flat_map(|p| p.sources.iter()));
    for source in sources {
        copy_into(source, &sources_dir)?;
    }
    let resources = chapter
        .resources
        .iter()
        .chain(chapter.pages.iter().flat_map(|p| p.resources.iter()));
    for resource in resources {
        copy_into(resource, &resources_dir)?;
    }

    Ok(CollatedChapter { dir, page_dirs })
}

fn write_page(
    pages_dir: &Path,
    page: &PageSpec,
    header: &[u8],
    config: &RenderConfig,
) -> io::Result<PathBuf> {
    let page_dir = pages_dir.join(page_dir_name(&page.name));
    ensure_dir(&page_dir)?;

    let mut contents = Vec::with_capacity(header.len() + page.content.len());
    contents.extend_from_slice(header);
    contents.extend_from_slice(&page.content);
    fs::write(page_dir.join("Contents.swift"), contents)?;

    let manifest = Plist::Dict(vec![
        ("Name".into(), Plist::string(&page.name)),
        (
            "LiveViewMode".into(),
            Plist::string(&config.pages.live_view_mode),
        ),
        ("Version".into(), Plist::string(MANIFEST_VERSION)),
    ]);
    write_plist(&page_dir.join(MANIFEST_FILE), &manifest)?;

    tracing::debug!(page = %page.name, dir = %page_dir.display(), "wrote page");
    Ok(page_dir)
}

/// Hidden-code block importing `imports`, or nothing for an empty list.
pub fn import_header(imports: &[String]) -> Vec<u8> {
    if imports.is_empty() {
        return Vec::new();
    }
    let mut header = String::from("//#-hidden-code\n");
    for import in imports {
        header.push_str(&format!("import {import}\n"));
    }
    header.push_str("//#-end-hidden-code\n");
    header.into_bytes()
}

/// Imports declared by a page's hidden-code header, in order.
pub fn header_imports(contents: &str) -> Vec<String> {
    let mut lines = contents.lines();
    if lines.next() != Some("//#-hidden-code") {
        return Vec::new();
    }
    lines
        .take_while(|l| *l != "//#-end-hidden-code")
        .filter_map(|l| l.strip_prefix("import "))
        .map(|m| m.trim().to_string())
        .collect()
}
