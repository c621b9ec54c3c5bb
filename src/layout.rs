//! Chapter layout detection.
//!
//! Every chapter identifier names a `<id>.playground` directory in one of two
//! layouts:
//!
//! ```text
//! Intro.playground/               # Single-Page
//! ├── Contents.swift
//! ├── Sources/*.swift
//! └── Resources/*
//!
//! Loops.playground/               # Multi-Page
//! ├── contents.xcplayground       # <page name="..."/> in reading order
//! ├── Sources/*.swift             # chapter-level sources
//! ├── Resources/*
//! └── Pages/
//!     ├── While.xcplaygroundpage/
//!     │   ├── Contents.swift
//!     │   ├── Sources/*.swift
//!     │   └── Resources/*
//!     └── For.xcplaygroundpage/
//! ```
//!
//! `Contents.swift` is checked first: single-page playgrounds saved by Xcode
//! also carry a `contents.xcplayground`, just without pages.

use crate::config::RenderConfig;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONTENTS_FILE: &str = "Contents.swift";
pub const TABLE_OF_CONTENTS_FILE: &str = "contents.xcplayground";
pub const PAGES_DIR: &str = "Pages";
pub const SOURCES_DIR: &str = "Sources";
pub const RESOURCES_DIR: &str = "Resources";

/// Failures while detecting or parsing a single chapter.
#[derive(Error, Debug)]
pub enum ChapterError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("no Contents.swift or contents.xcplayground found in {0}")]
    MissingLayout(PathBuf),
    #[error("page '{page}' listed in the table of contents not found at {path}")]
    PageNotFound { page: String, path: PathBuf },
    #[error("page '{page}' has no Contents.swift at {path}")]
    MissingPageContents { page: String, path: PathBuf },
    #[error("page '{0}' is listed more than once in the table of contents")]
    DuplicatePage(String),
    #[error("page name '{0}' must not contain path separators or be '.' or '..'")]
    InvalidPageName(String),
    #[error("table of contents {0} lists no pages")]
    EmptyTableOfContents(PathBuf),
    #[error("malformed table of contents {path}: {message}")]
    TableOfContents { path: PathBuf, message: String },
}

/// Which of the two layouts a chapter uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LayoutKind {
    SinglePage,
    MultiPage,
}

/// A classified chapter directory with the paths the parser needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChapterLayout {
    SinglePage {
        contents: PathBuf,
    },
    MultiPage {
        table_of_contents: PathBuf,
        pages_dir: PathBuf,
    },
}

impl ChapterLayout {
    pub fn kind(&self) -> LayoutKind {
        match self {
            ChapterLayout::SinglePage { .. } => LayoutKind::SinglePage,
            ChapterLayout::MultiPage { .. } => LayoutKind::MultiPage,
        }
    }
}

/// Detector output: the layout plus chapter-level asset sets.
#[derive(Debug, Clone)]
pub struct DetectedChapter {
    pub id: String,
    pub dir: PathBuf,
    pub layout: ChapterLayout,
    pub sources: BTreeSet<PathBuf>,
    pub resources: BTreeSet<PathBuf>,
}

/// Directory holding the chapter `id`, e.g. `Intro.playground`.
pub fn chapter_dir(base_dir: &Path, id: &str) -> PathBuf {
    base_dir.join(format!("{id}.playground"))
}

/// Classify the chapter `id` found under `base_dir`.
pub fn detect(
    id: &str,
    base_dir: &Path,
    config: &RenderConfig,
) -> Result<DetectedChapter, ChapterError> {
    let dir = chapter_dir(base_dir, id);

    let contents = dir.join(CONTENTS_FILE);
    let table_of_contents = dir.join(TABLE_OF_CONTENTS_FILE);

    let layout = if contents.is_file() {
        ChapterLayout::SinglePage { contents }
    } else if table_of_contents.is_file() {
        ChapterLayout::MultiPage {
            table_of_contents,
            pages_dir: dir.join(PAGES_DIR),
        }
    } else {
        return Err(ChapterError::MissingLayout(dir));
    };

    tracing::debug!(chapter = id, layout = ?layout.kind(), "detected chapter layout");

    Ok(DetectedChapter {
        id: id.to_string(),
        sources: list_sources(&dir, &config.source_extension)?,
        resources: list_resources(&dir)?,
        dir,
        layout,
    })
}

/// `<dir>/Sources/*.<extension>`. A missing `Sources` directory is empty.
pub fn list_sources(dir: &Path, extension: &str) -> io::Result<BTreeSet<PathBuf>> {
    list_entries(&dir.join(SOURCES_DIR), |p| {
        p.is_file()
            && p.extension()
                .map(|e| e.eq_ignore_ascii_case(extension))
                .unwrap_or(false)
    })
}

/// Every non-hidden entry of `<dir>/Resources`, files and directories alike.
pub fn list_resources(dir: &Path) -> io::Result<BTreeSet<PathBuf>> {
    list_entries(&dir.join(RESOURCES_DIR), |_| true)
}

fn list_entries(dir: &Path, keep: impl Fn(&Path) -> bool) -> io::Result<BTreeSet<PathBuf>> {
    if !dir.is_dir() {
        return Ok(BTreeSet::new());
    }
    let mut entries = BTreeSet::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let hidden = path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with('.'))
            .unwrap_or(true);
        if !hidden && keep(&path) {
            entries.insert(path);
        }
    }
    Ok(entries)
}
