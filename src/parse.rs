//! Page parsing.
//!
//! Turns a [`DetectedChapter`] into a [`ParsedChapter`], the layout-independent
//! form every later stage works with: an ordered, non-empty list of pages plus
//! the chapter-level source and resource sets.
//!
//! A Single-Page chapter becomes exactly one page named after the chapter.
//! A Multi-Page chapter becomes one page per `<page name="…">` entry of its
//! `contents.xcplayground`, in table-of-contents order. Directory listing order
//! under `Pages/` never matters.

use crate::config::RenderConfig;
use crate::layout::{
    self, CONTENTS_FILE, ChapterError, ChapterLayout, DetectedChapter, LayoutKind,
};
use quick_xml::events::Event;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// One normalized page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpec {
    pub name: String,
    /// Raw `Contents.swift` bytes, copied through untouched.
    pub content: Vec<u8>,
    pub sources: BTreeSet<PathBuf>,
    pub resources: BTreeSet<PathBuf>,
}

/// A chapter normalized to pages. `pages` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedChapter {
    pub layout: LayoutKind,
    pub pages: Vec<PageSpec>,
    /// Chapter-level sources, kept apart from each page's own set.
    pub sources: BTreeSet<PathBuf>,
    pub resources: BTreeSet<PathBuf>,
}

impl ParsedChapter {
    pub fn page_names(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.name.as_str()).collect()
    }

    /// Serializable inventory used by `check --json`.
    ///
    /// Asset names cover the chapter and all of its pages, flattened the same
    /// way collation flattens them into the chapter's `Sources/`/`Resources/`.
    pub fn summary(&self, id: &str) -> ChapterSummary {
        let page_sources = self.pages.iter().flat_map(|p| p.sources.iter());
        let page_resources = self.pages.iter().flat_map(|p| p.resources.iter());
        ChapterSummary {
            id: id.to_string(),
            layout: self.layout,
            pages: self.pages.iter().map(|p| p.name.clone()).collect(),
            sources: asset_names(self.sources.iter().chain(page_sources)),
            resources: asset_names(self.resources.iter().chain(page_resources)),
        }
    }
}

/// A manifest chapter identifier paired with its parsed chapter.
///
/// The driver keeps one ordered list of these rather than two parallel lists,
/// so the glossary's positional chapter references cannot drift.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookChapter {
    pub id: String,
    pub parsed: ParsedChapter,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChapterSummary {
    pub id: String,
    pub layout: LayoutKind,
    pub pages: Vec<String>,
    pub sources: Vec<String>,
    pub resources: Vec<String>,
}

/// Sorted, de-duplicated file names.
fn asset_names<'a>(paths: impl Iterator<Item = &'a PathBuf>) -> Vec<String> {
    paths
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Parse a detected chapter, dispatching once on its layout.
pub fn parse_chapter(
    detected: DetectedChapter,
    config: &RenderConfig,
) -> Result<ParsedChapter, ChapterError> {
    let DetectedChapter {
        id,
        layout,
        sources,
        resources,
        ..
    } = detected;

    match layout {
        ChapterLayout::SinglePage { contents } => {
            parse_single_page(&id, &contents, sources, resources)
        }
        ChapterLayout::MultiPage {
            table_of_contents,
            pages_dir,
        } => parse_multi_page(&table_of_contents, &pages_dir, sources, resources, config),
    }
}

/// Wrap a single `Contents.swift` as a one-page chapter named `chapter_id`.
pub fn parse_single_page(
    chapter_id: &str,
    contents: &Path,
    sources: BTreeSet<PathBuf>,
    resources: BTreeSet<PathBuf>,
) -> Result<ParsedChapter, ChapterError> {
    let content = fs::read(contents)?;
    Ok(ParsedChapter {
        layout: LayoutKind::SinglePage,
        pages: vec![PageSpec {
            name: chapter_id.to_string(),
            content,
            sources,
            resources,
        }],
        sources: BTreeSet::new(),
        resources: BTreeSet::new(),
    })
}

/// Read every page named by the table of contents, in its order.
///
/// A named page whose directory is missing aborts with
/// [`ChapterError::PageNotFound`]; pages are never skipped.
pub fn parse_multi_page(
    table_of_contents: &Path,
    pages_dir: &Path,
    sources: BTreeSet<PathBuf>,
    resources: BTreeSet<PathBuf>,
    config: &RenderConfig,
) -> Result<ParsedChapter, ChapterError> {
    let xml = fs::read(table_of_contents)?;
    let names = parse_table_of_contents(&xml).map_err(|message| {
        ChapterError::TableOfContents {
            path: table_of_contents.to_path_buf(),
            message,
        }
    })?;

    if names.is_empty() {
        return Err(ChapterError::EmptyTableOfContents(
            table_of_contents.to_path_buf(),
        ));
    }

    let mut seen = HashSet::new();
    let mut pages = Vec::with_capacity(names.len());
    for name in names {
        if !is_plain_page_name(&name) {
            return Err(ChapterError::InvalidPageName(name));
        }
        if !seen.insert(name.clone()) {
            return Err(ChapterError::DuplicatePage(name));
        }
        pages.push(read_page(pages_dir, name, config)?);
    }

    Ok(ParsedChapter {
        layout: LayoutKind::MultiPage,
        pages,
        sources,
        resources,
    })
}

/// Page names become single path components under `Pages/` and the output.
fn is_plain_page_name(name: &str) -> bool {
    name != "." && name != ".." && !name.contains('/') && !name.contains('\\')
}

fn read_page(pages_dir: &Path, name: String, config: &RenderConfig) -> Result<PageSpec, ChapterError> {
    let page_dir = pages_dir.join(format!("{name}.xcplaygroundpage"));
    if !page_dir.is_dir() {
        return Err(ChapterError::PageNotFound {
            page: name,
            path: page_dir,
        });
    }

    let contents = page_dir.join(CONTENTS_FILE);
    if !contents.is_file() {
        return Err(ChapterError::MissingPageContents {
            page: name,
            path: contents,
        });
    }

    Ok(PageSpec {
        content: fs::read(&contents)?,
        sources: layout::list_sources(&page_dir, &config.source_extension)?,
        resources: layout::list_resources(&page_dir)?,
        name,
    })
}

/// Extract page names from `contents.xcplayground`, in document order.
///
/// ```xml
/// <playground version='6.0' target-platform='ios'>
///     <pages>
///         <page name='While'/>
///         <page name='For'/>
///     </pages>
/// </playground>
/// ```
pub fn parse_table_of_contents(content: &[u8]) -> Result<Vec<String>, String> {
    let mut reader = quick_xml::reader::Reader::from_reader(content);
    reader.config_mut().trim_text(true);

    let mut names = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.name().as_ref() == b"page" => {
                let mut name = None;
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"name" {
                        let raw = reader
                            .decoder()
                            .decode(&attr.value)
                            .map_err(|e| format!("undecodable page name: {e}"))?;
                        let value = quick_xml::escape::unescape(&raw)
                            .map_err(|e| format!("bad escape in page name: {e}"))?;
                        name = Some(value.into_owned());
                    }
                }
                match name {
                    Some(n) if !n.trim().is_empty() => names.push(n),
                    _ => return Err("<page> element without a name".to_string()),
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(format!(
                    "XML error at position {}: {e}",
                    reader.buffer_position()
                ));
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(names)
}
