//! Book glossary.
//!
//! Pages link glossary terms with `glossary://` URLs in their markup comments,
//! e.g. `[loops](glossary://loop)` or `glossary://for%20loop`. The glossary
//! records each configured term's definition plus the first page, in book
//! order, that links it:
//!
//! ```text
//! Glossary.plist
//! └── Terms
//!     └── loop
//!         ├── Definition: "Code that repeats."
//!         └── FirstUse
//!             ├── PageReference: "Loops/While"
//!             └── Title: "While"
//! ```
//!
//! Terms nobody links get a definition and no `FirstUse`.

use crate::book::GlossaryConfig;
use crate::parse::BookChapter;
use crate::plist::{Plist, write_plist};
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::io;
use std::path::Path;

pub const GLOSSARY_FILE: &str = "Glossary.plist";
const LINK_SCHEME: &str = "glossary://";

/// Writes the glossary for a fully parsed book.
///
/// `chapters` is in manifest order; positions matter for `FirstUse`.
pub trait GlossaryWriter {
    fn write(
        &self,
        chapters: &[BookChapter],
        glossary: &GlossaryConfig,
        book_dir: &Path,
    ) -> io::Result<()>;
}

/// Production writer producing `Glossary.plist` at the top of the bundle.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlistGlossaryWriter;

impl GlossaryWriter for PlistGlossaryWriter {
    fn write(
        &self,
        chapters: &[BookChapter],
        glossary: &GlossaryConfig,
        book_dir: &Path,
    ) -> io::Result<()> {
        tracing::info!(terms = glossary.len(), "writing glossary");
        write_plist(&book_dir.join(GLOSSARY_FILE), &glossary_plist(chapters, glossary))
    }
}

/// Where a term is first linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstUse {
    pub chapter: String,
    pub page: String,
}

impl FirstUse {
    pub fn page_reference(&self) -> String {
        format!("{}/{}", self.chapter, self.page)
    }
}

/// First page linking each term, walking chapters and pages in order.
pub fn first_uses(chapters: &[BookChapter]) -> HashMap<String, FirstUse> {
    let mut uses = HashMap::new();
    for chapter in chapters {
        for page in &chapter.parsed.pages {
            let text = String::from_utf8_lossy(&page.content);
            for term in linked_terms(&text) {
                uses.entry(term).or_insert_with(|| FirstUse {
                    chapter: chapter.id.clone(),
                    page: page.name.clone(),
                });
            }
        }
    }
    uses
}

/// Percent-decoded targets of every `glossary://` link in `text`.
pub fn linked_terms(text: &str) -> Vec<String> {
    text.match_indices(LINK_SCHEME)
        .filter_map(|(start, _)| {
            let rest = &text[start + LINK_SCHEME.len()..];
            let end = rest
                .find(|c: char| c == ')' || c == '"' || c == '\'' || c.is_whitespace())
                .unwrap_or(rest.len());
            let raw = &rest[..end];
            if raw.is_empty() {
                return None;
            }
            Some(percent_decode_str(raw).decode_utf8_lossy().into_owned())
        })
        .collect()
}

pub fn glossary_plist(chapters: &[BookChapter], glossary: &GlossaryConfig) -> Plist {
    let uses = first_uses(chapters);
    let terms = glossary
        .iter()
        .map(|(term, definition)| {
            let mut entry = vec![("Definition".to_string(), Plist::string(definition))];
            if let Some(first) = uses.get(term) {
                entry.push((
                    "FirstUse".to_string(),
                    Plist::Dict(vec![
                        (
                            "PageReference".to_string(),
                            Plist::string(first.page_reference()),
                        ),
                        ("Title".to_string(), Plist::string(&first.page)),
                    ]),
                ));
            } else {
                tracing::warn!(term = %term, "glossary term is never linked");
            }
            (term.clone(), Plist::Dict(entry))
        })
        .collect();
    Plist::Dict(vec![("Terms".to_string(), Plist::Dict(terms))])
}
