//! CLI output formatting.
//!
//! Output is information-first: every chapter leads with its positional index
//! and identifier, pages follow with their own index, and filesystem paths are
//! indented context lines.
//!
//! ## Check
//!
//! ```text
//! Sample
//! 001 Intro (single page)
//!     001 Intro
//! 002 Loops (2 pages)
//!     001 While
//!     002 For
//!     Sources: Shared.swift
//! ```
//!
//! ## Render
//!
//! ```text
//! 001 Intro → Sample.playgroundbook/Contents/Chapters/Intro
//!     001 Intro
//! 002 Loops → Sample.playgroundbook/Contents/Chapters/Loops
//!     001 While
//!     002 For
//!
//! Imports: Foundation
//! Shared sources: 1
//! Book resources: 3
//! Glossary: Sample.playgroundbook/Glossary.plist
//!
//! Rendered 2 chapters, 3 pages → Sample.playgroundbook
//! ```
//!
//! Each `format_*` function is pure and returns lines; the `print_*` wrappers
//! write them to stdout.

use crate::layout::LayoutKind;
use crate::parse::BookChapter;
use crate::render::RenderReport;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn layout_detail(layout: LayoutKind, pages: usize) -> String {
    match layout {
        LayoutKind::SinglePage => "single page".to_string(),
        LayoutKind::MultiPage if pages == 1 => "1 page".to_string(),
        LayoutKind::MultiPage => format!("{pages} pages"),
    }
}

/// Show `path` relative to `root` when possible.
fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn page_lines<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    names
        .enumerate()
        .map(|(i, name)| format!("    {} {}", format_index(i + 1), name))
        .collect()
}

/// Format the parsed-chapter inventory produced by `check`.
pub fn format_check_output(book_name: &str, chapters: &[BookChapter]) -> Vec<String> {
    let mut lines = vec![book_name.to_string()];
    for (i, chapter) in chapters.iter().enumerate() {
        let parsed = &chapter.parsed;
        lines.push(format!(
            "{} {} ({})",
            format_index(i + 1),
            chapter.id,
            layout_detail(parsed.layout, parsed.pages.len())
        ));
        lines.extend(page_lines(parsed.pages.iter().map(|p| p.name.as_str())));

        let sources = parsed.summary(&chapter.id).sources;
        if !sources.is_empty() {
            lines.push(format!("    Sources: {}", sources.join(", ")));
        }
    }
    lines
}

pub fn print_check_output(book_name: &str, chapters: &[BookChapter]) {
    for line in format_check_output(book_name, chapters) {
        println!("{}", line);
    }
}

/// Format the result of a full render. Paths are shown relative to `output_root`.
pub fn format_render_output(report: &RenderReport, output_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    let mut page_count = 0;

    for (i, chapter) in report.chapters.iter().enumerate() {
        page_count += chapter.pages.len();
        lines.push(format!(
            "{} {} → {}",
            format_index(i + 1),
            chapter.id,
            display_relative(&chapter.dir, output_root)
        ));
        lines.extend(page_lines(chapter.pages.iter().map(String::as_str)));
    }

    lines.push(String::new());
    if report.imports.is_empty() {
        lines.push("Imports: (none)".to_string());
    } else {
        lines.push(format!("Imports: {}", report.imports.join(", ")));
    }
    lines.push(format!("Shared sources: {}", report.shared_sources));
    lines.push(format!("Book resources: {}", report.book_resources));
    if let Some(glossary) = &report.glossary {
        lines.push(format!("Glossary: {}", display_relative(glossary, output_root)));
    }

    lines.push(String::new());
    let chapter_word = if report.chapters.len() == 1 { "chapter" } else { "chapters" };
    let page_word = if page_count == 1 { "page" } else { "pages" };
    lines.push(format!(
        "Rendered {} {}, {} {} → {}",
        report.chapters.len(),
        chapter_word,
        page_count,
        page_word,
        display_relative(&report.book_dir, output_root)
    ));
    lines
}

pub fn print_render_output(report: &RenderReport, output_root: &Path) {
    for line in format_render_output(report, output_root) {
        println!("{}", line);
    }
}
