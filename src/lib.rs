//! # playgroundbook
//!
//! Renders a Swift Playground book (`<Name>.playgroundbook`) from a YAML book
//! manifest and a directory of ordinary Xcode playgrounds, one per chapter.
//!
//! # Architecture: Normalize, Then Collate
//!
//! Chapters come in two incompatible layouts: a single-page playground with
//! one `Contents.swift`, or a multi-page playground whose
//! `contents.xcplayground` lists pages under `Pages/`. Every chapter is first
//! normalized into the same in-memory form, a [`parse::ParsedChapter`], and
//! only then written out:
//!
//! ```text
//! 1. Detect    Intro.playground  →  ChapterLayout     (which layout?)
//! 2. Parse     ChapterLayout     →  ParsedChapter     (ordered pages + assets)
//! 3. Aggregate Packages/**/Sources → chapter Sources  (shared code, by name)
//! 4. Collate   ParsedChapter     →  Contents/Chapters/Intro/
//! ```
//!
//! All chapters are parsed before the bundle is touched, so a broken chapter
//! fails the run before any collation happens.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`book`] | YAML book manifest loading, validation, import resolution |
//! | [`layout`] | Chapter layout detection and chapter-level asset listing |
//! | [`parse`] | Normalization of either layout into a `ParsedChapter` |
//! | [`assets`] | Shared-source aggregation, book resources, idempotent `ensure_dir` |
//! | [`collate`] | Writing one chapter, its pages, and their import headers |
//! | [`contents`] | The book's `Contents/Manifest.plist` |
//! | [`glossary`] | `Glossary.plist` with definitions and first uses |
//! | [`plist`] | Minimal XML property-list writer |
//! | [`render`] | The pipeline driver tying the stages together |
//! | [`config`] | `playgroundbook.toml` loading, merging, and validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Order Is Positional
//!
//! Chapter numbering and the glossary's page references depend on manifest
//! order, and page order depends on the table of contents, never on directory
//! listing order. The driver carries chapters as one ordered list of
//! [`parse::BookChapter`] pairs instead of parallel lists of identifiers and
//! parsed chapters.
//!
//! ## Safe Reruns
//!
//! Rendering twice into the same output produces the same bytes. Destination
//! directories go through [`assets::ensure_dir`], files are overwritten by
//! name, and plist keys are written in a fixed order.
//!
//! ## Imports Replace, Never Merge
//!
//! A manifest `imports` list replaces the default (`UIKit`) outright, and
//! `imports: []` is an explicit request for no imports at all.

pub mod assets;
pub mod book;
pub mod collate;
pub mod config;
pub mod contents;
pub mod glossary;
pub mod layout;
pub mod output;
pub mod parse;
pub mod plist;
pub mod render;

#[cfg(test)]
pub(crate) mod test_helpers;
