//! The render pipeline.
//!
//! ```text
//! book.yml ─▶ load BookSpec
//!          ─▶ per chapter, in manifest order:
//!                detect layout ─▶ parse pages ─▶ merge shared sources
//!          ─▶ <Name>.playgroundbook/Contents/{Resources,Sources,Chapters}
//!          ─▶ Contents/Manifest.plist
//!          ─▶ collate each chapter, in manifest order
//!          ─▶ Glossary.plist (only when the manifest has a glossary)
//! ```
//!
//! Every chapter is parsed before anything is written to the bundle, and the
//! first failure aborts the run naming the chapter. An aborted run can still
//! leave a partially populated bundle or chapter `Sources/` behind; callers
//! must treat it as having produced nothing.
//!
//! Paths in the manifest (chapters, `resources`, the package area) are
//! resolved against the manifest's directory.

use crate::assets::{self, ensure_dir};
use crate::book::{BookSpec, ManifestLoadError};
use crate::collate::collate;
use crate::config::{ConfigError, RenderConfig};
use crate::contents::{ContentsWriter, PlistContentsWriter};
use crate::glossary::{GlossaryWriter, PlistGlossaryWriter};
use crate::layout::{self, ChapterError, LayoutKind, RESOURCES_DIR, SOURCES_DIR};
use crate::parse::{self, BookChapter};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONTENTS_DIR: &str = "Contents";
pub const CHAPTERS_DIR: &str = "Chapters";

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    ManifestLoad(#[from] ManifestLoadError),
    #[error("chapter '{chapter}': {source}")]
    Chapter {
        chapter: String,
        #[source]
        source: ChapterError,
    },
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    fn chapter(chapter: &str) -> impl FnOnce(ChapterError) -> RenderError + '_ {
        move |source| RenderError::Chapter {
            chapter: chapter.to_string(),
            source,
        }
    }
}

/// What a render produced, for CLI output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReport {
    pub book_name: String,
    pub book_dir: PathBuf,
    pub imports: Vec<String>,
    pub chapters: Vec<ChapterReport>,
    pub shared_sources: usize,
    pub book_resources: usize,
    pub glossary: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterReport {
    pub id: String,
    pub layout: LayoutKind,
    pub pages: Vec<String>,
    pub dir: PathBuf,
}

/// Directory the manifest's relative paths are resolved against.
pub fn base_dir(manifest_path: &Path) -> PathBuf {
    match manifest_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Render the book declared at `manifest_path` into `output_dir`.
pub fn render(
    manifest_path: &Path,
    output_dir: &Path,
    config: &RenderConfig,
) -> Result<RenderReport, RenderError> {
    render_with(
        &PlistContentsWriter::new(config),
        &PlistGlossaryWriter,
        manifest_path,
        output_dir,
        config,
    )
}

/// Render using specific manifest and glossary writers (allows testing with mocks).
pub fn render_with(
    contents_writer: &impl ContentsWriter,
    glossary_writer: &impl GlossaryWriter,
    manifest_path: &Path,
    output_dir: &Path,
    config: &RenderConfig,
) -> Result<RenderReport, RenderError> {
    let book = BookSpec::load(manifest_path)?;
    let base = base_dir(manifest_path);
    tracing::info!(book = %book.name, chapters = book.chapters.len(), "rendering");

    let shared = assets::shared_sources(&base, config)?;

    let mut chapters = Vec::with_capacity(book.chapters.len());
    for id in &book.chapters {
        let detected = layout::detect(id, &base, config).map_err(RenderError::chapter(id))?;
        let chapter_dir = detected.dir.clone();
        let mut parsed = parse::parse_chapter(detected, config).map_err(RenderError::chapter(id))?;
        assets::aggregate_chapter_sources(&chapter_dir, &mut parsed, &shared)
            .map_err(|e| RenderError::chapter(id)(ChapterError::Io(e)))?;
        tracing::info!(chapter = %id, pages = parsed.pages.len(), "parsed chapter");
        chapters.push(BookChapter {
            id: id.clone(),
            parsed,
        });
    }

    let book_dir = output_dir.join(book.bundle_dir_name());
    let contents_dir = book_dir.join(CONTENTS_DIR);
    ensure_dir(&contents_dir)?;

    let shared_sources = assets::copy_shared_sources(&shared, &contents_dir.join(SOURCES_DIR))?;
    let resources_dir = contents_dir.join(RESOURCES_DIR);
    let book_resources = match &book.resources {
        Some(dir) if !dir.as_os_str().is_empty() => {
            tracing::info!(dir = %dir.display(), "copying book resources");
            assets::copy_book_resources(&base.join(dir), &resources_dir)?
        }
        _ => {
            ensure_dir(&resources_dir)?;
            0
        }
    };

    contents_writer.write(&book, &contents_dir)?;

    let imports = book.resolve_imports(&config.default_imports);
    let chapters_dir = contents_dir.join(CHAPTERS_DIR);
    ensure_dir(&chapters_dir)?;
    let mut reports = Vec::with_capacity(chapters.len());
    for chapter in &chapters {
        let collated = collate(&chapter.id, &chapter.parsed, &imports, &chapters_dir, config)
            .map_err(|e| RenderError::chapter(&chapter.id)(ChapterError::Io(e)))?;
        reports.push(ChapterReport {
            id: chapter.id.clone(),
            layout: chapter.parsed.layout,
            pages: chapter.parsed.pages.iter().map(|p| p.name.clone()).collect(),
            dir: collated.dir,
        });
    }

    let glossary = match &book.glossary {
        Some(terms) => {
            glossary_writer.write(&chapters, terms, &book_dir)?;
            Some(book_dir.join(crate::glossary::GLOSSARY_FILE))
        }
        None => None,
    };

    Ok(RenderReport {
        book_name: book.name,
        book_dir,
        imports,
        chapters: reports,
        shared_sources,
        book_resources,
        glossary,
    })
}

/// Load the manifest and parse every chapter without writing anything.
pub fn check(
    manifest_path: &Path,
    config: &RenderConfig,
) -> Result<(BookSpec, Vec<BookChapter>), RenderError> {
    let book = BookSpec::load(manifest_path)?;
    let base = base_dir(manifest_path);

    let mut chapters = Vec::with_capacity(book.chapters.len());
    for id in &book.chapters {
        let detected = layout::detect(id, &base, config).map_err(RenderError::chapter(id))?;
        let parsed = parse::parse_chapter(detected, config).map_err(RenderError::chapter(id))?;
        chapters.push(BookChapter {
            id: id.clone(),
            parsed,
        });
    }
    Ok((book, chapters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::GlossaryConfig;
    use crate::test_helpers::*;
    use std::cell::RefCell;
    use std::fs;
    use std::io;
    use tempfile::TempDir;

    /// Records what the pipeline hands to the external writers.
    #[derive(Default)]
    struct RecordingWriters {
        contents: RefCell<Vec<BookSpec>>,
        glossary: RefCell<Vec<(Vec<String>, Vec<Vec<String>>, GlossaryConfig)>>,
    }

    impl ContentsWriter for RecordingWriters {
        fn write(&self, book: &BookSpec, _contents_dir: &Path) -> io::Result<()> {
            self.contents.borrow_mut().push(book.clone());
            Ok(())
        }
    }

    impl GlossaryWriter for RecordingWriters {
        fn write(
            &self,
            chapters: &[BookChapter],
            glossary: &GlossaryConfig,
            _book_dir: &Path,
        ) -> io::Result<()> {
            let ids = chapters.iter().map(|c| c.id.clone()).collect();
            let pages = chapters
                .iter()
                .map(|c| c.parsed.pages.iter().map(|p| p.name.clone()).collect())
                .collect();
            self.glossary
                .borrow_mut()
                .push((ids, pages, glossary.clone()));
            Ok(())
        }
    }

    #[test]
    fn base_dir_of_bare_file_name_is_cwd() {
        assert_eq!(base_dir(Path::new("book.yml")), PathBuf::from("."));
        assert_eq!(base_dir(Path::new("books/a/book.yml")), PathBuf::from("books/a"));
    }

    #[test]
    fn glossary_receives_chapters_aligned_with_manifest() {
        let tmp = TempDir::new().unwrap();
        write_multi_page_chapter(tmp.path(), "Beta", &[("B2", ""), ("B1", "")]);
        write_single_page_chapter(tmp.path(), "Alpha", "");
        write_single_page_chapter(tmp.path(), "Gamma", "");
        let manifest = write_manifest(
            tmp.path(),
            "name: Sample\nchapters: [Gamma, Beta, Alpha]\nglossary:\n  loop: repeats\n",
        );

        let writers = RecordingWriters::default();
        render_with(&writers, &writers, &manifest, tmp.path(), &RenderConfig::default()).unwrap();

        let glossary = writers.glossary.borrow();
        assert_eq!(glossary.len(), 1);
        let (ids, pages, terms) = &glossary[0];
        assert_eq!(ids, &vec!["Gamma", "Beta", "Alpha"]);
        assert_eq!(
            pages,
            &vec![vec!["Gamma"], vec!["B2", "B1"], vec!["Alpha"]]
        );
        assert_eq!(terms["loop"], "repeats");
    }

    #[test]
    fn glossary_writer_skipped_without_config() {
        let tmp = TempDir::new().unwrap();
        write_single_page_chapter(tmp.path(), "Intro", "");
        let manifest = write_manifest(tmp.path(), "name: Sample\nchapters: [Intro]\n");

        let writers = RecordingWriters::default();
        let report =
            render_with(&writers, &writers, &manifest, tmp.path(), &RenderConfig::default())
                .unwrap();

        assert!(writers.glossary.borrow().is_empty());
        assert!(report.glossary.is_none());
        assert_eq!(writers.contents.borrow().len(), 1);
        assert_eq!(writers.contents.borrow()[0].name, "Sample");
    }

    #[test]
    fn missing_layout_names_chapter_and_stops() {
        let tmp = TempDir::new().unwrap();
        write_single_page_chapter(tmp.path(), "First", "");
        fs::create_dir_all(tmp.path().join("Broken.playground")).unwrap();
        write_single_page_chapter(tmp.path(), "Last", "");
        write_file(&tmp.path().join("Packages/Kit/Sources/Shared.swift"), "shared");
        let manifest =
            write_manifest(tmp.path(), "name: Sample\nchapters: [First, Broken, Last]\n");

        let writers = RecordingWriters::default();
        let err = render_with(&writers, &writers, &manifest, tmp.path(), &RenderConfig::default())
            .unwrap_err();

        match err {
            RenderError::Chapter { chapter, source } => {
                assert_eq!(chapter, "Broken");
                assert!(matches!(source, ChapterError::MissingLayout(_)));
            }
            other => panic!("expected chapter error, got {other:?}"),
        }
        assert!(writers.contents.borrow().is_empty());
        assert!(!tmp.path().join("Sample.playgroundbook").exists());
        // Chapters after the failing one are never touched.
        assert!(!tmp.path().join("Last.playground/Sources/Shared.swift").exists());
    }

    #[test]
    fn collation_failure_names_chapter() {
        let tmp = TempDir::new().unwrap();
        write_single_page_chapter(tmp.path(), "Intro", "");
        let manifest = write_manifest(tmp.path(), "name: Sample\nchapters: [Intro]\n");
        // A plain file where the chapter's output directory belongs.
        write_file(
            &tmp.path().join("Sample.playgroundbook/Contents/Chapters/Intro"),
            "in the way",
        );

        let err = render(&manifest, tmp.path(), &RenderConfig::default()).unwrap_err();
        match err {
            RenderError::Chapter { chapter, source } => {
                assert_eq!(chapter, "Intro");
                assert!(matches!(source, ChapterError::Io(_)));
            }
            other => panic!("expected chapter error, got {other:?}"),
        }
    }

    #[test]
    fn manifest_errors_surface_as_manifest_load() {
        let tmp = TempDir::new().unwrap();
        let manifest = write_manifest(tmp.path(), "name: [unterminated\n");
        let result = render(&manifest, tmp.path(), &RenderConfig::default());
        assert!(matches!(result, Err(RenderError::ManifestLoad(_))));
    }

    #[test]
    fn configured_default_imports_apply_without_manifest_imports() {
        let tmp = TempDir::new().unwrap();
        write_single_page_chapter(tmp.path(), "Intro", "");
        let manifest = write_manifest(tmp.path(), "name: Sample\nchapters: [Intro]\n");
        let config = RenderConfig {
            default_imports: vec!["SpriteKit".into()],
            ..RenderConfig::default()
        };

        let report = render(&manifest, tmp.path(), &config).unwrap();
        assert_eq!(report.imports, vec!["SpriteKit"]);
    }

    #[test]
    fn check_parses_without_writing() {
        let tmp = TempDir::new().unwrap();
        write_single_page_chapter(tmp.path(), "Intro", "");
        write_file(&tmp.path().join("Packages/Kit/Sources/Shared.swift"), "shared");
        let manifest = write_manifest(tmp.path(), "name: Sample\nchapters: [Intro]\n");

        let (book, chapters) = check(&manifest, &RenderConfig::default()).unwrap();
        assert_eq!(book.name, "Sample");
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].id, "Intro");
        assert!(!tmp.path().join("Sample.playgroundbook").exists());
        assert!(!tmp.path().join("Intro.playground/Sources/Shared.swift").exists());
    }
}
