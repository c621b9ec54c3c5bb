//! Asset aggregation and file copying.
//!
//! Shared sources live in a package area next to the manifest:
//!
//! ```text
//! Packages/
//! ├── Geometry/Sources/Vector.swift
//! └── Drawing/Sources/Canvas.swift
//! ```
//!
//! Every shared source is copied into each chapter's `Sources/` and into the
//! book's `Contents/Sources/`. Files are matched by name and overwritten, so a
//! rerun against populated directories changes nothing. Resources are never
//! taken from the package area; the book-level resource directory goes to
//! `Contents/Resources/` only.
//!
//! [`ensure_dir`] is the one place destination directories get created.

use crate::config::RenderConfig;
use crate::layout::SOURCES_DIR;
use crate::parse::ParsedChapter;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Create `path` (and parents) if absent. Existing directories are reused as is.
pub fn ensure_dir(path: &Path) -> io::Result<&Path> {
    if !path.is_dir() {
        fs::create_dir_all(path)?;
    }
    Ok(path)
}

/// Copy a file or directory into `dest_dir`, keeping its name and replacing
/// whatever is already there under that name.
pub fn copy_into(entry: &Path, dest_dir: &Path) -> io::Result<PathBuf> {
    let name = entry.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("cannot copy {}: no file name", entry.display()),
        )
    })?;
    let target = dest_dir.join(name);
    if entry.is_dir() {
        ensure_dir(&target)?;
        copy_dir_recursive(entry, &target)?;
    } else {
        fs::copy(entry, &target)?;
    }
    tracing::debug!(from = %entry.display(), to = %target.display(), "copied");
    Ok(target)
}

pub fn copy_dir_recursive(src: &Path, dst: &Path) -> io::Result<()> {
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            ensure_dir(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Every `<packages_dir>/**/Sources/*.<source_extension>` file, sorted.
///
/// A missing package area yields an empty list.
pub fn shared_sources(base_dir: &Path, config: &RenderConfig) -> io::Result<Vec<PathBuf>> {
    let packages = base_dir.join(&config.packages_dir);
    if !packages.is_dir() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    for entry in WalkDir::new(&packages).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        let in_sources = path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n == SOURCES_DIR)
            .unwrap_or(false);
        let matches_ext = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case(&config.source_extension))
            .unwrap_or(false);
        if entry.file_type().is_file() && in_sources && matches_ext {
            found.push(path.to_path_buf());
        }
    }
    tracing::debug!(count = found.len(), dir = %packages.display(), "found shared sources");
    Ok(found)
}

/// Merge shared sources into a chapter.
///
/// Each file is copied into `<chapter_dir>/Sources/`, overwriting a same-named
/// file, and replaces any same-named entry of the chapter-level source set
/// with the copied path. Same-named page sources are dropped, so the package
/// copy is the one collation writes.
pub fn aggregate_chapter_sources(
    chapter_dir: &Path,
    chapter: &mut ParsedChapter,
    shared: &[PathBuf],
) -> io::Result<()> {
    if shared.is_empty() {
        return Ok(());
    }
    let sources_dir = chapter_dir.join(SOURCES_DIR);
    ensure_dir(&sources_dir)?;

    for source in shared {
        let copied = copy_into(source, &sources_dir)?;
        for page in &mut chapter.pages {
            page.sources
                .retain(|existing| existing.file_name() != copied.file_name());
        }
        replace_by_name(&mut chapter.sources, copied);
    }
    Ok(())
}

fn replace_by_name(set: &mut BTreeSet<PathBuf>, path: PathBuf) {
    set.retain(|existing| existing.file_name() != path.file_name());
    set.insert(path);
}

/// Copy shared sources into the book's `Contents/Sources`.
pub fn copy_shared_sources(shared: &[PathBuf], dest_dir: &Path) -> io::Result<usize> {
    ensure_dir(dest_dir)?;
    for source in shared {
        copy_into(source, dest_dir)?;
    }
    Ok(shared.len())
}

/// Copy every entry of the book-level resource directory into `dest_dir`.
///
/// Returns the number of top-level entries copied. A missing directory is
/// logged and skipped.
pub fn copy_book_resources(resource_dir: &Path, dest_dir: &Path) -> io::Result<usize> {
    ensure_dir(dest_dir)?;
    if !resource_dir.is_dir() {
        tracing::warn!(dir = %resource_dir.display(), "book resource directory not found");
        return Ok(0);
    }

    let mut entries = Vec::new();
    for entry in fs::read_dir(resource_dir)? {
        let path = entry?.path();
        let hidden = path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with('.'))
            .unwrap_or(true);
        if !hidden {
            entries.push(path);
        }
    }
    entries.sort();

    for entry in &entries {
        copy_into(entry, dest_dir)?;
    }
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutKind, chapter_dir};
    use crate::parse::PageSpec;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn empty_chapter() -> ParsedChapter {
        ParsedChapter {
            layout: LayoutKind::SinglePage,
            pages: vec![PageSpec {
                name: "Intro".into(),
                content: Vec::new(),
                sources: BTreeSet::new(),
                resources: BTreeSet::new(),
            }],
            sources: BTreeSet::new(),
            resources: BTreeSet::new(),
        }
    }

    #[test]
    fn ensure_dir_reuses_existing_directory() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("Contents/Resources");
        ensure_dir(&dir).unwrap();
        write_file(&dir.join("keep.txt"), "keep");

        ensure_dir(&dir).unwrap();
        assert_eq!(fs::read_to_string(dir.join("keep.txt")).unwrap(), "keep");
    }

    #[test]
    fn shared_sources_found_in_nested_packages() {
        let tmp = TempDir::new().unwrap();
        write_file(&tmp.path().join("Packages/Geo/Sources/Vector.swift"), "v");
        write_file(&tmp.path().join("Packages/Deep/Kit/Sources/Canvas.swift"), "c");
        write_file(&tmp.path().join("Packages/Geo/Sources/README.md"), "no");
        write_file(&tmp.path().join("Packages/Geo/Tests/VectorTests.swift"), "no");

        let shared = shared_sources(tmp.path(), &RenderConfig::default()).unwrap();
        let mut names: Vec<String> = shared
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["Canvas.swift", "Vector.swift"]);
    }

    #[test]
    fn missing_package_area_is_empty() {
        let tmp = TempDir::new().unwrap();
        let shared = shared_sources(tmp.path(), &RenderConfig::default()).unwrap();
        assert!(shared.is_empty());
    }

    #[test]
    fn shared_source_overwrites_same_named_chapter_source() {
        let tmp = TempDir::new().unwrap();
        let dir = write_single_page_chapter(tmp.path(), "Intro", "");
        write_file(&dir.join("Sources/Shared.swift"), "old chapter copy");
        write_file(&tmp.path().join("Packages/Kit/Sources/Shared.swift"), "package copy");

        let shared = shared_sources(tmp.path(), &RenderConfig::default()).unwrap();
        let mut chapter = empty_chapter();
        chapter.sources.insert(dir.join("Sources/Shared.swift"));

        aggregate_chapter_sources(&dir, &mut chapter, &shared).unwrap();

        let on_disk = dir_file_names(&dir.join("Sources"));
        assert_eq!(on_disk, vec!["Shared.swift"]);
        assert_eq!(
            fs::read_to_string(dir.join("Sources/Shared.swift")).unwrap(),
            "package copy"
        );
        assert_eq!(file_names(&chapter.sources), vec!["Shared.swift"]);
    }

    #[test]
    fn shared_source_supersedes_same_named_page_source() {
        let tmp = TempDir::new().unwrap();
        let dir = write_multi_page_chapter(tmp.path(), "Loops", &[("While", "")]);
        let page_source = dir.join("Pages/While.xcplaygroundpage/Sources/Shared.swift");
        let page_helper = dir.join("Pages/While.xcplaygroundpage/Sources/Helper.swift");
        write_file(&page_source, "// page copy\n");
        write_file(&page_helper, "// helper\n");
        write_file(&tmp.path().join("Packages/Kit/Sources/Shared.swift"), "// package copy\n");

        let shared = shared_sources(tmp.path(), &RenderConfig::default()).unwrap();
        let mut chapter = empty_chapter();
        chapter.pages[0].sources.insert(page_source);
        chapter.pages[0].sources.insert(page_helper.clone());

        aggregate_chapter_sources(&dir, &mut chapter, &shared).unwrap();

        assert_eq!(chapter.pages[0].sources, BTreeSet::from([page_helper]));
        assert_eq!(file_names(&chapter.sources), vec!["Shared.swift"]);
        let collated = crate::collate::collate(
            "Loops",
            &chapter,
            &[],
            &tmp.path().join("out"),
            &RenderConfig::default(),
        )
        .unwrap();
        assert_eq!(
            fs::read_to_string(collated.dir.join("Sources/Shared.swift")).unwrap(),
            "// package copy\n"
        );
        assert!(collated.dir.join("Sources/Helper.swift").is_file());
    }

    #[test]
    fn aggregation_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let dir = write_single_page_chapter(tmp.path(), "Intro", "");
        write_file(&tmp.path().join("Packages/Kit/Sources/A.swift"), "a");
        write_file(&tmp.path().join("Packages/Kit/Sources/B.swift"), "b");
        let shared = shared_sources(tmp.path(), &RenderConfig::default()).unwrap();

        let mut first = empty_chapter();
        aggregate_chapter_sources(&dir, &mut first, &shared).unwrap();
        let mut second = empty_chapter();
        aggregate_chapter_sources(&dir, &mut second, &shared).unwrap();

        assert_eq!(first.sources, second.sources);
        assert_eq!(dir_file_names(&dir.join("Sources")), vec!["A.swift", "B.swift"]);
    }

    #[test]
    fn aggregation_creates_missing_sources_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = chapter_dir(tmp.path(), "Bare");
        write_file(&dir.join("Contents.swift"), "");
        write_file(&tmp.path().join("Packages/Kit/Sources/A.swift"), "a");
        let shared = shared_sources(tmp.path(), &RenderConfig::default()).unwrap();

        let mut chapter = empty_chapter();
        aggregate_chapter_sources(&dir, &mut chapter, &shared).unwrap();
        assert!(dir.join("Sources/A.swift").is_file());
    }

    #[test]
    fn book_resources_copied_recursively() {
        let tmp = TempDir::new().unwrap();
        let assets = tmp.path().join("Assets");
        write_file(&assets.join("cover.png"), "png");
        write_file(&assets.join("Scenes.scnassets/ship.scn"), "scn");
        write_file(&assets.join(".DS_Store"), "junk");
        let dest = tmp.path().join("out/Contents/Resources");

        let copied = copy_book_resources(&assets, &dest).unwrap();
        assert_eq!(copied, 2);
        assert!(dest.join("cover.png").is_file());
        assert!(dest.join("Scenes.scnassets/ship.scn").is_file());
        assert!(!dest.join(".DS_Store").exists());
    }

    #[test]
    fn missing_book_resources_still_creates_destination() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("Contents/Resources");
        let copied = copy_book_resources(&tmp.path().join("Nope"), &dest).unwrap();
        assert_eq!(copied, 0);
        assert!(dest.is_dir());
    }
}
