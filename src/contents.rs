//! Book-level `Contents/Manifest.plist`.

use crate::book::BookSpec;
use crate::collate::MANIFEST_FILE;
use crate::config::RenderConfig;
use crate::plist::{Plist, write_plist};
use std::io;
use std::path::Path;

/// Writes the book manifest into `Contents/`.
pub trait ContentsWriter {
    fn write(&self, book: &BookSpec, contents_dir: &Path) -> io::Result<()>;
}

/// Production writer: an XML plist built from the book and render config.
#[derive(Debug, Clone)]
pub struct PlistContentsWriter {
    pub deployment_target: String,
    pub content_version: String,
}

impl PlistContentsWriter {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            deployment_target: config.book.deployment_target.clone(),
            content_version: config.book.content_version.clone(),
        }
    }

    pub fn manifest(&self, book: &BookSpec) -> Plist {
        let identifier = book
            .identifier
            .clone()
            .unwrap_or_else(|| default_identifier(&book.name));
        let deployment_target = book
            .deployment_target
            .clone()
            .unwrap_or_else(|| self.deployment_target.clone());

        let mut entries = vec![
            ("Chapters".to_string(), Plist::strings(book.chapters.iter().cloned())),
            ("ContentIdentifier".to_string(), Plist::string(identifier)),
            (
                "ContentVersion".to_string(),
                Plist::string(&self.content_version),
            ),
            ("DeploymentTarget".to_string(), Plist::string(deployment_target)),
        ];
        if let Some(cover) = &book.cover {
            entries.push(("ImageReference".to_string(), Plist::string(cover)));
        }
        entries.push(("Name".to_string(), Plist::string(&book.name)));
        entries.push(("Version".to_string(), Plist::string("1.0")));
        Plist::Dict(entries)
    }
}

impl ContentsWriter for PlistContentsWriter {
    fn write(&self, book: &BookSpec, contents_dir: &Path) -> io::Result<()> {
        tracing::info!(book = %book.name, "writing contents manifest");
        write_plist(&contents_dir.join(MANIFEST_FILE), &self.manifest(book))
    }
}

/// `com.playgroundbook.<name>` with anything but ASCII alphanumerics, `-`,
/// and `.` replaced by `-`.
pub fn default_identifier(name: &str) -> String {
    let slug: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("com.playgroundbook.{slug}")
}
