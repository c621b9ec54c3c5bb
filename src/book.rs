//! Book manifest loading.
//!
//! A book is declared in a YAML manifest next to its chapter playgrounds:
//!
//! ```yaml
//! name: Sample
//! chapters:
//!   - Intro          # reads Intro.playground
//!   - Loops
//! resources: Assets  # optional, copied into Contents/Resources
//! imports:           # optional, replaces the default import list
//!   - Foundation
//! glossary:          # optional, term -> definition
//!   loop: A block of code that repeats.
//! ```
//!
//! `identifier`, `deployment_target`, and `cover` are also accepted and end up
//! in the book's `Contents/Manifest.plist`. Unknown keys are rejected.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Glossary terms mapped to their definitions.
pub type GlossaryConfig = BTreeMap<String, String>;

#[derive(Error, Debug)]
pub enum ManifestLoadError {
    #[error("cannot read book manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed book manifest: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid book manifest: {0}")]
    Invalid(String),
}

/// The parsed book manifest. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookSpec {
    pub name: String,
    /// Chapter identifiers in output order. `Intro` is read from `Intro.playground`.
    pub chapters: Vec<String>,
    /// Book-level resource directory, relative to the manifest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<PathBuf>,
    /// `None` when the key is absent or null; `Some(vec![])` is an explicit "no imports".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imports: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub glossary: Option<GlossaryConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_target: Option<String>,
    /// Cover image file name inside the book resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}

impl BookSpec {
    /// Parse and validate a manifest from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, ManifestLoadError> {
        let book: BookSpec = serde_yaml::from_str(text)?;
        book.validate()?;
        Ok(book)
    }

    /// Read, parse, and validate the manifest at `path`.
    pub fn load(path: &Path) -> Result<Self, ManifestLoadError> {
        let text = fs::read_to_string(path).map_err(|source| ManifestLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    fn validate(&self) -> Result<(), ManifestLoadError> {
        if self.name.trim().is_empty() {
            return Err(ManifestLoadError::Invalid("name must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for chapter in &self.chapters {
            if chapter.trim().is_empty() {
                return Err(ManifestLoadError::Invalid(
                    "chapter identifiers must not be empty".into(),
                ));
            }
            if chapter.contains('/') || chapter.contains('\\') {
                return Err(ManifestLoadError::Invalid(format!(
                    "chapter identifier '{chapter}' must not contain path separators"
                )));
            }
            if !seen.insert(chapter.as_str()) {
                return Err(ManifestLoadError::Invalid(format!(
                    "chapter '{chapter}' is listed more than once"
                )));
            }
        }
        if let Some(imports) = &self.imports
            && imports.iter().any(|i| i.trim().is_empty())
        {
            return Err(ManifestLoadError::Invalid(
                "imports must not contain empty names".into(),
            ));
        }
        Ok(())
    }

    /// The import list injected into every page.
    ///
    /// A manifest `imports` list replaces `default` outright; the two are
    /// never combined.
    pub fn resolve_imports(&self, default: &[String]) -> Vec<String> {
        match &self.imports {
            Some(imports) => imports.clone(),
            None => default.to_vec(),
        }
    }

    /// Output bundle directory name, e.g. `Sample.playgroundbook`.
    pub fn bundle_dir_name(&self) -> String {
        format!("{}.playgroundbook", self.name)
    }
}
