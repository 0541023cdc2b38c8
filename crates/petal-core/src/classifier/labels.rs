//! The label table mapping model output indices to class names.
//!
//! Labels live in a plain text file, one class per line, in model output
//! order. Blank lines and `#` comments are ignored. The table is checked
//! against the model's output length before any prediction is reported.

use std::path::Path;

use crate::error::PipelineError;

/// Labels for the bundled flower model.
const BUNDLED_LABELS: &str = include_str!("../../../../data/labels/flowers.txt");

/// Ordered class names; index `i` names model score `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<String>,
}

impl LabelTable {
    /// Parse a labels file body.
    pub fn parse(content: &str) -> Self {
        let labels = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { labels }
    }

    /// The table shipped with the bundled model.
    pub fn bundled() -> Self {
        Self::parse(BUNDLED_LABELS)
    }

    /// Load a labels file from disk. An empty table is an error.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let content = std::fs::read_to_string(path).map_err(|e| PipelineError::Labels {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let table = Self::parse(&content);
        if table.is_empty() {
            return Err(PipelineError::Labels {
                path: path.to_path_buf(),
                message: "file contains no labels".to_string(),
            });
        }
        tracing::debug!("Loaded {} labels from {:?}", table.len(), path);
        Ok(table)
    }

    /// Load from `path` if given, otherwise use the bundled table.
    pub fn load_or_bundled(path: Option<&Path>) -> Result<Self, PipelineError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::bundled()),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Fail unless the table has exactly one label per model output.
    pub fn ensure_matches(&self, scores: usize) -> Result<(), PipelineError> {
        if self.labels.len() != scores {
            return Err(PipelineError::LabelMismatch {
                labels: self.labels.len(),
                scores,
            });
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for LabelTable {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            labels: iter.into_iter().map(Into::into).collect(),
        }
    }
}
