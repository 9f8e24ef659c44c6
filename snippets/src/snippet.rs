use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::EmitError;

/// One entry of an editor `.code-snippets` file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snippet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<Vec<String>>,
    pub body: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub scope: String,
}

/// Snippets keyed by `"<file> - <region>"`, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SnippetFile {
    entries: IndexMap<String, Snippet>,
}

impl SnippetFile {
    pub fn new() -> Self {
        SnippetFile::default()
    }

    /// Add a snippet. An existing entry with the same key is replaced where it stands.
    pub fn insert(&mut self, key: String, snippet: Snippet) {
        self.entries.insert(key, snippet);
    }

    pub fn get(&self, key: &str) -> Option<&Snippet> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Snippet)> {
        self.entries.iter().map(|(k, s)| (k.as_str(), s))
    }

    /// Pretty JSON with two-space indentation.
    pub fn to_json(&self) -> Result<String, EmitError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the JSON to `path`, creating parent directories as needed.
    pub fn write(&self, path: &Path) -> Result<(), EmitError> {
        let json = self.to_json()?;
        let write_err = |source| EmitError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        fs::write(path, json).map_err(write_err)?;
        tracing::info!(path = %path.display(), snippets = self.len(), "snippet file written");
        Ok(())
    }
}
