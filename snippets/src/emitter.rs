use std::fs;
use std::path::Path;

use regions::{Extractor, Region, adjust_indent};
use tracing::debug;

use crate::error::EmitError;
use crate::snippet::{Snippet, SnippetFile};

/// Scope used for regions without a `scope` attribute.
pub const DEFAULT_SCOPE: &str = "vue,html";

/// Turns resolved regions into snippet entries.
#[derive(Debug, Clone)]
pub struct Emitter {
    default_scope: String,
}

impl Default for Emitter {
    fn default() -> Self {
        Emitter::new(DEFAULT_SCOPE)
    }
}

impl Emitter {
    pub fn new(default_scope: impl Into<String>) -> Self {
        Emitter {
            default_scope: default_scope.into(),
        }
    }

    pub fn default_scope(&self) -> &str {
        &self.default_scope
    }

    /// The snippet for one region, or `None` when the region is marked
    /// `skip` or resolves to nothing.
    pub fn snippet(&self, region: &Region) -> Option<Snippet> {
        let attrs = &region.attributes;
        if attrs.is_skipped() || region.resolved_content.is_empty() {
            return None;
        }

        Some(Snippet {
            prefix: attrs.prefix().map(<[String]>::to_vec),
            body: adjust_indent(&region.resolved_content)
                .split('\n')
                .map(str::to_string)
                .collect(),
            description: attrs.description().map(str::to_string),
            scope: attrs
                .scope()
                .filter(|s| !s.is_empty())
                .unwrap_or(&self.default_scope)
                .to_string(),
        })
    }

    /// Add a snippet for every eligible region of one document.
    /// Returns how many entries were added or replaced.
    pub fn emit(&self, file_name: &str, regions: &[Region], out: &mut SnippetFile) -> usize {
        let mut count = 0;
        for region in regions {
            let Some(snippet) = self.snippet(region) else {
                debug!(file = file_name, region = %region.name, "region not emitted");
                continue;
            };
            out.insert(snippet_key(file_name, &region.name), snippet);
            count += 1;
        }
        count
    }

    /// Extract `source` and emit its regions under `file_name`.
    pub fn emit_source(
        &self,
        file_name: &str,
        source: &str,
        file_id: usize,
        out: &mut SnippetFile,
    ) -> Result<usize, EmitError> {
        let regions = Extractor::new(source, file_id).extract()?;
        Ok(self.emit(file_name, &regions, out))
    }

    /// Read a template from disk and emit its regions, keyed by its file name.
    pub fn emit_file(&self, path: &Path, out: &mut SnippetFile) -> Result<usize, EmitError> {
        let source = fs::read_to_string(path).map_err(|source| EmitError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.emit_source(&file_name, &source, 0, out)
    }
}

/// Entry key used in the snippet file.
pub fn snippet_key(file_name: &str, region_name: &str) -> String {
    format!("{} - {}", file_name, region_name)
}
