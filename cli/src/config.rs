use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "sfc-snippets.toml";

/// Where snippets go when neither the command line nor the config says.
pub const DEFAULT_OUTPUT: &str = ".vscode/snippet.code-snippets";

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Snippet file to write.
    pub output: Option<PathBuf>,

    /// Scope for regions without a `scope` attribute.
    pub default_scope: Option<String>,

    /// Templates to process when none are given on the command line.
    pub inputs: Vec<PathBuf>,
}

impl Config {
    /// Load `explicit`, or `sfc-snippets.toml` if it exists, or defaults.
    /// An explicitly named file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Config, String> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let implicit = PathBuf::from(CONFIG_FILE);
                if !implicit.is_file() {
                    return Ok(Config::default());
                }
                implicit
            }
        };

        let text = std::fs::read_to_string(&path)
            .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
        let config = Config::parse(&text)
            .map_err(|e| format!("invalid config '{}': {}", path.display(), e))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_config() {
        let config = Config::parse(
            r#"
output = "out/snips.code-snippets"
default_scope = "html"
inputs = ["a.vue", "b.vue"]
"#,
        )
        .unwrap();
        assert_eq!(config.output, Some(PathBuf::from("out/snips.code-snippets")));
        assert_eq!(config.default_scope.as_deref(), Some("html"));
        assert_eq!(config.inputs.len(), 2);
    }

    #[test]
    fn empty_config_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::parse("outptu = \"x\"").is_err());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(dir.path().join("missing.toml").as_path())).unwrap_err();
        assert!(err.contains("missing.toml"));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "default_scope = \"vue\"").unwrap();
        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.default_scope.as_deref(), Some("vue"));
    }
}
