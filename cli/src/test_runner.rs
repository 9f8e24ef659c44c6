use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use snippets::{EmitError, Emitter, SnippetFile, snippet_key};

const FIXTURE_SUFFIXES: &[&str] = &[".test.vue", ".test.html"];

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// File name used in snippet keys. Defaults to "fixture.vue".
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Overrides the emitter's default scope.
    #[serde(default)]
    pub default_scope: Option<String>,

    /// The parse error's message or notes must contain this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// Number of snippets emitted.
    #[serde(default)]
    pub expect_count: Option<usize>,

    /// Region name → expected body lines joined with `\n`.
    #[serde(default)]
    pub expect_bodies: BTreeMap<String, String>,

    /// Region names that must not produce a snippet.
    #[serde(default)]
    pub expect_absent: Vec<String>,
}

fn default_file_name() -> String {
    "fixture.vue".to_string()
}

/// Split a fixture into its TOML frontmatter and template source.
fn parse_fixture(content: &str) -> Result<(FixtureConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}');

    let Some(after_open) = content.strip_prefix("---") else {
        return Err("missing opening --- frontmatter delimiter".into());
    };
    let after_open = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
        .unwrap_or(after_open);

    let close = after_open
        .find("\n---")
        .ok_or("missing closing --- frontmatter delimiter")?;

    let toml_str = after_open[..close].trim_end_matches('\r');
    let rest = &after_open[close + 4..];
    let source = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: FixtureConfig =
        toml::from_str(toml_str).map_err(|e| format!("TOML parse error: {}", e))?;

    Ok((config, source))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("?")
        })
    }
}

fn run_single_test(path: &Path) -> TestResult {
    let fail = |description: Option<String>, reason: String| TestResult {
        path: path.to_path_buf(),
        description,
        outcome: TestOutcome::Fail(reason),
    };

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return fail(None, format!("cannot read file: {}", e)),
    };

    let (config, source) = match parse_fixture(&content) {
        Ok(pair) => pair,
        Err(e) => return fail(None, format!("frontmatter error: {}", e)),
    };
    let description = config.description.clone();

    let emitter = match &config.default_scope {
        Some(scope) => Emitter::new(scope.as_str()),
        None => Emitter::default(),
    };
    let mut out = SnippetFile::new();
    let result = emitter.emit_source(&config.file_name, source, 0, &mut out);

    let outcome = match (&config.expect_error, result) {
        (Some(expected), Err(EmitError::Parse(err))) => {
            let mut text = err.message.clone();
            for note in &err.notes {
                text.push('\n');
                text.push_str(note);
            }
            if text.contains(expected.as_str()) {
                None
            } else {
                Some(format!(
                    "expected error containing \"{}\", got: {}",
                    expected, text
                ))
            }
        }
        (Some(expected), Err(other)) => Some(format!(
            "expected parse error containing \"{}\", got: {}",
            expected, other
        )),
        (Some(expected), Ok(_)) => Some(format!(
            "expected error containing \"{}\", but extraction succeeded",
            expected
        )),
        (None, Err(err)) => Some(format!("unexpected error: {}", err)),
        (None, Ok(_)) => check_snippets(&config, &out),
    };

    TestResult {
        path: path.to_path_buf(),
        description,
        outcome: match outcome {
            Some(reason) => TestOutcome::Fail(reason),
            None => TestOutcome::Pass,
        },
    }
}

/// Compare emitted snippets with the fixture's expectations.
/// Returns `Some(reason)` on the first mismatch.
fn check_snippets(config: &FixtureConfig, out: &SnippetFile) -> Option<String> {
    if let Some(expected) = config.expect_count {
        if out.len() != expected {
            let keys: Vec<&str> = out.iter().map(|(k, _)| k).collect();
            return Some(format!(
                "expected {} snippet(s), got {}: [{}]",
                expected,
                out.len(),
                keys.join(", ")
            ));
        }
    }

    for (name, expected_body) in &config.expect_bodies {
        let key = snippet_key(&config.file_name, name);
        let Some(snippet) = out.get(&key) else {
            return Some(format!("no snippet emitted for region `{}`", name));
        };
        let actual = snippet.body.join("\n");
        let expected = expected_body.trim_end_matches('\n');
        if actual != expected {
            return Some(format!(
                "body mismatch for `{}`\n  expected:\n{}\n  actual:\n{}",
                name,
                indent_block(expected),
                indent_block(&actual)
            ));
        }
    }

    for name in &config.expect_absent {
        if out.get(&snippet_key(&config.file_name, name)).is_some() {
            return Some(format!("region `{}` should not produce a snippet", name));
        }
    }

    None
}

fn indent_block(text: &str) -> String {
    text.lines()
        .map(|l| format!("    | {}", l))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_fixture(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| FIXTURE_SUFFIXES.iter().any(|s| n.ends_with(s)))
}

/// Discover fixtures grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_fixtures(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_fixtures(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_fixtures(&path, root, out);
        } else if is_fixture(&path) {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

/// List available categories for the given fixture path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no fixtures found in {}", path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        let label = if cat.is_empty() { "(root)" } else { cat.as_str() };
        eprintln!("  {} ({} tests)", label, files.len());
    }
}

struct Palette {
    no_color: bool,
}

impl Palette {
    fn paint(&self, text: &str, code: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            format!("\x1b[{}m{}\x1b[0m", code, text)
        }
    }

    fn pass(&self) -> String {
        self.paint("PASS", "32")
    }

    fn fail(&self) -> String {
        self.paint("FAIL", "31")
    }

    fn bold(&self, text: &str) -> String {
        self.paint(text, "1")
    }
}

/// Select the categories to run. Unknown requested categories are warned about.
fn filter_categories<'c>(
    all: &'c BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'c str, &'c Vec<PathBuf>> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v)).collect();
    }

    let mut filtered = BTreeMap::new();
    for req in requested {
        let req = req.trim_matches('/');
        let prefix = format!("{}/", req);
        let before = filtered.len();
        for (cat, files) in all {
            if cat == req || cat.starts_with(&prefix) {
                filtered.insert(cat.as_str(), files);
            }
        }
        if filtered.len() == before {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                all.keys()
                    .map(|k| if k.is_empty() { "(root)" } else { k.as_str() })
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    filtered
}

/// Run all fixtures under `path` (or a single fixture file).
/// If `categories` is non-empty, only fixtures in those categories run.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let palette = Palette { no_color };

    let groups: BTreeMap<String, Vec<PathBuf>> = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        discover_categorized(path)
    };

    if groups.is_empty() {
        eprintln!("no fixtures found in {}", path.display());
        return 1;
    }

    let selected = filter_categories(&groups, categories);
    if selected.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &selected {
        eprintln!();
        eprintln!("{}", palette.bold(if cat.is_empty() { "(root)" } else { *cat }));

        for file in *files {
            let result = run_single_test(file);
            match result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", palette.pass(), result.label());
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", palette.fail(), result.label());
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let TestOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    if failures.is_empty() {
        eprintln!("test result: {}. {} passed, 0 failed", palette.paint("ok", "32"), passed);
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            palette.paint("FAILED", "31"),
            passed,
            failures.len(),
            passed + failures.len()
        );
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"---
description = "nested button"
file_name = "Btn.vue"
expect_count = 1
expect_absent = ["icon"]

[expect_bodies]
button = """
<button>
  Go
</button>
"""
---
<!--#button-->
  <button>
    <!--#icon alone skip--><i></i><!--/#icon-->Go
  </button>
<!--/#button-->
"#;

    fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn frontmatter_is_split_from_source() {
        let (config, source) = parse_fixture(FIXTURE).unwrap();
        assert_eq!(config.file_name, "Btn.vue");
        assert_eq!(config.expect_count, Some(1));
        assert!(source.starts_with("<!--#button-->"));
    }

    #[test]
    fn missing_frontmatter_is_reported() {
        assert!(parse_fixture("<!--#a-->x<!--/#a-->").is_err());
        assert!(parse_fixture("---\ndescription = \"x\"\n").is_err());
    }

    #[test]
    fn passing_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "button.test.vue", FIXTURE);
        assert!(matches!(run_single_test(&path).outcome, TestOutcome::Pass));
    }

    #[test]
    fn expected_error_fixture() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            "bad.test.vue",
            "---\nexpect_error = \"mismatched\"\n---\n<!--#a--><!--#-->x<!--/#-->\n",
        );
        assert!(matches!(run_single_test(&path).outcome, TestOutcome::Pass));
    }

    #[test]
    fn body_mismatch_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            "wrong.test.vue",
            "---\n[expect_bodies]\na = \"y\"\n---\n<!--#a-->x<!--/#a-->\n",
        );
        match run_single_test(&path).outcome {
            TestOutcome::Fail(reason) => assert!(reason.contains("body mismatch")),
            TestOutcome::Pass => panic!("fixture should fail"),
        }
    }

    #[test]
    fn categories_follow_subfolders() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "root.test.vue", FIXTURE);
        write_fixture(dir.path(), "nested/inner.test.html", FIXTURE);
        write_fixture(dir.path(), "nested/ignored.vue", FIXTURE);

        let categories = discover_categorized(dir.path());
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[""].len(), 1);
        assert_eq!(categories["nested"].len(), 1);
        assert_eq!(run_tests(dir.path(), true, &[]), 0);
    }
}
