mod config;
mod test_runner;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::EnvFilter;

use regions::{AttributeValue, Extractor, Region};
use snippets::{DEFAULT_SCOPE, Emitter, SnippetFile};

use config::{Config, DEFAULT_OUTPUT};

const SUBCOMMANDS: &[&str] = &["run", "test", "help"];

#[derive(Parser)]
#[command(
    name = "sfc-snippets",
    version,
    about = "Generate editor snippets from marked template regions"
)]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log progress (same as RUST_LOG=info)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract regions and write a snippet file
    Run(RunArgs),

    /// Run .test.vue fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Template files to read (defaults to `inputs` from the config file)
    files: Vec<PathBuf>,

    /// Snippet file to write
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Scope for regions without a `scope` attribute
    #[arg(long)]
    scope: Option<String>,

    /// Config file (defaults to ./sfc-snippets.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Parse only, don't write anything (exit 0 if every file is valid)
    #[arg(long)]
    check: bool,

    /// Print the region tree of each file
    #[arg(long)]
    regions: bool,

    /// Dump resolved regions
    #[arg(long)]
    dump: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a fixture file or a directory containing them
    path: PathBuf,

    /// Run only fixtures in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    let args = with_implicit_run(std::env::args().collect());
    let cli = Cli::parse_from(&args);
    init_tracing(cli.verbose);

    match cli.command {
        Command::Run(run_args) => do_run(run_args, cli.no_color),
        Command::Test(test_args) => {
            if test_args.list_categories {
                test_runner::list_categories(&test_args.path);
                return;
            }
            let exit_code =
                test_runner::run_tests(&test_args.path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

/// `sfc-snippets a.vue` means `sfc-snippets run a.vue`, and a bare invocation
/// runs with the config file's inputs. `run` goes right after any leading
/// global flags so that run options such as `--config` reach the subcommand.
fn with_implicit_run(mut args: Vec<String>) -> Vec<String> {
    let first = args
        .iter()
        .skip(1)
        .position(|a| !is_global_flag(a))
        .map(|idx| idx + 1);
    match first {
        Some(idx) if SUBCOMMANDS.contains(&args[idx].as_str()) || is_help_or_version(&args[idx]) => {}
        Some(idx) => args.insert(idx, "run".to_string()),
        None => args.push("run".to_string()),
    }
    args
}

fn is_global_flag(arg: &str) -> bool {
    matches!(arg, "--no-color" | "-v" | "--verbose")
}

fn is_help_or_version(arg: &str) -> bool {
    matches!(arg, "-h" | "--help" | "-V" | "--version")
}

/// `--verbose` enables INFO, otherwise RUST_LOG decides, defaulting to WARN.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn do_run(args: RunArgs, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let config = match Config::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let inputs = if args.files.is_empty() {
        config.inputs
    } else {
        args.files
    };
    if inputs.is_empty() {
        eprintln!("error: no input files (pass them as arguments or set `inputs` in the config)");
        process::exit(1);
    }

    let scope = args
        .scope
        .or(config.default_scope)
        .unwrap_or_else(|| DEFAULT_SCOPE.to_string());
    let output = args
        .output
        .or(config.output)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    let emitter = Emitter::new(scope);
    let mut files = SimpleFiles::new();
    let mut snippet_file = SnippetFile::new();
    let writer = StandardStream::stderr(color_choice);
    let term_config = term::Config::default();
    let mut failed = false;

    for path in &inputs {
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: cannot read '{}': {}", path.display(), e);
                failed = true;
                continue;
            }
        };

        // Region spans index the text with carriage returns removed.
        let normalized = source.replace('\r', "");
        let file_id = files.add(path.display().to_string(), normalized.clone());
        let extractor = Extractor::new(&normalized, file_id);

        let regions = match extractor.extract() {
            Ok(r) => r,
            Err(error) => {
                let diagnostic = error.to_diagnostic();
                let _ = term::emit_to_write_style(
                    &mut writer.lock(),
                    &term_config,
                    &files,
                    &diagnostic,
                );
                failed = true;
                continue;
            }
        };

        if args.check {
            eprintln!("ok: {} ({} regions)", path.display(), regions.len());
        }
        if args.regions {
            println!("{}", path.display());
            print_region_tree(&regions);
        }
        if args.dump {
            println!("{:#?}", regions);
        }
        if !(args.check || args.regions || args.dump) {
            let added = emitter.emit(&file_name(path), &regions, &mut snippet_file);
            tracing::info!(file = %path.display(), snippets = added, "processed");
        }
    }

    if failed {
        process::exit(1);
    }
    if args.check || args.regions || args.dump {
        return;
    }

    if let Err(e) = snippet_file.write(&output) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
    eprintln!(
        "wrote {} snippet(s) to {}",
        snippet_file.len(),
        output.display()
    );
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Print regions in document order, indented by depth.
fn print_region_tree(regions: &[Region]) {
    let mut ordered: Vec<&Region> = regions.iter().collect();
    ordered.sort_by_key(|r| r.start_marker.start);

    for region in ordered {
        let pad = "  ".repeat(region.depth - 1);
        let attrs: Vec<String> = region
            .attributes
            .iter()
            .map(|(name, value)| format_attribute(name, value))
            .collect();
        if attrs.is_empty() {
            println!("{}#{}", pad, region.name);
        } else {
            println!("{}#{} {}", pad, region.name, attrs.join(" "));
        }
    }
}

fn format_attribute(name: &str, value: &AttributeValue) -> String {
    match value {
        AttributeValue::Flag => name.to_string(),
        AttributeValue::String(s) => format!("{}={:?}", name, s),
        AttributeValue::List(items) => format!("{}=[{}]", name, items.join(",")),
        AttributeValue::Placeholders(map) => map
            .iter()
            .map(|(key, v)| format!("placeholder-{}={:?}", key, v))
            .collect::<Vec<_>>()
            .join(" "),
    }
}
