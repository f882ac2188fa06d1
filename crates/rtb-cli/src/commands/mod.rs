pub mod dice;
pub mod pool;
pub mod startup;

use std::path::{Path, PathBuf};

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use rtb_core::{DicePoolResult, DisplayId, PoolTree, PoolValue, ResultSink};
use rtb_store::{DirStorage, FileFaceLoader, Registry, RollConfig, StoreConfig};
use tracing_subscriber::EnvFilter;

pub type DirRegistry = Registry<DirStorage>;

/// Route `tracing` output to stderr. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Open the registry in `dir`, or in the platform data directory.
pub fn open_registry(dir: Option<&Path>) -> Result<DirRegistry, String> {
    let dir = dir.map(Path::to_path_buf).unwrap_or_else(default_data_dir);
    let faces = FileFaceLoader::new(&dir);
    let registry =
        Registry::open_dir(StoreConfig::new(&dir), &faces).map_err(|e| e.to_string())?;
    for warning in registry.catalog().load_warnings() {
        match &warning.name {
            Some(name) => eprintln!("  {} die \"{name}\": {}", "WARN".yellow().bold(), warning.message),
            None => eprintln!("  {} {}", "WARN".yellow().bold(), warning.message),
        }
    }
    Ok(registry)
}

fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("com", "Winebone", "RollTheBones")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./rtb_data"))
}

/// Split a `KEY=VALUE` argument.
fn split_pair<'a>(arg: &'a str, what: &str) -> Result<(&'a str, &'a str), String> {
    arg.split_once('=')
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .ok_or_else(|| format!("expected {what}, got \"{arg}\""))
}

/// Print the top-level terms of `tree` with their indices.
fn print_terms(tree: &PoolTree) {
    let root = tree.root();
    let terms = tree.children(root);
    if terms.is_empty() {
        println!("  {}", "(empty pool)".dimmed());
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Term", "Kind"]);
    for (index, &id) in terms.iter().enumerate() {
        let term = tree
            .duplicate_subtree(id)
            .map(|sub| sub.notation())
            .unwrap_or_default();
        let kind = tree.value(id).map(PoolValue::kind).unwrap_or("?");
        table.add_row(vec![index.to_string(), term, kind.to_string()]);
    }
    println!("{table}");
}

/// Print a roll of `tree`, one line per top-level term, then the total.
fn print_roll(tree: &mut PoolTree, config: &RollConfig) -> Result<(), String> {
    let root = tree.root();
    let terms: Vec<_> = tree.children(root).to_vec();
    for (index, &id) in terms.iter().enumerate() {
        tree.set_display(id, Some(DisplayId(index as u64)))
            .map_err(|e| e.to_string())?;
    }

    let mut lines = TermLines::default();
    let mut rng = config.rng();
    let result = tree
        .evaluate_with(&mut rng, &mut lines)
        .map_err(|e| e.to_string())?;

    if terms.len() > 1 {
        lines.0.sort_by_key(|(display, _)| display.0);
        for (display, text) in &lines.0 {
            println!("  {} {text}", format!("[{}]", display.0).dimmed());
        }
    }
    println!("  {} {}", "Total".bold(), result.total().to_string().green().bold());
    if !result.is_empty() {
        println!("  {}", result.description().dimmed());
    }
    Ok(())
}

#[derive(Default)]
struct TermLines(Vec<(DisplayId, String)>);

impl ResultSink for TermLines {
    fn on_result_computed(&mut self, display: DisplayId, result: &DicePoolResult) {
        self.0.push((display, result.to_string()));
    }
}
