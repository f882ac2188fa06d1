use std::collections::HashMap;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use rtb_core::{DropSide, Operation, PlaceholderDecision, PoolTree, Resolution, resolve_placeholders};
use rtb_store::RollConfig;

use super::{DirRegistry, print_roll, print_terms, split_pair};

/// A new term for `pool add`.
pub enum Term {
    /// `count` dice of the named type.
    Dice(String, u32),
    /// A fixed number.
    Number(i32),
}

pub fn list(registry: &mut DirRegistry) -> Result<(), String> {
    let names = registry.pool_names().map_err(|e| e.to_string())?;
    if names.is_empty() {
        println!("  No saved pools.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Pool", "Preview"]);
    for name in &names {
        let (notation, preview) = match registry.load_pool(name) {
            Ok(pool) => {
                let preview = pool
                    .config_result()
                    .map(|r| r.total().to_string())
                    .unwrap_or_else(|_| "missing dice".to_string());
                (pool.notation(), preview)
            }
            Err(e) => (format!("unreadable: {e}"), "-".to_string()),
        };
        table.add_row(vec![name.clone(), notation, preview]);
    }

    println!("{table}");
    println!();
    println!("  {} saved pools", names.len());
    Ok(())
}

pub fn show(registry: &mut DirRegistry, name: &str) -> Result<(), String> {
    let pool = registry.load_pool(name).map_err(|e| e.to_string())?;
    show_tree(name, &pool);
    Ok(())
}

pub(super) fn show_tree(label: &str, pool: &PoolTree) {
    let operation = pool
        .root_list()
        .map(|list| list.operation())
        .unwrap_or(Operation::Add);
    println!("  {} [{}]", label.bold(), operation.name().dimmed());
    println!();
    print_terms(pool);
    println!();
    println!("  notation: {}", pool.notation());
    match pool.config_result() {
        Ok(result) => println!("  preview:  {result}"),
        Err(e) => println!("  preview:  {}", e.to_string().yellow()),
    }
}

pub fn new(registry: &mut DirRegistry, name: &str) -> Result<(), String> {
    if registry.has_saved_pool(name).map_err(|e| e.to_string())? {
        return Err(format!("pool \"{name}\" already exists"));
    }
    registry
        .save_pool(name, &PoolTree::list(Operation::Add))
        .into_result()?;
    println!("  {} {name}", "Created".green().bold());
    Ok(())
}

pub fn add(
    registry: &mut DirRegistry,
    name: &str,
    term: Term,
    op: Option<Operation>,
    at: Option<usize>,
    before: bool,
) -> Result<(), String> {
    let value = match term {
        Term::Dice(die, count) => {
            if count == 0 {
                return Err("--count must be at least 1".into());
            }
            let die_type = registry.die_type(&die);
            if die_type.is_placeholder() {
                return Err(format!("die type not found: \"{die}\""));
            }
            PoolTree::dice(die_type, count)
        }
        Term::Number(number) => PoolTree::fixed(number),
    };

    let mut pool = registry.load_pool(name).map_err(|e| e.to_string())?;
    let root = pool.root();
    let len = pool.children(root).len();

    if len == 0 {
        pool.drop_onto(root, value).map_err(|e| e.to_string())?;
    } else {
        let neighbor = at.unwrap_or(len - 1);
        if neighbor >= len {
            return Err(format!("index {neighbor} is out of range (pool has {len} terms)"));
        }
        let side = if before {
            DropSide::Before
        } else {
            DropSide::After
        };
        pool.insert_adjacent(root, neighbor, side, value, op)
            .map_err(|e| e.to_string())?;
    }

    registry.save_pool(name, &pool).into_result()?;
    println!("  {} {}", name.bold(), pool.notation());
    Ok(())
}

pub fn remove(registry: &mut DirRegistry, name: &str, index: usize) -> Result<(), String> {
    let mut pool = registry.load_pool(name).map_err(|e| e.to_string())?;
    let root = pool.root();
    let len = pool.children(root).len();
    if index >= len {
        return Err(format!("index {index} is out of range (pool has {len} terms)"));
    }
    let removed = pool.remove_at(root, index).map_err(|e| e.to_string())?;
    registry.save_pool(name, &pool).into_result()?;
    println!("  {} {}", "Removed".green().bold(), removed.notation());
    Ok(())
}

pub fn roll(
    registry: &mut DirRegistry,
    name: &str,
    seed: Option<u64>,
    replacements: &[String],
) -> Result<(), String> {
    let mut answers = HashMap::new();
    for arg in replacements {
        let (old, new) = split_pair(arg, "OLD=NEW")?;
        answers.insert(old.to_string(), new.to_string());
    }

    let mut pool = registry.load_pool(name).map_err(|e| e.to_string())?;
    let resolution = resolve_placeholders(&mut pool, registry.resolver(), |missing| {
        match answers.get(missing.name()) {
            Some(new) => PlaceholderDecision::Replace(new.clone()),
            None => PlaceholderDecision::Abort,
        }
    })
    .map_err(|e| e.to_string())?;

    match resolution {
        Resolution::Aborted => {
            let missing = pool
                .find_first_placeholder()
                .map(|die| die.name().to_string())
                .unwrap_or_default();
            return Err(format!(
                "die type \"{missing}\" is missing; pass --replace {missing}=<TYPE> to roll"
            ));
        }
        Resolution::Resolved { replaced } => {
            for (old, new) in &replaced {
                println!("  {} {old} with {new}", "Replaced".yellow().bold());
            }
        }
    }

    println!("  {} {}", "Rolling".bold(), pool.notation().dimmed());
    print_roll(&mut pool, &roll_config(seed))
}

pub fn delete(registry: &mut DirRegistry, names: &[String]) -> Result<(), String> {
    let outcome = registry.delete_pools(names);
    for name in outcome.removed() {
        println!("  {} {name}", "Deleted".green().bold());
    }
    for (name, message) in outcome.failures() {
        eprintln!("  {} {name}: {message}", "FAILED".red().bold());
    }
    if let Some(message) = outcome.list_error() {
        eprintln!("  {} pool list: {message}", "FAILED".red().bold());
    }

    if outcome.is_success() {
        Ok(())
    } else {
        Err("some pools could not be deleted".into())
    }
}

pub(super) fn roll_config(seed: Option<u64>) -> RollConfig {
    RollConfig { seed }
}
