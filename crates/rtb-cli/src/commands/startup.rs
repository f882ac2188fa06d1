use colored::Colorize;

use super::pool::{roll_config, show_tree};
use super::{DirRegistry, print_roll};

pub fn show(registry: &mut DirRegistry) -> Result<(), String> {
    let (read_ok, pool) = registry.initial_pool();
    if !read_ok {
        eprintln!(
            "  {} startup pool could not be read, showing the default pool",
            "WARN".yellow().bold()
        );
    }
    show_tree("Startup pool", &pool);
    Ok(())
}

pub fn set(registry: &mut DirRegistry, name: &str) -> Result<(), String> {
    let pool = registry.load_pool(name).map_err(|e| e.to_string())?;
    registry.set_initial_pool(&pool).into_result()?;
    println!("  {} startup pool to {}", "Set".green().bold(), name.bold());
    Ok(())
}

pub fn roll(registry: &mut DirRegistry, seed: Option<u64>) -> Result<(), String> {
    let (_, mut pool) = registry.initial_pool();
    if let Some(missing) = pool.find_first_placeholder() {
        return Err(format!(
            "the startup pool uses the missing die type \"{}\"",
            missing.name()
        ));
    }
    print_roll(&mut pool, &roll_config(seed))
}
