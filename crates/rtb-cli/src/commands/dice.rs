use std::collections::BTreeMap;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use rtb_core::{DieType, FaceSource, MAX_FACES};
use rtb_store::{FaceLoader, FileFaceLoader};

use super::{DirRegistry, split_pair};

pub fn list(registry: &mut DirRegistry) -> Result<(), String> {
    let catalog = registry.catalog();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Range", "Kind"]);

    for die in catalog.builtin() {
        let kind = if die.name() == catalog.default_type().name() {
            "built-in (default)"
        } else {
            "built-in"
        };
        table.add_row(vec![die.name().to_string(), range(die), kind.to_string()]);
    }
    for die in (0..catalog.custom_count()).filter_map(|i| catalog.by_position(i)) {
        let kind = if die.has_custom_faces() {
            "custom (images)"
        } else {
            "custom"
        };
        table.add_row(vec![die.name().to_string(), range(&die), kind.to_string()]);
    }

    println!("{table}");
    println!();
    println!("  {} custom die types", catalog.custom_count());
    Ok(())
}

pub fn show(registry: &mut DirRegistry, name: &str) -> Result<(), String> {
    let die = registry
        .catalog()
        .get(name)
        .filter(|die| !die.is_placeholder())
        .ok_or_else(|| format!("die type not found: \"{name}\""))?;

    let kind = if registry.catalog().is_builtin(name) {
        "built-in"
    } else {
        "custom"
    };
    println!("  {} [{}]", die.name().bold(), kind.dimmed());
    println!();
    println!("  range:   {}", range(&die));
    if let Some(face) = die.config_face() {
        println!("  preview: {face}");
    }
    println!();
    println!("  {}", "Faces".bold().underline());
    for (offset, value) in (die.min_result()..=die.max_result()).enumerate() {
        let face = die
            .face_for_result(value)
            .map(ToString::to_string)
            .unwrap_or_default();
        match die.face_sources().get(offset) {
            Some(FaceSource::Custom(reference)) => {
                println!("  {value:>4}  {face}  {}", reference.dimmed())
            }
            _ => println!("  {value:>4}  {face}"),
        }
    }
    Ok(())
}

pub fn save(
    registry: &mut DirRegistry,
    name: &str,
    min: i32,
    max: i32,
    faces: &[String],
) -> Result<(), String> {
    if min > max {
        return Err(format!("--min {min} is above --max {max}"));
    }
    if i64::from(max) - i64::from(min) + 1 > MAX_FACES as i64 {
        return Err(format!("a die can have at most {MAX_FACES} results"));
    }

    let mut references = BTreeMap::new();
    for arg in faces {
        let (value, reference) = split_pair(arg, "VALUE=REF")?;
        let value: i32 = value
            .trim()
            .parse()
            .map_err(|_| format!("face value \"{value}\" is not a number"))?;
        if !(min..=max).contains(&value) {
            return Err(format!("face value {value} is outside {min}-{max}"));
        }
        references.insert(value, reference.to_string());
    }

    let loader = FileFaceLoader::new(&registry.config().data_dir);
    let mut sources = Vec::new();
    let mut loaded = Vec::new();
    for value in min..=max {
        match references.remove(&value) {
            Some(reference) => {
                let face = loader.load_face(&reference).map_err(|e| e.to_string())?;
                sources.push(FaceSource::Custom(reference));
                loaded.push(Some(face));
            }
            None => {
                sources.push(FaceSource::Generic(value));
                loaded.push(None);
            }
        }
    }

    let die = DieType::custom(name, min, max, sources, loaded).map_err(|e| e.to_string())?;
    registry.save_custom_die(die).into_result()?;
    println!("  {} {name} ({min}-{max})", "Saved".green().bold());
    Ok(())
}

pub fn delete(registry: &mut DirRegistry, names: &[String]) -> Result<(), String> {
    let outcome = registry.delete_custom_dice(names);
    for name in outcome.removed() {
        println!("  {} {name}", "Deleted".green().bold());
    }
    for (name, message) in outcome.failures() {
        eprintln!("  {} {name}: {message}", "FAILED".red().bold());
    }
    if let Some(message) = outcome.list_error() {
        eprintln!("  {} die list: {message}", "FAILED".red().bold());
    }

    if outcome.is_success() {
        Ok(())
    } else {
        Err("some die types could not be deleted".into())
    }
}

fn range(die: &DieType) -> String {
    format!("{}-{}", die.min_result(), die.max_result())
}
