//! The die type catalog: built-in, custom, and placeholder die types.
//!
//! Custom die types are listed in the custom dice list file, one
//! `name SEP file` line each, and every listed die has an entity file of its
//! own. Names resolve built-in first, then custom, then placeholder; a name
//! that is none of those gets a fresh placeholder.

mod builtin;
mod faces;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rtb_core::{DieType, DieTypeResolver, FaceSource};
use tracing::{info, warn};
use uuid::Uuid;

pub use builtin::{BUILTIN_SIDES, DEFAULT_TYPE_INDEX, builtin_types};
pub use faces::{FaceLoader, FileFaceLoader, ReferenceFaceLoader};

use crate::codec::{CustomDieRecord, ListEntry, check_name, format_list, parse_list};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::outcome::BatchOutcome;
use crate::storage::Storage;

/// A custom die that could not be loaded at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    /// The die's name, or `None` when the list file itself was unreadable.
    pub name: Option<String>,
    /// What went wrong.
    pub message: String,
}

/// Every die type the application knows about.
#[derive(Debug)]
pub struct DieTypeCatalog {
    builtin: Vec<Arc<DieType>>,
    default_index: usize,
    custom: HashMap<String, Arc<DieType>>,
    placeholders: HashMap<String, Arc<DieType>>,
    // Everything in the list file, including entries that failed to load.
    entries: Vec<ListEntry>,
    // Loaded custom names in stable order.
    names: Vec<String>,
    warnings: Vec<LoadWarning>,
    list_file: String,
}

impl DieTypeCatalog {
    /// Build the catalog from storage.
    ///
    /// Never fails. Entries that cannot be loaded are left out and reported
    /// through [`load_warnings`](Self::load_warnings).
    pub fn load(storage: &dyn Storage, config: &StoreConfig, faces: &dyn FaceLoader) -> Self {
        let builtin = builtin_types();
        let default_index = builtin
            .iter()
            .position(|t| t.name() == config.default_die)
            .unwrap_or(DEFAULT_TYPE_INDEX);
        let mut catalog = Self {
            builtin,
            default_index,
            custom: HashMap::new(),
            placeholders: HashMap::new(),
            entries: Vec::new(),
            names: Vec::new(),
            warnings: Vec::new(),
            list_file: config.custom_dice_file.clone(),
        };

        let listed = storage
            .read(&catalog.list_file)
            .and_then(|text| text.as_deref().map(parse_list).transpose());
        let listed = match listed {
            Ok(entries) => entries.unwrap_or_default(),
            Err(err) => {
                warn!(file = %catalog.list_file, error = %err, "custom dice list could not be read");
                catalog.warnings.push(LoadWarning {
                    name: None,
                    message: err.to_string(),
                });
                return catalog;
            }
        };

        let mut seen = HashSet::new();
        for entry in listed {
            if seen.insert(entry.name.clone()) {
                catalog.entries.push(entry);
            } else {
                warn!(die = %entry.name, file = %entry.file, "ignoring repeated custom dice list entry");
                catalog.warnings.push(LoadWarning {
                    message: format!("\"{}\" is listed more than once", entry.name),
                    name: Some(entry.name),
                });
            }
        }

        for entry in &catalog.entries {
            match load_custom(storage, entry, faces) {
                Ok(die) => {
                    catalog.names.push(entry.name.clone());
                    catalog.custom.insert(entry.name.clone(), Arc::new(die));
                }
                Err(err) => {
                    warn!(die = %entry.name, error = %err, "dropping custom die that failed to load");
                    catalog.warnings.push(LoadWarning {
                        name: Some(entry.name.clone()),
                        message: err.to_string(),
                    });
                }
            }
        }
        info!(
            builtin = catalog.builtin.len(),
            custom = catalog.custom.len(),
            "die type catalog loaded"
        );
        catalog
    }

    /// Built-in types in menu order.
    pub fn builtin(&self) -> &[Arc<DieType>] {
        &self.builtin
    }

    /// The die placed in fresh pools.
    pub fn default_type(&self) -> Arc<DieType> {
        match self.builtin.get(self.default_index) {
            Some(die) => die.clone(),
            None => Arc::new(DieType::placeholder(format!("D{}", BUILTIN_SIDES[DEFAULT_TYPE_INDEX]))),
        }
    }

    /// True if `name` is a built-in type.
    pub fn is_builtin(&self, name: &str) -> bool {
        self.builtin.iter().any(|t| t.name() == name)
    }

    /// True if a custom type named `name` is loaded.
    pub fn is_custom_registered(&self, name: &str) -> bool {
        self.custom.contains_key(name)
    }

    /// True if `name` is in the custom dice list, whether or not it loaded.
    pub fn is_listed(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// A built-in or custom type, without creating placeholders.
    pub fn get(&self, name: &str) -> Option<Arc<DieType>> {
        self.builtin
            .iter()
            .find(|t| t.name() == name)
            .or_else(|| self.custom.get(name))
            .cloned()
    }

    /// The custom type at `position` in stable order.
    pub fn by_position(&self, position: usize) -> Option<Arc<DieType>> {
        self.names
            .get(position)
            .and_then(|name| self.custom.get(name))
            .cloned()
    }

    /// Number of loaded custom types.
    pub fn custom_count(&self) -> usize {
        self.names.len()
    }

    /// Loaded custom names in stable order.
    pub fn custom_names(&self) -> &[String] {
        &self.names
    }

    /// Built-in names followed by custom names.
    pub fn names(&self) -> Vec<String> {
        self.builtin
            .iter()
            .map(|t| t.name().to_string())
            .chain(self.names.iter().cloned())
            .collect()
    }

    /// Problems found while loading custom dice.
    pub fn load_warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Store a custom die type.
    ///
    /// Returns true if loaded pools must be refreshed because a type or
    /// placeholder of that name was already known.
    pub fn save(&mut self, storage: &mut dyn Storage, die: DieType) -> StoreResult<bool> {
        let name = die.name().to_string();
        check_name(&name)?;
        if self.is_builtin(&name) {
            return Err(StoreError::NameReserved(name));
        }
        if die.is_placeholder() {
            return Err(StoreError::InvalidOperation(format!(
                "\"{name}\" is a placeholder and cannot be saved"
            )));
        }

        let file = match self.entries.iter().find(|e| e.name == name) {
            Some(entry) => entry.file.clone(),
            None => {
                let entry = ListEntry {
                    name: name.clone(),
                    file: Uuid::new_v4().to_string(),
                };
                storage.append_line(&self.list_file, &entry.to_line())?;
                let file = entry.file.clone();
                self.entries.push(entry);
                file
            }
        };

        let record = CustomDieRecord {
            name: name.clone(),
            min: die.min_result(),
            max: die.max_result(),
            faces: die
                .face_sources()
                .iter()
                .map(|source| source.as_field().to_string())
                .collect(),
        };
        storage.write(&file, &record.format())?;

        let was_placeholder = self.placeholders.remove(&name).is_some();
        let needs_refresh = was_placeholder || self.custom.contains_key(&name);
        if !self.names.contains(&name) {
            self.names.push(name.clone());
        }
        self.warnings.retain(|w| w.name.as_deref() != Some(name.as_str()));
        self.custom.insert(name.clone(), Arc::new(die));
        info!(die = %name, %file, "saved custom die type");
        Ok(needs_refresh)
    }

    /// Delete one custom die type.
    ///
    /// The name leaves the catalog and becomes a placeholder even if its
    /// file cannot be removed.
    pub fn delete(&mut self, storage: &mut dyn Storage, name: &str) -> StoreResult<()> {
        let entry = self.take_entry(name)?;
        let removed = storage.remove(&entry.file);
        let rewritten = self.rewrite_list(storage);
        info!(die = %name, "deleted custom die type");
        removed.and(rewritten)
    }

    /// Delete several custom die types, rewriting the list file once.
    pub fn delete_many(&mut self, storage: &mut dyn Storage, names: &[String]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for name in names {
            if outcome.was_removed(name) {
                continue;
            }
            let entry = match self.take_entry(name) {
                Ok(entry) => entry,
                Err(err) => {
                    outcome.fail(name, &err);
                    continue;
                }
            };
            outcome.removed_item(name);
            if let Err(err) = storage.remove(&entry.file) {
                warn!(die = %name, error = %err, "custom die file could not be deleted");
                outcome.fail(name, &err);
            }
        }
        if let Err(err) = self.rewrite_list(storage) {
            outcome.fail_list(&err);
        }
        info!(removed = outcome.removed().len(), "deleted custom die types");
        outcome
    }

    fn take_entry(&mut self, name: &str) -> StoreResult<ListEntry> {
        let position = self
            .entries
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| StoreError::NotFound(format!("custom die type \"{name}\"")))?;
        let entry = self.entries.remove(position);
        self.custom.remove(name);
        self.names.retain(|n| n != name);
        self.warnings.retain(|w| w.name.as_deref() != Some(name));
        self.placeholders
            .insert(name.to_string(), Arc::new(DieType::placeholder(name)));
        Ok(entry)
    }

    fn rewrite_list(&self, storage: &mut dyn Storage) -> StoreResult<()> {
        storage.write(&self.list_file, &format_list(&self.entries))
    }
}

impl DieTypeResolver for DieTypeCatalog {
    fn resolve(&mut self, name: &str) -> Arc<DieType> {
        if let Some(die) = self.get(name) {
            return die;
        }
        self.placeholders
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(DieType::placeholder(name)))
            .clone()
    }
}

fn load_custom(
    storage: &dyn Storage,
    entry: &ListEntry,
    faces: &dyn FaceLoader,
) -> StoreResult<DieType> {
    let text = storage
        .read(&entry.file)?
        .ok_or_else(|| StoreError::NotFound(format!("file for die \"{}\"", entry.name)))?;
    let record = CustomDieRecord::parse(&text)?;

    let mut sources = Vec::new();
    let mut loaded = Vec::new();
    for (offset, value) in (record.min..=record.max).enumerate() {
        let field = record.faces.get(offset).map(String::as_str).unwrap_or("");
        match FaceSource::from_field(value, field) {
            FaceSource::Custom(reference) => match faces.load_face(&reference) {
                Ok(face) => {
                    sources.push(FaceSource::Custom(reference));
                    loaded.push(Some(face));
                }
                Err(err) => {
                    warn!(die = %entry.name, %reference, error = %err, "face image unavailable, using generic face");
                    sources.push(FaceSource::Generic(value));
                    loaded.push(None);
                }
            },
            generic => {
                sources.push(generic);
                loaded.push(None);
            }
        }
    }
    Ok(DieType::custom(
        entry.name.clone(),
        record.min,
        record.max,
        sources,
        loaded,
    )?)
}
