//! Named saved pools and the startup pool.
//!
//! The saved pool list file holds one `name SEP file` line per pool; each
//! pool's tree is stored as JSON in its own file. Trees are read lazily, the
//! first time a pool is asked for, and kept in memory afterwards. Callers
//! only ever get duplicates of the cached trees.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rtb_core::{DieType, DieTypeResolver, PoolTree};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::codec::{ListEntry, check_name, format_list, parse_list};
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::outcome::BatchOutcome;
use crate::storage::Storage;

/// Registry of saved pools.
#[derive(Debug)]
pub struct SavedPools {
    list_file: String,
    startup_file: String,
    list_loaded: bool,
    entries: Vec<ListEntry>,
    cache: HashMap<String, PoolTree>,
}

impl SavedPools {
    /// An unloaded registry using the files named in `config`.
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            list_file: config.saved_pools_file.clone(),
            startup_file: config.startup_pool_file.clone(),
            list_loaded: false,
            entries: Vec::new(),
            cache: HashMap::new(),
        }
    }

    /// Pool names in stable order.
    pub fn names(&mut self, storage: &dyn Storage) -> StoreResult<Vec<String>> {
        self.ensure_list(storage)?;
        Ok(self.entries.iter().map(|e| e.name.clone()).collect())
    }

    /// Number of saved pools.
    pub fn count(&mut self, storage: &dyn Storage) -> StoreResult<usize> {
        self.ensure_list(storage)?;
        Ok(self.entries.len())
    }

    /// The name of the pool at `index`.
    pub fn name_at(&mut self, storage: &dyn Storage, index: usize) -> StoreResult<Option<String>> {
        self.ensure_list(storage)?;
        Ok(self.entries.get(index).map(|e| e.name.clone()))
    }

    /// True if a pool called `name` is saved.
    pub fn has_saved_pool(&mut self, storage: &dyn Storage, name: &str) -> StoreResult<bool> {
        self.ensure_list(storage)?;
        Ok(self.entry(name).is_some())
    }

    /// True if the tree for `name` has been read into memory.
    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.contains_key(name)
    }

    /// A copy of the saved pool called `name`.
    pub fn load(
        &mut self,
        storage: &dyn Storage,
        name: &str,
        resolver: &mut dyn DieTypeResolver,
    ) -> StoreResult<PoolTree> {
        self.ensure_list(storage)?;
        if !self.cache.contains_key(name) {
            let file = self
                .entry(name)
                .map(|e| e.file.clone())
                .ok_or_else(|| not_found(name))?;
            let text = storage
                .read(&file)?
                .ok_or_else(|| StoreError::NotFound(format!("file for pool \"{name}\"")))?;
            let tree = PoolTree::from_json(&text, resolver)?;
            debug!(pool = %name, "read saved pool");
            self.cache.insert(name.to_string(), tree);
        }
        self.cache
            .get(name)
            .map(PoolTree::duplicate)
            .ok_or_else(|| not_found(name))
    }

    /// Save `pool` under `name`, replacing any pool of that name.
    pub fn save(&mut self, storage: &mut dyn Storage, name: &str, pool: &PoolTree) -> StoreResult<()> {
        check_name(name)?;
        if pool.root_list().is_none() {
            return Err(StoreError::InvalidOperation(
                "a saved pool must have a list at its root".into(),
            ));
        }
        let text = pool.to_json()?;
        self.ensure_list(storage)?;

        let file = match self.entry(name) {
            Some(entry) => entry.file.clone(),
            None => {
                let entry = ListEntry {
                    name: name.to_string(),
                    file: Uuid::new_v4().to_string(),
                };
                storage.append_line(&self.list_file, &entry.to_line())?;
                let file = entry.file.clone();
                self.entries.push(entry);
                file
            }
        };
        storage.write(&file, &text)?;
        self.cache.insert(name.to_string(), pool.duplicate());
        info!(pool = %name, %file, "saved pool");
        Ok(())
    }

    /// Delete the pool called `name`.
    pub fn delete(&mut self, storage: &mut dyn Storage, name: &str) -> StoreResult<()> {
        self.ensure_list(storage)?;
        let entry = self.take_entry(name)?;
        let removed = storage.remove(&entry.file);
        let rewritten = self.rewrite_list(storage);
        info!(pool = %name, "deleted pool");
        removed.and(rewritten)
    }

    /// Delete several pools, rewriting the list file once.
    pub fn delete_many(&mut self, storage: &mut dyn Storage, names: &[String]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        if let Err(err) = self.ensure_list(storage) {
            outcome.fail_list(&err);
            return outcome;
        }
        for name in names {
            if outcome.was_removed(name) {
                continue;
            }
            match self.take_entry(name) {
                Ok(entry) => {
                    outcome.removed_item(name);
                    if let Err(err) = storage.remove(&entry.file) {
                        warn!(pool = %name, error = %err, "pool file could not be deleted");
                        outcome.fail(name, &err);
                    }
                }
                Err(err) => outcome.fail(name, &err),
            }
        }
        if let Err(err) = self.rewrite_list(storage) {
            outcome.fail_list(&err);
        }
        info!(removed = outcome.removed().len(), "deleted pools");
        outcome
    }

    /// The pool to show at start-up.
    ///
    /// Never fails: a missing startup file gives `(true, default)` and an
    /// unreadable one gives `(false, default)`.
    pub fn initial_pool(
        &self,
        storage: &dyn Storage,
        resolver: &mut dyn DieTypeResolver,
        default_die: Arc<DieType>,
    ) -> (bool, PoolTree) {
        let read = storage
            .read(&self.startup_file)
            .and_then(|text| match text {
                Some(text) => Ok(Some(PoolTree::from_json(&text, resolver)?)),
                None => Ok(None),
            });
        match read {
            Ok(Some(pool)) => (true, pool),
            Ok(None) => (true, PoolTree::default_pool(default_die)),
            Err(err) => {
                warn!(file = %self.startup_file, error = %err, "startup pool unreadable, using default");
                (false, PoolTree::default_pool(default_die))
            }
        }
    }

    /// Replace the startup pool.
    pub fn set_initial_pool(&self, storage: &mut dyn Storage, pool: &PoolTree) -> StoreResult<()> {
        if pool.root_list().is_none() {
            return Err(StoreError::InvalidOperation(
                "the startup pool must have a list at its root".into(),
            ));
        }
        storage.write(&self.startup_file, &pool.to_json()?)?;
        info!("saved startup pool");
        Ok(())
    }

    /// Re-resolve `die_name` in every pool already read into memory.
    ///
    /// Pools not yet read are skipped; they pick up the current type when
    /// they are loaded. Returns the number of pools that changed.
    pub fn die_type_updated(&mut self, die_name: &str, resolver: &mut dyn DieTypeResolver) -> usize {
        if !self.list_loaded {
            return 0;
        }
        let mut changed = 0;
        for tree in self.cache.values_mut() {
            if tree.replace_die_type(die_name, die_name, resolver) {
                changed += 1;
            }
        }
        debug!(die = %die_name, pools = changed, "refreshed loaded pools");
        changed
    }

    fn ensure_list(&mut self, storage: &dyn Storage) -> StoreResult<()> {
        if self.list_loaded {
            return Ok(());
        }
        self.entries = match storage.read(&self.list_file)? {
            Some(text) => {
                let mut seen = HashSet::new();
                parse_list(&text)?
                    .into_iter()
                    .filter(|entry| {
                        let first = seen.insert(entry.name.clone());
                        if !first {
                            warn!(pool = %entry.name, file = %entry.file, "ignoring repeated saved pool list entry");
                        }
                        first
                    })
                    .collect()
            }
            None => Vec::new(),
        };
        self.list_loaded = true;
        debug!(pools = self.entries.len(), "read saved pool list");
        Ok(())
    }

    fn entry(&self, name: &str) -> Option<&ListEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    fn take_entry(&mut self, name: &str) -> StoreResult<ListEntry> {
        let position = self
            .entries
            .iter()
            .position(|e| e.name == name)
            .ok_or_else(|| not_found(name))?;
        self.cache.remove(name);
        Ok(self.entries.remove(position))
    }

    fn rewrite_list(&self, storage: &mut dyn Storage) -> StoreResult<()> {
        storage.write(&self.list_file, &format_list(&self.entries))
    }
}

fn not_found(name: &str) -> StoreError {
    StoreError::NotFound(format!("pool \"{name}\""))
}
