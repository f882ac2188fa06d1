//! The application context: storage, the die type catalog, and saved pools.
//!
//! Changes to a custom die reach every pool already read into memory: saving
//! over an existing type or placeholder, or deleting a type, re-resolves that
//! name in each cached tree.

use std::sync::Arc;

use rtb_core::{DieType, DieTypeResolver, PoolTree};
use tracing::debug;

use crate::config::StoreConfig;
use crate::die_types::{DieTypeCatalog, FaceLoader};
use crate::error::StoreResult;
use crate::outcome::{BatchOutcome, Outcome};
use crate::saved_pools::SavedPools;
use crate::storage::{DirStorage, Storage};

/// Everything the application keeps about dice and pools.
#[derive(Debug)]
pub struct Registry<S> {
    storage: S,
    config: StoreConfig,
    catalog: DieTypeCatalog,
    pools: SavedPools,
}

impl Registry<DirStorage> {
    /// Open the data directory named in `config`, creating it if needed.
    pub fn open_dir(config: StoreConfig, faces: &dyn FaceLoader) -> StoreResult<Self> {
        let storage = DirStorage::open(&config.data_dir)?;
        Ok(Self::open(storage, config, faces))
    }
}

impl<S: Storage> Registry<S> {
    /// Load the catalog from `storage`. Saved pools are read on first use.
    pub fn open(storage: S, config: StoreConfig, faces: &dyn FaceLoader) -> Self {
        let catalog = DieTypeCatalog::load(&storage, &config, faces);
        let pools = SavedPools::new(&config);
        Self {
            storage,
            config,
            catalog,
            pools,
        }
    }

    /// The configuration this registry was opened with.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The backing storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable access to the backing storage.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// The die type catalog.
    pub fn catalog(&self) -> &DieTypeCatalog {
        &self.catalog
    }

    /// The saved pool registry.
    pub fn pools(&self) -> &SavedPools {
        &self.pools
    }

    /// The resolver to hand to tree operations.
    pub fn resolver(&mut self) -> &mut DieTypeCatalog {
        &mut self.catalog
    }

    /// Resolve a die type name. Unknown names give a placeholder.
    pub fn die_type(&mut self, name: &str) -> Arc<DieType> {
        self.catalog.resolve(name)
    }

    /// A fresh pool holding one default die.
    pub fn default_pool(&self) -> PoolTree {
        PoolTree::default_pool(self.catalog.default_type())
    }

    // -----------------------------------------------------------------------
    // Custom die types
    // -----------------------------------------------------------------------

    /// Save a custom die type and refresh loaded pools that use its name.
    pub fn save_custom_die(&mut self, die: DieType) -> Outcome {
        let name = die.name().to_string();
        match self.catalog.save(&mut self.storage, die) {
            Ok(refresh) => {
                if refresh {
                    self.propagate(&name);
                }
                Outcome::Done
            }
            Err(err) => Outcome::Failed(err.to_string()),
        }
    }

    /// Delete a custom die type. Loaded pools see a placeholder in its place.
    pub fn delete_custom_die(&mut self, name: &str) -> Outcome {
        let listed = self.catalog.is_listed(name);
        let result = self.catalog.delete(&mut self.storage, name);
        if listed {
            self.propagate(name);
        }
        Outcome::from_result(result)
    }

    /// Delete several custom die types.
    pub fn delete_custom_dice(&mut self, names: &[String]) -> BatchOutcome {
        let outcome = self.catalog.delete_many(&mut self.storage, names);
        for name in outcome.removed() {
            self.propagate(name);
        }
        outcome
    }

    fn propagate(&mut self, name: &str) {
        let changed = self.pools.die_type_updated(name, &mut self.catalog);
        debug!(die = %name, pools = changed, "propagated die type change");
    }

    // -----------------------------------------------------------------------
    // Saved pools
    // -----------------------------------------------------------------------

    /// Saved pool names in stable order.
    pub fn pool_names(&mut self) -> StoreResult<Vec<String>> {
        self.pools.names(&self.storage)
    }

    /// Number of saved pools.
    pub fn pool_count(&mut self) -> StoreResult<usize> {
        self.pools.count(&self.storage)
    }

    /// The saved pool name at `index`.
    pub fn pool_name_at(&mut self, index: usize) -> StoreResult<Option<String>> {
        self.pools.name_at(&self.storage, index)
    }

    /// True if a pool called `name` is saved.
    pub fn has_saved_pool(&mut self, name: &str) -> StoreResult<bool> {
        self.pools.has_saved_pool(&self.storage, name)
    }

    /// A copy of the saved pool `name`, free to edit.
    pub fn load_pool(&mut self, name: &str) -> StoreResult<PoolTree> {
        self.pools.load(&self.storage, name, &mut self.catalog)
    }

    /// Save `pool` as `name`.
    pub fn save_pool(&mut self, name: &str, pool: &PoolTree) -> Outcome {
        Outcome::from_result(self.pools.save(&mut self.storage, name, pool))
    }

    /// Delete the saved pool `name`.
    pub fn delete_pool(&mut self, name: &str) -> Outcome {
        Outcome::from_result(self.pools.delete(&mut self.storage, name))
    }

    /// Delete several saved pools.
    pub fn delete_pools(&mut self, names: &[String]) -> BatchOutcome {
        self.pools.delete_many(&mut self.storage, names)
    }

    /// The startup pool, or the default pool if there is none. The flag is
    /// false when a startup pool existed but could not be read.
    pub fn initial_pool(&mut self) -> (bool, PoolTree) {
        let default_die = self.catalog.default_type();
        self.pools
            .initial_pool(&self.storage, &mut self.catalog, default_die)
    }

    /// Replace the startup pool.
    pub fn set_initial_pool(&mut self, pool: &PoolTree) -> Outcome {
        Outcome::from_result(self.pools.set_initial_pool(&mut self.storage, pool))
    }
}
