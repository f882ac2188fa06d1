//! Where the catalog and saved pools live, and how rolls are seeded.

use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;

/// Name of the custom die list file.
pub const CUSTOM_DICE_FILE: &str = "customDice";
/// Name of the saved pool list file.
pub const SAVED_POOLS_FILE: &str = "savedPools";
/// Name of the startup pool file.
pub const STARTUP_POOL_FILE: &str = "defaultPool";
/// Built-in die used when a fresh pool is needed.
pub const DEFAULT_DIE: &str = "D6";

/// Layout of the private data directory.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding every list and entity file.
    pub data_dir: PathBuf,
    /// Custom die list file name.
    pub custom_dice_file: String,
    /// Saved pool list file name.
    pub saved_pools_file: String,
    /// Startup pool file name.
    pub startup_pool_file: String,
    /// Built-in die placed in the default pool.
    pub default_die: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

impl StoreConfig {
    /// Standard file names inside `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            custom_dice_file: CUSTOM_DICE_FILE.to_string(),
            saved_pools_file: SAVED_POOLS_FILE.to_string(),
            startup_pool_file: STARTUP_POOL_FILE.to_string(),
            default_die: DEFAULT_DIE.to_string(),
        }
    }

    /// Set the custom die list file name.
    pub fn with_custom_dice_file(mut self, name: impl Into<String>) -> Self {
        self.custom_dice_file = name.into();
        self
    }

    /// Set the saved pool list file name.
    pub fn with_saved_pools_file(mut self, name: impl Into<String>) -> Self {
        self.saved_pools_file = name.into();
        self
    }

    /// Set the startup pool file name.
    pub fn with_startup_pool_file(mut self, name: impl Into<String>) -> Self {
        self.startup_pool_file = name.into();
        self
    }

    /// Set the built-in die used for default pools.
    pub fn with_default_die(mut self, name: impl Into<String>) -> Self {
        self.default_die = name.into();
        self
    }
}

/// How rolls get their randomness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RollConfig {
    /// Fixed seed for reproducible rolls; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl RollConfig {
    /// Use a fixed seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// A generator for one batch of rolls.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
