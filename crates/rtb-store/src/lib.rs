//! Persistence for Roll the Bones: the die type catalog and saved pools.
//!
//! Everything lives in one private directory of flat files. [`Registry`]
//! owns the storage, the [`DieTypeCatalog`], and the [`SavedPools`], and is
//! passed to whatever needs die types or pools. Mutations report per-item
//! [`Outcome`]s rather than returning errors.

pub mod codec;
pub mod config;
pub mod die_types;
pub mod error;
pub mod outcome;
pub mod registry;
pub mod saved_pools;
pub mod storage;

pub use config::{RollConfig, StoreConfig};
pub use die_types::{
    DieTypeCatalog, FaceLoader, FileFaceLoader, LoadWarning, ReferenceFaceLoader, builtin_types,
};
pub use error::{StoreError, StoreResult};
pub use outcome::{BatchOutcome, Outcome};
pub use registry::Registry;
pub use saved_pools::SavedPools;
pub use storage::{DirStorage, MemoryStorage, Storage};
