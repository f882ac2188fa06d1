//! Dice pool expression trees for Roll the Bones.
//!
//! A pool is a tree of dice groups, fixed numbers, and operator lists. This
//! crate holds the tree itself ([`PoolTree`]), the die types it refers to,
//! result folding, and the serialized record form used for persistence. It
//! performs no I/O; die type names are resolved through a
//! [`DieTypeResolver`] supplied by the caller.

pub mod die;
pub mod error;
pub mod operation;
pub mod pool;
pub mod resolve;
pub mod result;

pub use die::{DieRollResult, DieType, Face, FaceSource, MAX_FACES};
pub use error::{PoolError, PoolResult};
pub use operation::Operation;
pub use pool::{
    DicePool, DisplayId, DropSide, FixedNumber, NodeId, PoolList, PoolNode, PoolRecord, PoolTree,
    PoolValue, ResultSink,
};
pub use resolve::{DieTypeResolver, PlaceholderDecision, Resolution, resolve_placeholders};
pub use result::DicePoolResult;
