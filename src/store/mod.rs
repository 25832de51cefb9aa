//! Motion persistence.
//!
//! The voting service only needs save/find/list semantics. Atomic
//! find-then-update comes from the service's per-motion lock together with
//! `MotionStore::lock`, which file-backed stores extend across processes.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileMotionStore;
pub use memory::InMemoryMotionStore;
pub use traits::{MotionStore, StoreError, StoreLock, StoreResult};
