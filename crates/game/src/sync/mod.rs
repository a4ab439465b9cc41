mod resync;
mod snapshot;
mod store;

/// One discrete simulation step. Monotonic, totally ordered; gaps are
/// tolerated but never expected.
pub type Tick = u64;

pub use resync::{FatalDesync, ResyncEngine, ResyncOutcome, SyncState};
pub use snapshot::{EntitySnapshot, WorldSnapshot};
pub use store::{SnapshotStore, StoreError};
