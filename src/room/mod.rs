mod coordinator;
mod locks;
mod merge;

pub use coordinator::{RoomSessionCoordinator, SyncStatus, UserSessions};
pub use locks::SessionLocks;
pub use merge::{apply_update, RoomSessionUpdate};
