//! File watching
//!
//! OS change notifications are debounced and batched, then the affected paths are
//! invalidated in the `VirtualFileSystem`.

pub mod events;
pub mod runtime;

pub use events::{ChangeEvent, EventBatcher, WatchConfig};
pub use runtime::VfsWatcher;
