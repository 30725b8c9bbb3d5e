//! Host page access for the share tool.
//!
//! The chat page is reached only through the [`DomReader`] and [`DomWriter`]
//! ports. [`MemoryDom`] implements both over an arena tree built from a JSON
//! snapshot posted by the browser relay, and publishes a [`Mutation`] for
//! every structural change.

pub mod memory;
pub mod port;
pub mod snapshot;

pub use memory::MemoryDom;
pub use port::*;
pub use snapshot::SnapshotNode;
