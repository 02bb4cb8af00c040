//! IP Registry Module
//!
//! Sharded, ownership-controlled store of IP records with a monotonic id
//! allocator and a broadcast stream of change events.

pub mod clock;
pub mod events;
pub mod ip_registry;
pub mod record;

pub use clock::*;
pub use events::*;
pub use ip_registry::*;
pub use record::*;
