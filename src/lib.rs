//! IP Registry - Ownership-Controlled Claim Store
//!
//! Records intellectual-property claims, each owned by a single principal,
//! with a creation/expiration window and an active flag. Only the current
//! owner may transfer a record or change its status.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │        Script Replay / CLI  (authenticated callers)        │
//! ├───────────────────────────────────────────────────────────┤
//! │   Dispatcher: register-ip │ get-ip-info │ is-ip-active     │
//! │               transfer-ip │ set-ip-status → Outcome        │
//! ├───────────────────────────────────────────────────────────┤
//! │                       IpRegistry                           │
//! │  ┌──────────────┐  ┌────────────────┐  ┌───────────────┐  │
//! │  │ id allocator │  │ sharded store  │  │ event stream  │  │
//! │  │  (atomic)    │  │ (RwLock/shard) │  │  (broadcast)  │  │
//! │  └──────────────┘  └────────────────┘  └───────────────┘  │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`registry`]: Records, principals, clock and the sharded registry
//! - [`dispatch`]: Function-name call dispatch with tagged outcomes
//! - [`script`]: Batch replay of calls
//! - [`config`]: Registry configuration
//! - [`error`]: Error types and codes

pub mod config;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod script;

// Re-export commonly used types
pub use config::RegistryConfig;

pub use dispatch::{Call, CallResult, Dispatcher, Outcome};

pub use error::{Error, ErrorKind, Result};

pub use registry::{
    Clock, IpId, IpRecord, IpRegistry, ManualClock, Principal, RegistryEvent,
    RegistryStatsSnapshot, SystemClock, Timestamp,
};

pub use script::{Script, Step, StepReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
