//! Sharded IP Registry
//!
//! Records are spread over independently locked shards keyed by id, so
//! mutations on different records never contend. Every owner-gated write
//! runs its existence check, ownership check and update under a single
//! shard write lock.

use super::clock::{Clock, SystemClock};
use super::events::RegistryEvent;
use super::record::{IpId, IpRecord, Principal, Timestamp};
use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

// =============================================================================
// Shard Statistics
// =============================================================================

/// Statistics for a single shard
#[repr(C, align(64))]
#[derive(Debug, Default)]
pub struct ShardStats {
    /// Number of records in shard
    pub record_count: AtomicU64,
    /// Total writes to this shard
    pub update_count: AtomicU64,
}

// =============================================================================
// Registry Shard
// =============================================================================

/// A single shard of the registry
#[repr(C, align(64))]
struct RegistryShard {
    records: RwLock<HashMap<IpId, IpRecord>>,
    stats: ShardStats,
}

impl std::fmt::Debug for RegistryShard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryShard")
            .field("record_count", &self.stats.record_count.load(Ordering::Relaxed))
            .finish()
    }
}

impl RegistryShard {
    fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            stats: ShardStats::default(),
        }
    }

    fn record_count(&self) -> usize {
        self.stats.record_count.load(Ordering::Relaxed) as usize
    }

    /// Snapshot of a record
    fn get(&self, id: IpId) -> Option<IpRecord> {
        self.records.read().get(&id).cloned()
    }

    /// Read a single field without cloning the whole record
    fn read<R>(&self, id: IpId, f: impl FnOnce(&IpRecord) -> R) -> Option<R> {
        self.records.read().get(&id).map(f)
    }

    fn records_owned_by(&self, owner: &Principal) -> Vec<IpRecord> {
        self.records
            .read()
            .values()
            .filter(|record| record.is_owned_by(owner))
            .cloned()
            .collect()
    }
}

// =============================================================================
// Registry Statistics
// =============================================================================

/// Counters across all shards
#[derive(Debug, Default)]
pub struct RegistryStats {
    pub registrations: AtomicU64,
    pub transfers: AtomicU64,
    pub status_changes: AtomicU64,
    /// Mutations rejected because the caller was not the owner
    pub denied: AtomicU64,
    /// Lookups and mutations against ids that were never issued
    pub not_found: AtomicU64,
}

impl RegistryStats {
    /// Create a snapshot of current stats
    pub fn snapshot(&self) -> RegistryStatsSnapshot {
        RegistryStatsSnapshot {
            registrations: self.registrations.load(Ordering::Relaxed),
            transfers: self.transfers.load(Ordering::Relaxed),
            status_changes: self.status_changes.load(Ordering::Relaxed),
            denied: self.denied.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of registry statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct RegistryStatsSnapshot {
    pub registrations: u64,
    pub transfers: u64,
    pub status_changes: u64,
    pub denied: u64,
    pub not_found: u64,
}

// =============================================================================
// IP Registry
// =============================================================================

/// Ownership-controlled registry of IP records
pub struct IpRegistry {
    shards: Box<[RegistryShard]>,
    /// Next id to hand out; starts at 1 and only moves forward
    next_id: AtomicI64,
    clock: Arc<dyn Clock>,
    stats: RegistryStats,
    event_sender: broadcast::Sender<RegistryEvent>,
    config: RegistryConfig,
}

impl std::fmt::Debug for IpRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IpRegistry")
            .field("shards", &self.shards.len())
            .field("next_id", &self.next_id.load(Ordering::Relaxed))
            .field("clock", &self.clock)
            .finish()
    }
}

impl IpRegistry {
    /// Create a registry with default config and the system clock
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(RegistryConfig::default(), Arc::new(SystemClock)))
    }

    /// Create a registry with default config and a custom clock
    pub fn with_clock(clock: Arc<dyn Clock>) -> Arc<Self> {
        Arc::new(Self::build(RegistryConfig::default(), clock))
    }

    /// Create a registry from an explicit config
    pub fn with_config(config: RegistryConfig, clock: Arc<dyn Clock>) -> Result<Arc<Self>> {
        config.validate()?;
        Ok(Arc::new(Self::build(config, clock)))
    }

    fn build(config: RegistryConfig, clock: Arc<dyn Clock>) -> Self {
        let shards: Vec<RegistryShard> = (0..config.shard_count)
            .map(|_| RegistryShard::new())
            .collect();
        let (event_sender, _) = broadcast::channel(config.event_capacity);

        Self {
            shards: shards.into_boxed_slice(),
            next_id: AtomicI64::new(1),
            clock,
            stats: RegistryStats::default(),
            event_sender,
            config,
        }
    }

    #[inline]
    fn shard(&self, id: IpId) -> &RegistryShard {
        &self.shards[id.shard_index(self.shards.len())]
    }

    /// Get an event receiver
    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.event_sender.subscribe()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a new IP record owned by `caller`.
    ///
    /// Never fails. The returned id has not been issued before and resolves
    /// through [`get_info`](Self::get_info) as soon as this returns.
    pub fn register(
        &self,
        caller: &Principal,
        title: impl Into<String>,
        description: impl Into<String>,
        expiration_date: Timestamp,
    ) -> IpId {
        let id = IpId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let now = self.clock.now_millis();
        let record = IpRecord::new(
            id,
            caller.clone(),
            title.into(),
            description.into(),
            now,
            expiration_date,
        );
        let title = record.title.clone();

        let shard = self.shard(id);
        {
            let mut records = shard.records.write();
            records.insert(id, record);
            shard.stats.record_count.fetch_add(1, Ordering::Relaxed);
            shard.stats.update_count.fetch_add(1, Ordering::Relaxed);

            let _ = self.event_sender.send(RegistryEvent::IpRegistered {
                id,
                owner: caller.clone(),
                title,
            });
        }
        self.stats.registrations.fetch_add(1, Ordering::Relaxed);

        debug!(%id, owner = %caller, "IP record registered");
        id
    }

    /// Get a snapshot of a record
    pub fn get_info(&self, id: IpId) -> Result<IpRecord> {
        self.shard(id).get(id).ok_or_else(|| self.not_found(id))
    }

    /// Get the stored active flag
    pub fn is_active(&self, id: IpId) -> Result<bool> {
        self.shard(id)
            .read(id, |record| record.is_active)
            .ok_or_else(|| self.not_found(id))
    }

    /// Hand ownership of a record to `new_owner`
    pub fn transfer(&self, caller: &Principal, id: IpId, new_owner: Principal) -> Result<()> {
        self.guarded_update(caller, id, |record| {
            let previous_owner = std::mem::replace(&mut record.owner, new_owner.clone());
            RegistryEvent::OwnershipTransferred {
                id,
                previous_owner,
                new_owner,
            }
        })?;

        self.stats.transfers.fetch_add(1, Ordering::Relaxed);
        info!(%id, from = %caller, "IP ownership transferred");
        Ok(())
    }

    /// Set the active flag of a record
    pub fn set_status(&self, caller: &Principal, id: IpId, is_active: bool) -> Result<()> {
        self.guarded_update(caller, id, |record| {
            record.is_active = is_active;
            RegistryEvent::StatusChanged { id, is_active }
        })?;

        self.stats.status_changes.fetch_add(1, Ordering::Relaxed);
        debug!(%id, is_active, "IP status updated");
        Ok(())
    }

    /// Owner-gated write: existence first, then ownership, then `apply`.
    ///
    /// All three steps and the resulting event happen under the shard write
    /// lock, so no other mutation on the same id can interleave.
    fn guarded_update<F>(&self, caller: &Principal, id: IpId, apply: F) -> Result<()>
    where
        F: FnOnce(&mut IpRecord) -> RegistryEvent,
    {
        let shard = self.shard(id);
        let mut records = shard.records.write();

        let record = match records.get_mut(&id) {
            Some(record) => record,
            None => return Err(self.not_found(id)),
        };

        if !record.is_owned_by(caller) {
            self.stats.denied.fetch_add(1, Ordering::Relaxed);
            let _ = self.event_sender.send(RegistryEvent::MutationDenied {
                id,
                caller: caller.clone(),
            });
            warn!(%id, caller = %caller, "rejected mutation from non-owner");
            return Err(Error::NotAuthorized {
                id,
                caller: caller.clone(),
            });
        }

        let event = apply(record);
        shard.stats.update_count.fetch_add(1, Ordering::Relaxed);
        let _ = self.event_sender.send(event);
        Ok(())
    }

    fn not_found(&self, id: IpId) -> Error {
        self.stats.not_found.fetch_add(1, Ordering::Relaxed);
        debug!(%id, "IP record not found");
        Error::NotFound { id }
    }

    /// Check if a record exists
    pub fn contains(&self, id: IpId) -> bool {
        self.shard(id).read(id, |_| ()).is_some()
    }

    /// Number of records stored
    pub fn len(&self) -> usize {
        self.shards.iter().map(RegistryShard::record_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshots of every record currently owned by `owner`, ordered by id
    pub fn records_owned_by(&self, owner: &Principal) -> Vec<IpRecord> {
        let mut records: Vec<IpRecord> = self
            .shards
            .iter()
            .flat_map(|shard| shard.records_owned_by(owner))
            .collect();
        records.sort_by_key(|record| record.id);
        records
    }

    /// Get registry statistics
    pub fn stats(&self) -> RegistryStatsSnapshot {
        self.stats.snapshot()
    }

    /// Get shard statistics for debugging: (index, records, writes)
    pub fn shard_stats(&self) -> Vec<(usize, usize, u64)> {
        self.shards
            .iter()
            .enumerate()
            .map(|(idx, shard)| {
                (
                    idx,
                    shard.record_count(),
                    shard.stats.update_count.load(Ordering::Relaxed),
                )
            })
            .filter(|(_, count, _)| *count > 0)
            .collect()
    }
}
