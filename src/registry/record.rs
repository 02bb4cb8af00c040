//! IP Records
//!
//! Identifier, principal and record types stored by the registry.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Milliseconds since the Unix epoch for registry-stamped dates.
/// `expiration_date` reuses the type but is passed through untouched.
pub type Timestamp = i64;

// =============================================================================
// IP ID
// =============================================================================

/// Identifier of an IP record.
///
/// Issued ids are always positive. Lookups accept any integer so that a
/// zero or negative id resolves to "not found" like any other unissued id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IpId(pub i64);

impl IpId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// Get the shard index for this id
    #[inline]
    pub fn shard_index(self, shard_count: usize) -> usize {
        self.0.rem_euclid(shard_count as i64) as usize
    }
}

impl std::fmt::Display for IpId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for IpId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

// =============================================================================
// Principal
// =============================================================================

/// Opaque, already-authenticated caller identity.
///
/// The registry never looks inside a principal; it only compares two of them
/// for equality. The one structural rule is that a principal is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Principal(String);

impl Principal {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() {
            return Err(Error::InvalidPrincipal(
                "principal must not be empty".to_string(),
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Principal {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Principal {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Principal> for String {
    fn from(principal: Principal) -> Self {
        principal.0
    }
}

// =============================================================================
// IP Record
// =============================================================================

/// A single registered IP claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IpRecord {
    pub id: IpId,
    /// Only this principal may transfer the record or change its status
    pub owner: Principal,
    pub title: String,
    pub description: String,
    pub creation_date: Timestamp,
    /// Always equal to `creation_date`
    pub registration_date: Timestamp,
    pub expiration_date: Timestamp,
    pub is_active: bool,
}

impl IpRecord {
    /// Create a freshly registered, active record
    pub fn new(
        id: IpId,
        owner: Principal,
        title: String,
        description: String,
        now: Timestamp,
        expiration_date: Timestamp,
    ) -> Self {
        Self {
            id,
            owner,
            title,
            description,
            creation_date: now,
            registration_date: now,
            expiration_date,
            is_active: true,
        }
    }

    /// Exact-match ownership check
    #[inline]
    pub fn is_owned_by(&self, principal: &Principal) -> bool {
        self.owner == *principal
    }

    /// Whether `expiration_date` has been reached at `now`.
    ///
    /// Purely comparative: the registry never deactivates a record on its own.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expiration_date <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_rejects_empty() {
        assert!(Principal::new("").is_err());
        assert!(Principal::try_from("").is_err());
        assert_eq!(Principal::new("alice").unwrap().as_str(), "alice");
    }

    #[test]
    fn test_principal_deserialize_validates() {
        let ok: Principal = serde_json::from_str("\"bob\"").unwrap();
        assert_eq!(ok.as_str(), "bob");
        assert!(serde_json::from_str::<Principal>("\"\"").is_err());
    }

    #[test]
    fn test_id_shard_index() {
        assert_eq!(IpId::new(1).shard_index(64), 1);
        assert_eq!(IpId::new(65).shard_index(64), 1);
        assert_eq!(IpId::new(64).shard_index(64), 0);
        assert_eq!(IpId::new(-1).shard_index(64), 63);
        assert_eq!(IpId::new(0).shard_index(64), 0);
    }

    #[test]
    fn test_record_fields_and_expiry() {
        let owner = Principal::new("alice").unwrap();
        let record = IpRecord::new(
            IpId::new(1),
            owner.clone(),
            "Patent X".into(),
            "A widget".into(),
            1_000,
            5_000,
        );

        assert!(record.is_active);
        assert_eq!(record.creation_date, record.registration_date);
        assert!(record.is_owned_by(&owner));
        assert!(!record.is_owned_by(&Principal::new("alice2").unwrap()));
        assert!(!record.is_expired_at(4_999));
        assert!(record.is_expired_at(5_000));
    }

    #[test]
    fn test_record_serializes_kebab_case() {
        let record = IpRecord::new(
            IpId::new(3),
            Principal::new("alice").unwrap(),
            "T".into(),
            "D".into(),
            10,
            20,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["owner"], "alice");
        assert_eq!(json["creation-date"], 10);
        assert_eq!(json["expiration-date"], 20);
        assert_eq!(json["is-active"], true);
    }
}
