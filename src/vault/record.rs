//! The stored unit of the vault and its lifecycle state.
//!
//! A `Record` is immutable once written except for its `RecordSlot`,
//! which holds the state tag, the view counter and the payload behind a
//! per-record mutex.  Every mutation of a record goes through that lock.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use zeroize::{Zeroize, Zeroizing};

use crate::crypto::PasswordVerifier;

use super::ttl::{self, Liveness};

/// Lifecycle state of a record.
///
/// `Pending` is the only non-terminal state.  The only legal edges are
/// `Pending -> Consumed` and `Pending -> Expired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Pending,
    Consumed,
    Expired,
}

impl RecordState {
    /// Returns `true` for `Consumed` and `Expired`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Options accepted by `VaultStore::create`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreateOptions<'a> {
    /// Lifetime from creation; `None` means no deadline.
    pub ttl: Option<Duration>,
    /// Consume the record on its first successful retrieval.
    pub burn_after_reading: bool,
    /// Gate secret; only its verifier is stored.
    pub password: Option<&'a [u8]>,
}

/// Mutable part of a record, guarded by the record's mutex.
pub(crate) struct RecordSlot {
    pub(crate) state: RecordState,
    pub(crate) view_count: u64,
    pub(crate) payload: Zeroizing<Vec<u8>>,
}

impl RecordSlot {
    /// `Pending -> Consumed`, handing the payload to the caller.
    pub(crate) fn consume(&mut self) -> Vec<u8> {
        debug_assert_eq!(self.state, RecordState::Pending);
        self.state = RecordState::Consumed;
        std::mem::take(&mut *self.payload)
    }

    /// `Pending -> Expired`, wiping the payload.
    pub(crate) fn expire(&mut self) {
        debug_assert_eq!(self.state, RecordState::Pending);
        self.state = RecordState::Expired;
        self.payload.zeroize();
    }
}

/// A single message held by the vault.
pub struct Record {
    reference: String,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    burn_after_reading: bool,
    verifier: Option<PasswordVerifier>,
    slot: Mutex<RecordSlot>,
}

impl Record {
    pub(crate) fn new(
        reference: String,
        payload: Vec<u8>,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
        burn_after_reading: bool,
        verifier: Option<PasswordVerifier>,
    ) -> Self {
        Self {
            reference,
            created_at,
            expires_at,
            burn_after_reading,
            verifier,
            slot: Mutex::new(RecordSlot {
                state: RecordState::Pending,
                view_count: 0,
                payload: Zeroizing::new(payload),
            }),
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn burn_after_reading(&self) -> bool {
        self.burn_after_reading
    }

    pub fn password_required(&self) -> bool {
        self.verifier.is_some()
    }

    pub(crate) fn verifier(&self) -> Option<&PasswordVerifier> {
        self.verifier.as_ref()
    }

    /// Current state tag.
    pub fn state(&self) -> RecordState {
        self.lock().state
    }

    /// Number of successful retrievals so far.
    pub fn view_count(&self) -> u64 {
        self.lock().view_count
    }

    /// TTL decision for this record at `now`.
    pub fn liveness(&self, now: DateTime<Utc>) -> Liveness {
        ttl::evaluate(self.expires_at, now)
    }

    /// Acquire the per-record lock.
    ///
    /// A panic while holding the lock cannot leave the slot half-updated
    /// (each transition is a single assignment), so poisoning is ignored.
    pub(crate) fn lock(&self) -> MutexGuard<'_, RecordSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the record expired if its deadline has passed.
    ///
    /// Returns `true` when the record is terminal and can be reclaimed.
    pub(crate) fn settle(&self, now: DateTime<Utc>) -> bool {
        let mut slot = self.lock();
        if slot.state == RecordState::Pending && self.liveness(now) == Liveness::Expired {
            slot.expire();
        }
        slot.state.is_terminal()
    }
}

impl std::fmt::Debug for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record")
            .field("reference", &self.reference)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .field("burn_after_reading", &self.burn_after_reading)
            .field("password_required", &self.password_required())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
