//! The vault store — a concurrency-safe map from reference to `Record`.
//!
//! The map sits behind an `RwLock` that is only ever held for lookups,
//! inserts and removals.  Everything that decides a record's fate runs
//! under that record's own mutex (see `redemption`), so retrievals of
//! different references never wait on each other and password hashing
//! never blocks the map.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use crate::crypto::{Argon2Params, PasswordVerifier};
use crate::errors::{LockitError, Result};

use super::record::{CreateOptions, Record, RecordState};
use super::redemption::{self, Delivery};
use super::reference;
use super::ttl::Liveness;

/// Returned by `VaultStore::create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub reference: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Non-consuming view of a live record, returned by `VaultStore::peek`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeekStatus {
    pub password_required: bool,
    pub burn_after_reading: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// The in-memory message vault.
///
/// Owned by whoever starts the process and shared by `Arc`; there is
/// no global instance.
pub struct VaultStore {
    records: RwLock<HashMap<String, Arc<Record>>>,
    argon2_params: Argon2Params,
}

impl VaultStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create an empty store whose password verifiers use `argon2_params`.
    pub fn new(argon2_params: Argon2Params) -> Result<Self> {
        argon2_params.validate()?;
        Ok(Self {
            records: RwLock::new(HashMap::new()),
            argon2_params,
        })
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Store `payload` and return its freshly issued reference.
    pub fn create(&self, payload: Vec<u8>, options: CreateOptions<'_>) -> Result<Receipt> {
        self.create_at(payload, options, Utc::now())
    }

    /// `create` with an explicit creation time.
    pub fn create_at(
        &self,
        payload: Vec<u8>,
        options: CreateOptions<'_>,
        now: DateTime<Utc>,
    ) -> Result<Receipt> {
        if payload.is_empty() {
            return Err(LockitError::Validation("payload cannot be empty".into()));
        }

        let expires_at = match options.ttl {
            Some(ttl) if ttl <= chrono::Duration::zero() => {
                return Err(LockitError::Validation("ttl must be positive".into()));
            }
            Some(ttl) => Some(now.checked_add_signed(ttl).ok_or_else(|| {
                LockitError::Validation("ttl is out of range".into())
            })?),
            None => None,
        };

        // Hash before taking the map lock; Argon2 is deliberately slow.
        let verifier = options
            .password
            .map(|secret| PasswordVerifier::new(secret, &self.argon2_params))
            .transpose()?;

        let mut records = self.write();
        let reference = loop {
            let candidate = reference::generate();
            if !records.contains_key(&candidate) {
                break candidate;
            }
        };

        let record = Record::new(
            reference.clone(),
            payload,
            now,
            expires_at,
            options.burn_after_reading,
            verifier,
        );
        records.insert(reference.clone(), Arc::new(record));
        drop(records);

        tracing::debug!(
            reference = reference::redacted(&reference),
            burn_after_reading = options.burn_after_reading,
            password_gated = options.password.is_some(),
            expires_at = ?expires_at,
            "message stored"
        );

        Ok(Receipt {
            reference,
            expires_at,
        })
    }

    /// Redeem `reference`, optionally presenting the gate secret.
    ///
    /// This is the only mutating read.  See `redemption::redeem` for the
    /// decision procedure.
    pub fn retrieve(&self, reference: &str, secret: Option<&[u8]>) -> Result<Delivery> {
        self.retrieve_at(reference, secret, Utc::now())
    }

    /// `retrieve` evaluated at an explicit time.
    pub fn retrieve_at(
        &self,
        reference: &str,
        secret: Option<&[u8]>,
        now: DateTime<Utc>,
    ) -> Result<Delivery> {
        let record = self.lookup(reference).ok_or(LockitError::NotFound)?;

        let outcome = redemption::redeem(&record, secret, now);

        let state = record.state();
        if state.is_terminal() {
            self.reclaim(&record);
        }

        match &outcome {
            Ok(delivery) => tracing::debug!(
                reference = reference::redacted(reference),
                view_count = delivery.view_count,
                consumed = state == RecordState::Consumed,
                "message delivered"
            ),
            Err(e) => tracing::debug!(
                reference = reference::redacted(reference),
                error = %e,
                "retrieval refused"
            ),
        }

        outcome
    }

    /// Report whether `reference` resolves to a live, pending record.
    ///
    /// Never counts as a view and never changes state; an expired record
    /// simply reports `NotFound` and is left for the sweep.
    pub fn peek(&self, reference: &str) -> Result<PeekStatus> {
        self.peek_at(reference, Utc::now())
    }

    /// `peek` evaluated at an explicit time.
    pub fn peek_at(&self, reference: &str, now: DateTime<Utc>) -> Result<PeekStatus> {
        let record = self.lookup(reference).ok_or(LockitError::NotFound)?;
        if record.state() != RecordState::Pending || record.liveness(now) == Liveness::Expired {
            return Err(LockitError::NotFound);
        }
        Ok(PeekStatus {
            password_required: record.password_required(),
            burn_after_reading: record.burn_after_reading(),
            created_at: record.created_at(),
            expires_at: record.expires_at(),
        })
    }

    // ------------------------------------------------------------------
    // Reclamation
    // ------------------------------------------------------------------

    /// Expire overdue records and drop every terminal one from the map.
    ///
    /// Returns the number of records reclaimed.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Utc::now())
    }

    /// `sweep` evaluated at an explicit time.
    pub fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        // Snapshot first; record locks are only taken once the map guard is gone.
        let snapshot: Vec<Arc<Record>> = self.read().values().cloned().collect();

        // Settle each under its own lock so a concurrent retrieval either
        // finishes first or sees the record expired.
        let dead: Vec<Arc<Record>> = snapshot.into_iter().filter(|r| r.settle(now)).collect();
        if dead.is_empty() {
            return 0;
        }

        let mut records = self.write();
        let mut reclaimed = 0;
        for record in &dead {
            if Self::remove_locked(&mut records, record) {
                reclaimed += 1;
            }
        }
        drop(records);

        tracing::debug!(reclaimed, "sweep finished");
        reclaimed
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Number of records physically held, including terminal records not
    /// yet reclaimed.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if no records are held.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn lookup(&self, reference: &str) -> Option<Arc<Record>> {
        self.read().get(reference).cloned()
    }

    fn reclaim(&self, record: &Arc<Record>) {
        Self::remove_locked(&mut self.write(), record);
    }

    /// Remove `record` only if the map still holds that exact record.
    fn remove_locked(records: &mut HashMap<String, Arc<Record>>, record: &Arc<Record>) -> bool {
        let same = records
            .get(record.reference())
            .is_some_and(|current| Arc::ptr_eq(current, record));
        if same {
            records.remove(record.reference());
        }
        same
    }

    // The map holds no invariant that a panicking holder could break
    // halfway, so a poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Arc<Record>>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Arc<Record>>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for VaultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultStore")
            .field("records", &self.len())
            .field("argon2_params", &self.argon2_params)
            .finish()
    }
}
