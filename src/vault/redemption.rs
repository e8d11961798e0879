//! Redemption protocol — the only path that mutates a pending record.
//!
//! ```text
//!             retrieve ok + burn
//!   Pending ─────────────────────▶ Consumed
//!      │
//!      │ deadline passed (observed)
//!      ▼
//!   Expired
//! ```
//!
//! Both terminal states are absorbing and answer every later retrieval
//! with `NotFound`.  Password failures never leave `Pending`.

use chrono::{DateTime, Utc};

use crate::errors::{LockitError, Result};

use super::record::{Record, RecordSlot, RecordState};
use super::ttl::Liveness;

/// A successful retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// The payload exactly as it was stored.
    pub payload: Vec<u8>,
    /// Successful retrievals including this one.
    pub view_count: u64,
}

/// Run a retrieval against `record` at time `now`.
///
/// The verifier is immutable, so the password check runs without holding
/// the record lock.  Liveness is checked again under the lock right before
/// the transition; whichever caller gets there first wins.
pub fn redeem(record: &Record, secret: Option<&[u8]>, now: DateTime<Utc>) -> Result<Delivery> {
    ensure_pending(record, &mut record.lock(), now)?;

    if let Some(verifier) = record.verifier() {
        let secret = secret.ok_or(LockitError::PasswordRequired)?;
        if !verifier.verify(secret)? {
            return Err(LockitError::PasswordIncorrect);
        }
    }

    let mut slot = record.lock();
    ensure_pending(record, &mut slot, now)?;

    slot.view_count += 1;
    let view_count = slot.view_count;
    let payload = if record.burn_after_reading() {
        slot.consume()
    } else {
        slot.payload.to_vec()
    };

    Ok(Delivery {
        payload,
        view_count,
    })
}

/// Terminal or past-deadline records resolve to `NotFound`.
///
/// A pending record observed past its deadline is moved to `Expired`.
fn ensure_pending(record: &Record, slot: &mut RecordSlot, now: DateTime<Utc>) -> Result<()> {
    if slot.state != RecordState::Pending {
        return Err(LockitError::NotFound);
    }
    if record.liveness(now) == Liveness::Expired {
        slot.expire();
        return Err(LockitError::NotFound);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::verifier::MIN_MEMORY_KIB;
    use crate::crypto::{Argon2Params, PasswordVerifier};
    use chrono::Duration;

    fn params() -> Argon2Params {
        Argon2Params {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn record(burn: bool, password: Option<&[u8]>, expires_at: Option<DateTime<Utc>>) -> Record {
        let verifier = password.map(|p| PasswordVerifier::new(p, &params()).unwrap());
        Record::new(
            "ref".into(),
            b"ciphertext".to_vec(),
            Utc::now(),
            expires_at,
            burn,
            verifier,
        )
    }

    #[test]
    fn burn_record_is_consumed_by_first_read() {
        let r = record(true, None, None);
        let now = Utc::now();

        let d = redeem(&r, None, now).unwrap();
        assert_eq!(d.payload, b"ciphertext");
        assert_eq!(d.view_count, 1);
        assert_eq!(r.state(), RecordState::Consumed);

        assert!(matches!(redeem(&r, None, now), Err(LockitError::NotFound)));
    }

    #[test]
    fn reusable_record_counts_views() {
        let r = record(false, None, None);
        let now = Utc::now();
        assert_eq!(redeem(&r, None, now).unwrap().view_count, 1);
        assert_eq!(redeem(&r, None, now).unwrap().view_count, 2);
        assert_eq!(r.state(), RecordState::Pending);
    }

    #[test]
    fn expired_record_transitions_and_reports_not_found() {
        let now = Utc::now();
        let r = record(false, None, Some(now));
        assert!(matches!(redeem(&r, None, now), Err(LockitError::NotFound)));
        assert_eq!(r.state(), RecordState::Expired);
        assert_eq!(r.view_count(), 0);
    }

    #[test]
    fn password_failures_leave_record_pending() {
        let r = record(true, Some(b"hunter2".as_slice()), None);
        let now = Utc::now();

        assert!(matches!(
            redeem(&r, None, now),
            Err(LockitError::PasswordRequired)
        ));
        assert!(matches!(
            redeem(&r, Some(b"wrong".as_slice()), now),
            Err(LockitError::PasswordIncorrect)
        ));
        assert_eq!(r.state(), RecordState::Pending);
        assert_eq!(r.view_count(), 0);

        let d = redeem(&r, Some(b"hunter2".as_slice()), now).unwrap();
        assert_eq!(d.payload, b"ciphertext");
        assert_eq!(r.state(), RecordState::Consumed);
    }

    #[test]
    fn consumed_record_does_not_reveal_password_gate() {
        let r = record(true, Some(b"pw".as_slice()), None);
        let now = Utc::now();
        redeem(&r, Some(b"pw".as_slice()), now).unwrap();
        // Not PasswordRequired: a spent reference looks like a missing one.
        assert!(matches!(redeem(&r, None, now), Err(LockitError::NotFound)));
    }

    #[test]
    fn expired_password_record_reports_not_found_first() {
        let now = Utc::now();
        let r = record(false, Some(b"pw".as_slice()), Some(now - Duration::seconds(1)));
        assert!(matches!(redeem(&r, None, now), Err(LockitError::NotFound)));
    }
}
