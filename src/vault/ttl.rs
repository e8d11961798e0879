//! TTL policy — a pure function of a deadline and the current time.
//!
//! Expiry is evaluated on every access.  The background sweep only
//! reclaims memory; it is never what makes a record unredeemable.

use chrono::{DateTime, Utc};

/// Outcome of a TTL check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Expired,
}

/// Decide whether a record with deadline `expires_at` is still alive at `now`.
///
/// The deadline itself is already expired.  No deadline means alive forever.
pub fn evaluate(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Liveness {
    match expires_at {
        Some(deadline) if now >= deadline => Liveness::Expired,
        _ => Liveness::Alive,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn no_deadline_is_always_alive() {
        let far = Utc::now() + Duration::days(365 * 100);
        assert_eq!(evaluate(None, far), Liveness::Alive);
    }

    #[test]
    fn alive_just_before_deadline() {
        let deadline = Utc::now();
        assert_eq!(
            evaluate(Some(deadline), deadline - Duration::milliseconds(1)),
            Liveness::Alive
        );
    }

    #[test]
    fn expired_at_and_after_deadline() {
        let deadline = Utc::now();
        assert_eq!(evaluate(Some(deadline), deadline), Liveness::Expired);
        assert_eq!(
            evaluate(Some(deadline), deadline + Duration::milliseconds(1)),
            Liveness::Expired
        );
    }
}
