//! Share links: `<reference>#<key>`.
//!
//! The key rides in the fragment so that, when the link is pasted into a
//! browser as `https://host/m/<reference>#<key>`, it is never sent to any
//! server.  A link without a fragment addresses a raw (unencrypted by the
//! CLI) message.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use zeroize::Zeroizing;

use crate::crypto::encryption::KEY_LEN;
use crate::errors::{LockitError, Result};
use crate::vault::reference;

/// A parsed share link.
pub struct ShareLink {
    pub reference: String,
    pub key: Option<Zeroizing<Vec<u8>>>,
}

impl ShareLink {
    /// Parse a bare `<reference>[#<key>]` or a URL ending in one.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let (locator, fragment) = match input.split_once('#') {
            Some((locator, fragment)) => (locator, Some(fragment)),
            None => (input, None),
        };

        let reference = locator
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default();
        if !reference::is_well_formed(reference) {
            return Err(LockitError::InvalidLink(format!(
                "'{reference}' is not a message reference"
            )));
        }

        let key = match fragment {
            None | Some("") => None,
            Some(encoded) => {
                let key = Zeroizing::new(URL_SAFE_NO_PAD.decode(encoded).map_err(|_| {
                    LockitError::InvalidLink("key is not valid base64url".into())
                })?);
                if key.len() != KEY_LEN {
                    return Err(LockitError::InvalidLink(format!(
                        "key must be {KEY_LEN} bytes (got {})",
                        key.len()
                    )));
                }
                Some(key)
            }
        };

        Ok(Self {
            reference: reference.to_string(),
            key,
        })
    }

    /// Render `reference` and an optional key as a share link.
    pub fn format(reference: &str, key: Option<&[u8]>) -> String {
        match key {
            Some(key) => format!("{reference}#{}", URL_SAFE_NO_PAD.encode(key)),
            None => reference.to_string(),
        }
    }
}

impl std::fmt::Debug for ShareLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareLink")
            .field("reference", &self.reference)
            .field("has_key", &self.key.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REF: &str = "AAAAAAAAAAAAAAAAAAAAAA";

    #[test]
    fn format_then_parse_keeps_reference_and_key() {
        let key = [7u8; KEY_LEN];
        let link = ShareLink::format(REF, Some(&key));
        let parsed = ShareLink::parse(&link).unwrap();
        assert_eq!(parsed.reference, REF);
        assert_eq!(parsed.key.unwrap().as_slice(), &key);
    }

    #[test]
    fn parses_full_url() {
        let key = [1u8; KEY_LEN];
        let url = format!("https://lockit.example/m/{}", ShareLink::format(REF, Some(&key)));
        let parsed = ShareLink::parse(&url).unwrap();
        assert_eq!(parsed.reference, REF);
        assert!(parsed.key.is_some());
    }

    #[test]
    fn bare_reference_has_no_key() {
        let parsed = ShareLink::parse(REF).unwrap();
        assert!(parsed.key.is_none());
        let parsed = ShareLink::parse(&format!("{REF}#")).unwrap();
        assert!(parsed.key.is_none());
    }

    #[test]
    fn rejects_bad_reference_and_key() {
        assert!(ShareLink::parse("not-a-reference").is_err());
        assert!(ShareLink::parse(&format!("{REF}#!!!")).is_err());
        assert!(ShareLink::parse(&format!("{REF}#AAAA")).is_err());
    }
}
