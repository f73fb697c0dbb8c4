//! Stable entity keys
//!
//! Keys are pure functions of source URLs so the same fighter, event or bout
//! gets the same key in every run.
//!
//! # Key forms
//! ```text
//! fighter:f4c49976c75c5ab2            http://ufcstats.com/fighter-details/f4c49976c75c5ab2
//! event:~3f9a0c1d22e07b41             any other URL: first 16 hex of sha256(normalized URL)
//! bout:6420efac0578988b+a1b2+c3d4+3   composite: event id, fighter ids, ordinal
//! ```
//! The three forms never overlap: URL ids contain neither `~` nor `+`.

use serde::Serialize;
use std::collections::HashMap;
use url::Url;

use ufcstats_common::checksum::sha256_hex;
use ufcstats_common::{PipelineError, Result};

use crate::coerce::{clean_text, is_missing_token};

/// Host the short `<kind>:<id>` form is reserved for
pub const SOURCE_HOST: &str = "ufcstats.com";

const BASE_URL: &str = "http://ufcstats.com/";

/// Hex digits kept from the URL hash
const HASH_PREFIX_LEN: usize = 16;

/// Placeholder for an absent component of a composite key
const ABSENT_COMPONENT: &str = "_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Fighter,
    Event,
    Bout,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Fighter => "fighter",
            EntityKind::Event => "event",
            EntityKind::Bout => "bout",
        }
    }

    /// Path segment of this kind's detail page on the source site
    pub fn page_segment(&self) -> &'static str {
        match self {
            EntityKind::Fighter => "fighter-details",
            EntityKind::Event => "event-details",
            EntityKind::Bout => "fight-details",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A derived entity key, e.g. `fighter:f4c49976c75c5ab2`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StableKey(String);

impl StableKey {
    fn new(kind: EntityKind, ident: &str) -> Self {
        Self(format!("{}:{}", kind, ident))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part after `<kind>:`
    pub fn ident(&self) -> &str {
        self.0.split_once(':').map(|(_, id)| id).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for StableKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalize a source URL to `host/path`
///
/// Drops scheme, `www.`, query, fragment and trailing slashes. Relative URLs
/// are resolved against the source site. Returns `None` for a missing token.
pub fn normalize_url(raw: &str) -> Option<String> {
    let cleaned = clean_text(raw);
    if is_missing_token(&cleaned) {
        return None;
    }

    // a bare host parses as a relative path
    let lower = cleaned.to_ascii_lowercase();
    let host = lower.strip_prefix("www.").unwrap_or(&lower);
    let cleaned = match host.strip_prefix(SOURCE_HOST) {
        Some(rest) if rest.starts_with('/') => format!("http://{}", cleaned),
        _ => cleaned,
    };

    let parsed = match Url::parse(&cleaned) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(BASE_URL).and_then(|base| base.join(&cleaned)).ok()
        },
        Err(_) => None,
    };

    let normalized = match parsed.as_ref().and_then(|u| u.host_str().map(|h| (h, u.path()))) {
        Some((host, path)) => {
            let host = host.strip_prefix("www.").unwrap_or(host);
            format!("{}{}", host, path.trim_end_matches('/'))
        },
        None => normalize_manually(&cleaned),
    };
    Some(normalized)
}

/// Fallback for strings `url` refuses to parse
fn normalize_manually(cleaned: &str) -> String {
    let without_scheme = cleaned
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(cleaned);
    let end = without_scheme.find(['?', '#']).unwrap_or(without_scheme.len());
    let trimmed = without_scheme[..end].trim_end_matches('/');

    let (host, path) = trimmed.split_at(trimmed.find('/').unwrap_or(trimmed.len()));
    let host = host.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    format!("{}{}", host, path)
}

fn is_url_ident(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Key for an already normalized URL
pub fn key_for_normalized(kind: EntityKind, normalized: &str) -> StableKey {
    let segments: Option<(&str, &str)> = normalized.split_once('/');
    if let Some((SOURCE_HOST, path)) = segments {
        if let Some((page, id)) = path.split_once('/') {
            if page == kind.page_segment() && is_url_ident(id) {
                return StableKey::new(kind, id);
            }
        }
    }

    let digest = sha256_hex(normalized.as_bytes());
    StableKey::new(kind, &format!("~{}", &digest[..HASH_PREFIX_LEN]))
}

/// Derive the key of an entity from its source URL
///
/// Returns `None` when the URL is absent in the source.
pub fn derive_key(kind: EntityKind, raw_url: &str) -> Option<StableKey> {
    normalize_url(raw_url).map(|n| key_for_normalized(kind, &n))
}

/// Composite key for a bout with no usable URL
///
/// `bout:<event id>+<fighter_1 id>+<fighter_2 id>+<ordinal>`; fighter order is
/// kept as listed.
pub fn composite_bout_key(
    event: Option<&StableKey>,
    fighter_1: Option<&StableKey>,
    fighter_2: Option<&StableKey>,
    ordinal: Option<i64>,
) -> StableKey {
    let part = |k: Option<&StableKey>| k.map(|k| k.ident().to_string());
    let components = [
        part(event),
        part(fighter_1),
        part(fighter_2),
        ordinal.map(|o| o.to_string()),
    ];
    let ident = components
        .iter()
        .map(|c| c.as_deref().unwrap_or(ABSENT_COMPONENT))
        .collect::<Vec<_>>()
        .join("+");
    StableKey::new(EntityKind::Bout, &ident)
}

/// Run-local record of every key issued for one entity kind
///
/// Checks both directions: one identity must always get the same key, and
/// one key must never be issued to two identities. Either failure aborts the
/// run with [`PipelineError::KeyCollision`].
#[derive(Debug)]
pub struct KeyRegistry {
    kind: EntityKind,
    by_identity: HashMap<String, StableKey>,
    by_key: HashMap<StableKey, String>,
}

impl KeyRegistry {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            by_identity: HashMap::new(),
            by_key: HashMap::new(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    /// Record that `identity` maps to `key`
    pub fn register(&mut self, identity: &str, key: &StableKey) -> Result<()> {
        if let Some(existing) = self.by_identity.get(identity) {
            if existing != key {
                return Err(self.collision(existing, identity, key.as_str()));
            }
            return Ok(());
        }
        if let Some(owner) = self.by_key.get(key) {
            if owner != identity {
                return Err(self.collision(key, owner, identity));
            }
        }

        self.by_identity.insert(identity.to_string(), key.clone());
        self.by_key.insert(key.clone(), identity.to_string());
        Ok(())
    }

    /// Derive and register the key for a raw URL
    pub fn derive(&mut self, raw_url: &str) -> Result<Option<StableKey>> {
        let Some(normalized) = normalize_url(raw_url) else {
            return Ok(None);
        };
        let key = key_for_normalized(self.kind, &normalized);
        self.register(&normalized, &key)?;
        Ok(Some(key))
    }

    fn collision(&self, key: &StableKey, first: &str, second: &str) -> PipelineError {
        PipelineError::KeyCollision {
            kind: self.kind.to_string(),
            key: key.to_string(),
            first: first.to_string(),
            second: second.to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_normalize_strips_noise() {
        let expected = Some("ufcstats.com/fighter-details/f4c49976c75c5ab2".to_string());
        assert_eq!(
            normalize_url("http://ufcstats.com/fighter-details/f4c49976c75c5ab2"),
            expected
        );
        assert_eq!(
            normalize_url("https://www.UFCStats.com/fighter-details/f4c49976c75c5ab2/?tab=1#top"),
            expected
        );
        assert_eq!(
            normalize_url(" /fighter-details/f4c49976c75c5ab2/ "),
            expected
        );
        assert_eq!(normalize_url("--"), None);
        assert_eq!(normalize_url(""), None);
    }

    #[test]
    fn test_normalize_host_without_scheme() {
        let expected = Some("ufcstats.com/fighter-details/f4c49976c75c5ab2".to_string());
        assert_eq!(normalize_url("ufcstats.com/fighter-details/f4c49976c75c5ab2"), expected);
        assert_eq!(normalize_url("www.ufcstats.com/fighter-details/f4c49976c75c5ab2/"), expected);

        let bare = derive_key(EntityKind::Fighter, "ufcstats.com/fighter-details/f4c49976c75c5ab2");
        let full = derive_key(
            EntityKind::Fighter,
            "http://ufcstats.com/fighter-details/f4c49976c75c5ab2",
        );
        assert_eq!(bare, full);
        assert_eq!(bare.unwrap().as_str(), "fighter:f4c49976c75c5ab2");
    }

    #[test]
    fn test_url_form_keys() {
        let key = derive_key(
            EntityKind::Fighter,
            "http://ufcstats.com/fighter-details/f4c49976c75c5ab2",
        )
        .unwrap();
        assert_eq!(key.as_str(), "fighter:f4c49976c75c5ab2");
        assert_eq!(key.ident(), "f4c49976c75c5ab2");

        let key = derive_key(EntityKind::Bout, "http://ufcstats.com/fight-details/abc123").unwrap();
        assert_eq!(key.as_str(), "bout:abc123");
    }

    #[test]
    fn test_unexpected_shape_falls_back_to_hash() {
        // event URL handed to the fighter kind
        let key = derive_key(EntityKind::Fighter, "http://ufcstats.com/event-details/abc").unwrap();
        assert!(key.as_str().starts_with("fighter:~"));
        assert_eq!(key.ident().len(), HASH_PREFIX_LEN + 1);

        let key = derive_key(EntityKind::Event, "http://mirror.example/event-details/abc").unwrap();
        assert!(key.as_str().starts_with("event:~"));
    }

    #[test]
    fn test_composite_bout_key() {
        let event = derive_key(EntityKind::Event, "http://ufcstats.com/event-details/e1").unwrap();
        let f1 = derive_key(EntityKind::Fighter, "http://ufcstats.com/fighter-details/a").unwrap();
        let key = composite_bout_key(Some(&event), Some(&f1), None, Some(3));
        assert_eq!(key.as_str(), "bout:e1+a+_+3");

        let swapped = composite_bout_key(Some(&event), None, Some(&f1), Some(3));
        assert_ne!(key, swapped);
    }

    #[test]
    fn test_registry_accepts_repeat_registration() {
        let mut registry = KeyRegistry::new(EntityKind::Fighter);
        let a = registry.derive("http://ufcstats.com/fighter-details/a").unwrap();
        let b = registry.derive("http://ufcstats.com/fighter-details/a/").unwrap();
        assert_eq!(a, b);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.derive("--").unwrap(), None);
    }

    #[test]
    fn test_registry_detects_two_identities_one_key() {
        let mut registry = KeyRegistry::new(EntityKind::Event);
        let key = StableKey::new(EntityKind::Event, "x");
        registry.register("ufcstats.com/event-details/x", &key).unwrap();
        let err = registry.register("ufcstats.com/event-details/y", &key).unwrap_err();
        assert!(matches!(err, PipelineError::KeyCollision { .. }));
        assert!(err.is_run_fatal());
    }

    #[test]
    fn test_registry_detects_one_identity_two_keys() {
        let mut registry = KeyRegistry::new(EntityKind::Event);
        registry
            .register("ufcstats.com/event-details/x", &StableKey::new(EntityKind::Event, "x"))
            .unwrap();
        let err = registry
            .register("ufcstats.com/event-details/x", &StableKey::new(EntityKind::Event, "z"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::KeyCollision { .. }));
    }

    proptest! {
        #[test]
        fn prop_derive_is_pure(id in "[a-f0-9]{16}", slash in proptest::bool::ANY) {
            let url = format!("http://ufcstats.com/fighter-details/{}{}", id, if slash { "/" } else { "" });
            let first = derive_key(EntityKind::Fighter, &url);
            let second = derive_key(EntityKind::Fighter, &url);
            prop_assert_eq!(first.clone(), second);
            let first = first.unwrap();
            prop_assert_eq!(first.ident(), id.as_str());
        }

        #[test]
        fn prop_distinct_urls_get_distinct_keys(
            ids in proptest::collection::hash_set("[A-Za-z0-9]{1,12}", 1..40),
        ) {
            let mut registry = KeyRegistry::new(EntityKind::Event);
            let mut keys = HashSet::new();
            for (i, id) in ids.iter().enumerate() {
                // mix URL-form and hash-form inputs
                let url = if i % 2 == 0 {
                    format!("http://ufcstats.com/event-details/{}", id)
                } else {
                    format!("http://ufcstats.com/event-details/{}/extra", id)
                };
                let key = registry.derive(&url).unwrap().unwrap();
                prop_assert!(keys.insert(key));
            }
        }
    }
}
