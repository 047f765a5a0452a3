//! Locator resolution
//!
//! A locator is the string identifying which conversation/agent to connect
//! to. Three shapes are accepted:
//!
//! - a bare identifier (`"abc123"`), which is the target id as-is;
//! - an absolute URL with `targetId` and optional `shareKey` query parameters;
//! - a malformed string that still contains `targetId=`/`shareKey=`
//!   substrings, recovered by pattern extraction.
//!
//! Resolution is pure and deterministic: no I/O, no panics, `None` on
//! irrecoverable input.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::config::ConnectionConfig;

// Fallback patterns for locators that fail structured URL parsing
static TARGET_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"targetId=([^\s&?#]+)").unwrap());
static SHARE_KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"shareKey=([^\s&?#]+)").unwrap());

/// Resolve a locator into connection credentials
///
/// `default_credential` is used whenever the locator does not carry a
/// `shareKey` override. Returns `None` for a missing/empty locator or when no
/// non-empty credential can be produced.
///
/// # Examples
///
/// ```rust
/// use voxdesk_voice_session::locator::resolve;
///
/// let config = resolve(Some("abc123"), "public-key").unwrap();
/// assert_eq!(config.target_id, "abc123");
/// assert_eq!(config.credential, "public-key");
///
/// let config = resolve(Some("https://h/x?targetId=ID&shareKey=KEY"), "public-key").unwrap();
/// assert_eq!(config.target_id, "ID");
/// assert_eq!(config.credential, "KEY");
///
/// assert!(resolve(None, "public-key").is_none());
/// ```
pub fn resolve(locator: Option<&str>, default_credential: &str) -> Option<ConnectionConfig> {
    let raw = locator?.trim();
    if raw.is_empty() {
        return None;
    }

    // A bare identifier carries no scheme, no query, and no embedded
    // parameter text; it is the target id itself.
    let structured = raw.contains("://")
        || raw.contains('?')
        || raw.contains("targetId=")
        || raw.contains("shareKey=");
    if !structured {
        return finish(raw.to_string(), None, default_credential);
    }

    if let Ok(parsed) = Url::parse(raw) {
        let mut target_id = None;
        let mut share_key = None;
        for (key, value) in parsed.query_pairs() {
            match key.as_ref() {
                "targetId" => target_id = Some(value.into_owned()),
                "shareKey" => share_key = Some(value.into_owned()),
                _ => {}
            }
        }
        // Best effort: with no extractable targetId the original locator
        // string stands in for it.
        let target_id = target_id.filter(|t| !t.is_empty()).unwrap_or_else(|| raw.to_string());
        return finish(target_id, share_key, default_credential);
    }

    // Malformed URL: recover the same two parameters from the raw string.
    let target_id = TARGET_ID_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| raw.to_string());
    let share_key = SHARE_KEY_RE
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());
    finish(target_id, share_key, default_credential)
}

fn finish(
    target_id: String,
    share_key: Option<String>,
    default_credential: &str,
) -> Option<ConnectionConfig> {
    let credential = share_key
        .filter(|k| !k.is_empty())
        .unwrap_or_else(|| default_credential.to_string());
    let config = ConnectionConfig {
        target_id,
        credential,
    };
    config.is_valid().then_some(config)
}
