//! Entity id discovery
//!
//! The app assigns ids server-side; the harness recovers them by scanning
//! rendered links for a displayed name and taking the trailing path
//! segment of the matching href. All string-search coupling to the UI
//! lives here so the matching strategy can change without touching
//! workflow scripts.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::error::{HarnessError, HarnessResult};
use crate::session::Session;

/// Resolve an entity id by its displayed name.
///
/// Scans every link matching `link_selector` for one whose rendered text
/// contains `displayed_name` and extracts the id from its href. Ambiguity
/// is resolved in favor of the first match, mirroring the UI's own list
/// ordering.
pub async fn resolve_entity_id(
    session: &Session,
    link_selector: &str,
    displayed_name: &str,
) -> HarnessResult<String> {
    let links = session.links(link_selector).await?;
    for link in &links {
        if link.text.contains(displayed_name) {
            if let Some(id) = id_from_href(&link.href) {
                debug!(name = %displayed_name, %id, "entity resolved");
                return Ok(id);
            }
        }
    }
    Err(HarnessError::EntityNotFound(displayed_name.to_string()))
}

/// Extract the trailing path segment of an href, ignoring any query or
/// fragment. Returns None for hrefs with no usable segment.
pub fn id_from_href(href: &str) -> Option<String> {
    static SEGMENT: OnceLock<Regex> = OnceLock::new();
    let segment =
        SEGMENT.get_or_init(|| Regex::new(r"/([^/?#]+)/?(?:[?#].*)?$").expect("static regex"));
    segment
        .captures(href)
        .map(|caps| caps[1].to_string())
        .filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_trailing_segment() {
        assert_eq!(
            id_from_href("/feed/4f9a06b1-9ac9-4b8f-90d8-22d9b67a0de7"),
            Some("4f9a06b1-9ac9-4b8f-90d8-22d9b67a0de7".to_string())
        );
        assert_eq!(
            id_from_href("http://localhost:9966/project/abc123"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn ignores_query_and_fragment() {
        assert_eq!(
            id_from_href("/project/abc123?tab=settings"),
            Some("abc123".to_string())
        );
        assert_eq!(
            id_from_href("/project/abc123#deployments"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn tolerates_trailing_slash() {
        assert_eq!(id_from_href("/feed/xyz/"), Some("xyz".to_string()));
    }

    #[test]
    fn rejects_hrefs_without_a_segment() {
        assert_eq!(id_from_href(""), None);
        assert_eq!(id_from_href("#"), None);
    }
}
