//! Cache key helpers
//!
//! Pure functions producing the key formats used across the crate.

/// Prefix of search result set keys.
pub const SEARCH_PREFIX: &str = "places_search";
/// Prefix of single place detail keys.
pub const PLACE_DETAILS_PREFIX: &str = "place_details";

/// Key of a nearby search result set.
///
/// Coordinates are rendered at their natural precision (shortest
/// round-trip form), never rounded: callers that want cache hits must pass
/// identical values.
///
/// ```
/// use sento_search::cache::search_key;
/// assert_eq!(
///     search_key(35.7148, 139.7967, 10_000, Some("サウナ")),
///     "places_search:35.7148,139.7967,10000,サウナ"
/// );
/// ```
pub fn search_key(lat: f64, lng: f64, radius: u32, keyword: Option<&str>) -> String {
    format!(
        "{SEARCH_PREFIX}:{lat},{lng},{radius},{}",
        keyword.unwrap_or("")
    )
}

/// Key of a single place's details.
pub fn place_details_key(place_id: &str) -> String {
    compose_key(PLACE_DETAILS_PREFIX, &[place_id])
}

/// Generic `prefix:part1:part2` key.
pub fn compose_key(prefix: &str, parts: &[&str]) -> String {
    let mut key = String::from(prefix);
    key.push(':');
    key.push_str(&parts.join(":"));
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_key_format() {
        assert_eq!(
            search_key(35.6812, 139.7671, 5000, None),
            "places_search:35.6812,139.7671,5000,"
        );
        assert_eq!(
            search_key(35.0, -139.5, 10000, Some("銭湯")),
            "places_search:35,-139.5,10000,銭湯"
        );
    }

    #[test]
    fn test_search_key_is_deterministic() {
        let a = search_key(35.68123456789, 139.7, 1000, Some("spa"));
        let b = search_key(35.68123456789, 139.7, 1000, Some("spa"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_search_keys_distinguish_inputs() {
        let base = search_key(35.6812, 139.7671, 5000, None);
        assert_ne!(base, search_key(35.6813, 139.7671, 5000, None));
        assert_ne!(base, search_key(35.6812, 139.7672, 5000, None));
        assert_ne!(base, search_key(35.6812, 139.7671, 5001, None));
        assert_ne!(base, search_key(35.6812, 139.7671, 5000, Some("湯")));
        // Full precision is kept
        assert_ne!(
            search_key(35.000001, 139.0, 1, None),
            search_key(35.000002, 139.0, 1, None)
        );
    }

    #[test]
    fn test_place_details_key() {
        assert_eq!(place_details_key("ChIJ123"), "place_details:ChIJ123");
    }

    #[test]
    fn test_compose_key() {
        assert_eq!(compose_key("image", &["a", "b"]), "image:a:b");
    }
}
