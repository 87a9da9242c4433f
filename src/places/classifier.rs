//! Facility classifier
//!
//! Decides whether a place is a bathhouse, onsen or sauna facility. Places
//! APIs file gyms, clinics and massage parlours under the same categories
//! ("spa"), so results are screened in four ordered stages:
//!
//! 1. high-priority include keywords (unambiguous, short-circuit to `true`)
//! 2. exclude keywords (`false`)
//! 3. medium-priority include keywords (`true`)
//! 4. place types: blocked types `false`, allowed types `true`
//!
//! Anything left over is rejected. Keyword tables live in [`ClassifierRules`]
//! and can be tuned without touching the stage order.

use std::path::Path;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::places::PlaceRecord;

// == Keyword Tables ==
const HIGH_PRIORITY_INCLUDE: &[&str] = &[
    "銭湯",
    "温泉",
    "サウナ",
    "スーパー銭湯",
    "健康ランド",
    "health land",
    "sauna",
    "onsen",
    "sento",
];

const EXCLUDE: &[&str] = &[
    "フィットネス",
    "fitness",
    "gym",
    "ジム",
    "エニタイム",
    "ライザップ",
    "ゴールドジム",
    "マッサージ店",
    "エステ",
    "ネイル",
    "美容室",
    "病院",
    "クリニック",
    "整骨院",
    "接骨院",
    "学校",
    "博物館",
    "美術館",
    "図書館",
];

const MEDIUM_PRIORITY_INCLUDE: &[&str] = &[
    "湯",
    "風呂",
    "浴場",
    "bath",
    "入浴",
    "湯屋",
    "岩盤浴",
    "露天風呂",
    "大浴場",
    "スパ",
    "spa",
];

const BLOCKED_TYPES: &[&str] = &["gym", "fitness_center", "beauty_salon"];

const ALLOWED_TYPES: &[&str] = &["spa", "health", "sauna", "public_bath"];

static DEFAULT_CLASSIFIER: LazyLock<Classifier> = LazyLock::new(Classifier::default);

// == Rules ==
/// Keyword and type tables driving the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierRules {
    pub high_priority_include: Vec<String>,
    pub exclude: Vec<String>,
    pub medium_priority_include: Vec<String>,
    pub blocked_types: Vec<String>,
    pub allowed_types: Vec<String>,
}

impl Default for ClassifierRules {
    fn default() -> Self {
        fn owned(list: &[&str]) -> Vec<String> {
            list.iter().map(|s| s.to_string()).collect()
        }

        Self {
            high_priority_include: owned(HIGH_PRIORITY_INCLUDE),
            exclude: owned(EXCLUDE),
            medium_priority_include: owned(MEDIUM_PRIORITY_INCLUDE),
            blocked_types: owned(BLOCKED_TYPES),
            allowed_types: owned(ALLOWED_TYPES),
        }
    }
}

impl ClassifierRules {
    /// Reads rules from a JSON file. Missing tables fall back to defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}

// == Classifier ==
/// Stateless predicate built from a set of [`ClassifierRules`].
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: ClassifierRules,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ClassifierRules::default())
    }
}

impl Classifier {
    /// Builds a classifier; keywords are lowercased for matching.
    pub fn new(rules: ClassifierRules) -> Self {
        fn lowered(list: Vec<String>) -> Vec<String> {
            list.into_iter()
                .map(|keyword| keyword.to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect()
        }

        Self {
            rules: ClassifierRules {
                high_priority_include: lowered(rules.high_priority_include),
                exclude: lowered(rules.exclude),
                medium_priority_include: lowered(rules.medium_priority_include),
                blocked_types: rules.blocked_types,
                allowed_types: rules.allowed_types,
            },
        }
    }

    pub fn rules(&self) -> &ClassifierRules {
        &self.rules
    }

    pub fn is_bathhouse_related(&self, place: &PlaceRecord) -> bool {
        let name = place.name.to_lowercase();
        let address = place.formatted_address.to_lowercase();
        let mentions = |keywords: &[String]| {
            keywords
                .iter()
                .any(|k| name.contains(k.as_str()) || address.contains(k.as_str()))
        };

        if mentions(&self.rules.high_priority_include) {
            return true;
        }
        if mentions(&self.rules.exclude) {
            return false;
        }
        if mentions(&self.rules.medium_priority_include) {
            return true;
        }

        let has_any = |types: &[String]| types.iter().any(|t| place.has_type(t));
        if has_any(&self.rules.blocked_types) {
            return false;
        }
        has_any(&self.rules.allowed_types)
    }
}

/// Classifies with the built-in keyword tables.
pub fn is_bathhouse_related(place: &PlaceRecord) -> bool {
    DEFAULT_CLASSIFIER.is_bathhouse_related(place)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::places::LatLng;
    use proptest::prelude::*;

    fn place(name: &str, types: &[&str]) -> PlaceRecord {
        PlaceRecord {
            place_id: format!("id-{name}"),
            name: name.to_string(),
            formatted_address: "東京都台東区".to_string(),
            location: LatLng::new(35.7, 139.8),
            rating: None,
            user_ratings_total: None,
            price_level: None,
            types: types.iter().map(|t| t.to_string()).collect(),
            vicinity: None,
        }
    }

    #[test]
    fn test_high_priority_keyword_includes() {
        assert!(is_bathhouse_related(&place("大黒銭湯", &[])));
        assert!(is_bathhouse_related(&place("Yuzu ONSEN House", &[])));
    }

    #[test]
    fn test_high_priority_short_circuits_exclude() {
        assert!(is_bathhouse_related(&place("大黒銭湯フィットネス", &["gym"])));
    }

    #[test]
    fn test_exclude_beats_medium_priority() {
        assert!(!is_bathhouse_related(&place("エニタイムフィットネス湯", &["spa"])));
        assert!(!is_bathhouse_related(&place("エステサロン スパ", &[])));
    }

    #[test]
    fn test_medium_priority_includes() {
        assert!(is_bathhouse_related(&place("松の湯", &[])));
        assert!(is_bathhouse_related(&place("Grand Bath Tokyo", &[])));
    }

    #[test]
    fn test_keywords_match_address() {
        let mut p = place("Sakura", &[]);
        p.formatted_address = "Hakone Onsen, Kanagawa".to_string();
        assert!(is_bathhouse_related(&p));
    }

    #[test]
    fn test_type_fallback() {
        assert!(is_bathhouse_related(&place("Zen Retreat", &["spa"])));
        assert!(is_bathhouse_related(&place("Tokyo Relax", &["public_bath"])));
        assert!(!is_bathhouse_related(&place("Body Works", &["spa", "gym"])));
        assert!(!is_bathhouse_related(&place("Hair Lounge", &["beauty_salon"])));
    }

    #[test]
    fn test_default_excludes_unknown() {
        assert!(!is_bathhouse_related(&place("中央図書館", &["library"])));
        assert!(!is_bathhouse_related(&place("Coffee Stand", &["cafe"])));
        assert!(!is_bathhouse_related(&place("Thai Massage", &["massage"])));
    }

    #[test]
    fn test_custom_rules_are_lowercased() {
        let rules = ClassifierRules {
            high_priority_include: vec!["Kurhaus".to_string()],
            ..ClassifierRules::default()
        };
        let classifier = Classifier::new(rules);

        assert!(classifier.is_bathhouse_related(&place("kurhaus gym", &[])));
        assert_eq!(classifier.rules().high_priority_include, vec!["kurhaus"]);
    }

    #[test]
    fn test_rules_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.json");
        std::fs::write(&path, r#"{"exclude": ["カフェ"]}"#).unwrap();

        let rules = ClassifierRules::from_json_file(&path).unwrap();
        assert_eq!(rules.exclude, vec!["カフェ"]);
        assert_eq!(rules.allowed_types, ClassifierRules::default().allowed_types);

        let classifier = Classifier::new(rules);
        // "ジム" is no longer excluded, so the medium keyword wins
        assert!(classifier.is_bathhouse_related(&place("ジムの湯", &[])));
        assert!(!classifier.is_bathhouse_related(&place("カフェ湯", &[])));
    }

    proptest! {
        #[test]
        fn prop_classifier_is_deterministic(
            name in "[a-zA-Z 湯銭サウナジムスパ]{0,20}",
            types in prop::collection::vec(
                prop::sample::select(vec!["spa", "gym", "health", "cafe", "library"]),
                0..4
            )
        ) {
            let p = place(&name, &types);
            prop_assert_eq!(is_bathhouse_related(&p), is_bathhouse_related(&p.clone()));
        }
    }
}
