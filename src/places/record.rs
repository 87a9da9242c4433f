//! Place records
//!
//! The normalized facility shape used throughout the crate, and the raw
//! provider shape it is built from.

use serde::{Deserialize, Serialize};

// == Coordinates ==
/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Returns a copy shifted by the given degree offsets.
    pub fn offset(&self, d_lat: f64, d_lng: f64) -> Self {
        Self::new(self.lat + d_lat, self.lng + d_lng)
    }

    /// Describes the first out-of-range coordinate, if any.
    pub fn range_error(&self) -> Option<&'static str> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Some("lat must be between -90 and 90");
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Some("lng must be between -180 and 180");
        }
        None
    }
}

// == Place Record ==
/// A bathhouse-or-similar facility. Identity is `place_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceRecord {
    pub place_id: String,
    pub name: String,
    pub formatted_address: String,
    pub location: LatLng,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ratings_total: Option<u32>,
    /// 1 (inexpensive) ..= 4 (very expensive)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_level: Option<u8>,
    #[serde(default)]
    pub types: Vec<String>,
    /// First segment of the address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vicinity: Option<String>,
}

impl PlaceRecord {
    /// Normalizes a provider record. Records without an id are dropped.
    pub fn from_raw(raw: RawPlace) -> Option<Self> {
        let place_id = raw.id.filter(|id| !id.trim().is_empty())?;
        let name = raw
            .display_name
            .map(DisplayName::into_text)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Unknown".to_string());
        let formatted_address = raw.formatted_address.unwrap_or_default();
        let vicinity = formatted_address
            .split(',')
            .next()
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .map(str::to_string);
        let location = raw
            .location
            .map(|loc| LatLng::new(loc.latitude, loc.longitude))
            .unwrap_or_default();

        Some(Self {
            place_id,
            name,
            formatted_address,
            location,
            rating: raw.rating.filter(|r| *r > 0.0),
            user_ratings_total: raw.user_rating_count.filter(|n| *n > 0),
            price_level: raw.price_level.and_then(RawPriceLevel::level),
            types: raw.types,
            vicinity,
        })
    }

    /// Human-readable admission price range for the price level.
    pub fn price_range_label(&self) -> &'static str {
        match self.price_level {
            Some(1) => "¥500-¥800",
            Some(2) => "¥800-¥1,500",
            Some(3) => "¥1,500-¥3,000",
            Some(4) => "¥3,000以上",
            _ => "料金不明",
        }
    }

    pub fn has_type(&self, place_type: &str) -> bool {
        self.types.iter().any(|t| t == place_type)
    }
}

// == Raw Provider Shape ==
/// A place as returned by the places-search capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPlace {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<DisplayName>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub location: Option<RawLocation>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_rating_count: Option<u32>,
    #[serde(default)]
    pub price_level: Option<RawPriceLevel>,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Display name, either localized (`{"text": ...}`) or a bare string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayName {
    Localized {
        text: String,
        #[serde(default, rename = "languageCode", skip_serializing_if = "Option::is_none")]
        language_code: Option<String>,
    },
    Plain(String),
}

impl DisplayName {
    pub fn into_text(self) -> String {
        match self {
            DisplayName::Localized { text, .. } => text,
            DisplayName::Plain(text) => text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Price level, numeric or a `PRICE_LEVEL_*` name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawPriceLevel {
    Level(u8),
    Named(String),
}

impl RawPriceLevel {
    /// Maps to 1..=4; free or unknown levels yield `None`.
    pub fn level(self) -> Option<u8> {
        match self {
            RawPriceLevel::Level(level) if (1..=4).contains(&level) => Some(level),
            RawPriceLevel::Level(_) => None,
            RawPriceLevel::Named(name) => match name.as_str() {
                "PRICE_LEVEL_INEXPENSIVE" => Some(1),
                "PRICE_LEVEL_MODERATE" => Some(2),
                "PRICE_LEVEL_EXPENSIVE" => Some(3),
                "PRICE_LEVEL_VERY_EXPENSIVE" => Some(4),
                _ => None,
            },
        }
    }
}
