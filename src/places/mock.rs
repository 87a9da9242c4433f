//! Sample facilities served when no usable API key is configured or every
//! provider query failed.

use crate::places::{LatLng, PlaceRecord};

struct MockFacility {
    id: &'static str,
    name: &'static str,
    address: &'static str,
    d_lat: f64,
    d_lng: f64,
    rating: f64,
    ratings_total: u32,
    price_level: u8,
    types: &'static [&'static str],
}

const MOCK_PLACES: &[MockFacility] = &[
    MockFacility {
        id: "mock_1",
        name: "大江戸温泉物語",
        address: "東京都江東区青海2-6-3",
        d_lat: 0.01,
        d_lng: 0.01,
        rating: 4.2,
        ratings_total: 1250,
        price_level: 3,
        types: &["spa", "tourist_attraction"],
    },
    MockFacility {
        id: "mock_2",
        name: "湯乃泉 草加健康センター",
        address: "埼玉県草加市北谷2-24-1",
        d_lat: -0.02,
        d_lng: 0.015,
        rating: 4.5,
        ratings_total: 890,
        price_level: 2,
        types: &["spa", "health"],
    },
    MockFacility {
        id: "mock_3",
        name: "桜湯",
        address: "東京都台東区谷中3-10-5",
        d_lat: 0.005,
        d_lng: -0.01,
        rating: 4.0,
        ratings_total: 420,
        price_level: 1,
        types: &["spa"],
    },
];

/// Three fixed facilities positioned around `center`.
pub fn mock_places(center: LatLng) -> Vec<PlaceRecord> {
    MOCK_PLACES
        .iter()
        .map(|facility| PlaceRecord {
            place_id: facility.id.to_string(),
            name: facility.name.to_string(),
            formatted_address: facility.address.to_string(),
            location: center.offset(facility.d_lat, facility.d_lng),
            rating: Some(facility.rating),
            user_ratings_total: Some(facility.ratings_total),
            price_level: Some(facility.price_level),
            types: facility.types.iter().map(|t| t.to_string()).collect(),
            vicinity: Some(facility.address.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::places::is_bathhouse_related;

    #[test]
    fn test_mock_places_shape() {
        let center = LatLng::new(35.6812, 139.7671);
        let places = mock_places(center);

        assert_eq!(places.len(), 3);
        assert_eq!(places[0].place_id, "mock_1");
        assert_eq!(places[1].name, "湯乃泉 草加健康センター");
        assert_eq!(places[2].price_level, Some(1));
        assert!((places[0].location.lat - 35.6912).abs() < 1e-9);
        assert!((places[1].location.lng - 139.7821).abs() < 1e-9);
    }

    #[test]
    fn test_mock_places_pass_classifier() {
        for place in mock_places(LatLng::new(35.0, 139.0)) {
            assert!(is_bathhouse_related(&place), "{} rejected", place.name);
        }
    }
}
