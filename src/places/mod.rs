//! Places Module
//!
//! Facility records, the bathhouse classifier, the progressive search
//! aggregator and the search façade built on top of them.

mod aggregator;
mod classifier;
mod http_client;
mod mock;
mod provider;
mod record;
mod service;

pub use aggregator::{AggregateOutcome, MergedPlaces, ProgressFn, QueryPlan, SearchAggregator};
pub use classifier::{is_bathhouse_related, Classifier, ClassifierRules};
pub use http_client::HttpPlacesClient;
pub use mock::mock_places;
pub use provider::{NearbyRequest, PlacesProvider, TextRequest};
pub use record::{DisplayName, LatLng, PlaceRecord, RawLocation, RawPlace, RawPriceLevel};
pub use service::{
    validate_api_key, ApiKeyValidation, PlacesService, MOCK_RADIUS_M, PLACEHOLDER_API_KEY,
    RESULT_TTL,
};
