//! Search aggregator
//!
//! Runs a three-phase query plan against a [`PlacesProvider`] and merges
//! the results into one deduplicated, classified list:
//!
//! - Phase 1: the nearby-by-type query, reported as soon as it lands.
//! - Phase 2: high-value text queries, one after another, each reported
//!   when it adds something new.
//! - Phase 3: the remaining text queries, issued together and reported once
//!   after all of them settle.
//!
//! Batches only ever grow: places already reported keep their position and
//! attributes. Every query is isolated; a failure or timeout costs that
//! query's results and nothing else.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, SearchError};
use crate::places::{
    Classifier, LatLng, NearbyRequest, PlaceRecord, PlacesProvider, RawPlace, TextRequest,
};

/// Progress callback invoked with the cumulative result set.
pub type ProgressFn<'a> = &'a mut (dyn FnMut(&[PlaceRecord]) + Send);

// == Query Plan ==
/// Queries issued per search. Kept as data so terms can be tuned freely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryPlan {
    /// Category types for the Phase 1 nearby query
    pub nearby_types: Vec<String>,
    /// Phase 2 text queries, run sequentially in order
    pub priority_queries: Vec<String>,
    /// Phase 3 text queries, run concurrently
    pub remaining_queries: Vec<String>,
    /// Bias radius for text queries, in metres
    pub text_bias_radius_m: u32,
    /// Per-call result cap
    pub max_results: u32,
    /// Deadline for each individual query, in milliseconds
    pub query_timeout_ms: u64,
}

impl Default for QueryPlan {
    fn default() -> Self {
        Self {
            nearby_types: vec!["spa".to_string()],
            priority_queries: ["銭湯", "温泉", "サウナ"].map(String::from).to_vec(),
            remaining_queries: ["スパ", "湯", "風呂"].map(String::from).to_vec(),
            text_bias_radius_m: 10_000,
            max_results: 10,
            query_timeout_ms: 5_000,
        }
    }
}

impl QueryPlan {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

// == Outcome ==
/// Final merged list plus per-query bookkeeping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateOutcome {
    pub places: Vec<PlaceRecord>,
    /// Queries that returned a response (possibly empty)
    pub succeeded: usize,
    /// Queries that errored or timed out
    pub failed: usize,
}

impl AggregateOutcome {
    /// True when queries ran and every one of them failed.
    pub fn all_failed(&self) -> bool {
        self.succeeded == 0 && self.failed > 0
    }
}

// == Merged Results ==
/// Insertion-ordered, first-wins set of places keyed by `place_id`.
#[derive(Debug, Default)]
pub struct MergedPlaces {
    seen: HashSet<String>,
    places: Vec<PlaceRecord>,
}

impl MergedPlaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends unseen places and returns how many were new.
    pub fn extend(&mut self, batch: impl IntoIterator<Item = PlaceRecord>) -> usize {
        let before = self.places.len();
        for place in batch {
            if self.seen.insert(place.place_id.clone()) {
                self.places.push(place);
            }
        }
        self.places.len() - before
    }

    pub fn as_slice(&self) -> &[PlaceRecord] {
        &self.places
    }

    pub fn len(&self) -> usize {
        self.places.len()
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    pub fn into_vec(self) -> Vec<PlaceRecord> {
        self.places
    }
}

/// Reports batches to the caller, remembering the size last reported.
struct Progress<'a> {
    callback: Option<ProgressFn<'a>>,
    reported: Option<usize>,
}

impl<'a> Progress<'a> {
    fn report(&mut self, places: &[PlaceRecord]) {
        if let Some(callback) = self.callback.as_deref_mut() {
            callback(places);
            self.reported = Some(places.len());
        }
    }

    /// Emits the final set unless the last report already showed it.
    fn finish(&mut self, places: &[PlaceRecord]) {
        if self.reported != Some(places.len()) {
            self.report(places);
        }
    }
}

// == Aggregator ==
#[derive(Clone)]
pub struct SearchAggregator {
    provider: Arc<dyn PlacesProvider>,
    classifier: Arc<Classifier>,
    plan: QueryPlan,
}

impl SearchAggregator {
    pub fn new(
        provider: Arc<dyn PlacesProvider>,
        classifier: Arc<Classifier>,
        plan: QueryPlan,
    ) -> Self {
        Self {
            provider,
            classifier,
            plan,
        }
    }

    /// Runs every phase and returns the merged, classified result.
    ///
    /// A non-empty `keyword` is passed to the nearby query and also run as
    /// the first Phase 2 text query.
    pub async fn aggregate(
        &self,
        location: LatLng,
        radius_m: u32,
        keyword: Option<&str>,
        on_progress: Option<ProgressFn<'_>>,
    ) -> AggregateOutcome {
        let keyword = keyword.map(str::trim).filter(|k| !k.is_empty());
        let mut merged = MergedPlaces::new();
        let mut progress = Progress {
            callback: on_progress,
            reported: None,
        };
        let mut succeeded = 0;
        let mut failed = 0;

        // Phase 1
        let nearby = NearbyRequest {
            center: location,
            radius_m,
            included_types: self.plan.nearby_types.clone(),
            keyword: keyword.map(str::to_string),
            max_results: self.plan.max_results,
        };
        match self.with_timeout(self.provider.search_nearby(&nearby)).await {
            Ok(raw) => {
                succeeded += 1;
                let added = merged.extend(self.classify(raw));
                if added > 0 {
                    info!("Phase 1 (nearby): {} places", merged.len());
                    progress.report(merged.as_slice());
                }
            }
            Err(e) => {
                failed += 1;
                warn!("Nearby search failed: {}", e);
            }
        }

        // Phase 2
        let mut priority: Vec<&str> = Vec::with_capacity(self.plan.priority_queries.len() + 1);
        if let Some(keyword) = keyword {
            priority.push(keyword);
        }
        for query in &self.plan.priority_queries {
            if !priority.contains(&query.as_str()) {
                priority.push(query);
            }
        }

        for query in priority {
            match self.text_query(location, query).await {
                Ok(raw) => {
                    succeeded += 1;
                    let added = merged.extend(self.classify(raw));
                    if added > 0 {
                        info!("Phase 2 \"{}\": {} places so far", query, merged.len());
                        progress.report(merged.as_slice());
                    }
                }
                Err(e) => {
                    failed += 1;
                    warn!("Text search \"{}\" failed: {}", query, e);
                }
            }
        }

        // Phase 3
        let remaining: Vec<&str> = self
            .plan
            .remaining_queries
            .iter()
            .map(String::as_str)
            .filter(|q| Some(*q) != keyword)
            .collect();
        let settled = join_all(
            remaining
                .iter()
                .map(|query| async move { (*query, self.text_query(location, query).await) }),
        )
        .await;

        let mut phase3_added = 0;
        for (query, result) in settled {
            match result {
                Ok(raw) => {
                    succeeded += 1;
                    phase3_added += merged.extend(self.classify(raw));
                }
                Err(e) => {
                    failed += 1;
                    warn!("Text search \"{}\" failed: {}", query, e);
                }
            }
        }
        if phase3_added > 0 {
            progress.report(merged.as_slice());
        }

        let outcome = AggregateOutcome {
            places: merged.into_vec(),
            succeeded,
            failed,
        };
        // On total failure the caller decides what the final batch is
        if !outcome.all_failed() {
            progress.finish(&outcome.places);
        }

        info!(
            "Search finished: {} places ({} queries ok, {} failed)",
            outcome.places.len(),
            succeeded,
            failed
        );

        outcome
    }

    async fn text_query(&self, center: LatLng, query: &str) -> Result<Vec<RawPlace>> {
        let request = TextRequest {
            query: query.to_string(),
            center,
            bias_radius_m: self.plan.text_bias_radius_m,
            max_results: self.plan.max_results,
        };
        self.with_timeout(self.provider.search_text(&request)).await
    }

    async fn with_timeout<F>(&self, query: F) -> Result<Vec<RawPlace>>
    where
        F: std::future::Future<Output = Result<Vec<RawPlace>>>,
    {
        let limit = self.plan.query_timeout();
        match tokio::time::timeout(limit, query).await {
            Ok(result) => result,
            Err(_) => Err(SearchError::Timeout(limit)),
        }
    }

    fn classify(&self, raw: Vec<RawPlace>) -> Vec<PlaceRecord> {
        raw.into_iter()
            .filter_map(PlaceRecord::from_raw)
            .filter(|place| self.classifier.is_bathhouse_related(place))
            .collect()
    }
}
