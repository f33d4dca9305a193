//! The map source consumed by extraction and analysis.

use parking_lot::Mutex;
use portalmap_model::{Error, ErrorKind, MapDetail, MapSummary, Result, SpaceId};
use serde_json::Value;
use std::collections::HashMap;

/// Lists a space's maps and fetches a map's document.
///
/// Calls block until the remote answers. Implementations own retry/backoff
/// and the space-id encoding required by the remote API, and report failures
/// as `remote_unavailable`, `unauthenticated`, `not_found` or `schema_error`.
pub trait MapFetcher: Send + Sync {
    fn list_maps(&self, space_id: &SpaceId) -> Result<Vec<MapSummary>>;

    fn fetch_map(&self, space_id: &SpaceId, map_id: &str) -> Result<MapDetail>;
}

impl<T: MapFetcher + ?Sized> MapFetcher for &T {
    fn list_maps(&self, space_id: &SpaceId) -> Result<Vec<MapSummary>> {
        (**self).list_maps(space_id)
    }

    fn fetch_map(&self, space_id: &SpaceId, map_id: &str) -> Result<MapDetail> {
        (**self).fetch_map(space_id, map_id)
    }
}

impl<T: MapFetcher + ?Sized> MapFetcher for Box<T> {
    fn list_maps(&self, space_id: &SpaceId) -> Result<Vec<MapSummary>> {
        (**self).list_maps(space_id)
    }

    fn fetch_map(&self, space_id: &SpaceId, map_id: &str) -> Result<MapDetail> {
        (**self).fetch_map(space_id, map_id)
    }
}

enum Entry {
    Document(Value),
    Failure(ErrorKind, String),
}

/// Fixed set of map documents held in memory (offline analysis, tests).
///
/// Maps are listed in insertion order. Every `fetch_map` call is recorded.
#[derive(Default)]
pub struct InMemoryFetcher {
    listing: Vec<MapSummary>,
    entries: HashMap<String, Entry>,
    list_failure: Option<(ErrorKind, String)>,
    fetched: Mutex<Vec<String>>,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listed map whose fetch returns `document`.
    pub fn with_map(mut self, map_id: &str, document: Value) -> Self {
        self.listing.push(MapSummary::new(map_id));
        self.entries
            .insert(map_id.to_string(), Entry::Document(document));
        self
    }

    /// Add a listed map whose fetch fails with `kind`.
    pub fn with_failing_map(mut self, map_id: &str, kind: ErrorKind, cause: &str) -> Self {
        self.listing.push(MapSummary::new(map_id));
        self.entries
            .insert(map_id.to_string(), Entry::Failure(kind, cause.to_string()));
        self
    }

    /// Make `list_maps` fail with `kind`.
    pub fn with_list_failure(mut self, kind: ErrorKind, cause: &str) -> Self {
        self.list_failure = Some((kind, cause.to_string()));
        self
    }

    /// Map ids passed to `fetch_map`, in call order.
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().clone()
    }
}

impl MapFetcher for InMemoryFetcher {
    fn list_maps(&self, _space_id: &SpaceId) -> Result<Vec<MapSummary>> {
        match &self.list_failure {
            Some((kind, cause)) => Err(Error::from_kind(*kind, None, cause.clone())),
            None => Ok(self.listing.clone()),
        }
    }

    fn fetch_map(&self, _space_id: &SpaceId, map_id: &str) -> Result<MapDetail> {
        self.fetched.lock().push(map_id.to_string());
        match self.entries.get(map_id) {
            Some(Entry::Document(doc)) => MapDetail::from_document(map_id, doc.clone()),
            Some(Entry::Failure(kind, cause)) => {
                Err(Error::from_kind(*kind, Some(map_id), cause.clone()))
            }
            None => Err(Error::not_found(Some(map_id), "no such map")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lists_in_insertion_order_and_records_fetches() {
        let fetcher = InMemoryFetcher::new()
            .with_map("B", json!({"objects": []}))
            .with_failing_map("A", ErrorKind::NotFound, "gone");
        let space = SpaceId::new("s");

        let ids: Vec<_> = fetcher
            .list_maps(&space)
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["B", "A"]);

        assert_eq!(fetcher.fetch_map(&space, "B").unwrap().id, "B");
        let err = fetcher.fetch_map(&space, "A").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.map_id(), Some("A"));
        assert_eq!(fetcher.fetched(), vec!["B", "A"]);
    }

    #[test]
    fn boxed_fetcher_delegates() {
        let boxed: Box<dyn MapFetcher> = Box::new(
            InMemoryFetcher::new().with_list_failure(ErrorKind::Unauthenticated, "401"),
        );
        let err = boxed.list_maps(&SpaceId::new("s")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    }
}
