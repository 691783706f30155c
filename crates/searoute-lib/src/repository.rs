//! Port repository interface and the in-process implementation.
//!
//! The repository is a thin adapter with no business logic: lookup by
//! UN/LOCODE, ranked text search, and radius search. When backed by the
//! in-process index, all three operate on immutable snapshots; a
//! database-backed implementation would issue equivalent queries behind the
//! same trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::catalog::PortCatalog;
use crate::error::{Error, Result};
use crate::geo::Position;
use crate::port::{Port, PortStatus, PortType};
use crate::spatial::{PortDistance, SpatialPortIndex};
use crate::vessel::VesselType;

/// Minimum text query length.
pub const MIN_QUERY_LEN: usize = 2;
/// Hard cap on search results.
pub const MAX_SEARCH_RESULTS: usize = 100;

/// Options for [`PortRepository::search`].
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Maximum results; clamped to [`MAX_SEARCH_RESULTS`].
    pub limit: usize,
    /// Restrict to a single ISO country code.
    pub country: Option<String>,
    /// Restrict to ports that serve this vessel class.
    pub vessel_type_compatible: Option<VesselType>,
    /// Include inactive ports in results.
    pub include_inactive: bool,
}

/// A search hit with its relevance score in (0, 1].
#[derive(Debug, Clone)]
pub struct PortMatch {
    pub port: Arc<Port>,
    pub relevance: f64,
}

/// Abstract port store consumed by the coordinator and the HTTP surface.
#[async_trait]
pub trait PortRepository: Send + Sync {
    /// Lookup by exact UN/LOCODE.
    async fn get(&self, code: &str) -> Result<Arc<Port>>;

    /// Ranked text search over codes and names.
    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<PortMatch>>;

    /// Ports within `radius_nm` of a point, ascending by distance.
    async fn nearby(
        &self,
        lat: f64,
        lon: f64,
        radius_nm: f64,
        limit: usize,
    ) -> Result<Vec<PortDistance>>;
}

/// Repository over the in-memory catalog and spatial index.
pub struct InMemoryPortRepository {
    catalog: Arc<PortCatalog>,
    index: Arc<SpatialPortIndex>,
}

impl InMemoryPortRepository {
    pub fn new(catalog: Arc<PortCatalog>) -> Self {
        let index = Arc::new(SpatialPortIndex::build(&catalog));
        Self { catalog, index }
    }

    pub fn catalog(&self) -> &Arc<PortCatalog> {
        &self.catalog
    }

    pub fn index(&self) -> &Arc<SpatialPortIndex> {
        &self.index
    }
}

#[async_trait]
impl PortRepository for InMemoryPortRepository {
    async fn get(&self, code: &str) -> Result<Arc<Port>> {
        self.catalog.get(code).cloned().ok_or_else(|| Error::PortNotFound {
            code: code.to_string(),
            suggestions: self.catalog.fuzzy_matches(code, 3),
        })
    }

    async fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<PortMatch>> {
        let query = query.trim();
        if query.len() < MIN_QUERY_LEN {
            return Err(Error::validation(format!(
                "search query must be at least {MIN_QUERY_LEN} characters"
            )));
        }
        let limit = if options.limit == 0 {
            MAX_SEARCH_RESULTS
        } else {
            options.limit.min(MAX_SEARCH_RESULTS)
        };

        let mut matches: Vec<PortMatch> = self
            .catalog
            .iter()
            .filter(|port| options.include_inactive || port.status != PortStatus::Inactive)
            .filter(|port| {
                options
                    .country
                    .as_deref()
                    .map(|country| port.country.eq_ignore_ascii_case(country))
                    .unwrap_or(true)
            })
            .filter(|port| {
                options
                    .vessel_type_compatible
                    .map(|vessel_type| serves_vessel_type(port, vessel_type))
                    .unwrap_or(true)
            })
            .filter_map(|port| {
                relevance(port, query).map(|relevance| PortMatch {
                    port: port.clone(),
                    relevance,
                })
            })
            .collect();

        matches.sort_by(|a, b| {
            b.relevance
                .total_cmp(&a.relevance)
                .then_with(|| b.port.berth_count.cmp(&a.port.berth_count))
                .then_with(|| a.port.name.cmp(&b.port.name))
        });
        matches.truncate(limit);
        Ok(matches)
    }

    async fn nearby(
        &self,
        lat: f64,
        lon: f64,
        radius_nm: f64,
        limit: usize,
    ) -> Result<Vec<PortDistance>> {
        let origin = Position::new(lat, lon);
        if !origin.is_valid() {
            return Err(Error::validation(format!(
                "coordinates out of range: ({lat}, {lon})"
            )));
        }
        if !radius_nm.is_finite() || radius_nm <= 0.0 {
            return Err(Error::validation("radius_nm must be positive"));
        }
        Ok(self
            .index
            .within_radius(origin, radius_nm, limit.min(MAX_SEARCH_RESULTS)))
    }
}

/// Relevance tiers: exact UN/LOCODE, name prefix, name substring, then
/// similarity. Scores are layered so a lower tier can never outrank a
/// higher one.
fn relevance(port: &Port, query: &str) -> Option<f64> {
    let code_query = query.to_uppercase();
    let name = port.name.to_lowercase();
    let needle = query.to_lowercase();

    if port.code == code_query {
        return Some(1.0);
    }
    if name.starts_with(&needle) {
        return Some(0.9);
    }
    if name.contains(&needle) {
        return Some(0.75);
    }
    let similarity = strsim::jaro_winkler(&needle, &name)
        .max(strsim::jaro_winkler(&code_query, &port.code));
    (similarity >= 0.7).then_some(similarity * 0.7)
}

fn serves_vessel_type(port: &Port, vessel_type: VesselType) -> bool {
    match port.port_type {
        PortType::Multipurpose => true,
        PortType::Container => matches!(vessel_type, VesselType::Container | VesselType::RoRo),
        PortType::Bulk => matches!(vessel_type, VesselType::Bulk | VesselType::GeneralCargo),
        PortType::Tanker => matches!(vessel_type, VesselType::Tanker | VesselType::Lng),
        PortType::Passenger | PortType::Fishing => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::SeaArea;
    use crate::test_helpers::sample_port;

    fn repository() -> InMemoryPortRepository {
        let mut rotterdam = sample_port("NLRTM", 51.95, 4.14, SeaArea::NorthAtlantic);
        rotterdam.name = "Rotterdam".to_string();
        rotterdam.berth_count = 80;
        let mut antwerp = sample_port("BEANR", 51.28, 4.33, SeaArea::NorthAtlantic);
        antwerp.name = "Antwerp".to_string();
        antwerp.berth_count = 60;
        let mut singapore = sample_port("SGSIN", 1.2644, 103.84, SeaArea::Indian);
        singapore.name = "Singapore".to_string();
        singapore.berth_count = 90;
        let mut closed = sample_port("SGCLS", 1.30, 103.90, SeaArea::Indian);
        closed.name = "Singapore Old Basin".to_string();
        closed.status = PortStatus::Inactive;
        let mut bulk_only = sample_port("NLAMS", 52.40, 4.85, SeaArea::NorthAtlantic);
        bulk_only.name = "Amsterdam Bulk Terminal".to_string();
        bulk_only.port_type = PortType::Bulk;

        let catalog = PortCatalog::from_ports(
            [rotterdam, antwerp, singapore, closed, bulk_only],
            1,
        )
        .unwrap();
        InMemoryPortRepository::new(Arc::new(catalog))
    }

    #[tokio::test]
    async fn get_returns_port_or_suggestions() {
        let repo = repository();
        let port = repo.get("NLRTM").await.unwrap();
        assert_eq!(port.name, "Rotterdam");

        let err = repo.get("NLRTX").await.unwrap_err();
        match err {
            Error::PortNotFound { code, suggestions } => {
                assert_eq!(code, "NLRTX");
                assert!(suggestions.contains(&"NLRTM".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn exact_code_match_ranks_first() {
        let repo = repository();
        let results = repo
            .search("SGSIN", &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(results[0].port.code, "SGSIN");
        assert_eq!(results[0].relevance, 1.0);
    }

    #[tokio::test]
    async fn prefix_beats_substring() {
        let repo = repository();
        let results = repo
            .search("sing", &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(results[0].port.code, "SGSIN");
        assert!(results[0].relevance >= 0.9);
    }

    #[tokio::test]
    async fn short_query_is_invalid() {
        let repo = repository();
        let err = repo.search("s", &SearchOptions::default()).await.unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[tokio::test]
    async fn inactive_ports_hidden_by_default() {
        let repo = repository();
        let results = repo
            .search("singapore", &SearchOptions::default())
            .await
            .unwrap();
        assert!(results.iter().all(|m| m.port.code != "SGCLS"));

        let with_inactive = repo
            .search(
                "singapore",
                &SearchOptions {
                    include_inactive: true,
                    ..SearchOptions::default()
                },
            )
            .await
            .unwrap();
        assert!(with_inactive.iter().any(|m| m.port.code == "SGCLS"));
    }

    #[tokio::test]
    async fn country_filter_applies() {
        let repo = repository();
        let results = repo
            .search(
                "an",
                &SearchOptions {
                    country: Some("BE".to_string()),
                    ..SearchOptions::default()
                },
            )
            .await
            .unwrap();
        assert!(results.iter().all(|m| m.port.country == "BE"));
    }

    #[tokio::test]
    async fn vessel_type_filter_applies() {
        let repo = repository();
        let results = repo
            .search(
                "amsterdam",
                &SearchOptions {
                    vessel_type_compatible: Some(VesselType::Container),
                    ..SearchOptions::default()
                },
            )
            .await
            .unwrap();
        assert!(results.is_empty(), "bulk terminal rejects container ships");
    }

    #[tokio::test]
    async fn nearby_sorts_ascending() {
        let repo = repository();
        let results = repo.nearby(51.9, 4.1, 200.0, 10).await.unwrap();
        assert!(results.len() >= 2);
        assert_eq!(results[0].port.code, "NLRTM");
        for pair in results.windows(2) {
            assert!(pair[0].distance_nm <= pair[1].distance_nm);
        }
    }

    #[tokio::test]
    async fn nearby_rejects_bad_coordinates() {
        let repo = repository();
        assert!(repo.nearby(99.0, 0.0, 100.0, 5).await.is_err());
        assert!(repo.nearby(0.0, 0.0, -5.0, 5).await.is_err());
    }
}
