pub mod nearest;
pub mod rank;
pub mod topk;

use serde::{Deserialize, Serialize};

use crate::catalog::{BrandId, Catalog, ColorKey};
use crate::color::ColorError;

pub use nearest::{nearest, nearest_hex, NearestMetric, ResolverConfig};
pub use rank::{rank_matches, rank_matches_with, RankConfig};

/// A directed cross-brand nearest-neighbor edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub source_color_id: ColorKey,
    pub match_color_id: ColorKey,
    pub delta_e_score: f64,
    /// 1-based, unique per `(source_color_id, match brand)`.
    pub rank: u32,
}

impl MatchRecord {
    pub fn match_brand(&self) -> &BrandId {
        &self.match_color_id.brand_id
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("color {key} cannot be ranked")]
    InvalidColor {
        key: ColorKey,
        #[source]
        source: ColorError,
    },
    #[error("data integrity failure: {0}")]
    DataIntegrity(String),
    #[error(
        "match table is stale: ranked {ranked} colors, catalog now holds {current} \
         with different rows (run `paintmatch rank`)"
    )]
    StaleTable { ranked: usize, current: usize },
}

/// The persisted result of one complete ranking run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchTable {
    /// Number of catalog colors the run ranked.
    pub catalog_size: usize,
    /// [`Catalog::fingerprint`] of the ranked snapshot.
    #[serde(default)]
    pub catalog_fingerprint: String,
    pub matches: Vec<MatchRecord>,
}

impl MatchTable {
    pub fn new(catalog: &Catalog, matches: Vec<MatchRecord>) -> Self {
        Self {
            catalog_size: catalog.len(),
            catalog_fingerprint: catalog.fingerprint(),
            matches,
        }
    }

    /// Fails when `catalog` is not the snapshot this table was ranked from.
    pub fn ensure_current(&self, catalog: &Catalog) -> Result<(), MatchError> {
        if self.catalog_fingerprint == catalog.fingerprint() {
            Ok(())
        } else {
            Err(MatchError::StaleTable {
                ranked: self.catalog_size,
                current: catalog.len(),
            })
        }
    }

    /// Stored matches for a color. Scoped to one brand they come back by
    /// rank; across brands they are ordered by score, then rank.
    pub fn matches_for(&self, source: &ColorKey, target_brand: Option<&BrandId>) -> Vec<&MatchRecord> {
        let mut found: Vec<&MatchRecord> = self
            .matches
            .iter()
            .filter(|m| &m.source_color_id == source)
            .filter(|m| target_brand.map_or(true, |brand| m.match_brand() == brand))
            .collect();
        found.sort_by(|a, b| {
            a.delta_e_score
                .total_cmp(&b.delta_e_score)
                .then(a.rank.cmp(&b.rank))
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::record;

    fn edge(source: &str, target: &str, score: f64, rank: u32) -> MatchRecord {
        let key = |s: &str| {
            let (brand, slug) = s.split_once('/').unwrap();
            ColorKey::new(BrandId::new(brand), slug)
        };
        MatchRecord {
            source_color_id: key(source),
            match_color_id: key(target),
            delta_e_score: score,
            rank,
        }
    }

    #[test]
    fn matches_for_filters_by_source_and_brand() {
        let table = MatchTable::new(
            &Catalog::new(),
            vec![
                edge("a/x", "b/one", 1.5, 1),
                edge("a/x", "b/two", 2.0, 2),
                edge("a/x", "c/three", 0.75, 1),
                edge("a/y", "b/one", 0.1, 1),
            ],
        );
        let source = ColorKey::new(BrandId::new("a"), "x");

        let all: Vec<&str> = table
            .matches_for(&source, None)
            .iter()
            .map(|m| m.match_color_id.slug.as_str())
            .collect();
        assert_eq!(all, vec!["three", "one", "two"]);

        let only_b: Vec<u32> = table
            .matches_for(&source, Some(&BrandId::new("b")))
            .iter()
            .map(|m| m.rank)
            .collect();
        assert_eq!(only_b, vec![1, 2]);

        assert!(table
            .matches_for(&ColorKey::new(BrandId::new("z"), "x"), None)
            .is_empty());
    }

    #[test]
    fn match_record_wire_shape() {
        let json = serde_json::to_value(edge("a/x", "b/one", 1.5, 1)).unwrap();
        assert_eq!(json["source_color_id"]["brand_id"], "a");
        assert_eq!(json["match_color_id"]["slug"], "one");
        assert_eq!(json["delta_e_score"], 1.5);
        assert_eq!(json["rank"], 1);
    }

    #[test]
    fn table_is_current_only_for_its_own_catalog() {
        let ranked = Catalog::from_records(vec![
            record("a", "red", "#ff0000"),
            record("b", "blue", "#0000ff"),
        ])
        .unwrap();
        let table = MatchTable::new(&ranked, rank_matches(&ranked).unwrap());
        assert!(table.ensure_current(&ranked).is_ok());

        let reingested = Catalog::from_records(vec![
            record("a", "red", "#ff0000"),
            record("c", "green", "#00ff00"),
            record("d", "x", "#101010"),
        ])
        .unwrap();
        let err = table.ensure_current(&reingested).unwrap_err();
        assert!(matches!(err, MatchError::StaleTable { ranked: 2, current: 3 }));
        assert!(err.to_string().contains("paintmatch rank"), "got {err}");

        // same size, different rows
        let swapped = Catalog::from_records(vec![
            record("a", "red", "#ff0000"),
            record("c", "blue", "#0000ff"),
        ])
        .unwrap();
        assert!(table.ensure_current(&swapped).is_err());
    }

    #[test]
    fn tables_without_fingerprint_are_stale() {
        let catalog = Catalog::from_records(vec![record("a", "red", "#ff0000")]).unwrap();
        let legacy: MatchTable =
            serde_json::from_str(r#"{"catalog_size": 1, "matches": []}"#).unwrap();
        assert!(legacy.ensure_current(&catalog).is_err());
    }
}
