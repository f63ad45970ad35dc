use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rayon::prelude::*;

use super::topk::BoundedTopK;
use super::{MatchError, MatchRecord};
use crate::catalog::{BrandId, Catalog, ColorKey};
use crate::color::{round2, Color, Lab};
use crate::delta_e::ciede2000;

pub const DEFAULT_TOP_K: usize = 5;
pub const DEFAULT_PROGRESS_EVERY: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankConfig {
    /// Matches kept per (source color, target brand).
    pub top_k: usize,
    /// Source colors between progress lines inside one brand; 0 disables.
    pub progress_every: usize,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }
}

/// Rank the top five cross-brand matches of every catalog color.
pub fn rank_matches(catalog: &Catalog) -> Result<Vec<MatchRecord>, MatchError> {
    rank_matches_with(catalog, &RankConfig::default())
}

/// Brute-force CIEDE2000 ranking over the full catalog snapshot.
///
/// Work proceeds one source brand at a time; within a brand every source
/// color is scored independently on the rayon pool and its rows are merged
/// after the brand completes. Scores are compared at full precision and
/// rounded only when written into a [`MatchRecord`]. The output is checked
/// with [`validate`] before it is returned, so callers never see a
/// partially ranked set.
pub fn rank_matches_with(
    catalog: &Catalog,
    config: &RankConfig,
) -> Result<Vec<MatchRecord>, MatchError> {
    let labs = prepare(catalog)?;
    let colors = catalog.colors();
    let partitions = catalog.partitions();
    let started = Instant::now();
    let mut matches = Vec::new();

    for (position, source_brand) in partitions.iter().enumerate() {
        let targets: Vec<&[usize]> = partitions
            .iter()
            .filter(|p| p.brand_id != source_brand.brand_id)
            .map(|p| p.members.as_slice())
            .collect();

        let finished = AtomicUsize::new(0);
        let total = source_brand.members.len();
        let per_source: Vec<Vec<MatchRecord>> = source_brand
            .members
            .par_iter()
            .map(|&source| {
                let source_key = colors[source].key();
                let mut rows = Vec::with_capacity(targets.len() * config.top_k);
                for members in &targets {
                    let mut top = BoundedTopK::new(config.top_k);
                    for &candidate in *members {
                        top.offer(ciede2000(labs[source], labs[candidate]), candidate);
                    }
                    for (rank, scored) in top.into_sorted_vec().into_iter().enumerate() {
                        rows.push(MatchRecord {
                            source_color_id: source_key.clone(),
                            match_color_id: colors[scored.index].key(),
                            delta_e_score: round2(scored.score),
                            rank: (rank + 1) as u32,
                        });
                    }
                }
                let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
                if progress_due(done, total, config.progress_every) {
                    tracing::info!(
                        brand = %source_brand.brand_id,
                        done,
                        total,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "ranking source colors"
                    );
                }
                rows
            })
            .collect();

        let emitted: usize = per_source.iter().map(Vec::len).sum();
        matches.extend(per_source.into_iter().flatten());
        tracing::info!(
            brand = %source_brand.brand_id,
            progress = %format!("{}/{}", position + 1, partitions.len()),
            sources = source_brand.members.len(),
            emitted,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ranked source brand"
        );
    }

    validate(catalog, &matches, config.top_k)?;
    Ok(matches)
}

/// Whether the `done`-th finished source of `total` gets a progress line.
/// The last source is left to the per-brand summary.
fn progress_due(done: usize, total: usize, every: usize) -> bool {
    every > 0 && done < total && done % every == 0
}

/// Full-precision Lab for every record, re-derived from its hex.
///
/// A record whose hex no longer parses, or whose stored RGB disagrees with
/// its hex, fails the whole run: one bad value would skew every comparison
/// it takes part in.
fn prepare(catalog: &Catalog) -> Result<Vec<Lab>, MatchError> {
    catalog
        .colors()
        .par_iter()
        .map(|record| {
            let color = Color::from_hex(&record.attributes.hex).map_err(|source| {
                MatchError::InvalidColor {
                    key: record.key(),
                    source,
                }
            })?;
            let stored = record.attributes.rgb();
            if color != stored {
                return Err(MatchError::DataIntegrity(format!(
                    "{} stores rgb {stored} but hex {}",
                    record.key(),
                    record.attributes.hex
                )));
            }
            Ok(color.to_lab())
        })
        .collect()
}

/// Check a ranked set against the catalog it was computed from.
///
/// Every (source, target brand) group must hold `min(top_k, brand size)`
/// rows with ranks `1..=n`, non-decreasing scores and no same-brand or
/// repeated edges.
pub fn validate(catalog: &Catalog, matches: &[MatchRecord], top_k: usize) -> Result<(), MatchError> {
    let integrity = |msg: String| Err(MatchError::DataIntegrity(msg));

    let brand_sizes: HashMap<&BrandId, usize> = catalog
        .partitions()
        .into_iter()
        .map(|p| (p.brand_id, p.members.len()))
        .collect();

    let mut edges = HashSet::with_capacity(matches.len());
    let mut groups: HashMap<(&ColorKey, &BrandId), Vec<&MatchRecord>> = HashMap::new();
    for m in matches {
        if &m.source_color_id.brand_id == m.match_brand() {
            return integrity(format!("{} matched within its own brand", m.source_color_id));
        }
        if !edges.insert((&m.source_color_id, &m.match_color_id)) {
            return integrity(format!(
                "duplicate edge {} -> {}",
                m.source_color_id, m.match_color_id
            ));
        }
        if !(m.delta_e_score >= 0.0) {
            return integrity(format!(
                "{} -> {} has score {}",
                m.source_color_id, m.match_color_id, m.delta_e_score
            ));
        }
        groups
            .entry((&m.source_color_id, m.match_brand()))
            .or_default()
            .push(m);
    }

    for ((source, brand), mut group) in groups {
        let expected = top_k.min(brand_sizes.get(brand).copied().unwrap_or(0));
        if group.len() != expected {
            return integrity(format!(
                "{source} has {} matches in {brand}, expected {expected}",
                group.len()
            ));
        }
        group.sort_by_key(|m| m.rank);
        for (want, m) in (1u32..).zip(&group) {
            if m.rank != want {
                return integrity(format!(
                    "{source} -> {brand}: rank {} where {want} was expected",
                    m.rank
                ));
            }
        }
        if group
            .windows(2)
            .any(|pair| pair[1].delta_e_score < pair[0].delta_e_score)
        {
            return integrity(format!("{source} -> {brand}: scores decrease with rank"));
        }
    }

    let expected_rows: usize = catalog
        .colors()
        .iter()
        .map(|c| {
            brand_sizes
                .iter()
                .filter(|(brand, _)| **brand != &c.brand_id)
                .map(|(_, size)| top_k.min(*size))
                .sum::<usize>()
        })
        .sum();
    if matches.len() != expected_rows {
        return integrity(format!(
            "{} match rows, expected {expected_rows}",
            matches.len()
        ));
    }

    Ok(())
}
