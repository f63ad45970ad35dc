use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::slug::{slugify, SlugAllocator};
use super::{BrandId, Catalog, ColorAttributes, ColorRecord};
use crate::color::{Color, ColorError};

/// One entry of a brand's published color list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEntry {
    pub name: String,
    #[serde(default)]
    pub label: Option<String>,
    pub hex: String,
}

/// Whether a source file describes paint at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CatalogDomain {
    #[default]
    Paint,
    /// Non-paint color systems (fabric swatches, print inks, ...). Skipped.
    NonPaint,
}

/// A brand source file as delivered by the scrapers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandSource {
    pub brand_id: BrandId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: CatalogDomain,
    pub colors: Vec<RawEntry>,
}

impl BrandSource {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read brand source {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("malformed brand source {}", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EntryProblem {
    #[error(transparent)]
    Color(#[from] ColorError),
    #[error("empty name")]
    EmptyName,
}

/// A single source entry that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{brand_id} entry #{index} ({name:?}): {problem}")]
pub struct IngestWarning {
    pub brand_id: BrandId,
    pub index: usize,
    pub name: String,
    pub problem: EntryProblem,
}

/// Normalized records for one brand plus what was dropped on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub brand_id: BrandId,
    pub colors: Vec<ColorRecord>,
    pub skipped: usize,
    pub warnings: Vec<IngestWarning>,
}

/// Normalize one brand's raw entries.
///
/// Malformed entries are logged, counted and skipped; they never abort the
/// brand. Output is a pure function of the input, so re-ingesting the same
/// list yields identical slugs and derived fields.
pub fn ingest(brand_id: &BrandId, entries: &[RawEntry]) -> Ingested {
    let mut slugs = SlugAllocator::new();
    let mut colors = Vec::with_capacity(entries.len());
    let mut warnings = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        match normalize(entry, &mut slugs, brand_id) {
            Ok(record) => colors.push(record),
            Err(problem) => {
                let warning = IngestWarning {
                    brand_id: brand_id.clone(),
                    index,
                    name: entry.name.clone(),
                    problem,
                };
                tracing::warn!(%warning, "skipping catalog entry");
                warnings.push(warning);
            }
        }
    }

    Ingested {
        brand_id: brand_id.clone(),
        colors,
        skipped: warnings.len(),
        warnings,
    }
}

fn normalize(
    entry: &RawEntry,
    slugs: &mut SlugAllocator,
    brand_id: &BrandId,
) -> Result<ColorRecord, EntryProblem> {
    let name = entry.name.trim();
    if name.is_empty() {
        return Err(EntryProblem::EmptyName);
    }
    let color = Color::parse(&entry.hex)?;

    let label = entry
        .label
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty());
    let mut base = match label {
        Some(label) => slugify(&format!("{name} {label}")),
        None => slugify(name),
    };
    if base.is_empty() {
        // Names made only of punctuation still need an addressable slug.
        base = color.to_hex().trim_start_matches('#').to_string();
    }

    Ok(ColorRecord {
        brand_id: brand_id.clone(),
        name: name.to_string(),
        slug: slugs.allocate(&base),
        color_number: label.map(str::to_string),
        attributes: ColorAttributes::from_color(color),
    })
}

/// Per-brand line of an ingestion run's report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandSummary {
    pub brand_id: BrandId,
    pub ingested: usize,
    pub skipped: usize,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub brands: Vec<BrandSummary>,
    /// Sources flagged as non-paint, skipped entirely.
    pub out_of_domain: Vec<BrandId>,
}

impl IngestSummary {
    pub fn total_ingested(&self) -> usize {
        self.brands.iter().map(|b| b.ingested).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.brands.iter().map(|b| b.skipped).sum()
    }
}

/// Build a fresh catalog from every brand source.
///
/// Sources sharing a `brand_id` are concatenated in the order given so slug
/// disambiguation stays deterministic across files. A brand with any
/// source flagged non-paint is out of domain as a whole, and none of its
/// sources are ingested.
pub fn ingest_sources(sources: &[BrandSource]) -> (Catalog, IngestSummary) {
    let mut summary = IngestSummary::default();
    for source in sources {
        if source.domain == CatalogDomain::NonPaint
            && !summary.out_of_domain.contains(&source.brand_id)
        {
            tracing::info!(brand = %source.brand_id, "skipping non-paint color system");
            summary.out_of_domain.push(source.brand_id.clone());
        }
    }

    let mut grouped: Vec<(&BrandId, Vec<RawEntry>)> = Vec::new();
    for source in sources {
        if summary.out_of_domain.contains(&source.brand_id) {
            continue;
        }
        match grouped.iter().position(|(id, _)| *id == &source.brand_id) {
            Some(at) => grouped[at].1.extend(source.colors.iter().cloned()),
            None => grouped.push((&source.brand_id, source.colors.clone())),
        }
    }

    let mut catalog = Catalog::new();
    for (brand_id, entries) in grouped {
        let ingested = ingest(brand_id, &entries);
        tracing::info!(
            brand = %brand_id,
            ingested = ingested.colors.len(),
            skipped = ingested.skipped,
            "ingested brand"
        );
        summary.brands.push(BrandSummary {
            brand_id: brand_id.clone(),
            ingested: ingested.colors.len(),
            skipped: ingested.skipped,
            warnings: ingested.warnings.iter().map(ToString::to_string).collect(),
        });
        catalog.replace_brand(brand_id, ingested.colors);
    }

    (catalog, summary)
}
