use serde::{Deserialize, Serialize};

use crate::catalog::{BrandId, Catalog, ColorRecord};
use crate::color::{Color, ColorError};
use crate::delta_e::ciede2000;

/// Scoring used by the online resolver once the box pre-filter has run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NearestMetric {
    /// Squared Euclidean distance in raw RGB.
    #[default]
    Rgb,
    /// CIEDE2000, same as the batch ranker.
    Ciede2000,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Half-width of the first RGB bounding box, per channel.
    pub radius: u8,
    /// Half-width of the single widened retry.
    pub wide_radius: u8,
    pub metric: NearestMetric,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            radius: 30,
            wide_radius: 60,
            metric: NearestMetric::Rgb,
        }
    }
}

/// Closest catalog color to `query`, optionally restricted to one brand.
///
/// Candidates are first narrowed to an axis-aligned RGB box around the query;
/// if the box is empty it is widened once. `None` means no match: an empty
/// box after widening, or a scope brand the catalog does not know.
pub fn nearest<'a>(
    catalog: &'a Catalog,
    query: Color,
    scope: Option<&BrandId>,
    config: &ResolverConfig,
) -> Option<&'a ColorRecord> {
    if let Some(brand) = scope {
        if !catalog.contains_brand(brand) {
            tracing::debug!(%brand, "nearest: unknown brand scope");
            return None;
        }
    }

    let mut candidates = in_box(catalog, query, scope, config.radius);
    if candidates.is_empty() && config.wide_radius > config.radius {
        tracing::debug!(%query, radius = config.wide_radius, "nearest: widening search box");
        candidates = in_box(catalog, query, scope, config.wide_radius);
    }

    // min_by keeps the first of equal elements, i.e. catalog order.
    match config.metric {
        NearestMetric::Rgb => candidates
            .into_iter()
            .min_by_key(|c| query.rgb_distance_sq(c.attributes.rgb())),
        NearestMetric::Ciede2000 => {
            let lab = query.to_lab();
            candidates.into_iter().min_by(|a, b| {
                let da = ciede2000(lab, a.attributes.rgb().to_lab());
                let db = ciede2000(lab, b.attributes.rgb().to_lab());
                da.total_cmp(&db)
            })
        }
    }
}

/// [`nearest`] for a raw color string with the default configuration.
pub fn nearest_hex<'a>(
    catalog: &'a Catalog,
    input: &str,
    scope: Option<&BrandId>,
) -> Result<Option<&'a ColorRecord>, ColorError> {
    let query = Color::parse(input)?;
    Ok(nearest(catalog, query, scope, &ResolverConfig::default()))
}

fn in_box<'a>(
    catalog: &'a Catalog,
    query: Color,
    scope: Option<&BrandId>,
    radius: u8,
) -> Vec<&'a ColorRecord> {
    let within = |a: u8, b: u8| a.abs_diff(b) <= radius;
    catalog
        .colors()
        .iter()
        .filter(|c| scope.map_or(true, |brand| &c.brand_id == brand))
        .filter(|c| {
            let attrs = &c.attributes;
            within(attrs.rgb_r, query.r) && within(attrs.rgb_g, query.g) && within(attrs.rgb_b, query.b)
        })
        .collect()
}
