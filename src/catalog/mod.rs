pub mod ingest;
pub mod slug;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::color::{round2, Color, ColorError};
use crate::family::ColorFamily;

/// Opaque identifier of one brand's catalog partition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BrandId(pub String);

impl BrandId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BrandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a color in the normalized table: `(brand_id, slug)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColorKey {
    pub brand_id: BrandId,
    pub slug: String,
}

impl ColorKey {
    pub fn new(brand_id: BrandId, slug: impl Into<String>) -> Self {
        Self {
            brand_id,
            slug: slug.into(),
        }
    }
}

impl std::fmt::Display for ColorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.brand_id, self.slug)
    }
}

/// Every value derived from a color's hex. Pure function of `hex`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorAttributes {
    pub hex: String,
    pub rgb_r: u8,
    pub rgb_g: u8,
    pub rgb_b: u8,
    pub lab_l: f64,
    pub lab_a: f64,
    pub lab_b: f64,
    pub lrv: f64,
    pub color_family: ColorFamily,
}

impl ColorAttributes {
    pub fn from_color(color: Color) -> Self {
        let lab = color.to_lab();
        Self {
            hex: color.to_hex(),
            rgb_r: color.r,
            rgb_g: color.g,
            rgb_b: color.b,
            lab_l: round2(lab.l),
            lab_a: round2(lab.a),
            lab_b: round2(lab.b),
            lrv: round2(color.lrv()),
            color_family: ColorFamily::classify(color),
        }
    }

    /// The color as stored in the `rgb_*` columns.
    pub fn rgb(&self) -> Color {
        Color::new(self.rgb_r, self.rgb_g, self.rgb_b)
    }
}

/// Derive the stored attributes of a color given in any accepted notation.
pub fn convert(input: &str) -> Result<ColorAttributes, ColorError> {
    Color::parse(input).map(ColorAttributes::from_color)
}

/// One manufacturer paint color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorRecord {
    pub brand_id: BrandId,
    pub name: String,
    pub slug: String,
    pub color_number: Option<String>,
    #[serde(flatten)]
    pub attributes: ColorAttributes,
}

impl ColorRecord {
    pub fn key(&self) -> ColorKey {
        ColorKey::new(self.brand_id.clone(), self.slug.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate color key {0}")]
    DuplicateKey(ColorKey),
}

/// The normalized, brand-partitioned color table.
///
/// Records keep their insertion order, which is the tie-break order for
/// every ranking over the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CatalogRows")]
pub struct Catalog {
    colors: Vec<ColorRecord>,
}

#[derive(Deserialize)]
struct CatalogRows {
    colors: Vec<ColorRecord>,
}

impl TryFrom<CatalogRows> for Catalog {
    type Error = CatalogError;

    fn try_from(rows: CatalogRows) -> Result<Self, Self::Error> {
        Self::from_records(rows.colors)
    }
}

/// Indices into [`Catalog::colors`] belonging to one brand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandPartition<'a> {
    pub brand_id: &'a BrandId,
    pub members: Vec<usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from already-normalized records, rejecting duplicate
    /// `(brand_id, slug)` keys.
    pub fn from_records(colors: Vec<ColorRecord>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(colors.len());
        for record in &colors {
            if !seen.insert((&record.brand_id, &record.slug)) {
                return Err(CatalogError::DuplicateKey(record.key()));
            }
        }
        Ok(Self { colors })
    }

    /// Replace a brand's records wholesale. Re-ingesting a brand never
    /// patches individual records.
    pub fn replace_brand(&mut self, brand_id: &BrandId, records: Vec<ColorRecord>) {
        self.colors.retain(|c| &c.brand_id != brand_id);
        self.colors.extend(records);
    }

    pub fn colors(&self) -> &[ColorRecord] {
        &self.colors
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, key: &ColorKey) -> Option<&ColorRecord> {
        self.colors
            .iter()
            .find(|c| c.brand_id == key.brand_id && c.slug == key.slug)
    }

    /// SHA-256 over every `(brand_id, slug, hex)` row in catalog order.
    ///
    /// Two catalogs share a fingerprint exactly when ranking them yields the
    /// same match table.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for record in &self.colors {
            hasher.update(record.brand_id.as_str().as_bytes());
            hasher.update([0]);
            hasher.update(record.slug.as_bytes());
            hasher.update([0]);
            hasher.update(record.attributes.hex.as_bytes());
            hasher.update([b'\n']);
        }
        hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect()
    }

    pub fn contains_brand(&self, brand_id: &BrandId) -> bool {
        self.colors.iter().any(|c| &c.brand_id == brand_id)
    }

    /// Brand partitions in first-seen order, members in catalog order.
    pub fn partitions(&self) -> Vec<BrandPartition<'_>> {
        let mut partitions: Vec<BrandPartition<'_>> = Vec::new();
        for (index, record) in self.colors.iter().enumerate() {
            match partitions.iter_mut().find(|p| p.brand_id == &record.brand_id) {
                Some(partition) => partition.members.push(index),
                None => partitions.push(BrandPartition {
                    brand_id: &record.brand_id,
                    members: vec![index],
                }),
            }
        }
        partitions
    }
}
