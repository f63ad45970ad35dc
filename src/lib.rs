pub mod catalog;
pub mod cli;
pub mod color;
pub mod delta_e;
pub mod family;
pub mod logging;
pub mod matching;
pub mod store;

pub use catalog::ingest::{ingest, ingest_sources};
pub use catalog::{convert, BrandId, Catalog, ColorAttributes, ColorKey, ColorRecord};
pub use color::{Color, ColorError, Lab};
pub use delta_e::ciede2000 as distance;
pub use family::ColorFamily;
pub use matching::{nearest, nearest_hex, rank_matches, MatchError, MatchRecord, MatchTable};
