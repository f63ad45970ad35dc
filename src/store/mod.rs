pub mod json;

use anyhow::Result;

use crate::catalog::Catalog;
use crate::matching::MatchTable;

/// Where the normalized color table and the match table live.
///
/// Implementations must replace each table as a whole: a failed or
/// interrupted write leaves the previously stored table readable.
pub trait TableStore {
    /// Human-readable store name for log output.
    fn name(&self) -> &str;

    fn load_catalog(&self) -> Result<Catalog>;

    fn replace_catalog(&self, catalog: &Catalog) -> Result<()>;

    fn load_matches(&self) -> Result<MatchTable>;

    fn replace_matches(&self, matches: &MatchTable) -> Result<()>;
}
