use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::matching::NearestMetric;

/// Cross-catalog paint color conversion and matching.
#[derive(Parser, Debug)]
#[command(name = "paintmatch", version, about)]
pub struct Args {
    /// Directory holding catalog.json and matches.json
    #[arg(long, global = true, env = "PAINTMATCH_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, env = "PAINTMATCH_LOG", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the derived attributes of a color (`#rrggbb` or `rgb(r, g, b)`)
    Convert {
        color: String,
    },

    /// Normalize brand source files and replace the catalog
    Ingest {
        /// Brand source JSON files
        #[arg(required = true)]
        sources: Vec<PathBuf>,
    },

    /// Rank cross-brand matches for the whole catalog and replace the match table
    Rank {
        /// Matches kept per source color and target brand
        #[arg(long, default_value_t = crate::matching::rank::DEFAULT_TOP_K)]
        top_k: usize,

        /// Log progress every N source colors within a brand (0 disables)
        #[arg(long, default_value_t = crate::matching::rank::DEFAULT_PROGRESS_EVERY)]
        progress_every: usize,
    },

    /// Find the catalog color closest to an arbitrary color
    Nearest {
        color: String,

        /// Only consider this brand
        #[arg(short, long)]
        brand: Option<String>,

        /// Per-channel half-width of the RGB search box
        #[arg(long, default_value_t = 30)]
        radius: u8,

        /// Half-width of the widened retry when the first box is empty
        #[arg(long, default_value_t = 60)]
        wide_radius: u8,

        /// Distance used to pick among candidates
        #[arg(long, value_enum, default_value_t = NearestMetric::Rgb)]
        metric: NearestMetric,
    },

    /// List stored matches of a catalog color
    Matches {
        brand: String,
        slug: String,

        /// Only matches from this brand
        #[arg(short, long)]
        target_brand: Option<String>,

        /// Maximum number of matches printed
        #[arg(short = 'n', long, default_value_t = 5)]
        limit: usize,
    },
}
