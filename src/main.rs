use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::Parser;

use paintmatch::catalog::ingest::{ingest_sources, BrandSource, IngestSummary};
use paintmatch::catalog::{convert, BrandId, ColorKey};
use paintmatch::cli::{Args, Command};
use paintmatch::color::Color;
use paintmatch::matching::{nearest, rank_matches_with, MatchTable, RankConfig, ResolverConfig};
use paintmatch::store::json::JsonStore;
use paintmatch::store::TableStore;

fn main() -> Result<()> {
    let args = Args::parse();
    paintmatch::logging::init(&args.log_level)?;

    let store = JsonStore::new(&args.data_dir);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match args.command {
        Command::Convert { color } => {
            let attributes = convert(&color)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&attributes)?)?;
        }
        Command::Ingest { sources } => {
            let sources = sources
                .iter()
                .map(|path| BrandSource::from_path(path))
                .collect::<Result<Vec<_>>>()?;
            let (catalog, summary) = ingest_sources(&sources);
            store.replace_catalog(&catalog)?;
            tracing::info!(store = store.name(), colors = catalog.len(), "catalog replaced");
            print_ingest_summary(&mut out, &summary)?;
        }
        Command::Rank {
            top_k,
            progress_every,
        } => {
            let catalog = store.load_catalog()?;
            let config = RankConfig {
                top_k,
                progress_every,
            };
            let matches = rank_matches_with(&catalog, &config)
                .context("ranking failed; the stored match table was left untouched")?;
            let brands = catalog.partitions().len();
            let table = MatchTable::new(&catalog, matches);
            store.replace_matches(&table)?;
            writeln!(
                out,
                "ranked {} colors across {brands} brands: {} matches",
                catalog.len(),
                table.matches.len()
            )?;
        }
        Command::Nearest {
            color,
            brand,
            radius,
            wide_radius,
            metric,
        } => {
            let catalog = store.load_catalog()?;
            let query = Color::parse(&color)?;
            let scope = brand.map(BrandId::new);
            let config = ResolverConfig {
                radius,
                wide_radius,
                metric,
            };
            match nearest(&catalog, query, scope.as_ref(), &config) {
                Some(record) => writeln!(out, "{}", serde_json::to_string_pretty(record)?)?,
                None => writeln!(out, "no match found")?,
            }
        }
        Command::Matches {
            brand,
            slug,
            target_brand,
            limit,
        } => {
            let catalog = store.load_catalog()?;
            let table = store.load_matches()?;
            table.ensure_current(&catalog)?;
            let source = ColorKey::new(BrandId::new(brand), slug);
            if catalog.get(&source).is_none() {
                bail!("unknown color {source}");
            }
            let target = target_brand.map(BrandId::new);
            let found: Vec<_> = table
                .matches_for(&source, target.as_ref())
                .into_iter()
                .take(limit)
                .collect();
            if found.is_empty() {
                writeln!(out, "no match found")?;
            } else {
                writeln!(out, "{}", serde_json::to_string_pretty(&found)?)?;
            }
        }
    }

    Ok(())
}

fn print_ingest_summary(out: &mut impl Write, summary: &IngestSummary) -> Result<()> {
    for brand in &summary.brands {
        writeln!(
            out,
            "{}: {} colors, {} skipped",
            brand.brand_id, brand.ingested, brand.skipped
        )?;
        for warning in &brand.warnings {
            writeln!(out, "  warning: {warning}")?;
        }
    }
    for brand in &summary.out_of_domain {
        writeln!(out, "{brand}: skipped (not a paint catalog)")?;
    }
    writeln!(
        out,
        "total: {} colors ingested, {} skipped",
        summary.total_ingested(),
        summary.total_skipped()
    )?;
    Ok(())
}
