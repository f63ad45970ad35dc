use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::catalog::Catalog;
use crate::matching::MatchTable;

use super::TableStore;

pub const CATALOG_FILE: &str = "catalog.json";
pub const MATCHES_FILE: &str = "matches.json";

/// Tables stored as pretty-printed JSON files in one directory.
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.dir.join(CATALOG_FILE)
    }

    pub fn matches_path(&self) -> PathBuf {
        self.dir.join(MATCHES_FILE)
    }
}

impl TableStore for JsonStore {
    fn name(&self) -> &str {
        "json"
    }

    fn load_catalog(&self) -> Result<Catalog> {
        read_json(&self.catalog_path(), "paintmatch ingest")
    }

    fn replace_catalog(&self, catalog: &Catalog) -> Result<()> {
        write_json_atomic(&self.catalog_path(), catalog)
    }

    fn load_matches(&self) -> Result<MatchTable> {
        read_json(&self.matches_path(), "paintmatch rank")
    }

    fn replace_matches(&self, matches: &MatchTable) -> Result<()> {
        write_json_atomic(&self.matches_path(), matches)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path, producer: &str) -> Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| {
        if !path.exists() {
            format!("file not found: {} (run `{producer}` first)", path.display())
        } else {
            format!("failed to read {}", path.display())
        }
    })?;
    serde_json::from_str(&raw).with_context(|| format!("corrupt table file {}", path.display()))
}

/// Serialize to a sibling temp file, flush it to disk, then rename it over
/// the target. Readers see either the old table or the new one.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create data directory: {}", dir.display()))?;

    let body = serde_json::to_vec_pretty(value).context("failed to serialize table")?;
    let tmp = path.with_extension("json.tmp");
    let written = std::fs::File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(&body)?;
            file.sync_all()
        })
        .with_context(|| format!("failed to write {}", tmp.display()))
        .and_then(|()| {
            std::fs::rename(&tmp, path)
                .with_context(|| format!("failed to move {} into place", path.display()))
        });
    if let Err(err) = written {
        // The target is untouched; only the partial sibling needs removing.
        let _ = std::fs::remove_file(&tmp);
        return Err(err);
    }
    tracing::debug!(path = %path.display(), bytes = body.len(), "replaced table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::record;
    use crate::matching::rank_matches;

    fn temp_store(name: &str) -> JsonStore {
        let dir = std::env::temp_dir().join(format!("paintmatch-test-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        JsonStore::new(dir)
    }

    fn sample_catalog() -> Catalog {
        Catalog::from_records(vec![
            record("a", "red", "#d03030"),
            record("b", "crimson", "#c02030"),
        ])
        .unwrap()
    }

    #[test]
    fn catalog_round_trips_through_disk() {
        let store = temp_store("catalog");
        let catalog = sample_catalog();
        store.replace_catalog(&catalog).unwrap();

        assert_eq!(store.load_catalog().unwrap(), catalog);
        assert!(!store.catalog_path().with_extension("json.tmp").exists());

        std::fs::remove_dir_all(store.dir()).unwrap();
    }

    #[test]
    fn replacing_matches_overwrites_previous_table() {
        let store = temp_store("matches");
        let catalog = sample_catalog();
        let first = MatchTable::new(&catalog, rank_matches(&catalog).unwrap());
        store.replace_matches(&first).unwrap();
        store.replace_matches(&MatchTable::default()).unwrap();

        assert_eq!(store.load_matches().unwrap(), MatchTable::default());

        std::fs::remove_dir_all(store.dir()).unwrap();
    }

    #[test]
    fn missing_table_names_the_producing_command() {
        let store = temp_store("missing");
        let err = store.load_matches().unwrap_err().to_string();
        assert!(err.contains("file not found"), "got {err}");
        assert!(err.contains("paintmatch rank"), "got {err}");
    }

    #[test]
    fn corrupt_table_is_reported() {
        let store = temp_store("corrupt");
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.catalog_path(), "{ not json").unwrap();

        let err = store.load_catalog().unwrap_err().to_string();
        assert!(err.contains("corrupt table file"), "got {err}");

        std::fs::remove_dir_all(store.dir()).unwrap();
    }

    #[test]
    fn failed_replace_removes_temp_file() {
        let store = temp_store("failed-replace");
        // A directory in the target's place makes the final rename fail.
        std::fs::create_dir_all(store.catalog_path()).unwrap();

        let err = store.replace_catalog(&sample_catalog()).unwrap_err().to_string();
        assert!(err.contains("failed to move"), "got {err}");
        assert!(!store.catalog_path().with_extension("json.tmp").exists());
        assert!(store.catalog_path().is_dir());

        std::fs::remove_dir_all(store.dir()).unwrap();
    }
}
