use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::error::SourceError;
use super::parsing::split_element_sets;
use super::types::RawElementSet;

/// Supplies time-ordered raw element sets per catalog id.
///
/// `Ok(vec![])` means the source has no data for the satellite; `Err` means the
/// fetch itself failed. Callers report these differently.
pub trait ElementSetSource {
    fn element_sets(&self, norad_id: u32) -> Result<Vec<RawElementSet>, SourceError>;
}

/// Element sets loaded from a directory of `.tle` / `.txt` files.
pub struct DirectorySource {
    dir: PathBuf,
    by_id: HashMap<u32, Vec<RawElementSet>>,
}

impl DirectorySource {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            by_id: HashMap::new(),
        }
    }

    /// Load all element files from the directory
    pub fn load_all(&mut self) -> Result<(), SourceError> {
        if !self.dir.exists() {
            return Err(SourceError::NotFound(self.dir.display().to_string()));
        }

        self.by_id.clear();

        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext == "tle" || ext == "txt")
            {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            match fs::read_to_string(&path) {
                Ok(content) => self.add_document(&content),
                Err(e) => {
                    log::warn!("Failed to read element file {}: {}", path.display(), e);
                }
            }
        }

        log::info!(
            "loaded element sets for {} satellites from {}",
            self.by_id.len(),
            self.dir.display()
        );
        Ok(())
    }

    /// Add every element set of a 2LE/3LE document.
    pub fn add_document(&mut self, content: &str) {
        for raw in split_element_sets(content) {
            match catalog_number(&raw) {
                Some(id) => self.by_id.entry(id).or_default().push(raw),
                None => log::warn!("element set without catalog number: {:?}", raw.line1),
            }
        }
    }

    pub fn catalog_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.by_id.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl ElementSetSource for DirectorySource {
    fn element_sets(&self, norad_id: u32) -> Result<Vec<RawElementSet>, SourceError> {
        Ok(self.by_id.get(&norad_id).cloned().unwrap_or_default())
    }
}

/// One record of a Space-Track `gp_history` JSON response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GpRecord {
    #[serde(default)]
    pub object_name: Option<String>,
    #[serde(default)]
    pub norad_cat_id: Option<String>,
    #[serde(default)]
    pub tle_line0: Option<String>,
    pub tle_line1: String,
    pub tle_line2: String,
}

impl GpRecord {
    pub fn to_raw(&self) -> RawElementSet {
        let name = self
            .object_name
            .clone()
            .or_else(|| {
                self.tle_line0
                    .as_deref()
                    .map(|l| l.strip_prefix("0 ").unwrap_or(l).trim().to_string())
            })
            .filter(|n| !n.is_empty());
        RawElementSet::new(name, self.tle_line1.trim(), self.tle_line2.trim())
    }
}

/// Element sets decoded from saved `gp_history` JSON responses.
#[derive(Default)]
pub struct GpHistorySource {
    by_id: HashMap<u32, Vec<RawElementSet>>,
}

impl GpHistorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_file(&mut self, path: &Path) -> Result<usize, SourceError> {
        if !path.exists() {
            return Err(SourceError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        self.add_json(&content).map_err(|e| match e {
            SourceError::Json(err) => SourceError::Decode {
                file: path.display().to_string(),
                message: err.to_string(),
            },
            other => other,
        })
    }

    /// Decode one JSON array of GP records; returns how many were added.
    pub fn add_json(&mut self, json: &str) -> Result<usize, SourceError> {
        let records: Vec<GpRecord> = serde_json::from_str(json)?;
        let mut added = 0;
        for record in &records {
            let raw = record.to_raw();
            let id = record
                .norad_cat_id
                .as_deref()
                .and_then(|s| s.trim().parse().ok())
                .or_else(|| catalog_number(&raw));
            match id {
                Some(id) => {
                    self.by_id.entry(id).or_default().push(raw);
                    added += 1;
                }
                None => log::warn!("GP record without catalog number: {:?}", record.tle_line1),
            }
        }
        Ok(added)
    }

    pub fn catalog_ids(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self.by_id.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl ElementSetSource for GpHistorySource {
    fn element_sets(&self, norad_id: u32) -> Result<Vec<RawElementSet>, SourceError> {
        Ok(self.by_id.get(&norad_id).cloned().unwrap_or_default())
    }
}

fn catalog_number(raw: &RawElementSet) -> Option<u32> {
    raw.line1.get(2..7)?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAVIC: &str = include_str!("../../testdata/navic_2024.tle");
    const GP_JSON: &str = include_str!("../../testdata/gp_history_40269.json");

    #[test]
    fn groups_document_by_catalog_id() {
        let mut source = DirectorySource::new(PathBuf::from("unused"));
        source.add_document(NAVIC);
        assert_eq!(
            source.catalog_ids(),
            vec![39635, 40269, 40547, 41241, 41384, 43286, 56759]
        );
        let sets = source.element_sets(56759).unwrap();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].name.as_deref(), Some("NVS-01"));
    }

    #[test]
    fn unknown_satellite_is_empty_not_error() {
        let mut source = DirectorySource::new(PathBuf::from("unused"));
        source.add_document(NAVIC);
        assert!(source.element_sets(99999).unwrap().is_empty());
    }

    #[test]
    fn missing_directory_is_a_fetch_failure() {
        let mut source = DirectorySource::new(PathBuf::from("/definitely/not/here"));
        assert!(matches!(source.load_all(), Err(SourceError::NotFound(_))));
    }

    #[test]
    fn decodes_gp_history_records() {
        let mut source = GpHistorySource::new();
        assert_eq!(source.add_json(GP_JSON).unwrap(), 3);
        let sets = source.element_sets(40269).unwrap();
        assert_eq!(sets.len(), 3);
        assert_eq!(sets[0].name.as_deref(), Some("IRNSS-1C"));
        assert!(sets[0].line1.starts_with("1 40269U"));
    }

    #[test]
    fn rejects_invalid_gp_json() {
        let mut source = GpHistorySource::new();
        assert!(matches!(
            source.add_json("{\"not\": \"an array\"}"),
            Err(SourceError::Json(_))
        ));
        assert!(source.catalog_ids().is_empty());
    }

    #[test]
    fn gp_file_errors_name_the_file() {
        let path = std::env::temp_dir().join(format!("gp_history_{}.json", std::process::id()));
        fs::write(&path, "not json").unwrap();
        let mut source = GpHistorySource::new();
        let result = source.load_file(&path);
        fs::remove_file(&path).unwrap();
        match result {
            Err(SourceError::Decode { file, .. }) => assert!(file.ends_with(".json")),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
