//! JSON persistence of the prediction cache

use crate::cache::DateCache;
use crate::error::Result;
use crate::types::Prediction;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const CACHE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    #[serde(default)]
    dates: BTreeMap<NaiveDate, Vec<Prediction>>,
}

/// Read a saved snapshot. A missing file or a different format version gives
/// an empty snapshot; unreadable content is an error.
pub fn load(path: &Path) -> Result<BTreeMap<NaiveDate, Vec<Prediction>>> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(e.into()),
    };

    let file: CacheFile = serde_json::from_str(&raw)?;
    if file.version != CACHE_VERSION {
        warn!(
            "Ignoring cache file {} with version {} (expected {})",
            path.display(),
            file.version,
            CACHE_VERSION
        );
        return Ok(BTreeMap::new());
    }
    Ok(file.dates)
}

/// Write a snapshot via a temp file and rename
pub fn save(path: &Path, dates: BTreeMap<NaiveDate, Vec<Prediction>>) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let file = CacheFile {
        version: CACHE_VERSION,
        dates,
    };
    let json = serde_json::to_string(&file)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Restore `cache` from `path`; failures are logged and leave it untouched
pub fn load_into(cache: &DateCache, path: &Path) -> usize {
    match load(path) {
        Ok(dates) => {
            let n = dates.len();
            cache.restore(dates);
            debug!("Restored {} cached dates from {}", n, path.display());
            n
        }
        Err(e) => {
            warn!("Could not load cache from {}: {}", path.display(), e);
            0
        }
    }
}

/// Persist every completed entry of `cache`; failures are logged
pub fn save_from(cache: &DateCache, path: &Path) {
    if let Err(e) = save(path, cache.snapshot()) {
        warn!("Could not save cache to {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GoalRate, ScoreLine};

    fn prediction(home: &str) -> Prediction {
        Prediction {
            home_team: home.to_string(),
            away_team: "Utrecht".to_string(),
            league: "Eredivisie".to_string(),
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            p_home: 0.5,
            p_draw: 0.25,
            p_away: 0.25,
            p_btts_yes: 0.55,
            p_over_1_5: 0.77,
            p_over_2_5: 0.53,
            p_over_3_5: 0.31,
            avg_goals_home_last3: GoalRate::new(2.3).unwrap(),
            avg_goals_away_last3: GoalRate::new(1.0).unwrap(),
            top_scores: vec![
                ScoreLine {
                    score: "1-1".to_string(),
                    p: 0.11,
                },
                ScoreLine {
                    score: "2-1".to_string(),
                    p: 0.1,
                },
            ],
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_cache_survives_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.json");
        let day = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let empty_day = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();

        let cache = DateCache::new();
        cache.insert(day, vec![prediction("Twente"), prediction("AZ")]);
        cache.insert(empty_day, Vec::new());
        save_from(&cache, &path);
        assert!(path.exists());

        let restored = DateCache::new();
        assert_eq!(load_into(&restored, &path), 2);
        assert_eq!(restored.get(day), cache.get(day));
        assert!(restored.get(empty_day).unwrap().is_empty());
    }

    #[test]
    fn test_version_mismatch_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, r#"{"version": 99, "dates": {"2025-03-01": []}}"#).unwrap();
        assert!(load(&path).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_file_errors_but_load_into_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "not json").unwrap();
        assert!(load(&path).is_err());

        let cache = DateCache::new();
        assert_eq!(load_into(&cache, &path), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_serialized_prediction_shape() {
        let json = serde_json::to_value(prediction("PSV")).unwrap();
        assert_eq!(json["date"], "2025-03-01");
        assert_eq!(json["avg_goals_home_last3"], 2.3);
        assert_eq!(json["p_over_2_5"], 0.53);
        assert_eq!(json["top_scores"][0]["score"], "1-1");
        assert_eq!(json["top_scores"][0]["p"], 0.11);
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys.len(), 14);
    }
}
