//! Last-used filters per view, kept in one JSON file keyed by view.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

pub const ANALYSIS_KEY: &str = "analysisFilters";
pub const EVEN_ODD_KEY: &str = "evenOddAnalysisFilters";
pub const PRIME_KEY: &str = "primeAnalysisFilters";
pub const DIVIDE3_KEY: &str = "divide3AnalysisFilters";
pub const DASHBOARD_KEY: &str = "dashboardFilters";

pub const MIN_RANGE_SIZE: u32 = 10;
pub const MAX_RANGE_SIZE: u32 = 60;
pub const RANGE_SIZE_MESSAGE: &str = "Khoảng số phải từ 10 đến 60";
pub const DEFAULT_PAGE_SIZE: u32 = 30;

/// Prefix and two-digit values are always 00-99.
pub fn clamp_bound(value: i64) -> u8 {
    value.clamp(0, 99) as u8
}

pub fn validate_range_size(size: u32) -> Result<u32, &'static str> {
    if (MIN_RANGE_SIZE..=MAX_RANGE_SIZE).contains(&size) {
        Ok(size)
    } else {
        Err(RANGE_SIZE_MESSAGE)
    }
}

/// Filters of the 50/50 view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RangeFilters {
    pub from_date: Option<NaiveDate>,
    #[serde(rename = "dauDBStart")]
    pub dau_db_start: Option<u8>,
    #[serde(rename = "dauDBEnd")]
    pub dau_db_end: Option<u8>,
    pub db_start: Option<u8>,
    pub db_end: Option<u8>,
    pub dau_g1_start: Option<u8>,
    pub dau_g1_end: Option<u8>,
    pub g1_start: Option<u8>,
    pub g1_end: Option<u8>,
}

/// Filters of the fixed-rule views (even-odd, prime, divide-3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RuleFilters {
    pub from_date: Option<NaiveDate>,
    pub page: u32,
    pub size: u32,
}

impl Default for RuleFilters {
    fn default() -> Self {
        Self {
            from_date: None,
            page: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardFilters {
    pub month: Option<String>,
    pub lo_gan_month: Option<String>,
    pub lo_hot_month: Option<String>,
    pub algorithm: Option<String>,
    pub range_size: Option<u32>,
}

pub fn default_path() -> PathBuf {
    let mut path = std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default();
    path.push(".config");
    path.push("xoso");
    path.push("filters.json");
    path
}

#[derive(Debug)]
pub struct FilterStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl FilterStore {
    /// A missing file starts empty; an unreadable one falls back to defaults.
    pub fn open(path: &Path) -> Self {
        let entries = match std::fs::read_to_string(path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "bộ lọc đã lưu không đọc được, dùng mặc định");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "không mở được tệp bộ lọc, dùng mặc định");
                BTreeMap::new()
            }
        };
        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.entries.get(key) {
            None => T::default(),
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_else(|e| {
                warn!(key, error = %e, "bộ lọc không hợp lệ, dùng mặc định");
                T::default()
            }),
        }
    }

    pub fn save<T: Serialize>(&mut self, key: &str, filters: &T) -> Result<()> {
        let value = serde_json::to_value(filters).context("Không thể tuần tự hóa bộ lọc")?;
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    pub fn reset(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        self.flush()
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Không thể tạo thư mục {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Không thể ghi {:?}", self.path))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_bound() {
        assert_eq!(clamp_bound(-5), 0);
        assert_eq!(clamp_bound(42), 42);
        assert_eq!(clamp_bound(150), 99);
    }

    #[test]
    fn test_validate_range_size() {
        assert_eq!(validate_range_size(10), Ok(10));
        assert_eq!(validate_range_size(60), Ok(60));
        assert_eq!(validate_range_size(9), Err(RANGE_SIZE_MESSAGE));
        assert_eq!(validate_range_size(61), Err(RANGE_SIZE_MESSAGE));
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("filters.json");

        let range = RangeFilters {
            from_date: NaiveDate::from_ymd_opt(2025, 11, 1),
            dau_db_start: Some(36),
            dau_db_end: Some(95),
            g1_end: Some(0),
            ..RangeFilters::default()
        };
        let rule = RuleFilters {
            from_date: NaiveDate::from_ymd_opt(2025, 10, 1),
            page: 3,
            size: 50,
        };

        let mut store = FilterStore::open(&path);
        store.save(ANALYSIS_KEY, &range).unwrap();
        store.save(PRIME_KEY, &rule).unwrap();

        let reopened = FilterStore::open(&path);
        assert_eq!(reopened.load::<RangeFilters>(ANALYSIS_KEY), range);
        assert_eq!(reopened.load::<RuleFilters>(PRIME_KEY), rule);
        assert_eq!(reopened.load::<RuleFilters>(EVEN_ODD_KEY), RuleFilters::default());
    }

    #[test]
    fn test_stored_keys_are_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.json");
        let mut store = FilterStore::open(&path);
        let range = RangeFilters {
            dau_db_start: Some(1),
            ..RangeFilters::default()
        };
        store.save(ANALYSIS_KEY, &range).unwrap();

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["analysisFilters"]["dauDBStart"], 1);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.json");
        let mut store = FilterStore::open(&path);
        let dashboard = DashboardFilters {
            range_size: Some(25),
            ..DashboardFilters::default()
        };
        store.save(DASHBOARD_KEY, &dashboard).unwrap();
        store.reset(DASHBOARD_KEY).unwrap();
        assert_eq!(
            FilterStore::open(&path).load::<DashboardFilters>(DASHBOARD_KEY),
            DashboardFilters::default()
        );
    }

    #[test]
    fn test_corrupt_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = FilterStore::open(&path);
        assert_eq!(store.load::<RuleFilters>(PRIME_KEY), RuleFilters::default());
    }
}
