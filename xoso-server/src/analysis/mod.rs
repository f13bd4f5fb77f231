pub mod rules;
pub mod streaks;

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use xoso_db::db::fetch_results_from;
use xoso_db::models::{DailyResult, Prize};
use xoso_db::rusqlite::Connection;

use crate::dto::{AnalysisData, AnalysisRow, ROW_DATE};
use rules::{column_rules, AnalysisType, RangeFilters, Rule};
use streaks::empty_stats;

pub const DEFAULT_PAGE_SIZE: u32 = 30;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_LOOKBACK_DAYS: u64 = 30;

pub const COLUMN_NAMES: [&str; 4] = ["Đầu ĐB", "ĐB", "Đầu G1", "G1"];

#[derive(Debug, Clone)]
pub struct AnalysisQuery {
    pub from_date: Option<NaiveDate>,
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub kind: AnalysisType,
    pub filters: RangeFilters,
}

impl Default for AnalysisQuery {
    fn default() -> Self {
        Self {
            from_date: None,
            page: None,
            size: None,
            kind: AnalysisType::FiftyFifty,
            filters: RangeFilters::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    /// Negative pages become 0; sizes below 1 fall back to 30 and sizes over
    /// 100 are capped.
    pub fn clamped(page: Option<i64>, size: Option<i64>) -> Self {
        let page = page.unwrap_or(0).clamp(0, u32::MAX as i64) as u32;
        let size = match size {
            Some(s) if s < 1 => DEFAULT_PAGE_SIZE,
            Some(s) if s > MAX_PAGE_SIZE as i64 => MAX_PAGE_SIZE,
            Some(s) => s as u32,
            None => DEFAULT_PAGE_SIZE,
        };
        Self { page, size }
    }

    pub fn total_pages(&self, total: usize) -> u32 {
        total.div_ceil(self.size as usize) as u32
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = (self.page as usize).saturating_mul(self.size as usize);
        if start >= items.len() {
            return &[];
        }
        let end = (start + self.size as usize).min(items.len());
        &items[start..end]
    }
}

/// The four derived values of one day: Đầu ĐB, ĐB, Đầu G1, G1.
pub fn derive_values(result: &DailyResult) -> [Option<u8>; 4] {
    if result.digits.is_empty() {
        return [None; 4];
    }

    let (dau_db, db) = match result.first_of(Prize::Special) {
        Some(special) => {
            let head = special.head().or_else(|| {
                result
                    .special_prize_raw
                    .get(..2)
                    .and_then(|s| s.parse().ok())
            });
            (head, Some(special.value))
        }
        None => (None, None),
    };

    let (dau_g1, g1) = match result.first_of(Prize::First) {
        Some(first) => (first.head(), Some(first.value)),
        None => (None, None),
    };

    [dau_db, db, dau_g1, g1]
}

pub fn build_row(result: &DailyResult, rules: &[Rule; 4]) -> AnalysisRow {
    let values = derive_values(result);
    let hit = |i: usize| u8::from(rules[i].matches(values[i]));
    AnalysisRow {
        date: result.draw_date.format(ROW_DATE).to_string(),
        dau_db: values[0],
        db: values[1],
        dau_g1: values[2],
        g1: values[3],
        dau_db_match: hit(0),
        db_match: hit(1),
        dau_g1_match: hit(2),
        g1_match: hit(3),
    }
}

fn row_matches(row: &AnalysisRow) -> [bool; 4] {
    [
        row.dau_db_match == 1,
        row.db_match == 1,
        row.dau_g1_match == 1,
        row.g1_match == 1,
    ]
}

/// Rows are computed over the whole history from `from_date`; empty-streak
/// statistics use every row, pagination only trims what is returned. When
/// neither `page` nor `size` is given all rows come back on a single page.
pub fn analysis_data(
    conn: &Connection,
    query: &AnalysisQuery,
    today: NaiveDate,
) -> Result<AnalysisData> {
    let from = match query.from_date {
        Some(date) => date,
        None => today
            .checked_sub_days(Days::new(DEFAULT_LOOKBACK_DAYS))
            .context("Ngày ngoài khoảng hỗ trợ")?,
    };

    let rules = column_rules(query.kind, &query.filters);
    let results = fetch_results_from(conn, from)?;
    let rows: Vec<AnalysisRow> = results.iter().map(|r| build_row(r, &rules)).collect();

    let empty_stats = (0..4)
        .map(|col| {
            let series: Vec<bool> = rows.iter().map(|row| row_matches(row)[col]).collect();
            empty_stats(COLUMN_NAMES[col], rules[col].label(), &series)
        })
        .collect();

    let total_elements = rows.len() as u64;
    if query.page.is_none() && query.size.is_none() {
        let total_pages = u32::from(!rows.is_empty());
        return Ok(AnalysisData {
            rows,
            empty_stats,
            total_pages,
            current_page: 0,
            total_elements,
        });
    }

    let request = PageRequest::clamped(query.page, query.size);
    Ok(AnalysisData {
        rows: request.slice(&rows).to_vec(),
        empty_stats,
        total_pages: request.total_pages(rows.len()),
        current_page: request.page,
        total_elements,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rules::Bounds;
    use xoso_db::db::{insert_result, migrate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn day(d: NaiveDate, special: &str, first: &str) -> DailyResult {
        let mut result = DailyResult::new(d);
        result.push_raw(special, Prize::Special);
        result.push_raw(first, Prize::First);
        result
    }

    fn setup(days: &[(NaiveDate, &str, &str)]) -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        for (d, special, first) in days {
            insert_result(&conn, &day(*d, special, first)).unwrap();
        }
        conn
    }

    #[test]
    fn test_page_request_clamps() {
        assert_eq!(PageRequest::clamped(None, None), PageRequest { page: 0, size: 30 });
        assert_eq!(PageRequest::clamped(Some(-4), Some(0)), PageRequest { page: 0, size: 30 });
        assert_eq!(PageRequest::clamped(Some(2), Some(500)), PageRequest { page: 2, size: 100 });
        assert_eq!(PageRequest::clamped(Some(1), Some(7)), PageRequest { page: 1, size: 7 });
    }

    #[test]
    fn test_page_slice_and_total() {
        let items: Vec<u32> = (0..65).collect();
        let request = PageRequest { page: 2, size: 30 };
        assert_eq!(request.total_pages(items.len()), 3);
        assert_eq!(request.slice(&items), &[60, 61, 62, 63, 64]);
        assert!(PageRequest { page: 3, size: 30 }.slice(&items).is_empty());
        assert_eq!(request.total_pages(0), 0);
    }

    #[test]
    fn test_derive_values() {
        let result = day(date(2025, 1, 25), "52668", "13579");
        assert_eq!(derive_values(&result), [Some(52), Some(68), Some(13), Some(79)]);
    }

    #[test]
    fn test_derive_values_without_first_prize() {
        let mut result = DailyResult::new(date(2025, 1, 25));
        result.push_raw("07", Prize::Special);
        assert_eq!(derive_values(&result), [Some(7), Some(7), None, None]);
        assert_eq!(derive_values(&DailyResult::new(date(2025, 1, 26))), [None; 4]);
    }

    #[test]
    fn test_build_row_fifty_fifty() {
        let filters = RangeFilters {
            dau_db: Bounds::new(Some(50), Some(99)),
            db: Bounds::new(Some(0), Some(49)),
            dau_g1: Bounds::new(Some(13), Some(13)),
            g1: Bounds::default(),
        };
        let rules = column_rules(AnalysisType::FiftyFifty, &filters);
        let row = build_row(&day(date(2025, 1, 25), "52668", "13579"), &rules);
        assert_eq!(row.date, "25-01-2025");
        assert_eq!(
            [row.dau_db_match, row.db_match, row.dau_g1_match, row.g1_match],
            [1, 0, 1, 0]
        );
    }

    #[test]
    fn test_build_row_prime() {
        let rules = column_rules(AnalysisType::Prime, &RangeFilters::default());
        let row = build_row(&day(date(2025, 1, 25), "52668", "13579"), &rules);
        // 52 no, 68 no, 13 yes, 79 yes
        assert_eq!(
            [row.dau_db_match, row.db_match, row.dau_g1_match, row.g1_match],
            [0, 0, 1, 1]
        );
    }

    #[test]
    fn test_analysis_data_paginated() {
        let days: Vec<(NaiveDate, &str, &str)> = (1..=12)
            .map(|d| (date(2025, 1, d), "12345", "67891"))
            .collect();
        let conn = setup(&days);

        let query = AnalysisQuery {
            from_date: Some(date(2025, 1, 1)),
            page: Some(1),
            size: Some(5),
            kind: AnalysisType::EvenOdd,
            filters: RangeFilters::default(),
        };
        let data = analysis_data(&conn, &query, date(2025, 1, 31)).unwrap();
        assert_eq!(data.total_elements, 12);
        assert_eq!(data.total_pages, 3);
        assert_eq!(data.current_page, 1);
        assert_eq!(data.rows.len(), 5);
        assert_eq!(data.rows[0].date, "06-01-2025");

        // dauDB = 12 (even) always hits, ĐB = 45 never does: one 12-day run
        assert_eq!(data.empty_stats.len(), 4);
        assert_eq!(data.empty_stats[0].range, "Chẵn");
        assert!(data.empty_stats[0].counts.iter().all(|c| c.count == 0));
        let db_open = data.empty_stats[1].counts.last().unwrap();
        assert_eq!((db_open.empty_length, db_open.count), (10, 1));
    }

    #[test]
    fn test_analysis_data_unpaginated() {
        let days: Vec<(NaiveDate, &str, &str)> = (1..=40)
            .map(|d| (date(2025, 1, 1) + Days::new(d), "52668", "13579"))
            .collect();
        let conn = setup(&days);

        let query = AnalysisQuery {
            from_date: Some(date(2025, 1, 1)),
            ..Default::default()
        };
        let data = analysis_data(&conn, &query, date(2025, 3, 1)).unwrap();
        assert_eq!(data.rows.len(), 40);
        assert_eq!(data.total_pages, 1);
        assert_eq!(data.empty_stats[0].range, "-");
    }

    #[test]
    fn test_analysis_data_defaults_to_last_thirty_days() {
        let conn = setup(&[
            (date(2025, 1, 1), "11111", "22222"),
            (date(2025, 2, 20), "11111", "22222"),
        ]);
        let data = analysis_data(&conn, &AnalysisQuery::default(), date(2025, 3, 1)).unwrap();
        assert_eq!(data.rows.len(), 1);
        assert_eq!(data.rows[0].date, "20-02-2025");
    }
}
