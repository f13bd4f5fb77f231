use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;

use crate::models::{DailyResult, LotoDigit, Prize};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS daily_results (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    draw_date          TEXT NOT NULL UNIQUE,
    region             TEXT NOT NULL DEFAULT 'MB',
    special_prize_raw  TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_daily_results_date ON daily_results (draw_date);

CREATE TABLE IF NOT EXISTS loto_digits (
    id               INTEGER PRIMARY KEY AUTOINCREMENT,
    daily_result_id  INTEGER NOT NULL REFERENCES daily_results (id) ON DELETE CASCADE,
    value            INTEGER NOT NULL,
    full_number      TEXT NOT NULL,
    prize_name       TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_loto_digits_value ON loto_digits (value);
CREATE INDEX IF NOT EXISTS idx_loto_digits_result ON loto_digits (daily_result_id);
";

pub fn db_path() -> std::path::PathBuf {
    if let Ok(path) = std::env::var("XOSO_DB") {
        return path.into();
    }
    let mut path = std::env::current_dir().unwrap_or_default();
    path.push("data");
    path.push("xoso.db");
    path
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Không thể tạo thư mục {:?}", parent))?;
    }
    let conn = Connection::open(path)
        .with_context(|| format!("Không thể mở cơ sở dữ liệu {:?}", path))?;
    Ok(conn)
}

pub fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA).context("Migration thất bại")?;
    Ok(())
}

/// Stores a day and its digits. Returns `false` when the date already exists.
pub fn insert_result(conn: &Connection, result: &DailyResult) -> Result<bool> {
    let tx = conn
        .unchecked_transaction()
        .context("Không thể bắt đầu transaction")?;

    let changed = tx
        .execute(
            "INSERT OR IGNORE INTO daily_results (draw_date, region, special_prize_raw)
             VALUES (?1, ?2, ?3)",
            params![result.draw_date, result.region, result.special_prize_raw],
        )
        .context("Lỗi khi lưu kết quả")?;
    if changed == 0 {
        return Ok(false);
    }

    let result_id = tx.last_insert_rowid();
    {
        let mut stmt = tx.prepare(
            "INSERT INTO loto_digits (daily_result_id, value, full_number, prize_name)
             VALUES (?1, ?2, ?3, ?4)",
        )?;
        for digit in &result.digits {
            stmt.execute(params![result_id, digit.value, digit.full_number, digit.prize.code()])
                .context("Lỗi khi lưu số lô")?;
        }
    }

    tx.commit().context("Commit thất bại")?;
    Ok(true)
}

pub fn result_exists(conn: &Connection, date: NaiveDate) -> Result<bool> {
    let found: Option<i64> = conn
        .query_row(
            "SELECT id FROM daily_results WHERE draw_date = ?1",
            [date],
            |row| row.get(0),
        )
        .optional()?;
    Ok(found.is_some())
}

pub fn count_results(conn: &Connection) -> Result<u32> {
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM daily_results", [], |row| row.get(0))?;
    Ok(count)
}

pub fn latest_draw_date(conn: &Connection) -> Result<Option<NaiveDate>> {
    let date: Option<NaiveDate> =
        conn.query_row("SELECT MAX(draw_date) FROM daily_results", [], |row| row.get(0))?;
    Ok(date)
}

pub fn fetch_result_by_date(conn: &Connection, date: NaiveDate) -> Result<Option<DailyResult>> {
    let header = conn
        .query_row(
            "SELECT id, draw_date, region, special_prize_raw FROM daily_results WHERE draw_date = ?1",
            [date],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    DailyResult {
                        draw_date: row.get(1)?,
                        region: row.get(2)?,
                        special_prize_raw: row.get(3)?,
                        digits: Vec::new(),
                    },
                ))
            },
        )
        .optional()?;

    let Some((id, mut result)) = header else {
        return Ok(None);
    };
    result.digits = fetch_digits(conn, id)?;
    Ok(Some(result))
}

fn fetch_digits(conn: &Connection, result_id: i64) -> Result<Vec<LotoDigit>> {
    let mut stmt = conn.prepare(
        "SELECT value, full_number, prize_name FROM loto_digits
         WHERE daily_result_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map([result_id], |row| {
            Ok((
                row.get::<_, u8>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    Ok(rows
        .into_iter()
        .filter_map(|(value, full_number, prize_name)| {
            Prize::from_code(&prize_name).map(|prize| LotoDigit {
                prize,
                full_number,
                value,
            })
        })
        .collect())
}

/// Every stored day from `from` onwards, oldest first, digits included.
pub fn fetch_results_from(conn: &Connection, from: NaiveDate) -> Result<Vec<DailyResult>> {
    let mut stmt = conn.prepare(
        "SELECT r.id, r.draw_date, r.region, r.special_prize_raw,
                d.value, d.full_number, d.prize_name
         FROM daily_results r
         LEFT JOIN loto_digits d ON d.daily_result_id = r.id
         WHERE r.draw_date >= ?1
         ORDER BY r.draw_date, d.id",
    )?;
    let rows = stmt
        .query_map([from], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, NaiveDate>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, Option<u8>>(4)?,
                row.get::<_, Option<String>>(5)?,
                row.get::<_, Option<String>>(6)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let mut results: Vec<DailyResult> = Vec::new();
    let mut current_id = None;
    for (id, draw_date, region, special_prize_raw, value, full_number, prize_name) in rows {
        if current_id != Some(id) {
            current_id = Some(id);
            results.push(DailyResult {
                draw_date,
                region,
                special_prize_raw,
                digits: Vec::new(),
            });
        }
        if let (Some(value), Some(full_number), Some(prize)) =
            (value, full_number, prize_name.as_deref().and_then(Prize::from_code))
        {
            if let Some(last) = results.last_mut() {
                last.digits.push(LotoDigit {
                    prize,
                    full_number,
                    value,
                });
            }
        }
    }
    Ok(results)
}

/// Most recent draw date of every number that ever appeared.
pub fn last_appearances(conn: &Connection) -> Result<BTreeMap<u8, NaiveDate>> {
    let mut stmt = conn.prepare(
        "SELECT d.value, MAX(r.draw_date)
         FROM loto_digits d JOIN daily_results r ON r.id = d.daily_result_id
         GROUP BY d.value",
    )?;
    let map = stmt
        .query_map([], |row| Ok((row.get::<_, u8>(0)?, row.get::<_, NaiveDate>(1)?)))?
        .collect::<Result<BTreeMap<_, _>, _>>()?;
    Ok(map)
}

/// Occurrences per number between `from` and `to` inclusive. Several hits on
/// the same day are counted separately.
pub fn appearance_counts(
    conn: &Connection,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<BTreeMap<u8, u32>> {
    let mut stmt = conn.prepare(
        "SELECT d.value, COUNT(*)
         FROM loto_digits d JOIN daily_results r ON r.id = d.daily_result_id
         WHERE r.draw_date >= ?1 AND r.draw_date <= ?2
         GROUP BY d.value",
    )?;
    let map = stmt
        .query_map(params![from, to], |row| {
            Ok((row.get::<_, u8>(0)?, row.get::<_, u32>(1)?))
        })?
        .collect::<Result<BTreeMap<_, _>, _>>()?;
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn test_result(day: NaiveDate, special: &str, first: &str) -> DailyResult {
        let mut result = DailyResult::new(day);
        result.push_raw(special, Prize::Special);
        result.push_raw(first, Prize::First);
        result.push_raw("11205", Prize::Seventh);
        result
    }

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_count() {
        let conn = setup();
        assert_eq!(count_results(&conn).unwrap(), 0);

        insert_result(&conn, &test_result(date(2024, 1, 1), "12345", "67890")).unwrap();
        assert_eq!(count_results(&conn).unwrap(), 1);
        assert!(result_exists(&conn, date(2024, 1, 1)).unwrap());
        assert!(!result_exists(&conn, date(2024, 1, 2)).unwrap());
    }

    #[test]
    fn test_duplicate_ignored() {
        let conn = setup();
        let result = test_result(date(2024, 1, 1), "12345", "67890");

        assert!(insert_result(&conn, &result).unwrap());
        assert!(!insert_result(&conn, &result).unwrap());
        assert_eq!(count_results(&conn).unwrap(), 1);
        let digits: u32 = conn
            .query_row("SELECT COUNT(*) FROM loto_digits", [], |row| row.get(0))
            .unwrap();
        assert_eq!(digits, 3);
    }

    #[test]
    fn test_fetch_by_date_roundtrip() {
        let conn = setup();
        insert_result(&conn, &test_result(date(2025, 12, 11), "52668", "13579")).unwrap();

        let result = fetch_result_by_date(&conn, date(2025, 12, 11)).unwrap().unwrap();
        assert_eq!(result.special_prize_raw, "52668");
        assert_eq!(result.digits.len(), 3);
        assert_eq!(result.first_of(Prize::First).unwrap().full_number, "13579");
        assert!(fetch_result_by_date(&conn, date(2025, 12, 12)).unwrap().is_none());
    }

    #[test]
    fn test_latest_date() {
        let conn = setup();
        assert_eq!(latest_draw_date(&conn).unwrap(), None);
        insert_result(&conn, &test_result(date(2024, 1, 5), "1", "2")).unwrap();
        insert_result(&conn, &test_result(date(2024, 1, 3), "1", "2")).unwrap();
        assert_eq!(latest_draw_date(&conn).unwrap(), Some(date(2024, 1, 5)));
    }

    #[test]
    fn test_fetch_from_order() {
        let conn = setup();
        insert_result(&conn, &test_result(date(2024, 1, 1), "10001", "20002")).unwrap();
        insert_result(&conn, &test_result(date(2024, 1, 5), "10005", "20006")).unwrap();
        insert_result(&conn, &test_result(date(2024, 1, 3), "10003", "20004")).unwrap();

        let results = fetch_results_from(&conn, date(2024, 1, 2)).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].draw_date, date(2024, 1, 3));
        assert_eq!(results[1].draw_date, date(2024, 1, 5));
        assert_eq!(results[1].digits.len(), 3);
        assert_eq!(results[1].digits[0].prize, Prize::Special);
    }

    #[test]
    fn test_fetch_from_keeps_days_without_digits() {
        let conn = setup();
        let mut empty = DailyResult::new(date(2024, 2, 1));
        empty.special_prize_raw = "99999".to_string();
        insert_result(&conn, &empty).unwrap();

        let results = fetch_results_from(&conn, date(2024, 1, 1)).unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].digits.is_empty());
    }

    #[test]
    fn test_last_appearances_and_counts() {
        let conn = setup();
        // 05 appears twice on the 3rd (special and seventh prize)
        insert_result(&conn, &test_result(date(2024, 1, 1), "10012", "20034")).unwrap();
        insert_result(&conn, &test_result(date(2024, 1, 3), "10005", "20012")).unwrap();

        let last = last_appearances(&conn).unwrap();
        assert_eq!(last.get(&12), Some(&date(2024, 1, 3)));
        assert_eq!(last.get(&34), Some(&date(2024, 1, 1)));
        assert_eq!(last.get(&99), None);

        let counts = appearance_counts(&conn, date(2024, 1, 2), date(2024, 1, 3)).unwrap();
        assert_eq!(counts.get(&5), Some(&2));
        assert_eq!(counts.get(&12), Some(&1));
        assert_eq!(counts.get(&34), None);
    }
}
