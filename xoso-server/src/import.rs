use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use std::io::Read;
use std::path::Path;
use tracing::warn;
use xoso_db::db::insert_result;
use xoso_db::models::{validate_result, DailyResult, Prize};
use xoso_db::rusqlite::Connection;

use crate::dto::DISPLAY_DATE;

/// One line per day: `dd/MM/yyyy;ĐB;G1;G2;...;G7`. Tiers holding several
/// numbers separate them with spaces or dashes.
fn parse_record(record: &csv::StringRecord) -> Result<DailyResult> {
    let get = |idx: usize| -> Result<&str> {
        record
            .get(idx)
            .map(str::trim)
            .with_context(|| format!("Thiếu cột ở vị trí {}", idx))
    };

    let date = parse_date(get(0)?)?;
    let mut result = DailyResult::new(date);
    for (offset, prize) in Prize::ALL.iter().enumerate() {
        let field = get(offset + 1)?;
        for number in field
            .split(|c: char| c.is_whitespace() || c == '-')
            .filter(|s| !s.is_empty())
        {
            if !number.chars().all(|c| c.is_ascii_digit()) {
                bail!("Số không hợp lệ '{}' ({})", number, prize.label());
            }
            result.push_raw(number, *prize);
        }
    }

    validate_result(&result)?;
    Ok(result)
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DISPLAY_DATE)
        .with_context(|| format!("Định dạng ngày không hợp lệ: '{}'", raw))
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ImportResult {
    pub total_records: u32,
    pub inserted: u32,
    pub skipped: u32,
    pub errors: u32,
}

pub fn import_csv(conn: &Connection, path: &Path) -> Result<ImportResult> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Không thể mở {:?}", path))?;
    import_reader(conn, file)
}

pub fn import_reader<R: Read>(conn: &Connection, source: R) -> Result<ImportResult> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .flexible(true)
        .from_reader(source);

    let tx = conn
        .unchecked_transaction()
        .context("Không thể bắt đầu giao dịch")?;

    let mut result = ImportResult::default();

    for record_result in reader.records() {
        result.total_records += 1;
        let line = result.total_records;
        let record = match record_result {
            Ok(record) => record,
            Err(e) => {
                warn!(line, error = %e, "không đọc được dòng");
                result.errors += 1;
                continue;
            }
        };
        // header or comment lines
        if record
            .get(0)
            .map_or(true, |f| f.trim().is_empty() || f.trim_start().starts_with('#') || f.trim() == "date")
        {
            result.total_records -= 1;
            continue;
        }
        match parse_record(&record) {
            Ok(day) => match insert_result(&tx, &day) {
                Ok(true) => result.inserted += 1,
                Ok(false) => result.skipped += 1,
                Err(e) => {
                    warn!(line, error = %format!("{e:#}"), "lỗi ghi kết quả");
                    result.errors += 1;
                }
            },
            Err(e) => {
                warn!(line, error = %format!("{e:#}"), "lỗi phân tích dòng");
                result.errors += 1;
            }
        }
    }

    tx.commit().context("Không thể commit giao dịch")?;
    Ok(result)
}
