use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use chrono::{Days, Months, NaiveDate};
use xoso_db::db::{appearance_counts, count_results, last_appearances, latest_draw_date};
use xoso_db::rusqlite::Connection;

use crate::dto::{DashboardStats, LotoGan, LotoHot, DISPLAY_DATE};
use crate::forecast::{quick_forecast, recommend, recommendation_dto, valid_range_size};

const TOP_N: usize = 10;
const HOT_WINDOW_DAYS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn first_day(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .with_context(|| format!("Tháng không hợp lệ: {}", self))
    }

    pub fn last_day(&self) -> Result<NaiveDate> {
        let first = self.first_day()?;
        first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .with_context(|| format!("Tháng không hợp lệ: {}", self))
    }
}

impl FromStr for YearMonth {
    type Err = anyhow::Error;

    /// Parses `yyyy-MM`.
    fn from_str(s: &str) -> Result<Self> {
        let Some((year, month)) = s.trim().split_once('-') else {
            bail!("Định dạng tháng phải là yyyy-MM: '{}'", s);
        };
        let year: i32 = year
            .parse()
            .with_context(|| format!("Năm không hợp lệ: '{}'", s))?;
        let month: u32 = month
            .parse()
            .with_context(|| format!("Tháng không hợp lệ: '{}'", s))?;
        if !(1..=12).contains(&month) {
            bail!("Tháng ngoài khoảng 1-12: '{}'", s);
        }
        Ok(YearMonth { year, month })
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardQuery {
    /// Applies to both lists when set.
    pub month: Option<YearMonth>,
    pub lo_gan_month: Option<YearMonth>,
    pub lo_hot_month: Option<YearMonth>,
    pub algorithm: Option<String>,
    pub range_size: Option<i64>,
}

/// Numbers that have been missing the longest. With `filter_start`, only
/// numbers absent from that day up to `today` qualify.
pub fn top_lo_gan(
    last_seen: &BTreeMap<u8, NaiveDate>,
    filter_start: Option<NaiveDate>,
    today: NaiveDate,
) -> Vec<LotoGan> {
    let mut gan: Vec<LotoGan> = last_seen
        .iter()
        .filter(|(_, last)| filter_start.map_or(true, |start| **last < start))
        .map(|(&number, last)| LotoGan {
            number,
            days_since_last_appearance: today.signed_duration_since(*last).num_days(),
            last_appearance_date: last.format(DISPLAY_DATE).to_string(),
        })
        .collect();

    // stable: equal streaks stay in ascending number order
    gan.sort_by(|a, b| b.days_since_last_appearance.cmp(&a.days_since_last_appearance));
    gan.truncate(TOP_N);
    gan
}

pub fn top_lo_hot(counts: &BTreeMap<u8, u32>) -> Vec<LotoHot> {
    let mut hot: Vec<LotoHot> = counts
        .iter()
        .filter(|(_, &frequency)| frequency > 0)
        .map(|(&number, &frequency)| LotoHot { number, frequency })
        .collect();
    hot.sort_by(|a, b| b.frequency.cmp(&a.frequency));
    hot.truncate(TOP_N);
    hot
}

/// Inclusive window the hot list counts over.
pub fn hot_window(month: Option<YearMonth>, today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    match month {
        Some(month) => {
            let end = month.last_day()?;
            Ok((month.first_day()?, end.min(today)))
        }
        None => {
            let from = today
                .checked_sub_days(Days::new(HOT_WINDOW_DAYS))
                .context("Ngày ngoài khoảng hỗ trợ")?;
            Ok((from, today))
        }
    }
}

pub fn dashboard_stats(
    conn: &Connection,
    query: &DashboardQuery,
    today: NaiveDate,
) -> Result<DashboardStats> {
    let (gan_month, hot_month) = match query.month {
        Some(month) => (Some(month), Some(month)),
        None => (query.lo_gan_month, query.lo_hot_month),
    };

    let total_days = count_results(conn)? as u64;
    let last_update_date = match latest_draw_date(conn)? {
        Some(date) => date.format(DISPLAY_DATE).to_string(),
        None => "Chưa có dữ liệu".to_string(),
    };

    let gan_start = gan_month.map(|m| m.first_day()).transpose()?;
    let top_lo_gan = top_lo_gan(&last_appearances(conn)?, gan_start, today);

    let (hot_from, hot_to) = hot_window(hot_month, today)?;
    let top_lo_hot = top_lo_hot(&appearance_counts(conn, hot_from, hot_to)?);

    let user_size = valid_range_size(query.range_size);
    let (chosen, reason) = recommend(user_size, today);
    let quick_forecast = quick_forecast(query.algorithm.as_deref(), query.range_size, &chosen, today);

    Ok(DashboardStats {
        total_days,
        last_update_date,
        top_lo_gan,
        top_lo_hot,
        quick_forecast,
        recommendation: Some(recommendation_dto(&chosen, reason)),
    })
}
