//! JSON shapes served under `/api`. Field names follow the camelCase contract
//! the dashboard client reads.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use xoso_db::models::{DailyResult, Prize};

pub const DISPLAY_DATE: &str = "%d/%m/%Y";
pub const ROW_DATE: &str = "%d-%m-%Y";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LotteryData {
    pub date: String,
    pub day_of_week: String,
    pub codes: Option<Vec<String>>,
    pub special_prize: String,
    pub prize1: String,
    pub prize2: Vec<String>,
    pub prize3: Vec<String>,
    pub prize4: Vec<String>,
    pub prize5: Vec<String>,
    pub prize6: Vec<String>,
    pub prize7: Vec<String>,
}

/// Vietnamese weekday numbering: Monday is "thứ 2", Sunday is 8.
pub fn vietnamese_day_of_week(date: NaiveDate) -> String {
    match date.weekday() {
        Weekday::Sun => "8".to_string(),
        other => (other.number_from_monday() + 1).to_string(),
    }
}

impl From<&DailyResult> for LotteryData {
    fn from(result: &DailyResult) -> Self {
        let numbers = |prize: Prize| -> Vec<String> {
            result
                .numbers_of(prize)
                .into_iter()
                .map(|d| {
                    if !d.full_number.is_empty() {
                        d.full_number.clone()
                    } else {
                        format!("{:02}", d.value)
                    }
                })
                .collect()
        };

        LotteryData {
            date: result.draw_date.format(DISPLAY_DATE).to_string(),
            day_of_week: vietnamese_day_of_week(result.draw_date),
            codes: None,
            special_prize: result.special_prize_raw.clone(),
            prize1: numbers(Prize::First).into_iter().next().unwrap_or_default(),
            prize2: numbers(Prize::Second),
            prize3: numbers(Prize::Third),
            prize4: numbers(Prize::Fourth),
            prize5: numbers(Prize::Fifth),
            prize6: numbers(Prize::Sixth),
            prize7: numbers(Prize::Seventh),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_days: u64,
    pub last_update_date: String,
    pub top_lo_gan: Vec<LotoGan>,
    pub top_lo_hot: Vec<LotoHot>,
    pub quick_forecast: QuickForecast,
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LotoGan {
    pub number: u8,
    pub days_since_last_appearance: i64,
    pub last_appearance_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LotoHot {
    pub number: u8,
    pub frequency: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuickForecast {
    pub range_start: u32,
    pub range_end: u32,
    pub confidence_score: f64,
    pub algorithm_used: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub recommended_algorithm: String,
    pub recommended_range_size: u32,
    pub recommended_range_start: u32,
    pub recommended_range_end: u32,
    pub recommended_confidence_score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRow {
    pub date: String,
    #[serde(rename = "dauDB")]
    pub dau_db: Option<u8>,
    pub db: Option<u8>,
    pub dau_g1: Option<u8>,
    pub g1: Option<u8>,
    #[serde(rename = "dauDBMatch")]
    pub dau_db_match: u8,
    pub db_match: u8,
    pub dau_g1_match: u8,
    pub g1_match: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmptyCount {
    pub empty_length: u32,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EmptyStats {
    pub column_name: String,
    pub range: String,
    pub counts: Vec<EmptyCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    pub rows: Vec<AnalysisRow>,
    pub empty_stats: Vec<EmptyStats>,
    pub total_pages: u32,
    pub current_page: u32,
    pub total_elements: u64,
}
