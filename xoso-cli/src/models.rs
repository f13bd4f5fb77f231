//! Client-side view of the `/api` payloads. Every field has a default so a
//! partially filled response still renders.

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DrawResult {
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

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LotoGan {
    pub number: u8,
    pub days_since_last_appearance: i64,
    pub last_appearance_date: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LotoHot {
    pub number: u8,
    pub frequency: u32,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct QuickForecast {
    pub range_start: u32,
    pub range_end: u32,
    pub confidence_score: f64,
    pub algorithm_used: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Recommendation {
    pub recommended_algorithm: String,
    pub recommended_range_size: u32,
    pub recommended_range_start: u32,
    pub recommended_range_end: u32,
    pub recommended_confidence_score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_days: u64,
    pub last_update_date: String,
    pub top_lo_gan: Vec<LotoGan>,
    pub top_lo_hot: Vec<LotoHot>,
    pub quick_forecast: QuickForecast,
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
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

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EmptyCount {
    pub empty_length: u32,
    pub count: u32,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EmptyStats {
    pub column_name: String,
    pub range: String,
    pub counts: Vec<EmptyCount>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisData {
    pub rows: Vec<AnalysisRow>,
    pub empty_stats: Vec<EmptyStats>,
    pub total_pages: u32,
    pub current_page: u32,
    pub total_elements: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_tolerates_nulls_and_missing_fields() {
        let row: AnalysisRow =
            serde_json::from_str(r#"{"date":"01-02-2025","dauDB":null,"db":7,"dbMatch":1}"#)
                .unwrap();
        assert_eq!(row.dau_db, None);
        assert_eq!(row.db, Some(7));
        assert_eq!(row.db_match, 1);
        assert_eq!(row.g1_match, 0);
    }

    #[test]
    fn test_dashboard_without_recommendation() {
        let stats: DashboardStats = serde_json::from_str(
            r#"{"totalDays":3,"lastUpdateDate":"03/01/2025","topLoGan":[],"topLoHot":[],
                "quickForecast":{"rangeStart":60,"rangeEnd":79,"confidenceScore":0.64,
                "algorithmUsed":"Frequency Analysis"}}"#,
        )
        .unwrap();
        assert!(stats.recommendation.is_none());
        assert_eq!(stats.quick_forecast.range_end, 79);
    }
}
