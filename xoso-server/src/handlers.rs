use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use tracing::{error, info};

use xoso_db::db::fetch_result_by_date;

use crate::analysis::rules::{AnalysisType, Bounds, RangeFilters};
use crate::analysis::{analysis_data, AnalysisQuery};
use crate::crawler::summarize;
use crate::dto::{AnalysisData, DashboardStats, LotteryData};
use crate::error::{ApiError, ApiResult};
use crate::stats::{dashboard_stats, DashboardQuery, YearMonth};
use crate::{today, AppState};

const ISO_DATE: &str = "%Y-%m-%d";
const CRAWL_DATE: &str = "%d-%m-%Y";

fn parse_date(raw: &str, format: &str, field: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), format)
        .map_err(|_| ApiError::BadRequest(format!("Ngày không hợp lệ ({}): '{}'", field, raw)))
}

fn parse_month(raw: Option<&str>, field: &str) -> ApiResult<Option<YearMonth>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("Tháng không hợp lệ ({}): '{}'", field, s))),
    }
}

/// Blank numeric query values (`dbStart=`) read as absent.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[derive(Debug, Deserialize)]
pub struct LotteryParams {
    pub date: String,
}

pub async fn lottery(
    State(state): State<AppState>,
    Query(params): Query<LotteryParams>,
) -> ApiResult<Json<LotteryData>> {
    let date = parse_date(&params.date, ISO_DATE, "date")?;
    let found = state
        .store
        .call(move |conn| fetch_result_by_date(conn, date))
        .await?;
    match found {
        Some(result) => Ok(Json(LotteryData::from(&result))),
        None => Err(ApiError::NotFound),
    }
}

pub async fn auto_update(State(state): State<AppState>) -> impl IntoResponse {
    match state.crawler.auto_update(today()).await {
        Ok(message) => (StatusCode::OK, message),
        Err(err) => {
            error!(error = %format!("{err:#}"), "auto-update failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Lỗi khi cập nhật dữ liệu: {err}"),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SingleCrawlParams {
    pub date: String,
}

pub async fn crawl_single(
    State(state): State<AppState>,
    Query(params): Query<SingleCrawlParams>,
) -> ApiResult<String> {
    let date = parse_date(&params.date, CRAWL_DATE, "date")?;
    let day = state.crawler.crawl_date(date).await;
    Ok(day.to_string())
}

#[derive(Debug, Deserialize)]
pub struct RangeCrawlParams {
    pub from: String,
    pub to: String,
}

pub async fn crawl_range(
    State(state): State<AppState>,
    Query(params): Query<RangeCrawlParams>,
) -> ApiResult<String> {
    let from = parse_date(&params.from, CRAWL_DATE, "from")?;
    let to = parse_date(&params.to, CRAWL_DATE, "to")?;
    if from > to {
        return Err(ApiError::BadRequest(
            "Ngày bắt đầu phải trước ngày kết thúc".to_string(),
        ));
    }

    let crawler = state.crawler.clone();
    tokio::spawn(async move {
        let outcomes = crawler.crawl_range(from, to, |_| {}).await;
        info!("{}", summarize(&outcomes, from, to));
    });

    Ok(format!(
        "Đang bắt đầu cào dữ liệu từ {} đến {}. Hãy kiểm tra console log.",
        params.from, params.to
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardParams {
    pub month: Option<String>,
    pub lo_gan_month: Option<String>,
    pub lo_hot_month: Option<String>,
    pub algorithm: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub range_size: Option<i64>,
}

pub async fn dashboard(
    State(state): State<AppState>,
    Query(params): Query<DashboardParams>,
) -> ApiResult<Json<DashboardStats>> {
    let query = DashboardQuery {
        month: parse_month(params.month.as_deref(), "month")?,
        lo_gan_month: parse_month(params.lo_gan_month.as_deref(), "loGanMonth")?,
        lo_hot_month: parse_month(params.lo_hot_month.as_deref(), "loHotMonth")?,
        algorithm: params.algorithm.filter(|a| !a.trim().is_empty()),
        range_size: params.range_size,
    };
    let today = today();
    let stats = state
        .store
        .call(move |conn| dashboard_stats(conn, &query, today))
        .await?;
    Ok(Json(stats))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisParams {
    pub from_date: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub size: Option<i64>,
    pub analysis_type: Option<String>,
    #[serde(rename = "dauDBStart", default, deserialize_with = "blank_as_none")]
    pub dau_db_start: Option<i64>,
    #[serde(rename = "dauDBEnd", default, deserialize_with = "blank_as_none")]
    pub dau_db_end: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub db_start: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub db_end: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub dau_g1_start: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub dau_g1_end: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub g1_start: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub g1_end: Option<i64>,
}

impl AnalysisParams {
    pub fn into_query(self) -> ApiResult<AnalysisQuery> {
        let kind = match self.analysis_type.as_deref().map(str::trim) {
            None | Some("") => AnalysisType::FiftyFifty,
            Some(code) => code
                .parse()
                .map_err(|e: anyhow::Error| ApiError::BadRequest(e.to_string()))?,
        };
        let from_date = match self.from_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_date(raw, ISO_DATE, "fromDate")?),
        };
        Ok(AnalysisQuery {
            from_date,
            page: self.page,
            size: self.size,
            kind,
            filters: RangeFilters {
                dau_db: Bounds::new(self.dau_db_start, self.dau_db_end),
                db: Bounds::new(self.db_start, self.db_end),
                dau_g1: Bounds::new(self.dau_g1_start, self.dau_g1_end),
                g1: Bounds::new(self.g1_start, self.g1_end),
            },
        })
    }
}

pub async fn analysis(
    State(state): State<AppState>,
    Query(params): Query<AnalysisParams>,
) -> ApiResult<Json<AnalysisData>> {
    let query = params.into_query()?;
    let today = today();
    let data = state
        .store
        .call(move |conn| analysis_data(conn, &query, today))
        .await?;
    Ok(Json(data))
}
