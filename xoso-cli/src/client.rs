use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::filters::{DashboardFilters, RangeFilters, RuleFilters};
use crate::models::{AnalysisData, DashboardStats, DrawResult};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

pub const NOT_FOUND_MESSAGE: &str = "Không tìm thấy dữ liệu cho ngày này";
pub const LOAD_ERROR_MESSAGE: &str = "Có lỗi xảy ra khi tải dữ liệu";
pub const CONNECT_ERROR_MESSAGE: &str = "Không thể kết nối đến server. Vui lòng kiểm tra lại.";
pub const ANALYSIS_ERROR_MESSAGE: &str = "Không thể tải dữ liệu phân tích";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("không tìm thấy (404)")]
    NotFound,
    #[error("máy chủ trả về {0}")]
    Status(StatusCode),
    #[error("lỗi kết nối: {0}")]
    Network(#[source] reqwest::Error),
    #[error("phản hồi không hợp lệ: {0}")]
    Decode(#[source] reqwest::Error),
}

impl FetchError {
    /// Message shown by the single-date lookup.
    pub fn lookup_message(&self) -> &'static str {
        match self {
            FetchError::NotFound => NOT_FOUND_MESSAGE,
            FetchError::Status(_) | FetchError::Decode(_) => LOAD_ERROR_MESSAGE,
            FetchError::Network(_) => CONNECT_ERROR_MESSAGE,
        }
    }

    pub fn dashboard_message(&self) -> &'static str {
        CONNECT_ERROR_MESSAGE
    }

    pub fn analysis_message(&self) -> &'static str {
        ANALYSIS_ERROR_MESSAGE
    }
}

type Params = Vec<(&'static str, String)>;

fn push<T: ToString>(params: &mut Params, key: &'static str, value: Option<T>) {
    if let Some(value) = value {
        params.push((key, value.to_string()));
    }
}

pub fn dashboard_params(filters: &DashboardFilters) -> Params {
    let mut params = Params::new();
    push(&mut params, "month", filters.month.as_deref());
    push(&mut params, "loGanMonth", filters.lo_gan_month.as_deref());
    push(&mut params, "loHotMonth", filters.lo_hot_month.as_deref());
    push(&mut params, "algorithm", filters.algorithm.as_deref());
    push(&mut params, "rangeSize", filters.range_size);
    params
}

pub fn range_params(filters: &RangeFilters) -> Params {
    let mut params = Params::new();
    push(&mut params, "fromDate", filters.from_date.map(iso));
    push(&mut params, "dauDBStart", filters.dau_db_start);
    push(&mut params, "dauDBEnd", filters.dau_db_end);
    push(&mut params, "dbStart", filters.db_start);
    push(&mut params, "dbEnd", filters.db_end);
    push(&mut params, "dauG1Start", filters.dau_g1_start);
    push(&mut params, "dauG1End", filters.dau_g1_end);
    push(&mut params, "g1Start", filters.g1_start);
    push(&mut params, "g1End", filters.g1_end);
    params
}

pub fn rule_params(analysis_type: &str, filters: &RuleFilters) -> Params {
    let mut params = Params::new();
    push(&mut params, "fromDate", filters.from_date.map(iso));
    push(&mut params, "page", Some(filters.page));
    push(&mut params, "size", Some(filters.size));
    push(&mut params, "analysisType", Some(analysis_type));
    params
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(concat!("xoso-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(FetchError::Network)?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, path: &str, params: &Params) -> Result<reqwest::Response, FetchError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?params, "GET");
        let response = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(FetchError::Network)?;
        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(FetchError::NotFound),
            status => Err(FetchError::Status(status)),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, params: &Params) -> Result<T, FetchError> {
        let response = self.send(path, params).await?;
        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                FetchError::Decode(e)
            } else {
                FetchError::Network(e)
            }
        })
    }

    pub async fn lottery(&self, date: NaiveDate) -> Result<DrawResult, FetchError> {
        self.get_json("/api/lottery", &vec![("date", iso(date))]).await
    }

    pub async fn auto_update(&self) -> Result<String, FetchError> {
        let response = self.send("/api/crawl/auto-update", &Params::new()).await?;
        response.text().await.map_err(FetchError::Network)
    }

    pub async fn dashboard(&self, filters: &DashboardFilters) -> Result<DashboardStats, FetchError> {
        self.get_json("/api/dashboard/stats", &dashboard_params(filters)).await
    }

    pub async fn range_analysis(&self, filters: &RangeFilters) -> Result<AnalysisData, FetchError> {
        self.get_json("/api/analysis", &range_params(filters)).await
    }

    pub async fn rule_analysis(
        &self,
        analysis_type: &str,
        filters: &RuleFilters,
    ) -> Result<AnalysisData, FetchError> {
        self.get_json("/api/analysis", &rule_params(analysis_type, filters)).await
    }
}
