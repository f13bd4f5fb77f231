use anyhow::Result;
use chrono::NaiveDate;
use clap::ValueEnum;

use crate::client::{ApiClient, FetchError};
use crate::filters::{
    clamp_bound, validate_range_size, DashboardFilters, FilterStore, RangeFilters, RuleFilters,
    DASHBOARD_KEY, DEFAULT_PAGE_SIZE, DIVIDE3_KEY, EVEN_ODD_KEY, PRIME_KEY,
};
use crate::models::{AnalysisData, DashboardStats, DrawResult};
use crate::views::ViewState;

/// Analysis views offered by the selector; merge views are not available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnalysisRule {
    #[value(name = "50-50")]
    FiftyFifty,
    #[value(name = "even-odd")]
    EvenOdd,
    #[value(name = "prime")]
    Prime,
    #[value(name = "divide-3")]
    DivideByThree,
}

impl AnalysisRule {
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisRule::FiftyFifty => "50-50",
            AnalysisRule::EvenOdd => "even-odd",
            AnalysisRule::Prime => "prime",
            AnalysisRule::DivideByThree => "divide-3",
        }
    }

    /// Key of the rule views' stored filters; the 50/50 view has its own shape.
    pub fn filter_key(&self) -> Option<&'static str> {
        match self {
            AnalysisRule::FiftyFifty => None,
            AnalysisRule::EvenOdd => Some(EVEN_ODD_KEY),
            AnalysisRule::Prime => Some(PRIME_KEY),
            AnalysisRule::DivideByThree => Some(DIVIDE3_KEY),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            AnalysisRule::FiftyFifty => "Phân tích 50/50",
            AnalysisRule::EvenOdd => "Phân tích Chẵn/Lẻ",
            AnalysisRule::Prime => "Phân tích Số nguyên tố",
            AnalysisRule::DivideByThree => "Phân tích Chia hết cho 3",
        }
    }
}

/// Values given on the command line for the dashboard.
#[derive(Debug, Clone, Default)]
pub struct DashboardOverrides {
    pub month: Option<String>,
    pub lo_gan_month: Option<String>,
    pub lo_hot_month: Option<String>,
    pub algorithm: Option<String>,
    pub range_size: Option<u32>,
}

impl DashboardOverrides {
    pub fn apply(self, mut filters: DashboardFilters) -> DashboardFilters {
        if self.month.is_some() {
            filters.month = self.month;
        }
        if self.lo_gan_month.is_some() {
            filters.lo_gan_month = self.lo_gan_month;
        }
        if self.lo_hot_month.is_some() {
            filters.lo_hot_month = self.lo_hot_month;
        }
        if self.algorithm.is_some() {
            filters.algorithm = self.algorithm;
        }
        if self.range_size.is_some() {
            filters.range_size = self.range_size;
        }
        filters
    }
}

/// Merges the given values into the stored dashboard filters. Filters with an
/// out-of-range size are used for this run but never written back.
pub fn merge_dashboard_filters(
    store: &mut FilterStore,
    overrides: DashboardOverrides,
) -> Result<DashboardFilters> {
    let filters = overrides.apply(store.load(DASHBOARD_KEY));
    if filters
        .range_size
        .map_or(true, |size| validate_range_size(size).is_ok())
    {
        store.save(DASHBOARD_KEY, &filters)?;
    }
    Ok(filters)
}

/// Raw bounds for the 50/50 view, clamped to 00-99 when applied.
#[derive(Debug, Clone, Default)]
pub struct RangeOverrides {
    pub from_date: Option<NaiveDate>,
    pub bounds: [Option<i64>; 8],
}

impl RangeOverrides {
    pub fn apply(self, mut filters: RangeFilters) -> RangeFilters {
        if self.from_date.is_some() {
            filters.from_date = self.from_date;
        }
        let slots = [
            &mut filters.dau_db_start,
            &mut filters.dau_db_end,
            &mut filters.db_start,
            &mut filters.db_end,
            &mut filters.dau_g1_start,
            &mut filters.dau_g1_end,
            &mut filters.g1_start,
            &mut filters.g1_end,
        ];
        for (slot, given) in slots.into_iter().zip(self.bounds) {
            if let Some(value) = given {
                *slot = Some(clamp_bound(value));
            }
        }
        filters
    }
}

#[derive(Debug, Clone, Default)]
pub struct RuleOverrides {
    pub from_date: Option<NaiveDate>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl RuleOverrides {
    /// A new start date sends the view back to its first page.
    pub fn apply(self, mut filters: RuleFilters) -> RuleFilters {
        if self.from_date.is_some() && self.from_date != filters.from_date {
            filters.from_date = self.from_date;
            filters.page = 0;
        }
        if let Some(page) = self.page {
            filters.page = page;
        }
        if let Some(size) = self.size {
            filters.size = if size == 0 { DEFAULT_PAGE_SIZE } else { size.min(100) };
        }
        filters
    }
}

pub async fn load_draw(client: &ApiClient, date: NaiveDate) -> ViewState<DrawResult> {
    ViewState::settle(
        client.lottery(date).await,
        |_| false,
        |e: &FetchError| e.lookup_message().to_string(),
    )
}

/// A range size outside 10..=60 never reaches the server.
pub async fn load_dashboard(
    client: &ApiClient,
    filters: &DashboardFilters,
) -> ViewState<DashboardStats> {
    if let Some(size) = filters.range_size {
        if let Err(message) = validate_range_size(size) {
            return ViewState::Error(message.to_string());
        }
    }
    ViewState::settle(
        client.dashboard(filters).await,
        |_| false,
        |e: &FetchError| e.dashboard_message().to_string(),
    )
}

pub async fn load_range_analysis(
    client: &ApiClient,
    filters: &RangeFilters,
) -> ViewState<AnalysisData> {
    ViewState::settle(
        client.range_analysis(filters).await,
        |data| data.rows.is_empty(),
        |e: &FetchError| e.analysis_message().to_string(),
    )
}

pub async fn load_rule_analysis(
    client: &ApiClient,
    rule: AnalysisRule,
    filters: &RuleFilters,
) -> ViewState<AnalysisData> {
    ViewState::settle(
        client.rule_analysis(rule.code(), filters).await,
        |data| data.rows.is_empty(),
        |e: &FetchError| e.analysis_message().to_string(),
    )
}

pub async fn run_update(client: &ApiClient) -> ViewState<String> {
    ViewState::settle(
        client.auto_update().await,
        |text| text.trim().is_empty(),
        |e: &FetchError| e.lookup_message().to_string(),
    )
}
