use std::fmt;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{Days, NaiveDate};
use regex::Regex;
use reqwest::Client;
use tracing::{debug, info, warn};
use xoso_db::db::{insert_result, latest_draw_date, result_exists};
use xoso_db::models::{validate_result, DailyResult, Prize};

use crate::config::ServerConfig;
use crate::dto::DISPLAY_DATE;
use crate::store::Store;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
const TIMEOUT: Duration = Duration::from_secs(15);
const URL_DATE: &str = "%d-%m-%Y";
const RESULT_BOXES: [&str; 2] = ["box_kqxs", "bkqt"];

/// Cell classes used by the results page for each tier (current and legacy).
const TIER_CLASSES: [(Prize, &str); 8] = [
    (Prize::Special, "giai_db|giaidb"),
    (Prize::First, "giai_nhat|giai1"),
    (Prize::Second, "giai_nhi|giai2"),
    (Prize::Third, "giai_ba|giai3"),
    (Prize::Fourth, "giai_tu|giai4"),
    (Prize::Fifth, "giai_nam|giai5"),
    (Prize::Sixth, "giai_sau|giai6"),
    (Prize::Seventh, "giai_bay|giai7"),
];

fn tier_cell(classes: &str) -> Result<Regex> {
    let pattern =
        format!(r#"(?s)<td[^>]*class="(?:[^"]*\s)?(?:{classes})(?:\s[^"]*)?"[^>]*>(.*?)</td>"#);
    Ok(Regex::new(&pattern)?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    Saved,
    AlreadyExists,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayOutcome {
    pub date: NaiveDate,
    pub outcome: CrawlOutcome,
}

impl fmt::Display for DayOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let day = self.date.format(URL_DATE);
        match &self.outcome {
            CrawlOutcome::Saved => write!(f, "Thành công: {}", day),
            CrawlOutcome::AlreadyExists => write!(f, "Dữ liệu ngày {} đã tồn tại!", day),
            CrawlOutcome::Failed(reason) => write!(f, "Lỗi ngày {}: {}", day, reason),
        }
    }
}

/// Extracts one day's draw from a results page.
pub fn parse_result_page(html: &str, date: NaiveDate) -> Result<DailyResult> {
    let tag = Regex::new(r"<[^>]*>")?;
    let title = Regex::new(r"(?is)<title[^>]*>(.*?)</title>")?;
    let separator = Regex::new(r"[\s\-]+")?;
    let strip_tags = |fragment: &str| tag.replace_all(fragment, " ").replace("&nbsp;", " ");

    let page_title = title
        .captures(html)
        .and_then(|c| c.get(1))
        .map_or(String::new(), |m| strip_tags(m.as_str()));
    if page_title.contains("404") || !html.contains(&date.format(DISPLAY_DATE).to_string()) {
        bail!("Không tìm thấy trang kết quả cho ngày {}", date.format(URL_DATE));
    }

    let (box_start, marker) = RESULT_BOXES
        .iter()
        .find_map(|marker| html.find(marker).map(|i| (i, *marker)))
        .context("Không tìm thấy bảng .box_kqxs hoặc .bkqt")?;
    // only the first results box belongs to the requested day
    let rest = &html[box_start + marker.len()..];
    let box_len = RESULT_BOXES
        .iter()
        .filter_map(|m| rest.find(m))
        .min()
        .unwrap_or(rest.len());
    let body = &rest[..box_len];

    let mut result = DailyResult::new(date);
    for (prize, classes) in TIER_CLASSES {
        let cell = tier_cell(classes)?;
        let text = cell
            .captures_iter(body)
            .filter_map(|c| c.get(1))
            .map(|m| strip_tags(m.as_str()))
            .collect::<Vec<_>>()
            .join(" ");

        if prize == Prize::Special {
            let special: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
            if special.is_empty() {
                bail!("Chưa có KQ giải ĐB (có thể chưa đến giờ quay)");
            }
            result.push_raw(&special, Prize::Special);
            continue;
        }
        for number in separator.split(text.trim()).filter(|s| !s.is_empty()) {
            result.push_raw(number, prize);
        }
    }

    validate_result(&result)?;
    Ok(result)
}

#[derive(Clone)]
pub struct Crawler {
    client: Client,
    base_url: String,
    delay: Duration,
    store: Store,
}

impl Crawler {
    pub fn new(config: &ServerConfig, store: Store) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build()
            .context("Không thể tạo HTTP client")?;
        Ok(Self {
            client,
            base_url: config.crawl_base_url.trim_end_matches('/').to_string(),
            delay: config.crawl_delay,
            store,
        })
    }

    pub fn page_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/ket-qua-xo-so/mien-bac/{}.html",
            self.base_url,
            date.format(URL_DATE)
        )
    }

    async fn fetch_page(&self, date: NaiveDate) -> Result<String> {
        let url = self.page_url(date);
        debug!(%url, "fetching results page");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Không thể tải {}", url))?;
        if !response.status().is_success() {
            bail!("Máy chủ trả về {}", response.status());
        }
        response.text().await.context("Không đọc được nội dung trang")
    }

    pub async fn crawl_date(&self, date: NaiveDate) -> DayOutcome {
        let outcome = match self.try_crawl(date).await {
            Ok(outcome) => outcome,
            Err(err) => CrawlOutcome::Failed(format!("{err:#}")),
        };
        let day = DayOutcome { date, outcome };
        match &day.outcome {
            CrawlOutcome::Failed(_) => warn!("{}", day),
            _ => info!("{}", day),
        }
        day
    }

    async fn try_crawl(&self, date: NaiveDate) -> Result<CrawlOutcome> {
        if self.store.call(move |conn| result_exists(conn, date)).await? {
            return Ok(CrawlOutcome::AlreadyExists);
        }
        let html = self.fetch_page(date).await?;
        let result = parse_result_page(&html, date)?;
        let inserted = self.store.call(move |conn| insert_result(conn, &result)).await?;
        Ok(if inserted {
            CrawlOutcome::Saved
        } else {
            CrawlOutcome::AlreadyExists
        })
    }

    /// Crawls every day of `from..=to` in order, pausing between requests.
    pub async fn crawl_range<F>(&self, from: NaiveDate, to: NaiveDate, mut on_day: F) -> Vec<DayOutcome>
    where
        F: FnMut(&DayOutcome),
    {
        let mut outcomes = Vec::new();
        for date in from.iter_days().take_while(|d| *d <= to) {
            if !outcomes.is_empty() && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let day = self.crawl_date(date).await;
            on_day(&day);
            outcomes.push(day);
        }
        outcomes
    }

    /// Fills the gap between the latest stored day and `today`.
    pub async fn auto_update(&self, today: NaiveDate) -> Result<String> {
        let Some(last) = self.store.call(latest_draw_date).await? else {
            return Ok(
                "Không có dữ liệu trong database. Vui lòng cập nhật dữ liệu ban đầu.".to_string(),
            );
        };
        if last >= today {
            return Ok(format!(
                "Dữ liệu đã được cập nhật đến hôm nay ({}).",
                today.format(DISPLAY_DATE)
            ));
        }

        let start = last
            .checked_add_days(Days::new(1))
            .context("Ngày ngoài khoảng hỗ trợ")?;
        let outcomes = self.crawl_range(start, today, |_| {}).await;
        Ok(summarize(&outcomes, start, today))
    }
}

pub fn summarize(outcomes: &[DayOutcome], from: NaiveDate, to: NaiveDate) -> String {
    let total = outcomes.len();
    let saved = outcomes
        .iter()
        .filter(|d| d.outcome == CrawlOutcome::Saved)
        .count();
    let existing = outcomes
        .iter()
        .filter(|d| d.outcome == CrawlOutcome::AlreadyExists)
        .count();
    format!(
        "Hoàn thành! Đã cập nhật {} ngày (Thành công: {}, Đã tồn tại: {}, Lỗi: {}). Từ {} đến {}.",
        total,
        saved,
        existing,
        total - saved - existing,
        from.format(DISPLAY_DATE),
        to.format(DISPLAY_DATE)
    )
}
