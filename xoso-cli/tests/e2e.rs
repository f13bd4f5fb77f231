use chrono::NaiveDate;

use xoso_cli::app::{
    load_dashboard, load_draw, load_range_analysis, load_rule_analysis, run_update, AnalysisRule,
};
use xoso_cli::client::{ApiClient, CONNECT_ERROR_MESSAGE, NOT_FOUND_MESSAGE};
use xoso_cli::display::{analysis_report, draw_table};
use xoso_cli::filters::{DashboardFilters, FilterStore, RangeFilters, RuleFilters, PRIME_KEY};
use xoso_cli::views::ViewState;
use xoso_db::db::insert_result;
use xoso_db::models::{DailyResult, Prize};
use xoso_server::config::ServerConfig;
use xoso_server::store::Store;
use xoso_server::{serve_on, AppState};

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

/// Starts the real API on an ephemeral port with `days` stored.
async fn serve(days: u32) -> ApiClient {
    let store = Store::in_memory().unwrap();
    for d in 1..=days {
        let mut result = DailyResult::new(date(d));
        result.push_raw(&format!("{:02}345", d + 10), Prize::Special);
        result.push_raw("67891", Prize::First);
        result.push_raw("07", Prize::Seventh);
        store.call(move |conn| insert_result(conn, &result)).await.unwrap();
    }
    let state = AppState::new(&ServerConfig::default(), store).unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        serve_on(listener, state).await.unwrap();
    });
    ApiClient::new(&format!("http://{}", addr)).unwrap()
}

#[tokio::test]
async fn history_shows_stored_draw() {
    let client = serve(3).await;
    let state = load_draw(&client, date(2)).await;
    let ViewState::Ready(draw) = state else {
        panic!("expected a draw, got {:?}", state);
    };
    assert_eq!(draw.date, "02/01/2025");
    assert_eq!(draw.special_prize, "12345");
    assert_eq!(draw.prize7, vec!["07".to_string()]);
    assert!(draw_table(&draw).contains("G.ĐB"));
}

#[tokio::test]
async fn history_missing_day_reports_not_found() {
    let client = serve(1).await;
    let state = load_draw(&client, date(20)).await;
    assert_eq!(state, ViewState::Error(NOT_FOUND_MESSAGE.to_string()));
}

#[tokio::test]
async fn unreachable_server_reports_connection_error() {
    let client = ApiClient::new("http://127.0.0.1:9").unwrap();
    let state = load_draw(&client, date(1)).await;
    assert_eq!(state, ViewState::Error(CONNECT_ERROR_MESSAGE.to_string()));
}

#[tokio::test]
async fn dashboard_loads_stats() {
    let client = serve(5).await;
    let filters = DashboardFilters {
        algorithm: Some("Markov".to_string()),
        range_size: Some(20),
        ..DashboardFilters::default()
    };
    let ViewState::Ready(stats) = load_dashboard(&client, &filters).await else {
        panic!("dashboard should load");
    };
    assert_eq!(stats.total_days, 5);
    assert_eq!(stats.last_update_date, "05/01/2025");
    assert_eq!(stats.quick_forecast.algorithm_used, "Markov");
    assert_eq!(stats.quick_forecast.range_end - stats.quick_forecast.range_start + 1, 20);
}

#[tokio::test]
async fn range_analysis_applies_bounds() {
    let client = serve(4).await;
    let filters = RangeFilters {
        from_date: Some(date(1)),
        dau_db_start: Some(12),
        dau_db_end: Some(13),
        ..RangeFilters::default()
    };
    let ViewState::Ready(data) = load_range_analysis(&client, &filters).await else {
        panic!("analysis should load");
    };
    // dauDB runs 11, 12, 13, 14
    let hits: Vec<u8> = data.rows.iter().map(|r| r.dau_db_match).collect();
    assert_eq!(hits, vec![0, 1, 1, 0]);
    assert_eq!(data.empty_stats[0].range, "12-13");
    assert!(!analysis_report(&data, false).contains("Trang"));
}

#[tokio::test]
async fn rule_analysis_paginates() {
    let client = serve(7).await;
    let filters = RuleFilters {
        from_date: Some(date(1)),
        page: 1,
        size: 3,
    };
    let ViewState::Ready(data) = load_rule_analysis(&client, AnalysisRule::EvenOdd, &filters).await
    else {
        panic!("analysis should load");
    };
    assert_eq!(data.total_elements, 7);
    assert_eq!(data.total_pages, 3);
    assert_eq!(data.rows.len(), 3);
    assert_eq!(data.rows[0].date, "04-01-2025");
    assert_eq!(data.empty_stats[0].range, "Chẵn");
    assert!(analysis_report(&data, true).ends_with("Trang 2 / 3 (7 kết quả)"));
}

#[tokio::test]
async fn empty_analysis_is_empty_state() {
    let client = serve(0).await;
    let state = load_rule_analysis(&client, AnalysisRule::Prime, &RuleFilters::default()).await;
    assert_eq!(state, ViewState::Empty);
}

#[tokio::test]
async fn update_on_empty_store_reports_message() {
    let client = serve(0).await;
    let ViewState::Ready(text) = run_update(&client).await else {
        panic!("update should answer");
    };
    assert!(text.starts_with("Không có dữ liệu trong database"));
}

#[tokio::test]
async fn stored_filters_drive_next_request() {
    let client = serve(6).await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("filters.json");

    let mut store = FilterStore::open(&path);
    let saved = RuleFilters {
        from_date: Some(date(4)),
        page: 0,
        size: 30,
    };
    store.save(PRIME_KEY, &saved).unwrap();

    let loaded = FilterStore::open(&path).load::<RuleFilters>(PRIME_KEY);
    assert_eq!(loaded, saved);
    let ViewState::Ready(data) = load_rule_analysis(&client, AnalysisRule::Prime, &loaded).await
    else {
        panic!("analysis should load");
    };
    assert_eq!(data.total_elements, 3);
}
