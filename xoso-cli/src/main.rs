use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use xoso_cli::app::{
    load_dashboard, load_draw, load_range_analysis, load_rule_analysis, merge_dashboard_filters,
    run_update, AnalysisRule, DashboardOverrides, RangeOverrides, RuleOverrides,
};
use xoso_cli::client::{ApiClient, DEFAULT_API_URL};
use xoso_cli::display::{
    analysis_report, dashboard_tables, draw_table, render_loading, render_state,
};
use xoso_cli::filters::{
    default_path, FilterStore, RangeFilters, RuleFilters, ANALYSIS_KEY, DASHBOARD_KEY,
};
use xoso_cli::views::ViewState;

#[derive(Parser)]
#[command(name = "xoso", about = "Bảng thống kê xổ số miền Bắc")]
struct Cli {
    /// Địa chỉ API
    #[arg(long, env = "XOSO_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// Tệp lưu bộ lọc
    #[arg(long, env = "XOSO_FILTERS", global = true)]
    filters: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Tổng quan: lô gan, lô hot và dự báo nhanh
    Dashboard {
        /// Tháng (yyyy-MM) áp dụng cho cả lô gan và lô hot
        #[arg(long)]
        month: Option<String>,
        #[arg(long)]
        lo_gan_month: Option<String>,
        #[arg(long)]
        lo_hot_month: Option<String>,
        /// Frequency Analysis, LSTM hoặc Markov
        #[arg(long)]
        algorithm: Option<String>,
        /// Khoảng số (10-60)
        #[arg(long)]
        range_size: Option<u32>,
        /// Khôi phục bộ lọc mặc định
        #[arg(long)]
        reset: bool,
    },

    /// Kết quả của một ngày (yyyy-MM-dd, mặc định hôm nay)
    History {
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Bảng phân tích theo quy tắc
    Analysis {
        #[arg(value_enum)]
        rule: AnalysisRule,
        /// Từ ngày (yyyy-MM-dd)
        #[arg(long)]
        from: Option<NaiveDate>,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        size: Option<u32>,
        #[arg(long, allow_negative_numbers = true)]
        dau_db_start: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        dau_db_end: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        db_start: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        db_end: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        dau_g1_start: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        dau_g1_end: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        g1_start: Option<i64>,
        #[arg(long, allow_negative_numbers = true)]
        g1_end: Option<i64>,
        #[arg(long)]
        reset: bool,
    },

    /// Cập nhật dữ liệu đến hôm nay
    Update,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = ApiClient::new(&cli.api_url)?;
    let mut store = FilterStore::open(&cli.filters.unwrap_or_else(default_path));

    let failed = match cli.command {
        Command::Dashboard {
            month,
            lo_gan_month,
            lo_hot_month,
            algorithm,
            range_size,
            reset,
        } => {
            if reset {
                store.reset(DASHBOARD_KEY)?;
            }
            let overrides = DashboardOverrides {
                month,
                lo_gan_month,
                lo_hot_month,
                algorithm,
                range_size,
            };
            let filters = merge_dashboard_filters(&mut store, overrides)?;

            render_loading();
            let state = load_dashboard(&client, &filters).await;
            render_state(&state, dashboard_tables);
            state.is_error()
        }
        Command::History { date } => {
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            render_loading();
            let state = load_draw(&client, date).await;
            render_state(&state, draw_table);
            state.is_error()
        }
        Command::Analysis {
            rule,
            from,
            page,
            size,
            dau_db_start,
            dau_db_end,
            db_start,
            db_end,
            dau_g1_start,
            dau_g1_end,
            g1_start,
            g1_end,
            reset,
        } => {
            println!("{}", rule.title());
            let state = match rule.filter_key() {
                None => {
                    if reset {
                        store.reset(ANALYSIS_KEY)?;
                    }
                    let filters = RangeOverrides {
                        from_date: from,
                        bounds: [
                            dau_db_start,
                            dau_db_end,
                            db_start,
                            db_end,
                            dau_g1_start,
                            dau_g1_end,
                            g1_start,
                            g1_end,
                        ],
                    }
                    .apply(store.load::<RangeFilters>(ANALYSIS_KEY));
                    store.save(ANALYSIS_KEY, &filters)?;
                    render_loading();
                    load_range_analysis(&client, &filters).await
                }
                Some(key) => {
                    if reset {
                        store.reset(key)?;
                    }
                    let filters = RuleOverrides {
                        from_date: from,
                        page,
                        size,
                    }
                    .apply(store.load::<RuleFilters>(key));
                    store.save(key, &filters)?;
                    render_loading();
                    load_rule_analysis(&client, rule, &filters).await
                }
            };
            let paginated = rule != AnalysisRule::FiftyFifty;
            render_state(&state, |data| analysis_report(data, paginated));
            state.is_error()
        }
        Command::Update => {
            let state: ViewState<String> = run_update(&client).await;
            render_state(&state, |text| text.clone());
            state.is_error()
        }
    };

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
