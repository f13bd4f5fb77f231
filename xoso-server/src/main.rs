use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use xoso_db::db::{fetch_result_by_date, open_db};
use xoso_server::config::ServerConfig;
use xoso_server::crawler::{summarize, Crawler};
use xoso_server::display::{display_crawl_outcomes, display_import_summary, display_result};
use xoso_server::dto::LotteryData;
use xoso_server::import::import_csv;
use xoso_server::store::Store;
use xoso_server::{run, today};

#[derive(Parser)]
#[command(name = "xoso-server", about = "Máy chủ dữ liệu xổ số miền Bắc")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Chạy API HTTP (mặc định)
    Serve {
        /// Địa chỉ lắng nghe, ví dụ 0.0.0.0:8080
        #[arg(long)]
        addr: Option<String>,
    },

    /// Cào kết quả của một ngày (dd-MM-yyyy)
    Crawl {
        #[arg(short, long)]
        date: String,
    },

    /// Cào kết quả cho một khoảng ngày
    CrawlRange {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },

    /// Cập nhật từ ngày mới nhất trong cơ sở dữ liệu đến hôm nay
    AutoUpdate,

    /// Nhập kết quả từ tệp CSV
    Import {
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Hiển thị kết quả đã lưu của một ngày (dd-MM-yyyy)
    Show {
        #[arg(short, long)]
        date: String,
    },

    /// In đường dẫn cơ sở dữ liệu
    DbPath,
}

fn parse_day(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%d-%m-%Y")
        .with_context(|| format!("Ngày phải có dạng dd-MM-yyyy: '{}'", raw))
}

fn open_store(config: &ServerConfig) -> Result<Store> {
    Store::new(open_db(&config.db_path)?)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::from_env();

    match cli.command.unwrap_or(Command::Serve { addr: None }) {
        Command::Serve { addr } => {
            if let Some(addr) = addr {
                config.addr = addr;
            }
            run(config).await
        }
        Command::Crawl { date } => {
            let date = parse_day(&date)?;
            let crawler = Crawler::new(&config, open_store(&config)?)?;
            let day = crawler.crawl_date(date).await;
            display_crawl_outcomes(std::slice::from_ref(&day));
            Ok(())
        }
        Command::CrawlRange { from, to } => cmd_crawl_range(&config, &from, &to).await,
        Command::AutoUpdate => {
            let crawler = Crawler::new(&config, open_store(&config)?)?;
            println!("{}", crawler.auto_update(today()).await?);
            Ok(())
        }
        Command::Import { file } => {
            let store = open_store(&config)?;
            let result = store.call(move |conn| import_csv(conn, &file)).await?;
            display_import_summary(&result);
            Ok(())
        }
        Command::Show { date } => {
            let date = parse_day(&date)?;
            let store = open_store(&config)?;
            match store.call(move |conn| fetch_result_by_date(conn, date)).await? {
                Some(result) => display_result(&LotteryData::from(&result)),
                None => println!("Không tìm thấy dữ liệu cho ngày này"),
            }
            Ok(())
        }
        Command::DbPath => {
            println!("{}", config.db_path.display());
            Ok(())
        }
    }
}

async fn cmd_crawl_range(config: &ServerConfig, from: &str, to: &str) -> Result<()> {
    let from = parse_day(from)?;
    let to = parse_day(to)?;
    if from > to {
        bail!("Ngày bắt đầu phải trước ngày kết thúc");
    }

    let crawler = Crawler::new(config, open_store(config)?)?;
    let total = (to - from).num_days() as u64 + 1;
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let outcomes = crawler
        .crawl_range(from, to, |day| {
            pb.set_message(day.date.format("%d-%m-%Y").to_string());
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();

    display_crawl_outcomes(&outcomes);
    println!("{}", summarize(&outcomes, from, to));
    Ok(())
}
