use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::crawler::{CrawlOutcome, DayOutcome};
use crate::dto::LotteryData;
use crate::import::ImportResult;

pub fn display_import_summary(result: &ImportResult) {
    println!("Nhập dữ liệu xong :");
    println!("  Tổng số dòng đọc  : {}", result.total_records);
    println!("  Đã thêm           : {}", result.inserted);
    println!("  Bỏ qua (trùng)    : {}", result.skipped);
    if result.errors > 0 {
        println!("  Lỗi               : {}", result.errors);
    }
}

pub fn crawl_table(outcomes: &[DayOutcome]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Ngày", "Kết quả"]);

    for day in outcomes {
        let (text, color) = match &day.outcome {
            CrawlOutcome::Saved => ("Đã lưu".to_string(), Color::Green),
            CrawlOutcome::AlreadyExists => ("Đã tồn tại".to_string(), Color::Yellow),
            CrawlOutcome::Failed(reason) => (reason.clone(), Color::Red),
        };
        table.add_row(vec![
            Cell::new(day.date.format("%d-%m-%Y")),
            Cell::new(text).fg(color),
        ]);
    }
    table
}

pub fn display_crawl_outcomes(outcomes: &[DayOutcome]) {
    if outcomes.is_empty() {
        println!("Không có ngày nào để cào.");
        return;
    }
    println!("{}", crawl_table(outcomes));
}

pub fn result_table(data: &LotteryData) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Giải", "Số"]);

    table.add_row(vec![
        Cell::new("G.ĐB"),
        Cell::new(&data.special_prize).fg(Color::Red),
    ]);
    table.add_row(vec!["G.1".to_string(), data.prize1.clone()]);
    let tiers = [
        ("G.2", &data.prize2),
        ("G.3", &data.prize3),
        ("G.4", &data.prize4),
        ("G.5", &data.prize5),
        ("G.6", &data.prize6),
        ("G.7", &data.prize7),
    ];
    for (label, numbers) in tiers {
        table.add_row(vec![label.to_string(), numbers.join(" - ")]);
    }
    table
}

pub fn display_result(data: &LotteryData) {
    println!("Kết quả ngày {} (thứ {})", data.date, data.day_of_week);
    println!("{}", result_table(data));
}
