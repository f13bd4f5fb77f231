use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};

use crate::format::{pad2, page_footer, percent, short_date};
use crate::models::{AnalysisData, DashboardStats, DrawResult, EmptyStats};
use crate::views::{ViewState, EMPTY_TEXT, LOADING_TEXT};

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// Text a view shows for its state; errors come back as `Err` for stderr.
pub fn state_text<T>(
    state: &ViewState<T>,
    ready: impl FnOnce(&T) -> String,
) -> Result<String, String> {
    match state {
        ViewState::Loading => Ok(LOADING_TEXT.to_string()),
        ViewState::Error(message) => Err(message.clone()),
        ViewState::Empty => Ok(EMPTY_TEXT.to_string()),
        ViewState::Ready(data) => Ok(ready(data)),
    }
}

/// Prints whatever a view's state calls for; `ready` renders the payload.
pub fn render_state<T>(state: &ViewState<T>, ready: impl FnOnce(&T) -> String) {
    match state_text(state, ready) {
        Ok(text) => println!("{}", text),
        Err(message) => eprintln!("{}", message),
    }
}

/// Shown while a fetch is in flight.
pub fn render_loading() {
    render_state(&ViewState::<()>::Loading, |_| String::new());
}

pub fn draw_table(draw: &DrawResult) -> String {
    let mut table = new_table(vec!["Giải", "Kết quả"]);
    table.add_row(vec![
        Cell::new("G.ĐB"),
        Cell::new(&draw.special_prize).fg(Color::Red),
    ]);
    table.add_row(vec!["G.1".to_string(), draw.prize1.clone()]);
    let tiers = [
        ("G.2", &draw.prize2),
        ("G.3", &draw.prize3),
        ("G.4", &draw.prize4),
        ("G.5", &draw.prize5),
        ("G.6", &draw.prize6),
        ("G.7", &draw.prize7),
    ];
    for (label, numbers) in tiers {
        table.add_row(vec![label.to_string(), numbers.join(" - ")]);
    }
    if let Some(codes) = draw.codes.as_ref().filter(|c| !c.is_empty()) {
        table.add_row(vec!["Mã ĐB".to_string(), codes.join(" ")]);
    }
    format!("Kết quả ngày {} (thứ {})\n{}", draw.date, draw.day_of_week, table)
}

pub fn dashboard_tables(stats: &DashboardStats) -> String {
    let mut summary = new_table(vec!["Tổng số ngày", "Cập nhật gần nhất"]);
    summary.add_row(vec![
        stats.total_days.to_string(),
        stats.last_update_date.clone(),
    ]);

    let mut gan = new_table(vec!["Top Lô Gan", "Số ngày", "Lần cuối"]);
    if stats.top_lo_gan.is_empty() {
        gan.add_row(vec![EMPTY_TEXT, "", ""]);
    }
    for item in &stats.top_lo_gan {
        gan.add_row(vec![
            Cell::new(pad2(Some(item.number))).fg(Color::Blue),
            Cell::new(item.days_since_last_appearance),
            Cell::new(&item.last_appearance_date),
        ]);
    }

    let mut hot = new_table(vec!["Top Lô Hot", "Số lần"]);
    if stats.top_lo_hot.is_empty() {
        hot.add_row(vec![EMPTY_TEXT, ""]);
    }
    for item in &stats.top_lo_hot {
        hot.add_row(vec![
            Cell::new(pad2(Some(item.number))).fg(Color::Red),
            Cell::new(item.frequency),
        ]);
    }

    let forecast = &stats.quick_forecast;
    let mut quick = new_table(vec!["Dự Báo Nhanh", "Độ tin cậy", "Thuật toán"]);
    quick.add_row(vec![
        format!(
            "{} - {}",
            pad2(u8::try_from(forecast.range_start).ok()),
            pad2(u8::try_from(forecast.range_end).ok())
        ),
        percent(forecast.confidence_score),
        forecast.algorithm_used.clone(),
    ]);

    let mut out = format!("{summary}\n{gan}\n{hot}\n{quick}");
    if let Some(rec) = &stats.recommendation {
        out.push_str(&format!(
            "\nGợi ý: {} ({} số, {} - {}, {})\n{}",
            rec.recommended_algorithm,
            rec.recommended_range_size,
            pad2(u8::try_from(rec.recommended_range_start).ok()),
            pad2(u8::try_from(rec.recommended_range_end).ok()),
            percent(rec.recommended_confidence_score),
            rec.reason
        ));
    }
    out
}

fn match_cell(hit: u8) -> Cell {
    let color = if hit == 1 { Color::Green } else { Color::DarkGrey };
    Cell::new(hit).fg(color)
}

pub fn analysis_table(data: &AnalysisData) -> Table {
    let mut table = new_table(vec![
        "Ngày", "Đầu ĐB", "KQ", "ĐB", "KQ", "Đầu G1", "KQ", "G1", "KQ",
    ]);
    for row in &data.rows {
        table.add_row(vec![
            Cell::new(short_date(&row.date)),
            Cell::new(pad2(row.dau_db)),
            match_cell(row.dau_db_match),
            Cell::new(pad2(row.db)),
            match_cell(row.db_match),
            Cell::new(pad2(row.dau_g1)),
            match_cell(row.dau_g1_match),
            Cell::new(pad2(row.g1)),
            match_cell(row.g1_match),
        ]);
    }
    table
}

pub fn empty_stats_table(stats: &[EmptyStats]) -> Table {
    let mut header = vec!["Đầu Giải".to_string(), "Khoảng Lọc".to_string()];
    header.extend((3..=9).map(|n| format!("Rỗng {}", n)));
    header.push("Rỗng 10+".to_string());

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);

    for column in stats {
        let mut cells = vec![column.column_name.clone(), column.range.clone()];
        for length in 3..=10 {
            let count = column
                .counts
                .iter()
                .find(|c| c.empty_length == length)
                .map_or(0, |c| c.count);
            cells.push(count.to_string());
        }
        table.add_row(cells);
    }
    table
}

pub fn analysis_report(data: &AnalysisData, paginated: bool) -> String {
    let mut out = format!("{}\n{}", empty_stats_table(&data.empty_stats), analysis_table(data));
    if paginated {
        out.push('\n');
        out.push_str(&page_footer(
            data.current_page,
            data.total_pages,
            data.total_elements,
        ));
    }
    out
}
