/// Two-digit zero-padded number, `-` when absent.
pub fn pad2(value: Option<u8>) -> String {
    match value {
        Some(v) => format!("{:02}", v),
        None => "-".to_string(),
    }
}

/// `dd-MM-yyyy` row dates are shown as `dd-MM`.
pub fn short_date(date: &str) -> &str {
    match date.char_indices().nth(5) {
        Some((idx, _)) if date.len() > 5 => &date[..idx],
        _ => date,
    }
}

pub fn page_footer(current_page: u32, total_pages: u32, total_elements: u64) -> String {
    format!(
        "Trang {} / {} ({} kết quả)",
        current_page + 1,
        total_pages.max(1),
        total_elements
    )
}

pub fn percent(score: f64) -> String {
    format!("{:.0}%", score * 100.0)
}
