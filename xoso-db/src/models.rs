use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prize {
    Special,
    First,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
    Seventh,
}

impl Prize {
    pub const ALL: [Prize; 8] = [
        Prize::Special,
        Prize::First,
        Prize::Second,
        Prize::Third,
        Prize::Fourth,
        Prize::Fifth,
        Prize::Sixth,
        Prize::Seventh,
    ];

    /// Name stored in the `prize_name` column.
    pub fn code(&self) -> &'static str {
        match self {
            Prize::Special => "Giai_DB",
            Prize::First => "Giai_1",
            Prize::Second => "Giai_2",
            Prize::Third => "Giai_3",
            Prize::Fourth => "Giai_4",
            Prize::Fifth => "Giai_5",
            Prize::Sixth => "Giai_6",
            Prize::Seventh => "Giai_7",
        }
    }

    pub fn from_code(code: &str) -> Option<Prize> {
        Prize::ALL.into_iter().find(|p| p.code() == code)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Prize::Special => "G.ĐB",
            Prize::First => "G.1",
            Prize::Second => "G.2",
            Prize::Third => "G.3",
            Prize::Fourth => "G.4",
            Prize::Fifth => "G.5",
            Prize::Sixth => "G.6",
            Prize::Seventh => "G.7",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotoDigit {
    pub prize: Prize,
    /// Every digit of the drawn number, e.g. "52668".
    pub full_number: String,
    /// Last two digits (00-99).
    pub value: u8,
}

impl LotoDigit {
    /// Builds a digit from scraped or imported text, dropping anything that
    /// is not a digit. Returns `None` when nothing numeric is left.
    pub fn from_raw(raw: &str, prize: Prize) -> Option<LotoDigit> {
        let clean: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
        if clean.is_empty() {
            return None;
        }
        let tail = &clean[clean.len().saturating_sub(2)..];
        let value = tail.parse::<u8>().ok()?;
        Some(LotoDigit {
            prize,
            full_number: clean,
            value,
        })
    }

    /// Leading two digits of the full number ("đầu").
    pub fn head(&self) -> Option<u8> {
        if self.full_number.len() < 2 {
            return None;
        }
        self.full_number[..2].parse().ok()
    }
}

#[derive(Debug, Clone)]
pub struct DailyResult {
    pub draw_date: NaiveDate,
    pub region: String,
    pub special_prize_raw: String,
    pub digits: Vec<LotoDigit>,
}

impl DailyResult {
    pub fn new(draw_date: NaiveDate) -> Self {
        Self {
            draw_date,
            region: "MB".to_string(),
            special_prize_raw: String::new(),
            digits: Vec::new(),
        }
    }

    pub fn push_raw(&mut self, raw: &str, prize: Prize) {
        if let Some(digit) = LotoDigit::from_raw(raw, prize) {
            if prize == Prize::Special && self.special_prize_raw.is_empty() {
                self.special_prize_raw = digit.full_number.clone();
            }
            self.digits.push(digit);
        }
    }

    pub fn numbers_of(&self, prize: Prize) -> Vec<&LotoDigit> {
        self.digits.iter().filter(|d| d.prize == prize).collect()
    }

    pub fn first_of(&self, prize: Prize) -> Option<&LotoDigit> {
        self.digits.iter().find(|d| d.prize == prize)
    }
}

pub fn validate_result(result: &DailyResult) -> Result<()> {
    if result.special_prize_raw.is_empty() {
        bail!("Thiếu giải đặc biệt ngày {}", result.draw_date);
    }
    if !result.special_prize_raw.chars().all(|c| c.is_ascii_digit()) {
        bail!("Giải đặc biệt không hợp lệ : {}", result.special_prize_raw);
    }
    for digit in &result.digits {
        if digit.value > 99 {
            bail!("Số {} ngoài khoảng (00-99)", digit.value);
        }
    }
    let specials = result.numbers_of(Prize::Special).len();
    if specials != 1 {
        bail!("Cần đúng một giải đặc biệt, có {}", specials);
    }
    if result.numbers_of(Prize::First).len() > 1 {
        bail!("Giải nhất có nhiều hơn một số");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DailyResult {
        let mut result = DailyResult::new(NaiveDate::from_ymd_opt(2025, 12, 11).unwrap());
        result.push_raw("52668", Prize::Special);
        result.push_raw("13579", Prize::First);
        result.push_raw("01234", Prize::Second);
        result.push_raw("98765", Prize::Second);
        result
    }

    #[test]
    fn test_from_raw_keeps_last_two_digits() {
        let d = LotoDigit::from_raw(" 52668 ", Prize::Special).unwrap();
        assert_eq!(d.full_number, "52668");
        assert_eq!(d.value, 68);
        assert_eq!(d.head(), Some(52));
    }

    #[test]
    fn test_from_raw_strips_noise() {
        let d = LotoDigit::from_raw("SR-0245", Prize::Seventh).unwrap();
        assert_eq!(d.full_number, "0245");
        assert_eq!(d.value, 45);
        assert_eq!(d.head(), Some(2));
    }

    #[test]
    fn test_from_raw_single_digit() {
        let d = LotoDigit::from_raw("7", Prize::Seventh).unwrap();
        assert_eq!(d.value, 7);
        assert_eq!(d.head(), None);
        assert!(LotoDigit::from_raw("abc", Prize::Seventh).is_none());
    }

    #[test]
    fn test_prize_codes() {
        for prize in Prize::ALL {
            assert_eq!(Prize::from_code(prize.code()), Some(prize));
        }
        assert_eq!(Prize::from_code("Giai_9"), None);
        assert_eq!(Prize::Special.label(), "G.ĐB");
    }

    #[test]
    fn test_push_raw_sets_special() {
        let result = sample();
        assert_eq!(result.special_prize_raw, "52668");
        assert_eq!(result.numbers_of(Prize::Second).len(), 2);
        assert_eq!(result.first_of(Prize::First).unwrap().value, 79);
    }

    #[test]
    fn test_validate_result_ok() {
        assert!(validate_result(&sample()).is_ok());
    }

    #[test]
    fn test_validate_result_missing_special() {
        let mut result = DailyResult::new(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        result.push_raw("13579", Prize::First);
        assert!(validate_result(&result).is_err());
    }

    #[test]
    fn test_validate_result_two_specials() {
        let mut result = sample();
        result.push_raw("11111", Prize::Special);
        assert!(validate_result(&result).is_err());
    }
}
