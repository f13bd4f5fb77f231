use std::fmt;
use std::str::FromStr;

use anyhow::bail;

/// Inclusive bounds for one column of the 50/50 view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounds {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl Bounds {
    pub fn new(start: Option<i64>, end: Option<i64>) -> Self {
        Self { start, end }
    }

    /// Both ends must be present for anything to match.
    pub fn contains(&self, value: u8) -> bool {
        match (self.start, self.end) {
            (Some(start), Some(end)) => (start..=end).contains(&(value as i64)),
            _ => false,
        }
    }

    pub fn label(&self) -> String {
        match (self.start, self.end) {
            (Some(start), Some(end)) => format!("{}-{}", start, end),
            _ => "-".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RangeFilters {
    pub dau_db: Bounds,
    pub db: Bounds,
    pub dau_g1: Bounds,
    pub g1: Bounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisType {
    FiftyFifty,
    EvenOdd,
    Prime,
    DivideByThree,
}

impl AnalysisType {
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisType::FiftyFifty => "50-50",
            AnalysisType::EvenOdd => "even-odd",
            AnalysisType::Prime => "prime",
            AnalysisType::DivideByThree => "divide-3",
        }
    }
}

impl FromStr for AnalysisType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim() {
            "50-50" => Ok(AnalysisType::FiftyFifty),
            "even-odd" => Ok(AnalysisType::EvenOdd),
            "prime" => Ok(AnalysisType::Prime),
            "divide-3" => Ok(AnalysisType::DivideByThree),
            other => bail!("Loại phân tích không hỗ trợ: '{}'", other),
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

pub fn is_prime(n: u8) -> bool {
    if n < 2 {
        return false;
    }
    let n = n as u16;
    let mut d: u16 = 2;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

/// A rule decides, per value, whether the column "hits" on that day.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    Range(Bounds),
    Even,
    Prime,
    DivisibleByThree,
}

impl Rule {
    pub fn matches(&self, value: Option<u8>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self {
            Rule::Range(bounds) => bounds.contains(value),
            Rule::Even => value % 2 == 0,
            Rule::Prime => is_prime(value),
            Rule::DivisibleByThree => value % 3 == 0,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Rule::Range(bounds) => bounds.label(),
            Rule::Even => "Chẵn".to_string(),
            Rule::Prime => "Nguyên tố".to_string(),
            Rule::DivisibleByThree => "Chia hết cho 3".to_string(),
        }
    }
}

/// Rules for the four columns, in display order: Đầu ĐB, ĐB, Đầu G1, G1.
pub fn column_rules(kind: AnalysisType, filters: &RangeFilters) -> [Rule; 4] {
    match kind {
        AnalysisType::FiftyFifty => [
            Rule::Range(filters.dau_db),
            Rule::Range(filters.db),
            Rule::Range(filters.dau_g1),
            Rule::Range(filters.g1),
        ],
        AnalysisType::EvenOdd => [Rule::Even; 4],
        AnalysisType::Prime => [Rule::Prime; 4],
        AnalysisType::DivideByThree => [Rule::DivisibleByThree; 4],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_prime() {
        let primes: Vec<u8> = (0..100).filter(|&n| is_prime(n)).collect();
        assert_eq!(primes.len(), 25);
        assert_eq!(&primes[..5], &[2, 3, 5, 7, 11]);
        assert_eq!(primes.last(), Some(&97));
        assert!(!is_prime(0));
        assert!(!is_prime(1));
        assert!(!is_prime(91));
        assert!(is_prime(251));
    }

    #[test]
    fn test_bounds_inclusive() {
        let b = Bounds::new(Some(36), Some(95));
        assert!(b.contains(36));
        assert!(b.contains(95));
        assert!(!b.contains(35));
        assert!(!b.contains(96));
        assert_eq!(b.label(), "36-95");
    }

    #[test]
    fn test_bounds_need_both_ends() {
        let b = Bounds::new(Some(10), None);
        assert!(!b.contains(50));
        assert_eq!(b.label(), "-");
        // reversed bounds never match
        assert!(!Bounds::new(Some(29), Some(8)).contains(10));
    }

    #[test]
    fn test_rule_matches() {
        assert!(Rule::Even.matches(Some(0)));
        assert!(!Rule::Even.matches(Some(7)));
        assert!(Rule::Prime.matches(Some(13)));
        assert!(Rule::DivisibleByThree.matches(Some(99)));
        assert!(!Rule::DivisibleByThree.matches(Some(10)));
        assert!(!Rule::Even.matches(None));
    }

    #[test]
    fn test_analysis_type_parse() {
        assert_eq!("prime".parse::<AnalysisType>().unwrap(), AnalysisType::Prime);
        assert_eq!("50-50".parse::<AnalysisType>().unwrap(), AnalysisType::FiftyFifty);
        assert_eq!(AnalysisType::DivideByThree.to_string(), "divide-3");
        assert!("merge-2".parse::<AnalysisType>().is_err());
    }
}
