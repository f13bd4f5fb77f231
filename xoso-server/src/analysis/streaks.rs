use crate::dto::{EmptyCount, EmptyStats};

pub const MIN_EMPTY_LENGTH: usize = 3;
/// Runs of this length or longer share one bucket.
pub const OPEN_BUCKET: usize = 10;

/// Lengths of every run of consecutive misses, including a run still open
/// at the end of the series.
pub fn empty_runs(matches: impl IntoIterator<Item = bool>) -> Vec<usize> {
    let mut runs = Vec::new();
    let mut current = 0usize;
    for hit in matches {
        if hit {
            if current > 0 {
                runs.push(current);
            }
            current = 0;
        } else {
            current += 1;
        }
    }
    if current > 0 {
        runs.push(current);
    }
    runs
}

/// Buckets 3..=9 and a final 10 bucket meaning "10 or more".
pub fn histogram(runs: &[usize]) -> Vec<EmptyCount> {
    (MIN_EMPTY_LENGTH..=OPEN_BUCKET)
        .map(|length| {
            let count = runs
                .iter()
                .filter(|&&run| {
                    if length == OPEN_BUCKET {
                        run >= OPEN_BUCKET
                    } else {
                        run == length
                    }
                })
                .count();
            EmptyCount {
                empty_length: length as u32,
                count: count as u32,
            }
        })
        .collect()
}

pub fn empty_stats(column_name: &str, range: String, matches: &[bool]) -> EmptyStats {
    EmptyStats {
        column_name: column_name.to_string(),
        range,
        counts: histogram(&empty_runs(matches.iter().copied())),
    }
}
