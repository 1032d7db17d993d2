//! Result resolution: folds two sides' per-player lines into aggregate
//! scores and a winner, using the two-level star/percent tie-break.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::cup::StatLine;

/// How a side's per-player percentages are folded into the match aggregate.
///
/// This is a fixed per-format constant: 3-player war formats record the sum,
/// 5-player formats the average. Standings consume the stored aggregate
/// as-is, so the convention must never be reconstructed downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PercentAggregation {
    /// Aggregate is the sum of the per-player percentages.
    Sum,
    /// Aggregate is the mean of the per-player percentages.
    Average,
}

/// Aggregate result for one side of a match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideTotals {
    /// Total stars.
    pub stars: u32,
    /// Aggregated percentage per the format convention.
    pub percent: f64,
}

/// Which side won, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Team 1 wins.
    Side1,
    /// Team 2 wins.
    Side2,
    /// Equal stars and equal percent: a draw, not an error.
    Tie,
}

/// A fully resolved match result.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Aggregates for team 1.
    pub side1: SideTotals,
    /// Aggregates for team 2.
    pub side2: SideTotals,
    /// Winner per the tie-break rule.
    pub verdict: Verdict,
}

/// Rejection of malformed stat input; nothing is applied on error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// A side submitted the wrong number of lines for the format.
    #[error("side {side} has {got} stat lines, expected {expected}")]
    WrongLineCount {
        /// Offending side (1 or 2).
        side: u8,
        /// Roster size required by the format.
        expected: usize,
        /// Lines actually submitted.
        got: usize,
    },
    /// A line's percentage falls outside `[0, 100]`.
    #[error("percent {value} for `{tag}` is out of range (0-100)")]
    PercentOutOfRange {
        /// Tag of the offending line.
        tag: String,
        /// The rejected value.
        value: f64,
    },
}

/// Validate one side's lines and fold them into totals.
pub fn aggregate(
    lines: &[StatLine],
    roster_size: usize,
    aggregation: PercentAggregation,
    side: u8,
) -> Result<SideTotals, StatsError> {
    if lines.len() != roster_size {
        return Err(StatsError::WrongLineCount {
            side,
            expected: roster_size,
            got: lines.len(),
        });
    }

    for line in lines {
        if !(0.0..=100.0).contains(&line.percent) || !line.percent.is_finite() {
            return Err(StatsError::PercentOutOfRange {
                tag: line.tag.clone(),
                value: line.percent,
            });
        }
    }

    let stars = lines.iter().map(|line| line.stars).sum();
    let percent_sum: f64 = lines.iter().map(|line| line.percent).sum();
    let percent = match aggregation {
        PercentAggregation::Sum => percent_sum,
        PercentAggregation::Average => percent_sum / roster_size as f64,
    };

    Ok(SideTotals { stars, percent })
}

/// Resolve a match from both sides' lines.
///
/// Tie-break: higher stars win; on equal stars higher percent wins; on both
/// equal the result is a tie. Validation failures reject the whole call.
pub fn resolve(
    side1: &[StatLine],
    side2: &[StatLine],
    roster_size: usize,
    aggregation: PercentAggregation,
) -> Result<Resolution, StatsError> {
    let totals1 = aggregate(side1, roster_size, aggregation, 1)?;
    let totals2 = aggregate(side2, roster_size, aggregation, 2)?;

    let verdict = if totals1.stars > totals2.stars {
        Verdict::Side1
    } else if totals2.stars > totals1.stars {
        Verdict::Side2
    } else if totals1.percent > totals2.percent {
        Verdict::Side1
    } else if totals2.percent > totals1.percent {
        Verdict::Side2
    } else {
        Verdict::Tie
    };

    Ok(Resolution {
        side1: totals1,
        side2: totals2,
        verdict,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(stats: &[(u32, f64)]) -> Vec<StatLine> {
        stats
            .iter()
            .enumerate()
            .map(|(i, (stars, percent))| StatLine {
                tag: format!("#P{i}"),
                name: format!("Player {i}"),
                stars: *stars,
                percent: *percent,
            })
            .collect()
    }

    #[test]
    fn higher_stars_win_regardless_of_percent() {
        let a = lines(&[(3, 50.0), (0, 10.0), (0, 10.0)]);
        let b = lines(&[(1, 100.0), (1, 100.0), (0, 90.0)]);
        let res = resolve(&a, &b, 3, PercentAggregation::Sum).unwrap();
        assert_eq!(res.verdict, Verdict::Side1);
        assert_eq!(res.side1.stars, 3);
        assert_eq!(res.side2.stars, 2);
    }

    #[test]
    fn equal_stars_fall_back_to_percent() {
        let a = lines(&[(2, 100.0), (1, 100.0), (0, 100.0)]);
        let b = lines(&[(1, 90.0), (1, 90.0), (1, 90.0)]);
        let res = resolve(&a, &b, 3, PercentAggregation::Sum).unwrap();
        assert_eq!(res.side1.stars, res.side2.stars);
        assert_eq!(res.verdict, Verdict::Side1);
    }

    #[test]
    fn equal_stars_and_percent_is_a_tie() {
        let a = lines(&[(1, 60.0), (1, 60.0), (1, 60.0)]);
        let b = lines(&[(2, 90.0), (1, 90.0), (0, 0.0)]);
        let res = resolve(&a, &b, 3, PercentAggregation::Sum).unwrap();
        assert_eq!(res.verdict, Verdict::Tie);
    }

    #[test]
    fn five_player_formats_average_the_percent() {
        let a = lines(&[(3, 100.0), (3, 100.0), (3, 100.0), (3, 50.0), (3, 50.0)]);
        let b = lines(&[(0, 0.0); 5]);
        let res = resolve(&a, &b, 5, PercentAggregation::Average).unwrap();
        assert!((res.side1.percent - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn three_player_formats_sum_the_percent() {
        let a = lines(&[(1, 50.0), (1, 60.0), (1, 70.0)]);
        let totals = aggregate(&a, 3, PercentAggregation::Sum, 1).unwrap();
        assert!((totals.percent - 180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn wrong_line_count_names_the_side() {
        let a = lines(&[(1, 50.0), (1, 60.0)]);
        let b = lines(&[(1, 50.0), (1, 60.0), (1, 70.0)]);
        let err = resolve(&a, &b, 3, PercentAggregation::Sum).unwrap_err();
        assert_eq!(
            err,
            StatsError::WrongLineCount {
                side: 1,
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn out_of_range_percent_names_the_line() {
        let a = lines(&[(1, 50.0), (1, 101.0), (1, 70.0)]);
        let b = lines(&[(1, 50.0), (1, 60.0), (1, 70.0)]);
        match resolve(&a, &b, 3, PercentAggregation::Sum).unwrap_err() {
            StatsError::PercentOutOfRange { tag, value } => {
                assert_eq!(tag, "#P1");
                assert!((value - 101.0).abs() < f64::EPSILON);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
