//! Output structures for a two-strategy projection

use serde::{Deserialize, Serialize};

/// Which side of the comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    A,
    B,
}

impl Strategy {
    pub fn other(&self) -> Strategy {
        match self {
            Strategy::A => Strategy::B,
            Strategy::B => Strategy::A,
        }
    }
}

/// One simulated year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionYear {
    /// 1-indexed year
    pub year: u32,

    // Cost paid this year, including upfront capital in year 1 and any
    // opportunity cost charged to the strategy
    pub annual_cost_a: f64,
    pub annual_cost_b: f64,

    // Running totals of the annual costs
    pub cumulative_cost_a: f64,
    pub cumulative_cost_b: f64,

    // Equity held at year end
    pub equity_a: f64,
    pub equity_b: f64,

    /// Forgone investment return accrued to date
    pub opportunity_cost: f64,

    /// Strategy the opportunity cost is charged to (None when upfront capital matches)
    pub opportunity_charged_to: Option<Strategy>,

    // Cumulative cost less equity
    pub net_position_a: f64,
    pub net_position_b: f64,
}

impl ProjectionYear {
    /// Strictly cheaper strategy this year, None on a tie
    pub fn cheaper(&self) -> Option<Strategy> {
        if self.net_position_a < self.net_position_b {
            Some(Strategy::A)
        } else if self.net_position_b < self.net_position_a {
            Some(Strategy::B)
        } else {
            None
        }
    }

    /// Net advantage of A over B (positive when A is cheaper)
    pub fn advantage_a(&self) -> f64 {
        self.net_position_b - self.net_position_a
    }
}

/// A change in which strategy is cheaper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crossing {
    pub year: u32,
    /// Strategy that became the cheaper one
    pub now_cheaper: Strategy,
}

/// Scan the years for every change of the cheaper strategy.
/// Ties neither start nor end a lead.
pub fn find_crossings(years: &[ProjectionYear]) -> Vec<Crossing> {
    let mut crossings = Vec::new();
    let mut leader: Option<Strategy> = None;

    for row in years {
        let Some(cheaper) = row.cheaper() else {
            continue;
        };
        match leader {
            None => leader = Some(cheaper),
            Some(current) if current != cheaper => {
                crossings.push(Crossing {
                    year: row.year,
                    now_cheaper: cheaper,
                });
                leader = Some(cheaper);
            }
            Some(_) => {}
        }
    }

    crossings
}

/// Complete comparison of two strategies over the horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub label_a: String,
    pub label_b: String,

    /// First year the initially more expensive strategy becomes cheaper
    pub break_even_year: Option<u32>,

    /// Strategy that is cheaper from the break-even year
    pub break_even_strategy: Option<Strategy>,

    pub comparison: Vec<ProjectionYear>,
}

impl ComparisonResult {
    pub fn new(label_a: String, label_b: String, comparison: Vec<ProjectionYear>) -> Self {
        // First crossing wins; later re-crossings do not move the break-even year
        let first = find_crossings(&comparison).into_iter().next();
        Self {
            label_a,
            label_b,
            break_even_year: first.map(|c| c.year),
            break_even_strategy: first.map(|c| c.now_cheaper),
            comparison,
        }
    }

    /// Every year the cheaper strategy changed, including re-crossings
    pub fn crossings(&self) -> Vec<Crossing> {
        find_crossings(&self.comparison)
    }

    pub fn final_year(&self) -> Option<&ProjectionYear> {
        self.comparison.last()
    }

    pub fn label(&self, strategy: Strategy) -> &str {
        match strategy {
            Strategy::A => &self.label_a,
            Strategy::B => &self.label_b,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: u32, net_a: f64, net_b: f64) -> ProjectionYear {
        ProjectionYear {
            year,
            annual_cost_a: 0.0,
            annual_cost_b: 0.0,
            cumulative_cost_a: net_a,
            cumulative_cost_b: net_b,
            equity_a: 0.0,
            equity_b: 0.0,
            opportunity_cost: 0.0,
            opportunity_charged_to: None,
            net_position_a: net_a,
            net_position_b: net_b,
        }
    }

    #[test]
    fn test_first_crossing_wins() {
        let years = vec![
            row(1, 10.0, 5.0),
            row(2, 10.0, 12.0),
            row(3, 20.0, 12.0),
            row(4, 20.0, 25.0),
        ];
        let result = ComparisonResult::new("a".into(), "b".into(), years);

        assert_eq!(result.break_even_year, Some(2));
        assert_eq!(result.break_even_strategy, Some(Strategy::A));
        assert_eq!(result.crossings().len(), 3);
        assert_eq!(result.crossings()[1], Crossing { year: 3, now_cheaper: Strategy::B });
    }

    #[test]
    fn test_ties_do_not_cross() {
        let years = vec![row(1, 5.0, 5.0), row(2, 6.0, 7.0), row(3, 7.0, 7.0), row(4, 8.0, 9.0)];
        let result = ComparisonResult::new("a".into(), "b".into(), years);

        assert_eq!(result.break_even_year, None);
        assert!(result.crossings().is_empty());
    }

    #[test]
    fn test_strategy_helpers() {
        assert_eq!(Strategy::A.other(), Strategy::B);
        let r = row(1, 3.0, 5.0);
        assert_eq!(r.cheaper(), Some(Strategy::A));
        assert_eq!(r.advantage_a(), 2.0);
    }
}
