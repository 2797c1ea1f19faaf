//! Search budgets and termination policy (spec §4.4 step 7, §4.5, §6).
//!
//! Budgets bound the work a single query may perform so a pathological
//! input (disconnected goal, adversarial live-overlay state) cannot
//! monopolize a shared engine. Exceeding a budget is reported as a
//! [`crate::error::TaroError`] rather than silently truncating.

use crate::error::{TaroError, TaroResult};

/// Per-query resource caps for the point-to-point planner.
#[derive(Clone, Copy, Debug)]
pub struct SearchBudget {
    /// Maximum number of labels the planner may settle.
    pub max_settled: u64,
    /// Maximum number of labels the arena may hold.
    pub max_labels: u64,
    /// Maximum combined size of both frontiers.
    pub max_frontier_size: u64,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self {
            max_settled: 1_000_000,
            max_labels: 4_000_000,
            max_frontier_size: 1_000_000,
        }
    }
}

/// Live counters checked against a [`SearchBudget`] during a search.
#[derive(Clone, Copy, Debug, Default)]
pub struct BudgetCounters {
    /// Labels settled so far.
    pub settled: u64,
    /// Labels allocated so far.
    pub labels: u64,
    /// Current combined frontier size.
    pub frontier_size: u64,
}

impl SearchBudget {
    /// Checks `counters` against this budget, returning the first
    /// exceeded dimension as an error.
    pub fn check(&self, counters: BudgetCounters) -> TaroResult<()> {
        if counters.settled > self.max_settled {
            return Err(TaroError::SettledBudgetExceeded(self.max_settled));
        }
        if counters.labels > self.max_labels {
            return Err(TaroError::LabelBudgetExceeded(self.max_labels));
        }
        if counters.frontier_size > self.max_frontier_size {
            return Err(TaroError::FrontierBudgetExceeded(self.max_frontier_size));
        }
        Ok(())
    }
}

/// Per-row and per-request resource caps for the one-to-many matrix
/// planner (spec §4.5).
#[derive(Clone, Copy, Debug)]
pub struct MatrixBudget {
    /// Maximum settled-node work for a single source row.
    pub max_row_work: u64,
    /// Maximum labels for a single source row.
    pub max_row_labels: u64,
    /// Maximum frontier size for a single source row.
    pub max_row_frontier: u64,
    /// Maximum total settled-node work across the whole request.
    pub max_request_work: u64,
}

impl Default for MatrixBudget {
    fn default() -> Self {
        Self {
            max_row_work: 500_000,
            max_row_labels: 2_000_000,
            max_row_frontier: 500_000,
            max_request_work: 20_000_000,
        }
    }
}

impl MatrixBudget {
    /// Checks a single row's counters, returning the first exceeded
    /// dimension.
    pub fn check_row(&self, counters: BudgetCounters) -> TaroResult<()> {
        if counters.settled > self.max_row_work {
            return Err(TaroError::RowWorkBudgetExceeded(self.max_row_work));
        }
        if counters.labels > self.max_row_labels {
            return Err(TaroError::RowLabelBudgetExceeded(self.max_row_labels));
        }
        if counters.frontier_size > self.max_row_frontier {
            return Err(TaroError::RowFrontierBudgetExceeded(self.max_row_frontier));
        }
        Ok(())
    }

    /// Checks the request-wide cumulative work counter.
    pub fn check_request(&self, cumulative_work: u64) -> TaroResult<()> {
        if cumulative_work > self.max_request_work {
            return Err(TaroError::RequestWorkBudgetExceeded(self.max_request_work));
        }
        Ok(())
    }
}

/// How a matrix request picks between the native one-to-many planner and
/// a batch of pairwise point-to-point searches (spec §4.5, resolved Open
/// Question: always a fixed threshold, never per-row adaptive).
#[derive(Clone, Copy, Debug)]
pub struct TerminationPolicy {
    /// Above this many destinations, the matrix planner falls back to
    /// batched pairwise searches rather than a single one-to-many sweep.
    pub pairwise_fallback_threshold: usize,
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self {
            pairwise_fallback_threshold: 64,
        }
    }
}

impl TerminationPolicy {
    /// Returns `true` if a row with `destination_count` destinations
    /// should use the pairwise fallback instead of the native
    /// one-to-many sweep.
    #[must_use]
    pub fn should_use_pairwise_fallback(&self, destination_count: usize) -> bool {
        destination_count > self.pairwise_fallback_threshold
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn search_budget_reports_first_exceeded_dimension() {
        let budget = SearchBudget {
            max_settled: 10,
            max_labels: 100,
            max_frontier_size: 100,
        };
        let result = budget.check(BudgetCounters {
            settled: 11,
            labels: 0,
            frontier_size: 0,
        });
        assert_eq!(result.unwrap_err(), TaroError::SettledBudgetExceeded(10));
    }

    #[test]
    fn search_budget_passes_within_limits() {
        let budget = SearchBudget::default();
        assert!(budget.check(BudgetCounters::default()).is_ok());
    }

    #[test]
    fn termination_policy_threshold() {
        let policy = TerminationPolicy {
            pairwise_fallback_threshold: 10,
        };
        assert!(!policy.should_use_pairwise_fallback(10));
        assert!(policy.should_use_pairwise_fallback(11));
    }

    #[test]
    fn matrix_budget_request_check() {
        let budget = MatrixBudget {
            max_request_work: 100,
            ..MatrixBudget::default()
        };
        assert!(budget.check_request(100).is_ok());
        assert_eq!(
            budget.check_request(101).unwrap_err(),
            TaroError::RequestWorkBudgetExceeded(100)
        );
    }
}
