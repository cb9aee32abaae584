//! Milestone financial rollup
//!
//! Two distinct money streams meet here and are exposed side by side, never
//! conflated: the *allocated* stream (the milestone's cost breakdown and
//! expected profit) and the *actual* stream (cumulative weekly expenditure).

use serde::Serialize;

use bl_models::milestone::Milestone;
use bl_models::weekly_update::WeeklyUpdate;

/// Classification of actual spend against the allocated budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetHealth {
    UnderBudget,
    AtBudget,
    OverBudget,
}

/// The milestone band: overruns within 10% of the allocation are AT_BUDGET,
/// not failures. The tolerance is deliberate; preserve it exactly.
pub fn classify_milestone_spend(cumulative_expenditure: f64, budget_allocated: f64) -> BudgetHealth {
    let variance = cumulative_expenditure - budget_allocated;
    let variance_ratio = if budget_allocated > 0.0 {
        variance / budget_allocated
    } else {
        0.0
    };

    if variance_ratio > 0.10 {
        BudgetHealth::OverBudget
    } else if variance_ratio > 0.0 {
        BudgetHealth::AtBudget
    } else {
        BudgetHealth::UnderBudget
    }
}

/// Fully rolled-up financial view of one milestone
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneFinancials {
    // Allocated stream
    pub budget_allocated: f64,
    pub allocated_cost_total: f64,
    pub expected_profit: f64,

    // Actual stream, derived from weekly updates
    pub cumulative_expenditure: f64,
    /// May be negative once spend exceeds the allocation
    pub budget_remaining: f64,
    /// Percentage; 0 when nothing was allocated
    pub budget_utilization: f64,
    pub variance: f64,
    pub variance_ratio: f64,
    pub health: BudgetHealth,

    /// Progress of the most recently dated update (ties broken by latest
    /// insertion), 0 when no update exists
    pub latest_progress_percentage: f64,
    pub update_count: usize,
}

/// Recompute the milestone's financials from its weekly updates.
///
/// Pure and allocation-free of side effects; call it on every read.
pub fn milestone_financials(milestone: &Milestone, updates: &[WeeklyUpdate]) -> MilestoneFinancials {
    let cumulative_expenditure: f64 = updates.iter().map(WeeklyUpdate::total_expenditure).sum();
    let budget_allocated = milestone.budget_allocated;

    let budget_remaining = budget_allocated - cumulative_expenditure;
    let budget_utilization = if budget_allocated > 0.0 {
        cumulative_expenditure / budget_allocated * 100.0
    } else {
        0.0
    };

    let variance = cumulative_expenditure - budget_allocated;
    let variance_ratio = if budget_allocated > 0.0 {
        variance / budget_allocated
    } else {
        0.0
    };

    // Most recent week wins; among equal end dates the latest-inserted
    // (greatest id) wins. max_by_key returns the last maximum, so a stable
    // key of (date, id) gives exactly that.
    let latest_progress_percentage = updates
        .iter()
        .max_by_key(|u| (u.week_end_date, u.id.unwrap_or(0)))
        .map(|u| u.progress_percentage)
        .unwrap_or(0.0);

    MilestoneFinancials {
        budget_allocated,
        allocated_cost_total: milestone.cost_total(),
        expected_profit: milestone.expected_profit,
        cumulative_expenditure,
        budget_remaining,
        budget_utilization,
        variance,
        variance_ratio,
        health: classify_milestone_spend(cumulative_expenditure, budget_allocated),
        latest_progress_percentage,
        update_count: updates.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn update(id: i64, end: NaiveDate, total: f64, progress: f64) -> WeeklyUpdate {
        let mut u = WeeklyUpdate::new(1, end - chrono::Duration::days(6), end);
        u.id = Some(id);
        u.labour_expenditure = total;
        u.progress_percentage = progress;
        u
    }

    #[test]
    fn test_reference_scenario() {
        // budget 10000, labour 3000, material 2000 -> profit 5000;
        // updates 1500 + 2500 -> cumulative 4000, remaining 6000, 40%.
        let mut milestone = Milestone::new(1, "Foundation");
        milestone.budget_allocated = 10_000.0;
        milestone.labour_cost = 3_000.0;
        milestone.material_cost = 2_000.0;
        milestone.recalculate();

        let updates = vec![
            update(1, date(2026, 2, 8), 1_500.0, 20.0),
            update(2, date(2026, 2, 15), 2_500.0, 45.0),
        ];

        let financials = milestone_financials(&milestone, &updates);
        assert_eq!(financials.expected_profit, 5_000.0);
        assert_eq!(financials.cumulative_expenditure, 4_000.0);
        assert_eq!(financials.budget_remaining, 6_000.0);
        assert_eq!(financials.budget_utilization, 40.0);
        assert_eq!(financials.health, BudgetHealth::UnderBudget);
        assert_eq!(financials.latest_progress_percentage, 45.0);
    }

    #[test]
    fn test_band_boundary_exact_ten_percent() {
        assert_eq!(
            classify_milestone_spend(11_000.0, 10_000.0),
            BudgetHealth::AtBudget
        );
        assert_eq!(
            classify_milestone_spend(11_000.001, 10_000.0),
            BudgetHealth::OverBudget
        );
        assert_eq!(
            classify_milestone_spend(10_000.0, 10_000.0),
            BudgetHealth::UnderBudget
        );
        assert_eq!(
            classify_milestone_spend(10_000.01, 10_000.0),
            BudgetHealth::AtBudget
        );
    }

    #[test]
    fn test_zero_allocation_guards() {
        let milestone = Milestone::new(1, "Unbudgeted");
        let updates = vec![update(1, date(2026, 1, 11), 500.0, 10.0)];
        let financials = milestone_financials(&milestone, &updates);

        assert_eq!(financials.budget_utilization, 0.0);
        assert_eq!(financials.variance_ratio, 0.0);
        assert_eq!(financials.health, BudgetHealth::UnderBudget);
        assert_eq!(financials.budget_remaining, -500.0);
    }

    #[test]
    fn test_latest_progress_by_date_not_insertion() {
        let milestone = Milestone::new(1, "M");
        // Inserted out of order: the later-dated week is first.
        let updates = vec![
            update(1, date(2026, 3, 15), 100.0, 70.0),
            update(2, date(2026, 3, 8), 100.0, 60.0),
        ];
        let financials = milestone_financials(&milestone, &updates);
        assert_eq!(financials.latest_progress_percentage, 70.0);
    }

    #[test]
    fn test_latest_progress_tie_broken_by_latest_insertion() {
        let milestone = Milestone::new(1, "M");
        let updates = vec![
            update(1, date(2026, 3, 15), 100.0, 70.0),
            update(2, date(2026, 3, 15), 100.0, 65.0),
        ];
        let financials = milestone_financials(&milestone, &updates);
        assert_eq!(financials.latest_progress_percentage, 65.0);
    }

    #[test]
    fn test_no_updates() {
        let milestone = Milestone::new(1, "Quiet");
        let financials = milestone_financials(&milestone, &[]);
        assert_eq!(financials.cumulative_expenditure, 0.0);
        assert_eq!(financials.latest_progress_percentage, 0.0);
        assert_eq!(financials.update_count, 0);
    }
}
