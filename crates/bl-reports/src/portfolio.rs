//! Portfolio-level financial rollup
//!
//! Aggregates revenue and expense streams across buildings for a date
//! range. Everything is computed at read time over the period's records.

use chrono::NaiveDate;
use serde::Serialize;

use bl_core::traits::Id;
use bl_models::building::Building;
use bl_models::income::{BuildingCharge, IncomeKind, IncomeRecord};

/// A budget-ledger expense flattened to its building for portfolio math.
/// The caller resolves budget -> building before handing these over.
#[derive(Debug, Clone, Copy)]
pub struct BudgetSpendRecord {
    pub building_id: Id,
    pub amount: f64,
    pub date: NaiveDate,
}

/// Portfolio financial summary over a period
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioFinancials {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub building_count: usize,

    pub rental_income: f64,
    pub other_income: f64,
    pub total_revenue: f64,

    pub budget_expenses: f64,
    pub contractor_payments: f64,
    pub order_costs: f64,
    pub total_expenses: f64,

    pub net_operating_income: f64,
    /// Percentage; 0 when revenue is 0
    pub profit_margin: f64,

    pub total_units: i32,
    pub occupied_units: i32,
    /// Percentage; 0 when there are no units
    pub occupancy_rate: f64,
    pub revenue_per_unit: f64,
    pub expense_per_unit: f64,
    pub net_income_per_unit: f64,
}

fn in_period(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    date >= start && date <= end
}

fn building_selected(building_id: Id, filter: Option<&[Id]>) -> bool {
    match filter {
        Some(ids) => ids.contains(&building_id),
        None => true,
    }
}

/// Compute the portfolio summary for the period, optionally restricted to a
/// set of buildings.
pub fn portfolio_financials(
    period_start: NaiveDate,
    period_end: NaiveDate,
    building_filter: Option<&[Id]>,
    buildings: &[Building],
    incomes: &[IncomeRecord],
    charges: &[BuildingCharge],
    budget_spend: &[BudgetSpendRecord],
) -> PortfolioFinancials {
    let selected: Vec<&Building> = buildings
        .iter()
        .filter(|b| b.id.map(|id| building_selected(id, building_filter)).unwrap_or(false))
        .collect();

    let mut rental_income = 0.0;
    let mut other_income = 0.0;
    for income in incomes {
        if building_selected(income.building_id, building_filter)
            && in_period(income.date, period_start, period_end)
        {
            match income.kind {
                IncomeKind::Rental => rental_income += income.amount,
                IncomeKind::Other => other_income += income.amount,
            }
        }
    }

    let mut contractor_payments = 0.0;
    let mut order_costs = 0.0;
    for charge in charges {
        if building_selected(charge.building_id, building_filter)
            && in_period(charge.date, period_start, period_end)
        {
            match charge.kind {
                bl_models::income::ChargeKind::ContractorPayment => {
                    contractor_payments += charge.amount
                }
                bl_models::income::ChargeKind::OrderCost => order_costs += charge.amount,
            }
        }
    }

    let budget_expenses: f64 = budget_spend
        .iter()
        .filter(|s| {
            building_selected(s.building_id, building_filter)
                && in_period(s.date, period_start, period_end)
        })
        .map(|s| s.amount)
        .sum();

    let total_revenue = rental_income + other_income;
    let total_expenses = budget_expenses + contractor_payments + order_costs;
    let net_operating_income = total_revenue - total_expenses;

    let profit_margin = if total_revenue > 0.0 {
        net_operating_income / total_revenue * 100.0
    } else {
        0.0
    };

    let total_units: i32 = selected.iter().map(|b| b.total_units).sum();
    let occupied_units: i32 = selected.iter().map(|b| b.occupied_units).sum();

    let occupancy_rate = if total_units > 0 {
        occupied_units as f64 / total_units as f64 * 100.0
    } else {
        0.0
    };
    let per_unit = |amount: f64| {
        if total_units > 0 {
            amount / total_units as f64
        } else {
            0.0
        }
    };

    PortfolioFinancials {
        period_start,
        period_end,
        building_count: selected.len(),
        rental_income,
        other_income,
        total_revenue,
        budget_expenses,
        contractor_payments,
        order_costs,
        total_expenses,
        net_operating_income,
        profit_margin,
        total_units,
        occupied_units,
        occupancy_rate,
        revenue_per_unit: per_unit(total_revenue),
        expense_per_unit: per_unit(total_expenses),
        net_income_per_unit: per_unit(net_operating_income),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bl_models::income::ChargeKind;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    fn building(id: Id, total: i32, occupied: i32) -> Building {
        let mut b = Building::new(format!("Building {}", id), total);
        b.id = Some(id);
        b.occupied_units = occupied;
        b
    }

    fn income(building_id: Id, kind: IncomeKind, amount: f64, when: NaiveDate) -> IncomeRecord {
        IncomeRecord {
            id: None,
            building_id,
            kind,
            amount,
            date: when,
            created_at: None,
        }
    }

    fn charge(building_id: Id, kind: ChargeKind, amount: f64, when: NaiveDate) -> BuildingCharge {
        BuildingCharge {
            id: None,
            building_id,
            kind,
            amount,
            date: when,
            created_at: None,
        }
    }

    #[test]
    fn test_full_rollup() {
        let buildings = vec![building(1, 10, 8), building(2, 10, 6)];
        let incomes = vec![
            income(1, IncomeKind::Rental, 12_000.0, date(3, 1)),
            income(2, IncomeKind::Rental, 8_000.0, date(3, 15)),
            income(1, IncomeKind::Other, 1_000.0, date(3, 20)),
            // Outside the period: ignored.
            income(1, IncomeKind::Rental, 99_999.0, date(6, 1)),
        ];
        let charges = vec![
            charge(1, ChargeKind::ContractorPayment, 4_000.0, date(3, 5)),
            charge(2, ChargeKind::OrderCost, 1_500.0, date(3, 9)),
        ];
        let budget_spend = vec![BudgetSpendRecord {
            building_id: 1,
            amount: 2_500.0,
            date: date(3, 12),
        }];

        let summary = portfolio_financials(
            date(3, 1),
            date(3, 31),
            None,
            &buildings,
            &incomes,
            &charges,
            &budget_spend,
        );

        assert_eq!(summary.total_revenue, 21_000.0);
        assert_eq!(summary.total_expenses, 8_000.0);
        assert_eq!(summary.net_operating_income, 13_000.0);
        assert!((summary.profit_margin - 13_000.0 / 21_000.0 * 100.0).abs() < 1e-9);
        assert_eq!(summary.total_units, 20);
        assert_eq!(summary.occupied_units, 14);
        assert_eq!(summary.occupancy_rate, 70.0);
        assert_eq!(summary.revenue_per_unit, 1_050.0);
    }

    #[test]
    fn test_building_filter() {
        let buildings = vec![building(1, 10, 10), building(2, 10, 0)];
        let incomes = vec![
            income(1, IncomeKind::Rental, 5_000.0, date(2, 1)),
            income(2, IncomeKind::Rental, 7_000.0, date(2, 1)),
        ];

        let summary = portfolio_financials(
            date(2, 1),
            date(2, 28),
            Some(&[1]),
            &buildings,
            &incomes,
            &[],
            &[],
        );
        assert_eq!(summary.building_count, 1);
        assert_eq!(summary.total_revenue, 5_000.0);
        assert_eq!(summary.occupancy_rate, 100.0);
    }

    #[test]
    fn test_zero_guards() {
        let summary = portfolio_financials(date(1, 1), date(1, 31), None, &[], &[], &[], &[]);
        assert_eq!(summary.profit_margin, 0.0);
        assert_eq!(summary.occupancy_rate, 0.0);
        assert_eq!(summary.revenue_per_unit, 0.0);
        assert_eq!(summary.net_income_per_unit, 0.0);
    }

    #[test]
    fn test_period_bounds_inclusive() {
        let buildings = vec![building(1, 1, 1)];
        let incomes = vec![
            income(1, IncomeKind::Rental, 100.0, date(3, 1)),
            income(1, IncomeKind::Rental, 200.0, date(3, 31)),
        ];
        let summary = portfolio_financials(
            date(3, 1),
            date(3, 31),
            None,
            &buildings,
            &incomes,
            &[],
            &[],
        );
        assert_eq!(summary.total_revenue, 300.0);
    }
}
