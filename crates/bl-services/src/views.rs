//! Aggregation facade
//!
//! Composed read models over current store state. Every call walks the
//! stores and recomputes through `bl-reports`; nothing is cached and no view
//! field is ever persisted. O(n) per read is accepted, n is tens.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use bl_core::result::BlResult;
use bl_core::traits::Id;
use bl_models::budget::BuildingBudget;
use bl_models::milestone::Milestone;
use bl_models::payment_request::PaymentRequest;
use bl_models::project::Project;
use bl_models::risk::{Risk, RiskLevel, RiskStatus};
use bl_reports::budget::{summarize, BudgetSummary};
use bl_reports::milestone::{milestone_financials, MilestoneFinancials};
use bl_reports::portfolio::{portfolio_financials, BudgetSpendRecord, PortfolioFinancials};
use bl_store::Stores;

/// A risk with its derived severity alongside
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskView {
    #[serde(flatten)]
    pub risk: Risk,
    pub severity: RiskLevel,
}

impl From<Risk> for RiskView {
    fn from(risk: Risk) -> Self {
        let severity = risk.severity();
        Self { risk, severity }
    }
}

/// One milestone with its recomputed financials and children
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneView {
    #[serde(flatten)]
    pub milestone: Milestone,
    pub financials: MilestoneFinancials,
    pub overdue: bool,
    pub risks: Vec<RiskView>,
    pub payment_requests: Vec<PaymentRequest>,
}

/// Project rollup across its milestones
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: Project,
    pub milestones: Vec<MilestoneView>,

    pub total_budget_allocated: f64,
    pub total_cumulative_expenditure: f64,
    pub total_budget_remaining: f64,
    /// Percentage; 0 when nothing is allocated
    pub budget_utilization: f64,

    pub overdue_milestones: usize,
    /// Mean of latest progress across milestones; 0 when there are none
    pub average_progress: f64,
    pub open_risk_count: usize,
}

/// One building budget with its recomputed summary
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetView {
    #[serde(flatten)]
    pub budget: BuildingBudget,
    pub summary: BudgetSummary,
}

pub struct ViewService<'a> {
    stores: &'a Stores,
}

impl<'a> ViewService<'a> {
    pub fn new(stores: &'a Stores) -> Self {
        Self { stores }
    }

    async fn assemble_milestone(
        &self,
        milestone: Milestone,
        today: NaiveDate,
    ) -> BlResult<MilestoneView> {
        let id = milestone.id.unwrap_or(0);
        let updates = self.stores.weekly_updates.list_for_milestone(id).await?;
        let risks = self.stores.risks.list_for_milestone(id).await?;
        let payment_requests = self.stores.payments.list_for_milestone(id).await?;

        let financials = milestone_financials(&milestone, &updates);
        let overdue = milestone.is_overdue(today);
        Ok(MilestoneView {
            milestone,
            financials,
            overdue,
            risks: risks.into_iter().map(RiskView::from).collect(),
            payment_requests,
        })
    }

    pub async fn milestone_view(&self, milestone_id: Id) -> BlResult<MilestoneView> {
        let milestone = self.stores.milestones.find(milestone_id).await?;
        self.assemble_milestone(milestone, Utc::now().date_naive())
            .await
    }

    pub async fn project_view(&self, project_id: Id) -> BlResult<ProjectView> {
        self.project_view_as_of(project_id, Utc::now().date_naive())
            .await
    }

    /// As [`Self::project_view`] but with an explicit "today" for the
    /// overdue check.
    pub async fn project_view_as_of(
        &self,
        project_id: Id,
        today: NaiveDate,
    ) -> BlResult<ProjectView> {
        let project = self.stores.projects.find(project_id).await?;
        let mut views = Vec::new();
        for milestone in self.stores.milestones.list_for_project(project_id).await? {
            views.push(self.assemble_milestone(milestone, today).await?);
        }

        let total_budget_allocated: f64 = views
            .iter()
            .map(|v| v.financials.budget_allocated)
            .sum();
        let total_cumulative_expenditure: f64 = views
            .iter()
            .map(|v| v.financials.cumulative_expenditure)
            .sum();
        let budget_utilization = if total_budget_allocated > 0.0 {
            total_cumulative_expenditure / total_budget_allocated * 100.0
        } else {
            0.0
        };

        let overdue_milestones = views.iter().filter(|v| v.overdue).count();
        let average_progress = if views.is_empty() {
            0.0
        } else {
            views
                .iter()
                .map(|v| v.financials.latest_progress_percentage)
                .sum::<f64>()
                / views.len() as f64
        };
        let open_risk_count = views
            .iter()
            .flat_map(|v| v.risks.iter())
            .filter(|r| r.risk.status == RiskStatus::Open)
            .count();

        Ok(ProjectView {
            project,
            milestones: views,
            total_budget_allocated,
            total_cumulative_expenditure,
            total_budget_remaining: total_budget_allocated - total_cumulative_expenditure,
            budget_utilization,
            overdue_milestones,
            average_progress,
            open_risk_count,
        })
    }

    pub async fn budget_view(&self, budget_id: Id) -> BlResult<BudgetView> {
        let budget = self.stores.budgets.find(budget_id).await?;
        let expenses = self.stores.budgets.list_expenses(budget_id).await?;
        let summary = summarize(&budget, &expenses);
        Ok(BudgetView { budget, summary })
    }

    pub async fn portfolio_view(
        &self,
        period_start: NaiveDate,
        period_end: NaiveDate,
        building_filter: Option<&[Id]>,
    ) -> BlResult<PortfolioFinancials> {
        let buildings = self.stores.buildings.list().await?;
        let incomes = self.stores.incomes.list_incomes().await?;
        let charges = self.stores.incomes.list_charges().await?;

        // Flatten every budget's ledger to its building for the rollup.
        let mut budget_spend = Vec::new();
        for budget in self.stores.budgets.list().await? {
            let Some(budget_id) = budget.id else { continue };
            for expense in self.stores.budgets.list_expenses(budget_id).await? {
                budget_spend.push(BudgetSpendRecord {
                    building_id: budget.building_id,
                    amount: expense.amount,
                    date: expense.date,
                });
            }
        }

        Ok(portfolio_financials(
            period_start,
            period_end,
            building_filter,
            &buildings,
            &incomes,
            &charges,
            &budget_spend,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bl_core::user::{Role, UserContext};
    use bl_models::budget::{BudgetCategory, BudgetExpense, CategoryAllocations};
    use bl_models::building::Building;
    use bl_models::income::{BuildingCharge, ChargeKind, IncomeKind, IncomeRecord};
    use bl_models::milestone::MilestoneStatus;
    use bl_models::params::WeeklyUpdateParams;
    use bl_models::risk::RiskCategory;

    use crate::weekly_updates::RecordWeeklyUpdateService;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    async fn record_week(
        stores: &Stores,
        milestone_id: Id,
        start: NaiveDate,
        labour: f64,
        progress: f64,
    ) {
        let user = UserContext::new(1, Role::ProjectManager);
        RecordWeeklyUpdateService::new(&user, stores)
            .call(
                milestone_id,
                WeeklyUpdateParams {
                    week_start_date: start,
                    week_end_date: start + chrono::Duration::days(6),
                    labour_expenditure: labour,
                    progress_percentage: progress,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_project_view_rollup() {
        let stores = Stores::in_memory();
        let project = stores.projects.create(Project::new("Estate")).await.unwrap();
        let project_id = project.id.unwrap();

        let mut foundation = Milestone::new(project_id, "Foundation");
        foundation.budget_allocated = 10_000.0;
        let foundation = stores.milestones.create(foundation).await.unwrap();

        let mut roofing = Milestone::new(project_id, "Roofing");
        roofing.budget_allocated = 6_000.0;
        roofing.due_date = Some(date(1, 15));
        roofing.status = MilestoneStatus::InProgress;
        let roofing = stores.milestones.create(roofing).await.unwrap();

        record_week(&stores, foundation.id.unwrap(), date(2, 2), 1_500.0, 20.0).await;
        record_week(&stores, foundation.id.unwrap(), date(2, 9), 2_500.0, 45.0).await;
        record_week(&stores, roofing.id.unwrap(), date(2, 2), 1_000.0, 15.0).await;

        stores
            .risks
            .create(Risk {
                id: None,
                milestone_id: foundation.id.unwrap(),
                description: "Rebar shortage".into(),
                category: RiskCategory::Resource,
                probability: RiskLevel::Medium,
                impact: RiskLevel::High,
                mitigation_strategy: None,
                status: RiskStatus::Open,
                created_by: 1,
                created_at: None,
                updated_at: None,
            })
            .await
            .unwrap();

        let view = ViewService::new(&stores)
            .project_view_as_of(project_id, date(3, 1))
            .await
            .unwrap();

        assert_eq!(view.milestones.len(), 2);
        assert_eq!(view.total_budget_allocated, 16_000.0);
        assert_eq!(view.total_cumulative_expenditure, 5_000.0);
        assert_eq!(view.total_budget_remaining, 11_000.0);
        assert!((view.budget_utilization - 31.25).abs() < 1e-9);
        // Roofing's due date is past and it is still in progress.
        assert_eq!(view.overdue_milestones, 1);
        assert_eq!(view.average_progress, 30.0);
        assert_eq!(view.open_risk_count, 1);

        let foundation_view = view
            .milestones
            .iter()
            .find(|v| v.milestone.name == "Foundation")
            .unwrap();
        assert_eq!(foundation_view.financials.cumulative_expenditure, 4_000.0);
        assert_eq!(foundation_view.risks[0].severity, RiskLevel::High);
        assert!(!foundation_view.overdue);
    }

    #[tokio::test]
    async fn test_empty_project_view_zero_guards() {
        let stores = Stores::in_memory();
        let project = stores.projects.create(Project::new("Idle")).await.unwrap();
        let view = ViewService::new(&stores)
            .project_view(project.id.unwrap())
            .await
            .unwrap();
        assert_eq!(view.budget_utilization, 0.0);
        assert_eq!(view.average_progress, 0.0);
        assert_eq!(view.overdue_milestones, 0);
    }

    #[tokio::test]
    async fn test_portfolio_view_spans_budget_ledgers() {
        let stores = Stores::in_memory();
        let building = stores
            .buildings
            .create(Building::new("Riverside Court", 10))
            .await
            .unwrap();
        let building_id = building.id.unwrap();

        let budget = stores
            .budgets
            .create(BuildingBudget {
                id: None,
                building_id,
                fiscal_year: 2026,
                quarter: Some(1),
                period_start: date(1, 1),
                period_end: date(3, 31),
                allocations: CategoryAllocations {
                    utilities: 5_000.0,
                    ..Default::default()
                },
                status: Default::default(),
                created_at: None,
                updated_at: None,
            })
            .await
            .unwrap();
        stores
            .budgets
            .add_expense(BudgetExpense {
                id: None,
                budget_id: budget.id.unwrap(),
                category: BudgetCategory::Utilities,
                amount: 2_500.0,
                date: date(2, 10),
                description: None,
                created_at: None,
            })
            .await
            .unwrap();

        stores
            .incomes
            .add_income(IncomeRecord {
                id: None,
                building_id,
                kind: IncomeKind::Rental,
                amount: 12_000.0,
                date: date(2, 1),
                created_at: None,
            })
            .await
            .unwrap();
        stores
            .incomes
            .add_charge(BuildingCharge {
                id: None,
                building_id,
                kind: ChargeKind::ContractorPayment,
                amount: 3_000.0,
                date: date(2, 15),
                created_at: None,
            })
            .await
            .unwrap();

        let summary = ViewService::new(&stores)
            .portfolio_view(date(1, 1), date(3, 31), None)
            .await
            .unwrap();

        assert_eq!(summary.total_revenue, 12_000.0);
        assert_eq!(summary.budget_expenses, 2_500.0);
        assert_eq!(summary.contractor_payments, 3_000.0);
        assert_eq!(summary.total_expenses, 5_500.0);
        assert_eq!(summary.net_operating_income, 6_500.0);
    }
}
