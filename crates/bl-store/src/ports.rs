//! Store ports
//!
//! One trait per aggregate. Two operations carry atomicity requirements
//! beyond plain CRUD:
//!
//! - [`PaymentStore::decide`] is a single check-and-set keyed on the
//!   expected PENDING status, so racing reviewers cannot overwrite a
//!   decision;
//! - [`MilestoneStore::mutate`] runs a closure against the current row in
//!   one critical section / transaction, so material-item edits and the
//!   cost recompute commit together.

use std::sync::Arc;

use async_trait::async_trait;

use bl_core::pagination::{PaginatedResult, Pagination};
use bl_core::result::BlResult;
use bl_core::traits::Id;
use bl_models::budget::{BudgetExpense, BuildingBudget};
use bl_models::building::Building;
use bl_models::income::{BuildingCharge, IncomeRecord};
use bl_models::journal::{JournalEntry, JournalKind};
use bl_models::milestone::Milestone;
use bl_models::payment_request::{PaymentDecision, PaymentRequest};
use bl_models::risk::Risk;
use bl_models::weekly_update::WeeklyUpdate;

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn create(&self, project: bl_models::project::Project)
        -> BlResult<bl_models::project::Project>;
    async fn find(&self, id: Id) -> BlResult<bl_models::project::Project>;
    async fn list(&self, pagination: Pagination)
        -> BlResult<PaginatedResult<bl_models::project::Project>>;
}

#[async_trait]
pub trait MilestoneStore: Send + Sync {
    async fn create(&self, milestone: Milestone) -> BlResult<Milestone>;
    async fn find(&self, id: Id) -> BlResult<Milestone>;
    async fn list_for_project(&self, project_id: Id) -> BlResult<Vec<Milestone>>;
    async fn update(&self, milestone: Milestone) -> BlResult<Milestone>;
    async fn delete(&self, id: Id) -> BlResult<()>;

    /// Atomic read-modify-write: the closure runs against the current row
    /// and its result commits as one unit. No reader observes the row
    /// mid-mutation.
    async fn mutate(
        &self,
        id: Id,
        f: Box<dyn for<'a> FnOnce(&'a mut Milestone) -> BlResult<()> + Send>,
    ) -> BlResult<Milestone>;
}

#[async_trait]
pub trait WeeklyUpdateStore: Send + Sync {
    async fn create(&self, update: WeeklyUpdate) -> BlResult<WeeklyUpdate>;
    async fn find(&self, id: Id) -> BlResult<WeeklyUpdate>;
    async fn list_for_milestone(&self, milestone_id: Id) -> BlResult<Vec<WeeklyUpdate>>;
    async fn update(&self, update: WeeklyUpdate) -> BlResult<WeeklyUpdate>;
    async fn delete(&self, id: Id) -> BlResult<()>;
}

#[async_trait]
pub trait RiskStore: Send + Sync {
    async fn create(&self, risk: Risk) -> BlResult<Risk>;
    async fn find(&self, id: Id) -> BlResult<Risk>;
    async fn list_for_milestone(&self, milestone_id: Id) -> BlResult<Vec<Risk>>;
    async fn update(&self, risk: Risk) -> BlResult<Risk>;
    async fn delete(&self, id: Id) -> BlResult<()>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Persists in PENDING and assigns the unique, system-generated
    /// request number.
    async fn create(&self, request: PaymentRequest) -> BlResult<PaymentRequest>;
    async fn find(&self, id: Id) -> BlResult<PaymentRequest>;
    async fn list_for_milestone(&self, milestone_id: Id) -> BlResult<Vec<PaymentRequest>>;

    /// Single check-and-set against the expected PENDING status. If the
    /// request is already decided this fails with `InvalidState` and leaves
    /// the row untouched.
    async fn decide(
        &self,
        id: Id,
        decision: PaymentDecision,
        rejection_reason: Option<String>,
        reviewer_notes: Option<String>,
        reviewer_id: Id,
    ) -> BlResult<PaymentRequest>;
}

#[async_trait]
pub trait BuildingStore: Send + Sync {
    async fn create(&self, building: Building) -> BlResult<Building>;
    async fn find(&self, id: Id) -> BlResult<Building>;
    async fn list(&self) -> BlResult<Vec<Building>>;
}

#[async_trait]
pub trait BudgetStore: Send + Sync {
    async fn create(&self, budget: BuildingBudget) -> BlResult<BuildingBudget>;
    async fn find(&self, id: Id) -> BlResult<BuildingBudget>;
    async fn list(&self) -> BlResult<Vec<BuildingBudget>>;
    async fn list_for_building(&self, building_id: Id) -> BlResult<Vec<BuildingBudget>>;
    async fn update(&self, budget: BuildingBudget) -> BlResult<BuildingBudget>;

    async fn add_expense(&self, expense: BudgetExpense) -> BlResult<BudgetExpense>;
    async fn list_expenses(&self, budget_id: Id) -> BlResult<Vec<BudgetExpense>>;
}

#[async_trait]
pub trait IncomeStore: Send + Sync {
    async fn add_income(&self, income: IncomeRecord) -> BlResult<IncomeRecord>;
    async fn add_charge(&self, charge: BuildingCharge) -> BlResult<BuildingCharge>;
    async fn list_incomes(&self) -> BlResult<Vec<IncomeRecord>>;
    async fn list_charges(&self) -> BlResult<Vec<BuildingCharge>>;
}

#[async_trait]
pub trait JournalStore: Send + Sync {
    async fn append(&self, entry: JournalEntry) -> BlResult<JournalEntry>;
    async fn list_for_entity(&self, kind: JournalKind, entity_id: Id)
        -> BlResult<Vec<JournalEntry>>;
}

/// The full set of ports a service layer needs, wired to one backend.
#[derive(Clone)]
pub struct Stores {
    pub projects: Arc<dyn ProjectStore>,
    pub milestones: Arc<dyn MilestoneStore>,
    pub weekly_updates: Arc<dyn WeeklyUpdateStore>,
    pub risks: Arc<dyn RiskStore>,
    pub payments: Arc<dyn PaymentStore>,
    pub buildings: Arc<dyn BuildingStore>,
    pub budgets: Arc<dyn BudgetStore>,
    pub incomes: Arc<dyn IncomeStore>,
    pub journals: Arc<dyn JournalStore>,
}

impl Stores {
    /// Wire every port to one shared in-memory store.
    pub fn in_memory() -> Self {
        let store = Arc::new(crate::memory::MemoryStore::new());
        Self {
            projects: store.clone(),
            milestones: store.clone(),
            weekly_updates: store.clone(),
            risks: store.clone(),
            payments: store.clone(),
            buildings: store.clone(),
            budgets: store.clone(),
            incomes: store.clone(),
            journals: store,
        }
    }
}
