//! In-memory reference store
//!
//! Backs tests and development mode. A single `RwLock` over the whole
//! dataset makes every port operation one critical section, which is exactly
//! the atomicity the decide/mutate ports require. Locks are never held
//! across an await point.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use parking_lot::RwLock;

use bl_core::pagination::{PaginatedResult, Pagination};
use bl_core::result::BlResult;
use bl_core::traits::{Entity, Id};
use bl_core::BlError;
use bl_models::budget::{BudgetExpense, BuildingBudget};
use bl_models::building::Building;
use bl_models::income::{BuildingCharge, IncomeRecord};
use bl_models::journal::{JournalEntry, JournalKind};
use bl_models::milestone::Milestone;
use bl_models::payment_request::{PaymentDecision, PaymentRequest, PaymentStatus};
use bl_models::project::Project;
use bl_models::risk::Risk;
use bl_models::weekly_update::WeeklyUpdate;

use crate::ports::*;

#[derive(Default)]
struct Inner {
    seq: i64,
    payment_seq: i64,

    projects: HashMap<Id, Project>,
    milestones: HashMap<Id, Milestone>,
    weekly_updates: HashMap<Id, WeeklyUpdate>,
    risks: HashMap<Id, Risk>,
    payments: HashMap<Id, PaymentRequest>,
    buildings: HashMap<Id, Building>,
    budgets: HashMap<Id, BuildingBudget>,
    budget_expenses: HashMap<Id, BudgetExpense>,
    incomes: HashMap<Id, IncomeRecord>,
    charges: HashMap<Id, BuildingCharge>,
    journals: Vec<JournalEntry>,
}

impl Inner {
    fn next_id(&mut self) -> Id {
        self.seq += 1;
        self.seq
    }
}

/// Shared in-memory store implementing every port
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(entity: &'static str, id: Id) -> BlError {
    BlError::not_found(entity, id)
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn create(&self, mut project: Project) -> BlResult<Project> {
        let mut inner = self.inner.write();
        project.id = Some(inner.next_id());
        project.created_at = Some(Utc::now());
        inner.projects.insert(project.id.unwrap(), project.clone());
        Ok(project)
    }

    async fn find(&self, id: Id) -> BlResult<Project> {
        self.inner
            .read()
            .projects
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(Project::TYPE_NAME, id))
    }

    async fn list(&self, pagination: Pagination) -> BlResult<PaginatedResult<Project>> {
        let inner = self.inner.read();
        let mut all: Vec<Project> = inner.projects.values().cloned().collect();
        all.sort_by_key(|p| p.id);
        let total = all.len() as i64;
        let page = all
            .into_iter()
            .skip(pagination.offset as usize)
            .take(pagination.limit() as usize)
            .collect();
        Ok(PaginatedResult::new(page, total, pagination))
    }
}

#[async_trait]
impl MilestoneStore for MemoryStore {
    async fn create(&self, mut milestone: Milestone) -> BlResult<Milestone> {
        let mut inner = self.inner.write();
        milestone.id = Some(inner.next_id());
        milestone.created_at = Some(Utc::now());
        inner
            .milestones
            .insert(milestone.id.unwrap(), milestone.clone());
        Ok(milestone)
    }

    async fn find(&self, id: Id) -> BlResult<Milestone> {
        self.inner
            .read()
            .milestones
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(Milestone::TYPE_NAME, id))
    }

    async fn list_for_project(&self, project_id: Id) -> BlResult<Vec<Milestone>> {
        let inner = self.inner.read();
        let mut result: Vec<Milestone> = inner
            .milestones
            .values()
            .filter(|m| m.project_id == project_id)
            .cloned()
            .collect();
        result.sort_by_key(|m| m.id);
        Ok(result)
    }

    async fn update(&self, mut milestone: Milestone) -> BlResult<Milestone> {
        let id = milestone
            .id
            .ok_or_else(|| BlError::Internal("update on unpersisted Milestone".into()))?;
        let mut inner = self.inner.write();
        if !inner.milestones.contains_key(&id) {
            return Err(not_found(Milestone::TYPE_NAME, id));
        }
        milestone.updated_at = Some(Utc::now());
        inner.milestones.insert(id, milestone.clone());
        Ok(milestone)
    }

    async fn delete(&self, id: Id) -> BlResult<()> {
        let mut inner = self.inner.write();
        inner
            .milestones
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(Milestone::TYPE_NAME, id))?;
        // Children live and die with the parent.
        inner.weekly_updates.retain(|_, u| u.milestone_id != id);
        inner.risks.retain(|_, r| r.milestone_id != id);
        Ok(())
    }

    async fn mutate(
        &self,
        id: Id,
        f: Box<dyn for<'a> FnOnce(&'a mut Milestone) -> BlResult<()> + Send>,
    ) -> BlResult<Milestone> {
        let mut inner = self.inner.write();
        // Work on a scratch copy; commit only when the closure succeeds.
        let mut milestone = inner
            .milestones
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(Milestone::TYPE_NAME, id))?;
        f(&mut milestone)?;
        milestone.updated_at = Some(Utc::now());
        inner.milestones.insert(id, milestone.clone());
        Ok(milestone)
    }
}

#[async_trait]
impl WeeklyUpdateStore for MemoryStore {
    async fn create(&self, mut update: WeeklyUpdate) -> BlResult<WeeklyUpdate> {
        let mut inner = self.inner.write();
        if !inner.milestones.contains_key(&update.milestone_id) {
            return Err(not_found(Milestone::TYPE_NAME, update.milestone_id));
        }
        update.id = Some(inner.next_id());
        update.created_at = Some(Utc::now());
        inner.weekly_updates.insert(update.id.unwrap(), update.clone());
        Ok(update)
    }

    async fn find(&self, id: Id) -> BlResult<WeeklyUpdate> {
        self.inner
            .read()
            .weekly_updates
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(WeeklyUpdate::TYPE_NAME, id))
    }

    async fn list_for_milestone(&self, milestone_id: Id) -> BlResult<Vec<WeeklyUpdate>> {
        let inner = self.inner.read();
        let mut result: Vec<WeeklyUpdate> = inner
            .weekly_updates
            .values()
            .filter(|u| u.milestone_id == milestone_id)
            .cloned()
            .collect();
        result.sort_by_key(|u| u.id);
        Ok(result)
    }

    async fn update(&self, mut update: WeeklyUpdate) -> BlResult<WeeklyUpdate> {
        let id = update
            .id
            .ok_or_else(|| BlError::Internal("update on unpersisted WeeklyUpdate".into()))?;
        let mut inner = self.inner.write();
        if !inner.weekly_updates.contains_key(&id) {
            return Err(not_found(WeeklyUpdate::TYPE_NAME, id));
        }
        update.updated_at = Some(Utc::now());
        inner.weekly_updates.insert(id, update.clone());
        Ok(update)
    }

    async fn delete(&self, id: Id) -> BlResult<()> {
        self.inner
            .write()
            .weekly_updates
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(WeeklyUpdate::TYPE_NAME, id))
    }
}

#[async_trait]
impl RiskStore for MemoryStore {
    async fn create(&self, mut risk: Risk) -> BlResult<Risk> {
        let mut inner = self.inner.write();
        if !inner.milestones.contains_key(&risk.milestone_id) {
            return Err(not_found(Milestone::TYPE_NAME, risk.milestone_id));
        }
        risk.id = Some(inner.next_id());
        risk.created_at = Some(Utc::now());
        inner.risks.insert(risk.id.unwrap(), risk.clone());
        Ok(risk)
    }

    async fn find(&self, id: Id) -> BlResult<Risk> {
        self.inner
            .read()
            .risks
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(Risk::TYPE_NAME, id))
    }

    async fn list_for_milestone(&self, milestone_id: Id) -> BlResult<Vec<Risk>> {
        let inner = self.inner.read();
        let mut result: Vec<Risk> = inner
            .risks
            .values()
            .filter(|r| r.milestone_id == milestone_id)
            .cloned()
            .collect();
        result.sort_by_key(|r| r.id);
        Ok(result)
    }

    async fn update(&self, mut risk: Risk) -> BlResult<Risk> {
        let id = risk
            .id
            .ok_or_else(|| BlError::Internal("update on unpersisted Risk".into()))?;
        let mut inner = self.inner.write();
        if !inner.risks.contains_key(&id) {
            return Err(not_found(Risk::TYPE_NAME, id));
        }
        risk.updated_at = Some(Utc::now());
        inner.risks.insert(id, risk.clone());
        Ok(risk)
    }

    async fn delete(&self, id: Id) -> BlResult<()> {
        self.inner
            .write()
            .risks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(Risk::TYPE_NAME, id))
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn create(&self, mut request: PaymentRequest) -> BlResult<PaymentRequest> {
        let mut inner = self.inner.write();
        if !inner.milestones.contains_key(&request.milestone_id) {
            return Err(not_found(Milestone::TYPE_NAME, request.milestone_id));
        }
        inner.payment_seq += 1;
        request.id = Some(inner.next_id());
        request.request_number =
            PaymentRequest::format_request_number(Utc::now().year(), inner.payment_seq);
        request.status = PaymentStatus::Pending;
        request.created_at = Some(Utc::now());
        inner.payments.insert(request.id.unwrap(), request.clone());
        Ok(request)
    }

    async fn find(&self, id: Id) -> BlResult<PaymentRequest> {
        self.inner
            .read()
            .payments
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(PaymentRequest::TYPE_NAME, id))
    }

    async fn list_for_milestone(&self, milestone_id: Id) -> BlResult<Vec<PaymentRequest>> {
        let inner = self.inner.read();
        let mut result: Vec<PaymentRequest> = inner
            .payments
            .values()
            .filter(|p| p.milestone_id == milestone_id)
            .cloned()
            .collect();
        result.sort_by_key(|p| p.id);
        Ok(result)
    }

    async fn decide(
        &self,
        id: Id,
        decision: PaymentDecision,
        rejection_reason: Option<String>,
        reviewer_notes: Option<String>,
        reviewer_id: Id,
    ) -> BlResult<PaymentRequest> {
        // Check-and-set under one write lock: the loser of a race sees the
        // winner's terminal status and fails without touching the row.
        let mut inner = self.inner.write();
        let request = inner
            .payments
            .get_mut(&id)
            .ok_or_else(|| not_found(PaymentRequest::TYPE_NAME, id))?;

        PaymentStatus::validate_transition(request.status, decision.to_status())?;

        request.status = decision.to_status();
        request.rejection_reason = rejection_reason;
        request.reviewer_notes = reviewer_notes;
        request.reviewed_by = Some(reviewer_id);
        request.reviewed_at = Some(Utc::now());
        Ok(request.clone())
    }
}

#[async_trait]
impl BuildingStore for MemoryStore {
    async fn create(&self, mut building: Building) -> BlResult<Building> {
        let mut inner = self.inner.write();
        building.id = Some(inner.next_id());
        building.created_at = Some(Utc::now());
        inner.buildings.insert(building.id.unwrap(), building.clone());
        Ok(building)
    }

    async fn find(&self, id: Id) -> BlResult<Building> {
        self.inner
            .read()
            .buildings
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(Building::TYPE_NAME, id))
    }

    async fn list(&self) -> BlResult<Vec<Building>> {
        let inner = self.inner.read();
        let mut result: Vec<Building> = inner.buildings.values().cloned().collect();
        result.sort_by_key(|b| b.id);
        Ok(result)
    }
}

#[async_trait]
impl BudgetStore for MemoryStore {
    async fn create(&self, mut budget: BuildingBudget) -> BlResult<BuildingBudget> {
        let mut inner = self.inner.write();
        if !inner.buildings.contains_key(&budget.building_id) {
            return Err(not_found(Building::TYPE_NAME, budget.building_id));
        }
        budget.id = Some(inner.next_id());
        budget.created_at = Some(Utc::now());
        inner.budgets.insert(budget.id.unwrap(), budget.clone());
        Ok(budget)
    }

    async fn find(&self, id: Id) -> BlResult<BuildingBudget> {
        self.inner
            .read()
            .budgets
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(BuildingBudget::TYPE_NAME, id))
    }

    async fn list(&self) -> BlResult<Vec<BuildingBudget>> {
        let inner = self.inner.read();
        let mut result: Vec<BuildingBudget> = inner.budgets.values().cloned().collect();
        result.sort_by_key(|b| b.id);
        Ok(result)
    }

    async fn list_for_building(&self, building_id: Id) -> BlResult<Vec<BuildingBudget>> {
        let inner = self.inner.read();
        let mut result: Vec<BuildingBudget> = inner
            .budgets
            .values()
            .filter(|b| b.building_id == building_id)
            .cloned()
            .collect();
        result.sort_by_key(|b| b.id);
        Ok(result)
    }

    async fn update(&self, mut budget: BuildingBudget) -> BlResult<BuildingBudget> {
        let id = budget
            .id
            .ok_or_else(|| BlError::Internal("update on unpersisted BuildingBudget".into()))?;
        let mut inner = self.inner.write();
        if !inner.budgets.contains_key(&id) {
            return Err(not_found(BuildingBudget::TYPE_NAME, id));
        }
        budget.updated_at = Some(Utc::now());
        inner.budgets.insert(id, budget.clone());
        Ok(budget)
    }

    async fn add_expense(&self, mut expense: BudgetExpense) -> BlResult<BudgetExpense> {
        let mut inner = self.inner.write();
        if !inner.budgets.contains_key(&expense.budget_id) {
            return Err(not_found(BuildingBudget::TYPE_NAME, expense.budget_id));
        }
        expense.id = Some(inner.next_id());
        expense.created_at = Some(Utc::now());
        inner
            .budget_expenses
            .insert(expense.id.unwrap(), expense.clone());
        Ok(expense)
    }

    async fn list_expenses(&self, budget_id: Id) -> BlResult<Vec<BudgetExpense>> {
        let inner = self.inner.read();
        let mut result: Vec<BudgetExpense> = inner
            .budget_expenses
            .values()
            .filter(|e| e.budget_id == budget_id)
            .cloned()
            .collect();
        result.sort_by_key(|e| e.id);
        Ok(result)
    }
}

#[async_trait]
impl IncomeStore for MemoryStore {
    async fn add_income(&self, mut income: IncomeRecord) -> BlResult<IncomeRecord> {
        let mut inner = self.inner.write();
        income.id = Some(inner.next_id());
        income.created_at = Some(Utc::now());
        inner.incomes.insert(income.id.unwrap(), income.clone());
        Ok(income)
    }

    async fn add_charge(&self, mut charge: BuildingCharge) -> BlResult<BuildingCharge> {
        let mut inner = self.inner.write();
        charge.id = Some(inner.next_id());
        charge.created_at = Some(Utc::now());
        inner.charges.insert(charge.id.unwrap(), charge.clone());
        Ok(charge)
    }

    async fn list_incomes(&self) -> BlResult<Vec<IncomeRecord>> {
        let inner = self.inner.read();
        let mut result: Vec<IncomeRecord> = inner.incomes.values().cloned().collect();
        result.sort_by_key(|i| i.id);
        Ok(result)
    }

    async fn list_charges(&self) -> BlResult<Vec<BuildingCharge>> {
        let inner = self.inner.read();
        let mut result: Vec<BuildingCharge> = inner.charges.values().cloned().collect();
        result.sort_by_key(|c| c.id);
        Ok(result)
    }
}

#[async_trait]
impl JournalStore for MemoryStore {
    async fn append(&self, mut entry: JournalEntry) -> BlResult<JournalEntry> {
        let mut inner = self.inner.write();
        entry.id = Some(inner.next_id());
        entry.created_at = Some(Utc::now());
        inner.journals.push(entry.clone());
        Ok(entry)
    }

    async fn list_for_entity(
        &self,
        kind: JournalKind,
        entity_id: Id,
    ) -> BlResult<Vec<JournalEntry>> {
        let inner = self.inner.read();
        Ok(inner
            .journals
            .iter()
            .filter(|e| e.kind == kind && e.entity_id == entity_id)
            .cloned()
            .collect())
    }
}
