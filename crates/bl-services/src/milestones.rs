//! Milestone services
//!
//! Material-item mutations and the cost recompute go through the store's
//! atomic `mutate` so `material_cost` and `expected_profit` can never be
//! observed disagreeing, and status changes into terminal states are
//! journaled.

use tracing::{info, warn};

use bl_contracts::base::Contract;
use bl_contracts::milestones::{
    CreateMilestoneContract, MaterialItemContract, UpdateMilestoneContract,
};
use bl_core::error::{BlError, ValidationErrors};
use bl_core::result::BlResult;
use bl_core::traits::Id;
use bl_core::user::UserContext;
use bl_models::journal::{JournalEntry, JournalKind};
use bl_models::milestone::{MaterialItem, Milestone, MilestoneStatus};
use bl_models::params::MilestoneParams;
use bl_store::Stores;

fn apply_params(milestone: &mut Milestone, params: &MilestoneParams) {
    milestone.name = params.name.clone();
    milestone.description = params.description.clone();
    milestone.assignee_id = params.assignee_id;
    milestone.due_date = params.due_date;
    milestone.labour_cost = params.labour_cost;
    if !milestone.material_cost_is_derived() {
        milestone.material_cost = params.material_cost;
    }
    milestone.diesel_cost = params.diesel_cost;
    milestone.rent_cost = params.rent_cost;
    milestone.admin_cost = params.admin_cost;
    milestone.other_operational_cost = params.other_operational_cost;
    milestone.budget_allocated = params.budget_allocated;
    milestone.recalculate();
}

pub struct CreateMilestoneService<'a> {
    user: &'a UserContext,
    stores: &'a Stores,
}

impl<'a> CreateMilestoneService<'a> {
    pub fn new(user: &'a UserContext, stores: &'a Stores) -> Self {
        Self { user, stores }
    }

    pub async fn call(&self, project_id: Id, params: MilestoneParams) -> BlResult<Milestone> {
        self.stores.projects.find(project_id).await?;
        CreateMilestoneContract::new(self.user).check(&params)?;

        let mut milestone = Milestone::new(project_id, params.name.clone());
        apply_params(&mut milestone, &params);
        let milestone = self.stores.milestones.create(milestone).await?;
        info!(milestone_id = milestone.id, project_id, "milestone created");
        Ok(milestone)
    }
}

pub struct UpdateMilestoneService<'a> {
    user: &'a UserContext,
    stores: &'a Stores,
}

impl<'a> UpdateMilestoneService<'a> {
    pub fn new(user: &'a UserContext, stores: &'a Stores) -> Self {
        Self { user, stores }
    }

    pub async fn call(&self, id: Id, params: MilestoneParams) -> BlResult<Milestone> {
        let current = self.stores.milestones.find(id).await?;
        UpdateMilestoneContract::new(self.user, &current).check(&params)?;

        self.stores
            .milestones
            .mutate(
                id,
                Box::new(move |milestone| {
                    apply_params(milestone, &params);
                    Ok(())
                }),
            )
            .await
    }
}

/// Updates a milestone's status. Any transition is allowed; terminal ones
/// are journaled and logged for audit.
pub struct UpdateMilestoneStatusService<'a> {
    user: &'a UserContext,
    stores: &'a Stores,
}

impl<'a> UpdateMilestoneStatusService<'a> {
    pub fn new(user: &'a UserContext, stores: &'a Stores) -> Self {
        Self { user, stores }
    }

    pub async fn call(&self, id: Id, status: MilestoneStatus) -> BlResult<Milestone> {
        let current = self.stores.milestones.find(id).await?;
        let from = current.status;
        MilestoneStatus::validate_transition(from, status).map_err(BlError::Validation)?;

        let milestone = self
            .stores
            .milestones
            .mutate(
                id,
                Box::new(move |milestone| {
                    milestone.status = status;
                    Ok(())
                }),
            )
            .await?;

        if status.requires_audit() {
            warn!(
                milestone_id = id,
                from = from.as_str(),
                to = status.as_str(),
                actor = self.user.user_id,
                "milestone entered terminal status"
            );
            self.stores
                .journals
                .append(
                    JournalEntry::new(JournalKind::Milestone, id, self.user.user_id, "status_changed")
                        .with_detail(format!("{} -> {}", from.as_str(), status.as_str())),
                )
                .await?;
        }

        Ok(milestone)
    }
}

/// Material line item mutations; each one recomputes the cost breakdown in
/// the same atomic store operation.
pub struct MaterialItemService<'a> {
    user: &'a UserContext,
    stores: &'a Stores,
}

impl<'a> MaterialItemService<'a> {
    pub fn new(user: &'a UserContext, stores: &'a Stores) -> Self {
        Self { user, stores }
    }

    pub async fn add(&self, milestone_id: Id, item: MaterialItem) -> BlResult<Milestone> {
        MaterialItemContract::new(self.user).check(&item)?;
        self.stores
            .milestones
            .mutate(
                milestone_id,
                Box::new(move |milestone| {
                    milestone.add_material_item(item);
                    Ok(())
                }),
            )
            .await
    }

    pub async fn update(
        &self,
        milestone_id: Id,
        index: usize,
        item: MaterialItem,
    ) -> BlResult<Milestone> {
        MaterialItemContract::new(self.user).check(&item)?;
        self.stores
            .milestones
            .mutate(
                milestone_id,
                Box::new(move |milestone| {
                    if milestone.update_material_item(index, item) {
                        Ok(())
                    } else {
                        let mut errors = ValidationErrors::new();
                        errors.add("index", format!("no material item at index {}", index));
                        Err(BlError::Validation(errors))
                    }
                }),
            )
            .await
    }

    pub async fn remove(&self, milestone_id: Id, index: usize) -> BlResult<Milestone> {
        self.stores
            .milestones
            .mutate(
                milestone_id,
                Box::new(move |milestone| {
                    if milestone.remove_material_item(index).is_some() {
                        Ok(())
                    } else {
                        let mut errors = ValidationErrors::new();
                        errors.add("index", format!("no material item at index {}", index));
                        Err(BlError::Validation(errors))
                    }
                }),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bl_core::user::Role;
    use bl_models::project::Project;

    async fn setup() -> (UserContext, Stores, Id) {
        let user = UserContext::new(1, Role::ProjectManager);
        let stores = Stores::in_memory();
        let project = stores.projects.create(Project::new("Estate")).await.unwrap();
        (user, stores, project.id.unwrap())
    }

    fn params(name: &str, budget: f64) -> MilestoneParams {
        MilestoneParams {
            name: name.into(),
            budget_allocated: budget,
            labour_cost: 3_000.0,
            material_cost: 2_000.0,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_computes_expected_profit() {
        let (user, stores, project_id) = setup().await;
        let milestone = CreateMilestoneService::new(&user, &stores)
            .call(project_id, params("Foundation", 10_000.0))
            .await
            .unwrap();
        assert_eq!(milestone.expected_profit, 5_000.0);
    }

    #[tokio::test]
    async fn test_create_for_missing_project() {
        let (user, stores, _) = setup().await;
        let err = CreateMilestoneService::new(&user, &stores)
            .call(999, params("Orphan", 100.0))
            .await
            .unwrap_err();
        assert!(matches!(err, BlError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_material_items_keep_profit_consistent() {
        let (user, stores, project_id) = setup().await;
        let milestone = CreateMilestoneService::new(&user, &stores)
            .call(project_id, params("Roofing", 10_000.0))
            .await
            .unwrap();
        let id = milestone.id.unwrap();

        let service = MaterialItemService::new(&user, &stores);
        let milestone = service
            .add(
                id,
                MaterialItem {
                    name: "Sheets".into(),
                    quantity: 20.0,
                    unit_price: 75.0,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(milestone.material_cost, 1_500.0);
        assert_eq!(
            milestone.expected_profit,
            milestone.budget_allocated - milestone.cost_total()
        );

        let milestone = service
            .update(
                id,
                0,
                MaterialItem {
                    name: "Sheets".into(),
                    quantity: 30.0,
                    unit_price: 75.0,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(milestone.material_cost, 2_250.0);

        let err = service.remove(id, 5).await.unwrap_err();
        assert!(matches!(err, BlError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_cannot_override_derived_material_cost() {
        let (user, stores, project_id) = setup().await;
        let milestone = CreateMilestoneService::new(&user, &stores)
            .call(project_id, params("Walls", 10_000.0))
            .await
            .unwrap();
        let id = milestone.id.unwrap();

        MaterialItemService::new(&user, &stores)
            .add(
                id,
                MaterialItem {
                    name: "Blocks".into(),
                    quantity: 100.0,
                    unit_price: 8.0,
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let mut p = params("Walls", 10_000.0);
        p.material_cost = 123.0;
        let err = UpdateMilestoneService::new(&user, &stores)
            .call(id, p)
            .await
            .unwrap_err();
        assert!(matches!(err, BlError::Validation(_)));
    }

    #[tokio::test]
    async fn test_terminal_status_is_journaled() {
        let (user, stores, project_id) = setup().await;
        let milestone = CreateMilestoneService::new(&user, &stores)
            .call(project_id, params("Finishing", 1_000.0))
            .await
            .unwrap();
        let id = milestone.id.unwrap();

        let service = UpdateMilestoneStatusService::new(&user, &stores);
        service.call(id, MilestoneStatus::InProgress).await.unwrap();
        service.call(id, MilestoneStatus::Completed).await.unwrap();
        // Terminal states are not locked; reopening is permitted.
        service.call(id, MilestoneStatus::InProgress).await.unwrap();

        let entries = stores
            .journals
            .list_for_entity(JournalKind::Milestone, id)
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "status_changed");
        assert_eq!(
            entries[0].detail.as_deref(),
            Some("IN_PROGRESS -> COMPLETED")
        );
    }
}
