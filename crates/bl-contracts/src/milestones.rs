//! Contracts for milestone mutations

use bl_core::error::ValidationErrors;
use bl_core::user::UserContext;
use bl_models::milestone::{MaterialItem, Milestone};
use bl_models::params::MilestoneParams;

use crate::base::{run_derive_validation, Contract, ValidationResult};

/// Contract for creating a milestone
pub struct CreateMilestoneContract<'a> {
    #[allow(dead_code)]
    user: &'a UserContext,
}

impl<'a> CreateMilestoneContract<'a> {
    pub fn new(user: &'a UserContext) -> Self {
        Self { user }
    }
}

impl<'a> Contract<MilestoneParams> for CreateMilestoneContract<'a> {
    fn validate(&self, params: &MilestoneParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        run_derive_validation(&mut errors, params);
        errors.into_result()
    }
}

/// Contract for editing an existing milestone's attributes, checked against
/// its current state.
pub struct UpdateMilestoneContract<'a> {
    #[allow(dead_code)]
    user: &'a UserContext,
    current: &'a Milestone,
}

impl<'a> UpdateMilestoneContract<'a> {
    pub fn new(user: &'a UserContext, current: &'a Milestone) -> Self {
        Self { user, current }
    }

    /// Once material line items exist, `material_cost` is derived from them
    /// and cannot be set directly.
    fn validate_material_cost_not_overridden(
        &self,
        params: &MilestoneParams,
        errors: &mut ValidationErrors,
    ) {
        if self.current.material_cost_is_derived()
            && params.material_cost != self.current.material_cost
        {
            errors.add(
                "material_cost",
                "is derived from material items and cannot be edited directly",
            );
        }
    }
}

impl<'a> Contract<MilestoneParams> for UpdateMilestoneContract<'a> {
    fn validate(&self, params: &MilestoneParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        run_derive_validation(&mut errors, params);
        self.validate_material_cost_not_overridden(params, &mut errors);
        errors.into_result()
    }
}

/// Contract for material line items
pub struct MaterialItemContract<'a> {
    #[allow(dead_code)]
    user: &'a UserContext,
}

impl<'a> MaterialItemContract<'a> {
    pub fn new(user: &'a UserContext) -> Self {
        Self { user }
    }
}

impl<'a> Contract<MaterialItem> for MaterialItemContract<'a> {
    fn validate(&self, item: &MaterialItem) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        if item.name.trim().is_empty() {
            errors.add("name", "can't be blank");
        }
        if item.quantity < 0.0 {
            errors.add("quantity", "must be greater than or equal to 0");
        }
        if item.unit_price < 0.0 {
            errors.add("unit_price", "must be greater than or equal to 0");
        }
        if let Some(amount) = item.quotation_amount {
            if amount < 0.0 {
                errors.add("quotation_amount", "must be greater than or equal to 0");
            }
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bl_core::user::Role;

    fn user() -> UserContext {
        UserContext::new(1, Role::ProjectManager)
    }

    #[test]
    fn test_create_requires_name_and_non_negative_costs() {
        let user = user();
        let contract = CreateMilestoneContract::new(&user);
        let params = MilestoneParams {
            name: "".into(),
            labour_cost: -10.0,
            ..Default::default()
        };
        let errors = contract.validate(&params).unwrap_err();
        assert!(errors.has_error("name"));
        assert!(errors.has_error("labour_cost"));
    }

    #[test]
    fn test_material_cost_locked_once_items_exist() {
        let user = user();
        let mut milestone = Milestone::new(1, "Foundation");
        milestone.add_material_item(MaterialItem {
            name: "Cement".into(),
            quantity: 10.0,
            unit_price: 100.0,
            ..Default::default()
        });

        let contract = UpdateMilestoneContract::new(&user, &milestone);
        let params = MilestoneParams {
            name: "Foundation".into(),
            material_cost: 9_999.0,
            ..Default::default()
        };
        let errors = contract.validate(&params).unwrap_err();
        assert!(errors.has_error("material_cost"));

        // Leaving it at the derived value is fine.
        let params = MilestoneParams {
            name: "Foundation".into(),
            material_cost: milestone.material_cost,
            ..Default::default()
        };
        assert!(contract.validate(&params).is_ok());
    }

    #[test]
    fn test_material_item_contract() {
        let user = user();
        let contract = MaterialItemContract::new(&user);
        let item = MaterialItem {
            name: " ".into(),
            quantity: -1.0,
            unit_price: 5.0,
            quotation_amount: Some(-2.0),
            ..Default::default()
        };
        let errors = contract.validate(&item).unwrap_err();
        assert!(errors.has_error("name"));
        assert!(errors.has_error("quantity"));
        assert!(errors.has_error("quotation_amount"));
    }
}
