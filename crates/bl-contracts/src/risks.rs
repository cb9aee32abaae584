//! Contracts for the risk register

use bl_core::error::{BlError, ValidationErrors};
use bl_core::result::BlResult;
use bl_core::user::UserContext;
use bl_models::params::RiskParams;

use crate::base::{run_derive_validation, Contract, ValidationResult};

/// Contract for creating or editing a risk. Risks are owned by reviewer
/// roles; the status graph itself is unrestricted.
pub struct RiskContract<'a> {
    user: &'a UserContext,
}

impl<'a> RiskContract<'a> {
    pub fn new(user: &'a UserContext) -> Self {
        Self { user }
    }
}

impl<'a> Contract<RiskParams> for RiskContract<'a> {
    fn authorize(&self) -> BlResult<()> {
        if self.user.can_manage_risks() {
            Ok(())
        } else {
            Err(BlError::forbidden(
                "managing risks requires a reviewer role",
            ))
        }
    }

    fn validate(&self, params: &RiskParams) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        run_derive_validation(&mut errors, params);
        errors.into_result()
    }
}
