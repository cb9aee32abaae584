//! Risk register services

use tracing::info;

use bl_contracts::base::Contract;
use bl_contracts::risks::RiskContract;
use bl_core::error::BlError;
use bl_core::result::BlResult;
use bl_core::traits::Id;
use bl_core::user::UserContext;
use bl_models::params::RiskParams;
use bl_models::risk::{Risk, RiskStatus};
use bl_store::Stores;

pub struct CreateRiskService<'a> {
    user: &'a UserContext,
    stores: &'a Stores,
}

impl<'a> CreateRiskService<'a> {
    pub fn new(user: &'a UserContext, stores: &'a Stores) -> Self {
        Self { user, stores }
    }

    pub async fn call(&self, milestone_id: Id, params: RiskParams) -> BlResult<Risk> {
        self.stores.milestones.find(milestone_id).await?;
        RiskContract::new(self.user).check(&params)?;

        let risk = Risk {
            id: None,
            milestone_id,
            description: params.description,
            category: params.category,
            probability: params.probability,
            impact: params.impact,
            mitigation_strategy: params.mitigation_strategy,
            status: RiskStatus::Open,
            created_by: self.user.user_id,
            created_at: None,
            updated_at: None,
        };
        let risk = self.stores.risks.create(risk).await?;
        info!(
            risk_id = risk.id,
            milestone_id,
            severity = risk.severity().as_str(),
            "risk registered"
        );
        Ok(risk)
    }
}

pub struct UpdateRiskService<'a> {
    user: &'a UserContext,
    stores: &'a Stores,
}

impl<'a> UpdateRiskService<'a> {
    pub fn new(user: &'a UserContext, stores: &'a Stores) -> Self {
        Self { user, stores }
    }

    pub async fn call(&self, risk_id: Id, params: RiskParams) -> BlResult<Risk> {
        let mut risk = self.stores.risks.find(risk_id).await?;
        RiskContract::new(self.user).check(&params)?;

        risk.description = params.description;
        risk.category = params.category;
        risk.probability = params.probability;
        risk.impact = params.impact;
        risk.mitigation_strategy = params.mitigation_strategy;
        self.stores.risks.update(risk).await
    }
}

pub struct UpdateRiskStatusService<'a> {
    user: &'a UserContext,
    stores: &'a Stores,
}

impl<'a> UpdateRiskStatusService<'a> {
    pub fn new(user: &'a UserContext, stores: &'a Stores) -> Self {
        Self { user, stores }
    }

    pub async fn call(&self, risk_id: Id, status: RiskStatus) -> BlResult<Risk> {
        if !self.user.can_manage_risks() {
            return Err(BlError::forbidden(
                "managing risks requires a reviewer role",
            ));
        }
        let mut risk = self.stores.risks.find(risk_id).await?;
        RiskStatus::validate_transition(risk.status, status).map_err(BlError::Validation)?;
        risk.status = status;
        self.stores.risks.update(risk).await
    }
}

pub struct DeleteRiskService<'a> {
    user: &'a UserContext,
    stores: &'a Stores,
}

impl<'a> DeleteRiskService<'a> {
    pub fn new(user: &'a UserContext, stores: &'a Stores) -> Self {
        Self { user, stores }
    }

    pub async fn call(&self, risk_id: Id) -> BlResult<()> {
        if !self.user.can_manage_risks() {
            return Err(BlError::forbidden(
                "managing risks requires a reviewer role",
            ));
        }
        self.stores.risks.delete(risk_id).await
    }
}
