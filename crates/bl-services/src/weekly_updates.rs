//! Weekly update services
//!
//! Recording a week's report validates the submission as a whole (including
//! the overspend-justification rule on every itemized line), persists it,
//! and returns the milestone's recomputed financials so the caller sees the
//! new cumulative position immediately.

use tracing::info;

use bl_contracts::base::Contract;
use bl_contracts::weekly_updates::WeeklyUpdateContract;
use bl_core::result::BlResult;
use bl_core::traits::Id;
use bl_core::user::UserContext;
use bl_models::params::WeeklyUpdateParams;
use bl_models::weekly_update::WeeklyUpdate;
use bl_reports::milestone::{milestone_financials, MilestoneFinancials};
use bl_store::Stores;

/// A persisted update together with the milestone's recomputed rollup
#[derive(Debug, serde::Serialize)]
pub struct WeeklyUpdateOutcome {
    pub update: WeeklyUpdate,
    pub financials: MilestoneFinancials,
}

fn build_update(milestone_id: Id, params: &WeeklyUpdateParams) -> WeeklyUpdate {
    let mut update = WeeklyUpdate::new(milestone_id, params.week_start_date, params.week_end_date);
    update.labour_expenditure = params.labour_expenditure;
    update.material_expenditure = params.material_expenditure;
    update.other_expenditure = params.other_expenditure;
    update.progress_percentage = params.progress_percentage;
    update.work_done = params.work_done.clone();
    update.challenges = params.challenges.clone();
    update.successes = params.successes.clone();
    update.next_week_plan = params.next_week_plan.clone();
    update.notes = params.notes.clone();
    update.photos = params.photos.clone();
    for item in &params.items {
        update.add_item(item.clone());
    }
    update
}

pub struct RecordWeeklyUpdateService<'a> {
    user: &'a UserContext,
    stores: &'a Stores,
}

impl<'a> RecordWeeklyUpdateService<'a> {
    pub fn new(user: &'a UserContext, stores: &'a Stores) -> Self {
        Self { user, stores }
    }

    pub async fn call(
        &self,
        milestone_id: Id,
        params: WeeklyUpdateParams,
    ) -> BlResult<WeeklyUpdateOutcome> {
        let milestone = self.stores.milestones.find(milestone_id).await?;
        WeeklyUpdateContract::new(self.user).check(&params)?;

        let update = self
            .stores
            .weekly_updates
            .create(build_update(milestone_id, &params))
            .await?;

        let updates = self
            .stores
            .weekly_updates
            .list_for_milestone(milestone_id)
            .await?;
        let financials = milestone_financials(&milestone, &updates);

        info!(
            milestone_id,
            update_id = update.id,
            total = update.total_expenditure(),
            cumulative = financials.cumulative_expenditure,
            "weekly update recorded"
        );
        Ok(WeeklyUpdateOutcome { update, financials })
    }
}

/// The explicit edit path: updates are immutable except through here, and an
/// edit is re-validated exactly like a fresh submission.
pub struct EditWeeklyUpdateService<'a> {
    user: &'a UserContext,
    stores: &'a Stores,
}

impl<'a> EditWeeklyUpdateService<'a> {
    pub fn new(user: &'a UserContext, stores: &'a Stores) -> Self {
        Self { user, stores }
    }

    pub async fn call(
        &self,
        update_id: Id,
        params: WeeklyUpdateParams,
    ) -> BlResult<WeeklyUpdateOutcome> {
        let existing = self.stores.weekly_updates.find(update_id).await?;
        let milestone = self.stores.milestones.find(existing.milestone_id).await?;
        WeeklyUpdateContract::new(self.user).check(&params)?;

        let mut replacement = build_update(existing.milestone_id, &params);
        replacement.id = existing.id;
        replacement.created_at = existing.created_at;
        let update = self.stores.weekly_updates.update(replacement).await?;

        let updates = self
            .stores
            .weekly_updates
            .list_for_milestone(existing.milestone_id)
            .await?;
        let financials = milestone_financials(&milestone, &updates);
        Ok(WeeklyUpdateOutcome { update, financials })
    }
}

pub struct DeleteWeeklyUpdateService<'a> {
    #[allow(dead_code)]
    user: &'a UserContext,
    stores: &'a Stores,
}

impl<'a> DeleteWeeklyUpdateService<'a> {
    pub fn new(user: &'a UserContext, stores: &'a Stores) -> Self {
        Self { user, stores }
    }

    pub async fn call(&self, update_id: Id) -> BlResult<()> {
        self.stores.weekly_updates.delete(update_id).await
    }
}
