//! Request handlers, one module per resource

pub mod budgets;
pub mod buildings;
pub mod milestones;
pub mod payments;
pub mod portfolio;
pub mod projects;
pub mod risks;
pub mod weekly_updates;
