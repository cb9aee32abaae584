//! Risk analysis capability
//!
//! The analysis engine is a black box behind [`RiskAnalysisProvider`]. The
//! core builds a [`ProjectSnapshot`] from current store state, hands it
//! over, and validates only the shape of the typed envelope that comes
//! back, never its content. Control flow is identical whichever provider
//! is installed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use bl_core::error::BlError;
use bl_core::result::BlResult;
use bl_core::traits::Id;
use bl_models::risk::RiskLevel;
use bl_store::Stores;

use crate::views::ViewService;

/// Condensed project state handed to the provider
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub project_name: String,
    /// Percentage
    pub budget_utilization: f64,
    pub overdue_milestones: usize,
    /// Percentage
    pub average_progress: f64,
    pub open_risk_count: usize,
}

/// Per-severity counts over the findings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RiskSummary {
    pub total_risks_identified: usize,
    pub critical_risks: usize,
    pub high_risks: usize,
    pub medium_risks: usize,
    pub low_risks: usize,
}

/// The snapshot metrics echoed back in the envelope
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMetrics {
    pub budget_utilization: f64,
    pub overdue_milestones: usize,
    pub average_progress: f64,
    pub open_risk_count: usize,
}

/// One finding from the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFinding {
    pub title: String,
    pub severity: RiskLevel,
    pub likelihood: RiskLevel,
    pub category: String,
    pub mitigation: String,
}

/// The typed envelope every provider must produce
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAnalysis {
    pub project_name: String,
    pub summary: RiskSummary,
    pub project_metrics: ProjectMetrics,
    pub risks: Vec<RiskFinding>,
}

impl RiskAnalysis {
    /// Recount the summary from the findings. Severity HIGH with
    /// likelihood HIGH counts as critical on top of high.
    pub fn summarize_findings(findings: &[RiskFinding]) -> RiskSummary {
        let mut summary = RiskSummary {
            total_risks_identified: findings.len(),
            ..Default::default()
        };
        for finding in findings {
            match finding.severity {
                RiskLevel::High => {
                    summary.high_risks += 1;
                    if finding.likelihood == RiskLevel::High {
                        summary.critical_risks += 1;
                    }
                }
                RiskLevel::Medium => summary.medium_risks += 1,
                RiskLevel::Low => summary.low_risks += 1,
            }
        }
        summary
    }
}

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("malformed analysis envelope: {0}")]
    Malformed(String),
}

impl From<AnalysisError> for BlError {
    fn from(err: AnalysisError) -> Self {
        BlError::ExternalService {
            service: "risk-analysis".into(),
            message: err.to_string(),
        }
    }
}

/// Injected analysis boundary
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RiskAnalysisProvider: Send + Sync {
    async fn analyze(&self, snapshot: &ProjectSnapshot) -> Result<RiskAnalysis, AnalysisError>;
}

/// Deterministic local provider for development. Threshold rules over the
/// snapshot, no external calls.
pub struct HeuristicAnalysisProvider;

impl HeuristicAnalysisProvider {
    fn findings(snapshot: &ProjectSnapshot) -> Vec<RiskFinding> {
        let mut findings = Vec::new();

        if snapshot.budget_utilization > 100.0 {
            findings.push(RiskFinding {
                title: "Budget exceeded".into(),
                severity: RiskLevel::High,
                likelihood: RiskLevel::High,
                category: "FINANCIAL".into(),
                mitigation: "Freeze discretionary spend and re-baseline the remaining work"
                    .into(),
            });
        } else if snapshot.budget_utilization > 85.0 {
            findings.push(RiskFinding {
                title: "Budget nearly exhausted".into(),
                severity: RiskLevel::Medium,
                likelihood: RiskLevel::High,
                category: "FINANCIAL".into(),
                mitigation: "Review remaining scope against the unspent allocation".into(),
            });
        }

        if snapshot.overdue_milestones > 0 {
            let severity = if snapshot.overdue_milestones > 2 {
                RiskLevel::High
            } else {
                RiskLevel::Medium
            };
            findings.push(RiskFinding {
                title: format!("{} overdue milestone(s)", snapshot.overdue_milestones),
                severity,
                likelihood: RiskLevel::High,
                category: "SCHEDULE".into(),
                mitigation: "Re-sequence overdue work and confirm revised due dates".into(),
            });
        }

        if snapshot.average_progress < 25.0 && snapshot.budget_utilization > 50.0 {
            findings.push(RiskFinding {
                title: "Spend is outpacing progress".into(),
                severity: RiskLevel::High,
                likelihood: RiskLevel::Medium,
                category: "FINANCIAL".into(),
                mitigation: "Audit weekly expenditure against delivered work".into(),
            });
        }

        if snapshot.open_risk_count > 5 {
            findings.push(RiskFinding {
                title: "Large open risk register".into(),
                severity: RiskLevel::Medium,
                likelihood: RiskLevel::Medium,
                category: "RESOURCE".into(),
                mitigation: "Triage the register and close or mitigate stale entries".into(),
            });
        }

        findings
    }
}

#[async_trait]
impl RiskAnalysisProvider for HeuristicAnalysisProvider {
    async fn analyze(&self, snapshot: &ProjectSnapshot) -> Result<RiskAnalysis, AnalysisError> {
        let risks = Self::findings(snapshot);
        Ok(RiskAnalysis {
            project_name: snapshot.project_name.clone(),
            summary: RiskAnalysis::summarize_findings(&risks),
            project_metrics: ProjectMetrics {
                budget_utilization: snapshot.budget_utilization,
                overdue_milestones: snapshot.overdue_milestones,
                average_progress: snapshot.average_progress,
                open_risk_count: snapshot.open_risk_count,
            },
            risks,
        })
    }
}

pub struct AnalyzeProjectService<'a> {
    stores: &'a Stores,
    provider: &'a dyn RiskAnalysisProvider,
}

impl<'a> AnalyzeProjectService<'a> {
    pub fn new(stores: &'a Stores, provider: &'a dyn RiskAnalysisProvider) -> Self {
        Self { stores, provider }
    }

    pub async fn call(&self, project_id: Id) -> BlResult<RiskAnalysis> {
        let view = ViewService::new(self.stores).project_view(project_id).await?;
        let snapshot = ProjectSnapshot {
            project_name: view.project.name.clone(),
            budget_utilization: view.budget_utilization,
            overdue_milestones: view.overdue_milestones,
            average_progress: view.average_progress,
            open_risk_count: view.open_risk_count,
        };

        let analysis = self.provider.analyze(&snapshot).await?;
        info!(
            project_id,
            findings = analysis.risks.len(),
            "project risk analysis completed"
        );
        Ok(analysis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bl_models::project::Project;
    use mockall::predicate::always;

    fn snapshot(utilization: f64, overdue: usize, progress: f64, open: usize) -> ProjectSnapshot {
        ProjectSnapshot {
            project_name: "Estate".into(),
            budget_utilization: utilization,
            overdue_milestones: overdue,
            average_progress: progress,
            open_risk_count: open,
        }
    }

    #[tokio::test]
    async fn test_heuristic_flags_overrun_as_critical() {
        let analysis = HeuristicAnalysisProvider
            .analyze(&snapshot(110.0, 0, 60.0, 0))
            .await
            .unwrap();
        assert_eq!(analysis.summary.total_risks_identified, 1);
        assert_eq!(analysis.summary.critical_risks, 1);
        assert_eq!(analysis.risks[0].severity, RiskLevel::High);
    }

    #[tokio::test]
    async fn test_heuristic_quiet_project_has_no_findings() {
        let analysis = HeuristicAnalysisProvider
            .analyze(&snapshot(40.0, 0, 55.0, 1))
            .await
            .unwrap();
        assert!(analysis.risks.is_empty());
        assert_eq!(analysis.summary, RiskSummary::default());
        assert_eq!(analysis.project_metrics.budget_utilization, 40.0);
    }

    #[tokio::test]
    async fn test_heuristic_schedule_severity_scales_with_overdue_count() {
        let provider = HeuristicAnalysisProvider;
        let mild = provider.analyze(&snapshot(10.0, 1, 50.0, 0)).await.unwrap();
        assert_eq!(mild.risks[0].severity, RiskLevel::Medium);
        let bad = provider.analyze(&snapshot(10.0, 3, 50.0, 0)).await.unwrap();
        assert_eq!(bad.risks[0].severity, RiskLevel::High);
    }

    #[test]
    fn test_summary_counts() {
        let findings = vec![
            RiskFinding {
                title: "a".into(),
                severity: RiskLevel::High,
                likelihood: RiskLevel::High,
                category: "FINANCIAL".into(),
                mitigation: String::new(),
            },
            RiskFinding {
                title: "b".into(),
                severity: RiskLevel::High,
                likelihood: RiskLevel::Low,
                category: "SCHEDULE".into(),
                mitigation: String::new(),
            },
            RiskFinding {
                title: "c".into(),
                severity: RiskLevel::Low,
                likelihood: RiskLevel::Low,
                category: "OTHER".into(),
                mitigation: String::new(),
            },
        ];
        let summary = RiskAnalysis::summarize_findings(&findings);
        assert_eq!(summary.total_risks_identified, 3);
        assert_eq!(summary.high_risks, 2);
        assert_eq!(summary.critical_risks, 1);
        assert_eq!(summary.low_risks, 1);
        assert_eq!(summary.medium_risks, 0);
    }

    #[tokio::test]
    async fn test_provider_failure_maps_to_external_service_error() {
        let stores = Stores::in_memory();
        let project = stores.projects.create(Project::new("Estate")).await.unwrap();

        let mut provider = MockRiskAnalysisProvider::new();
        provider
            .expect_analyze()
            .with(always())
            .returning(|_| Err(AnalysisError::Unavailable("model offline".into())));

        let err = AnalyzeProjectService::new(&stores, &provider)
            .call(project.id.unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, BlError::ExternalService { .. }));
    }

    #[tokio::test]
    async fn test_envelope_built_from_store_state() {
        let stores = Stores::in_memory();
        let project = stores.projects.create(Project::new("Estate")).await.unwrap();

        let mut provider = MockRiskAnalysisProvider::new();
        provider.expect_analyze().returning(|snapshot| {
            assert_eq!(snapshot.project_name, "Estate");
            Ok(RiskAnalysis {
                project_name: snapshot.project_name.clone(),
                summary: RiskSummary::default(),
                project_metrics: ProjectMetrics::default(),
                risks: vec![],
            })
        });

        let analysis = AnalyzeProjectService::new(&stores, &provider)
            .call(project.id.unwrap())
            .await
            .unwrap();
        assert_eq!(analysis.project_name, "Estate");
    }
}
