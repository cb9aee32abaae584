//! Axum extractors for API handlers

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use bl_core::user::{Role, UserContext};
use bl_services::analysis::RiskAnalysisProvider;
use bl_store::ports::Stores;

use crate::error::ApiError;

/// Shared application state: one wired store set plus the analysis backend.
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub analysis: Arc<dyn RiskAnalysisProvider>,
}

impl AppState {
    pub fn new(stores: Stores, analysis: Arc<dyn RiskAnalysisProvider>) -> Self {
        Self { stores, analysis }
    }
}

/// Authenticated caller, passed through from the identity layer as
/// `x-user-id` and `x-user-role` headers. Verification itself happens
/// upstream; the engine only needs who is acting and in what role.
pub struct AuthenticatedUser(pub UserContext);

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
            .ok_or_else(|| ApiError::unauthorized("missing or invalid x-user-id header"))?;

        let role = parts
            .headers
            .get("x-user-role")
            .and_then(|v| v.to_str().ok())
            .and_then(Role::parse)
            .ok_or_else(|| ApiError::unauthorized("missing or invalid x-user-role header"))?;

        Ok(AuthenticatedUser(UserContext::new(user_id, role)))
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = UserContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    fn state() -> AppState {
        AppState::new(
            Stores::in_memory(),
            Arc::new(bl_services::analysis::HeuristicAnalysisProvider),
        )
    }

    #[tokio::test]
    async fn test_headers_become_user_context() {
        let mut parts = parts(&[("x-user-id", "42"), ("x-user-role", "property_manager")]);
        let user = AuthenticatedUser::from_request_parts(&mut parts, &state())
            .await
            .unwrap();
        assert_eq!(user.user_id, 42);
        assert_eq!(user.role, Role::PropertyManager);
    }

    #[tokio::test]
    async fn test_missing_or_unknown_role_rejected() {
        let mut parts = parts(&[("x-user-id", "42")]);
        assert!(AuthenticatedUser::from_request_parts(&mut parts, &state())
            .await
            .is_err());

        let mut parts = parts_with_role("landlord");
        assert!(AuthenticatedUser::from_request_parts(&mut parts, &state())
            .await
            .is_err());
    }

    fn parts_with_role(role: &str) -> Parts {
        parts(&[("x-user-id", "42"), ("x-user-role", role)])
    }
}
