use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use chrono::Local;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use models::{ExpenseRecord, ViewMode};

use crate::{
    error::ApiError,
    repository::{self, ExpenseRepository},
    session::AnalysisSession,
    Result,
};

/// Shared handler state: the record store plus one analysis session per user.
pub struct AppState {
    repo: Arc<dyn ExpenseRepository>,
    sessions: RwLock<HashMap<String, Arc<AnalysisSession>>>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(repo: Arc<dyn ExpenseRepository>) -> SharedState {
        Arc::new(Self {
            repo,
            sessions: RwLock::new(HashMap::new()),
        })
    }

    async fn session_for(&self, user_id: &str) -> Arc<AnalysisSession> {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(AnalysisSession::new()))
            .clone()
    }

    async fn existing_session(&self, user_id: &str) -> Option<Arc<AnalysisSession>> {
        self.sessions.read().await.get(user_id).cloned()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    #[serde(default)]
    pub view: ViewMode,
}

/// GET /api/users/:user_id/analysis?view=monthly|yearly
/// Fetches the user's records and aggregates them with today's local date.
/// A failing fetch degrades to an empty record list, so the response is
/// always a well-formed analysis.
pub async fn get_analysis(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Result<impl IntoResponse> {
    // A malformed id is the caller's mistake, not a fetch failure, and it
    // must not leave a session behind: the session map holds one entry per
    // accepted user id only.
    repository::validate_user_id(&user_id)?;

    let session = state.session_for(&user_id).await;
    let ticket = session.begin();

    let records = match state.repo.fetch_for_user(&user_id).await {
        Ok(records) => records,
        Err(err) => {
            tracing::warn!(user_id = %user_id, error = %err, "expense fetch failed; serving empty analysis");
            Vec::new()
        }
    };

    let today = Local::now().date_naive();
    let analysis = analysis::analyze(&records, query.view, today);

    if !session.install(ticket, analysis.clone()).await {
        tracing::debug!(user_id = %user_id, "analysis round superseded; result served but not installed");
    }

    Ok(Json(analysis))
}

/// GET /api/users/:user_id/analysis/latest
/// The most recently installed analysis for the user, whatever its view mode.
pub async fn get_latest_analysis(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse> {
    let latest = match state.existing_session(&user_id).await {
        Some(session) => session.latest().await,
        None => None,
    };
    latest
        .map(Json)
        .ok_or(ApiError::AnalysisNotFound(user_id))
}

/// GET /api/users/:user_id/expenses
/// The raw record list, as stored.
pub async fn list_expenses(
    State(state): State<SharedState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ExpenseRecord>>> {
    let records = state.repo.fetch_for_user(&user_id).await?;
    Ok(Json(records))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "expense-analytics-api"
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FailingRepository;

    #[async_trait]
    impl ExpenseRepository for FailingRepository {
        async fn fetch_for_user(&self, _user_id: &str) -> Result<Vec<ExpenseRecord>> {
            Err(ApiError::Internal("store unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn failed_fetch_degrades_to_empty_analysis() {
        let state = AppState::new(Arc::new(FailingRepository));
        let response = get_analysis(
            State(state.clone()),
            Path("u-1".to_string()),
            Query(AnalysisQuery::default()),
        )
        .await;
        assert!(response.is_ok());

        // The degraded round still installed an (empty) analysis.
        let latest = state.existing_session("u-1").await.unwrap().latest().await;
        let analysis = latest.unwrap();
        assert_eq!(analysis.yearly_total, 0.0);
        assert!(analysis.category_totals.is_empty());
    }

    #[tokio::test]
    async fn rejected_user_ids_leave_no_session_behind() {
        let state = AppState::new(Arc::new(FailingRepository));

        for i in 0..20 {
            let result = get_analysis(
                State(state.clone()),
                Path(format!("../bogus/{i}")),
                Query(AnalysisQuery::default()),
            )
            .await;
            assert!(matches!(result, Err(ApiError::InvalidUserId(_))));
        }

        // The session map only grows for accepted ids.
        assert!(state.sessions.read().await.is_empty());

        let ok = get_analysis(
            State(state.clone()),
            Path("real-user".to_string()),
            Query(AnalysisQuery::default()),
        )
        .await;
        assert!(ok.is_ok());
        assert_eq!(state.sessions.read().await.len(), 1);
    }
}
