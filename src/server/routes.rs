use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use std::sync::Arc;

use crate::query::RECENT_LIMIT;
use crate::server::AppState;
use crate::stone::{StoneDetail, StoneSummary};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

pub type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn error_response(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse { error: message.into() }))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "trailmarks-backend",
    })
}

pub async fn list_all(State(state): State<Arc<AppState>>) -> ApiResult<Vec<StoneSummary>> {
    // Backend details are already logged by the query service
    let stones = state
        .queries
        .list_all()
        .await
        .map_err(|_| error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch wandersteine"))?;

    Ok(Json(stones))
}

pub async fn list_recent(State(state): State<Arc<AppState>>) -> ApiResult<Vec<StoneSummary>> {
    let stones = state
        .queries
        .list_recent(RECENT_LIMIT)
        .await
        .map_err(|_| error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch wandersteine"))?;

    Ok(Json(stones))
}

pub async fn get_by_unique_id(
    State(state): State<Arc<AppState>>,
    Path(unique_id): Path<String>,
) -> ApiResult<StoneDetail> {
    let stone = state
        .queries
        .find_by_unique_id(&unique_id)
        .await
        .map_err(|_| error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch wanderstein"))?;

    match stone {
        Some(stone) => Ok(Json(stone)),
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Wanderstein '{}' not found", unique_id),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryService;
    use crate::seed::{SeedMode, seed};
    use crate::storage::{SqliteStore, StoreHandle};

    async fn state(seeded: bool) -> State<Arc<AppState>> {
        let store = SqliteStore::open_in_memory().unwrap();
        store.migrate().unwrap();
        let handle = StoreHandle::new(store);
        if seeded {
            seed(&handle, SeedMode::Atomic).await.unwrap();
        }
        State(Arc::new(AppState::new(QueryService::new(handle))))
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json, serde_json::json!({"status": "healthy", "service": "trailmarks-backend"}));
    }

    #[tokio::test]
    async fn test_list_all_json_shape() {
        let Json(stones) = list_all(state(true).await).await.unwrap();
        assert_eq!(stones.len(), 6);

        let json = serde_json::to_value(&stones[0]).unwrap();
        for key in ["id", "name", "unique_id", "preview_url", "created_at"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert!(json.get("description").is_none());
    }

    #[tokio::test]
    async fn test_list_recent_on_empty_store() {
        let Json(stones) = list_recent(state(false).await).await.unwrap();
        assert!(stones.is_empty());
        assert_eq!(serde_json::to_string(&stones).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_get_by_unique_id() {
        let state = state(true).await;

        let Json(stone) = get_by_unique_id(state.clone(), Path("WS-2024-002".to_string()))
            .await
            .unwrap();
        assert_eq!(stone.name, "Alpenblick");

        let (status, Json(body)) = get_by_unique_id(state, Path("WS-0000-000".to_string()))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.error.contains("WS-0000-000"));
    }
}
