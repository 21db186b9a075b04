use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use super::response::{ApiResponse, ApiResult, OrFail};
use super::AppState;
use crate::domain::{RerouteRecord, Shelter};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/shelters/list", get(list))
        .route("/api/shelters/seed", post(seed))
        .route("/api/reroutes", get(reroutes))
}

/// GET /api/shelters/list
async fn list(State(state): State<AppState>) -> ApiResult<Vec<Shelter>> {
    let shelters = state.lifecycle.active_shelters().await.or_fail("Error fetching shelters")?;
    Ok(ApiResponse::data(shelters))
}

/// POST /api/shelters/seed
async fn seed(State(state): State<AppState>) -> ApiResult<()> {
    let response = match state.lifecycle.seed_shelters().await.or_fail("Error seeding shelters")? {
        Some(count) => {
            let mut response = ApiResponse::message("Shelters seeded");
            response.count = Some(count);
            response
        }
        None => ApiResponse::message("Shelters already exist"),
    };
    Ok(response)
}

/// Query values that fail to parse fall back to their defaults.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RerouteQuery {
    page: Option<String>,
    limit: Option<String>,
    order_id: Option<String>,
}

/// GET /api/reroutes?page&limit
async fn reroutes(State(state): State<AppState>, Query(query): Query<RerouteQuery>) -> ApiResult<Vec<RerouteRecord>> {
    let page = query.page.and_then(|p| p.parse().ok());
    let limit = query.limit.and_then(|l| l.parse().ok());
    let order_id = query.order_id.filter(|id| !id.is_empty());

    let result = state
        .lifecycle
        .reroute_history(order_id, page, limit)
        .await
        .or_fail("Error fetching reroutes")?;

    let mut response = ApiResponse::data(result.rows);
    response.page = Some(result.page);
    response.limit = Some(result.limit);
    response.total = Some(result.total);
    Ok(response)
}
