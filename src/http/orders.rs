use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use super::response::{ApiFailure, ApiResponse, ApiResult, OrFail};
use super::AppState;
use crate::domain::{Order, OrderCreate};
use crate::lifecycle::StatusUpdate;
use crate::order_actor::OrderError;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/order", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/cancel", post(cancel))
        .route("/cancel_order", post(cancel))
        .route("/claim", post(claim))
        .route("/status", post(update_status))
        .route("/assign-shelter", post(assign_shelter))
        .route("/place", post(place))
        .route("/placecod", post(place))
        .route("/list", get(list))
        .route("/userorders", post(user_orders))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUserRequest {
    order_id: Option<String>,
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    order_id: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignShelterRequest {
    order_id: Option<String>,
    shelter_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    user_id: Option<String>,
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiFailure> {
    payload.map(|Json(body)| body).map_err(ApiFailure::invalid_body)
}

fn required(value: Option<String>, names: &str, fallback: &str) -> Result<String, ApiFailure> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiFailure::from_error(OrderError::MissingParameter(format!("{} required", names)), fallback))
}

/// POST /api/order/cancel
async fn cancel(State(state): State<AppState>, payload: Result<Json<OrderUserRequest>, JsonRejection>) -> ApiResult<()> {
    const FALLBACK: &str = "Error cancelling order";
    let req = body(payload)?;
    let order_id = required(req.order_id, "orderId and userId are", FALLBACK)?;
    let user_id = required(req.user_id, "orderId and userId are", FALLBACK)?;

    state.lifecycle.cancel(&order_id, &user_id).await.or_fail(FALLBACK)?;
    Ok(ApiResponse::message("Order cancelled successfully"))
}

/// POST /api/order/claim
async fn claim(State(state): State<AppState>, payload: Result<Json<OrderUserRequest>, JsonRejection>) -> ApiResult<Order> {
    const FALLBACK: &str = "Error claiming order";
    let req = body(payload)?;
    let order_id = required(req.order_id, "orderId and userId are", FALLBACK)?;
    let user_id = required(req.user_id, "orderId and userId are", FALLBACK)?;

    let order = state.lifecycle.claim(&order_id, &user_id).await.or_fail(FALLBACK)?;
    Ok(ApiResponse::data(order).with_message("Order successfully claimed"))
}

/// POST /api/order/status
async fn update_status(State(state): State<AppState>, payload: Result<Json<StatusRequest>, JsonRejection>) -> ApiResult<Order> {
    const FALLBACK: &str = "Error updating status";
    let req = body(payload)?;
    let order_id = required(req.order_id, "orderId and status are", FALLBACK)?;
    let status = required(req.status, "orderId and status are", FALLBACK)?;

    let response = match state.lifecycle.update_status(&order_id, &status).await.or_fail(FALLBACK)? {
        StatusUpdate::Updated(order) => ApiResponse::data(order).with_message("Status Updated"),
        StatusUpdate::Unchanged(order) => ApiResponse::data(order).with_message("Status unchanged"),
    };
    Ok(response)
}

/// POST /api/order/assign-shelter
async fn assign_shelter(
    State(state): State<AppState>,
    payload: Result<Json<AssignShelterRequest>, JsonRejection>,
) -> ApiResult<Order> {
    let req = body(payload)?;
    let outcome = state
        .lifecycle
        .assign_shelter(req.order_id.as_deref(), req.shelter_id.as_deref())
        .await
        .or_fail("Error assigning shelter")?;

    let message = match (outcome.already_assigned, outcome.audit_recorded) {
        (true, _) => "Order already assigned to a shelter",
        (false, true) => "Order assigned to shelter",
        (false, false) => "Order assigned to shelter, but the reroute record could not be saved",
    };
    let mut response = ApiResponse::data(outcome.order).with_message(message);
    if outcome.already_assigned {
        response.already_assigned = Some(true);
    } else {
        response.audit_recorded = Some(outcome.audit_recorded);
    }
    Ok(response)
}

/// POST /api/order/place
async fn place(State(state): State<AppState>, payload: Result<Json<OrderCreate>, JsonRejection>) -> ApiResult<Order> {
    let params = body(payload)?;
    let order = state.lifecycle.place_order(params).await.or_fail("Error placing order")?;
    Ok(ApiResponse::data(order).with_message("Order Placed"))
}

/// GET /api/order/list
async fn list(State(state): State<AppState>) -> ApiResult<Vec<Order>> {
    let orders = state.lifecycle.list_orders().await.or_fail("Error fetching orders")?;
    Ok(ApiResponse::data(orders))
}

/// POST /api/order/userorders
async fn user_orders(State(state): State<AppState>, payload: Result<Json<UserRequest>, JsonRejection>) -> ApiResult<Vec<Order>> {
    const FALLBACK: &str = "Error fetching orders";
    let user_id = required(body(payload)?.user_id, "userId is", FALLBACK)?;
    let orders = state.lifecycle.user_orders(&user_id).await.or_fail(FALLBACK)?;
    Ok(ApiResponse::data(orders))
}
