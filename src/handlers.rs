// handlers.rs

use crate::{
    error::AppError,
    events::DEVICE_CHANGE,
    models::{ActionParams, ActionView, AppState, PowerDeviceView, UpdateParams, UpdateResponse},
    utils::parse_value,
};
use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[utoipa::path(
    get,
    path = "/devices/power",
    responses(
        (status = 200, description = "All power devices in catalog order", body = [PowerDeviceView])
    )
)]
pub async fn list_power_devices(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<PowerDeviceView>> {
    Json(state.devices.snapshot().await)
}

#[utoipa::path(
    get,
    path = "/devices/power/{device}",
    params(("device" = String, Path, description = "Device name")),
    responses(
        (status = 200, description = "Device state", body = PowerDeviceView),
        (status = 404, description = "Can't find device")
    )
)]
pub async fn get_power_device(
    State(state): State<Arc<AppState>>,
    Path(device): Path<String>,
) -> Result<Json<PowerDeviceView>, AppError> {
    let device = state
        .devices
        .find(&device)
        .ok_or(AppError::DeviceNotFound(device))?;
    Ok(Json(device.snapshot().await))
}

#[utoipa::path(
    post,
    path = "/devices/power/update",
    params(UpdateParams),
    responses(
        (status = 200, description = "Command written", body = UpdateResponse),
        (status = 400, description = "Value is not a number, or device parameter missing"),
        (status = 404, description = "Can't find device"),
        (status = 500, description = "Value or type rejected, or serial write failed")
    )
)]
pub async fn update_power_device(
    State(state): State<Arc<AppState>>,
    params: Result<Query<UpdateParams>, QueryRejection>,
) -> Result<Json<UpdateResponse>, AppError> {
    let Query(params) = params.map_err(|rejection| AppError::Validation(rejection.body_text()))?;
    let device = state
        .devices
        .find(&params.device)
        .ok_or_else(|| AppError::DeviceNotFound(params.device.clone()))?;
    let value = parse_value(params.val.as_deref())
        .ok_or_else(|| AppError::NonNumericValue(params.val.clone().unwrap_or_default()))?;

    let outcome = device.request(value, &state.serial).await;
    if !matches!(
        outcome,
        Err(AppError::InvalidValue { .. } | AppError::UnknownDeviceType(_))
    ) {
        state.events.publish(
            DEVICE_CHANGE,
            json!({ "device": device.name(), "value": value, "written": outcome.is_ok() }),
        );
    }
    outcome?;

    Ok(Json(UpdateResponse { ok: true }))
}

#[utoipa::path(
    get,
    path = "/devices/power/{device}/on",
    params(("device" = String, Path, description = "Device name")),
    responses(
        (status = 200, description = "OK", body = String),
        (status = 404, description = "Can't find device")
    )
)]
pub async fn turn_on_device(
    State(state): State<Arc<AppState>>,
    Path(device): Path<String>,
) -> Result<&'static str, AppError> {
    toggle_device(&state, device, true).await
}

#[utoipa::path(
    get,
    path = "/devices/power/{device}/off",
    params(("device" = String, Path, description = "Device name")),
    responses(
        (status = 200, description = "OK", body = String),
        (status = 404, description = "Can't find device")
    )
)]
pub async fn turn_off_device(
    State(state): State<Arc<AppState>>,
    Path(device): Path<String>,
) -> Result<&'static str, AppError> {
    toggle_device(&state, device, false).await
}

async fn toggle_device(state: &AppState, name: String, on: bool) -> Result<&'static str, AppError> {
    let device = state
        .devices
        .find(&name)
        .ok_or(AppError::DeviceNotFound(name))?;

    let outcome = device.toggle(on, &state.serial).await;
    state.events.publish(
        DEVICE_CHANGE,
        json!({ "device": device.name(), "value": i64::from(on), "written": outcome.is_ok() }),
    );
    outcome?;
    Ok("OK")
}

#[utoipa::path(
    get,
    path = "/actions",
    responses((status = 200, description = "All actions in catalog order", body = [ActionView]))
)]
pub async fn list_actions(State(state): State<Arc<AppState>>) -> Json<Vec<ActionView>> {
    Json(state.actions.snapshot())
}

#[utoipa::path(
    method(get, post),
    path = "/actions/{action}",
    params(("action" = String, Path, description = "Action name"), ActionParams),
    responses(
        (status = 200, description = "Action started", body = String),
        (status = 404, description = "Unknown action, or action type not implemented")
    )
)]
pub async fn perform_action(
    State(state): State<Arc<AppState>>,
    Path(action): Path<String>,
    params: Result<Query<ActionParams>, QueryRejection>,
) -> Result<&'static str, AppError> {
    // A malformed query only loses the value; the action still runs.
    let params = params.map(|Query(params)| params).unwrap_or_default();
    let action = state
        .actions
        .find(&action)
        .ok_or(AppError::ActionNotFound(action))?;

    // Fire and forget: the run outlives this request.
    let handle = state.dispatcher.dispatch(action, params.val.as_deref())?;
    info!(action = %action.name, dispatch_id = %handle.id, "Action accepted");
    Ok("OK")
}
