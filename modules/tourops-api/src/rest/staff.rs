use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use tourops_common::{split_name, NewStaff, StaffMember, StaffPatch, StaffView};
use tracing::info;
use uuid::Uuid;

use super::{error_response, internal_error, not_found, parse_id, success};
use crate::notify::{dispatch, ChangeNotification, RecordType};
use crate::AppState;

async fn find_staff(state: &AppState, id: &str) -> Result<StaffMember, Response> {
    let Some(uuid) = parse_id(id) else {
        return Err(StatusCode::BAD_REQUEST.into_response());
    };
    match state.staff.get(uuid).await {
        Ok(Some(member)) => Ok(member),
        Ok(None) => Err(not_found("Staff member")),
        Err(e) => Err(internal_error(&e, "Failed to load staff member")),
    }
}

pub async fn api_staff(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.staff.list().await {
        Ok(staff) => {
            let views: Vec<StaffView> = staff.iter().map(StaffMember::view).collect();
            Json(views).into_response()
        }
        Err(e) => internal_error(&e, "Failed to list staff"),
    }
}

pub async fn api_create_staff(
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewStaff>,
) -> impl IntoResponse {
    if let Err(e) = body.validate() {
        return error_response(e);
    }

    let (first_name, last_name) = split_name(&body.name);
    let member = StaffMember {
        id: Uuid::new_v4(),
        email: body.email.trim().to_string(),
        first_name,
        last_name,
        role: body.role.trim().to_string(),
        created_at: Utc::now(),
    };

    if let Err(e) = state.staff.create(&member).await {
        return internal_error(&e, "Failed to create staff member");
    }
    info!(staff_id = %member.id, role = %member.role, "Staff member created");

    let view = member.view();
    dispatch(
        state.notifier.as_ref(),
        ChangeNotification::created(RecordType::Staff, member.id, &view.name, &view),
    )
    .await;

    (StatusCode::CREATED, Json(view)).into_response()
}

pub async fn api_update_staff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<StaffPatch>,
) -> impl IntoResponse {
    let existing = match find_staff(&state, &id).await {
        Ok(member) => member,
        Err(response) => return response,
    };

    let updated = patch.apply(&existing);
    match state.staff.update(&updated).await {
        Ok(true) => {}
        Ok(false) => return not_found("Staff member"),
        Err(e) => return internal_error(&e, "Failed to update staff member"),
    }

    let view = updated.view();
    dispatch(
        state.notifier.as_ref(),
        ChangeNotification::updated(RecordType::Staff, updated.id, &view.name, &existing.view(), &view),
    )
    .await;

    Json(view).into_response()
}

pub async fn api_delete_staff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let existing = match find_staff(&state, &id).await {
        Ok(member) => member,
        Err(response) => return response,
    };

    match state.staff.delete(existing.id).await {
        Ok(true) => {}
        Ok(false) => return not_found("Staff member"),
        Err(e) => return internal_error(&e, "Failed to delete staff member"),
    }

    let view = existing.view();
    dispatch(
        state.notifier.as_ref(),
        ChangeNotification::deleted(RecordType::Staff, existing.id, &view.name, &view),
    )
    .await;

    success()
}
