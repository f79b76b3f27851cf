use rocket::State;
use rocket::serde::json::Json;
use uuid::Uuid;

use crate::flow::FormController;
use crate::models::{ContactAction, FormSnapshot, UpdateFieldDto, VerifyOtpDto};
use crate::store::SessionRegistry;
use crate::utils::{ApiError, ApiResponse};

async fn controller_for(
    registry: &SessionRegistry,
    form_id: Uuid,
) -> Result<FormController, ApiError> {
    registry
        .get(&form_id)
        .await
        .ok_or_else(|| ApiError::not_found("Unknown or expired form session"))
}

/// Open a new form session. Every visitor gets their own state machine.
#[post("/contact/form")]
pub async fn open_form(registry: &State<SessionRegistry>) -> Json<ApiResponse<serde_json::Value>> {
    let id = registry.open().await;
    Json(ApiResponse::success_with_message(
        "Contact form session opened".to_string(),
        serde_json::json!({ "form_id": id }),
    ))
}

#[get("/contact/form/<form_id>")]
pub async fn form_snapshot(
    registry: &State<SessionRegistry>,
    form_id: Uuid,
) -> Result<Json<ApiResponse<FormSnapshot>>, ApiError> {
    let controller = controller_for(registry, form_id).await?;
    Ok(Json(ApiResponse::success(controller.snapshot().await)))
}

#[post("/contact/form/<form_id>/field", data = "<dto>")]
pub async fn update_field(
    registry: &State<SessionRegistry>,
    form_id: Uuid,
    dto: Json<UpdateFieldDto>,
) -> Result<Json<ApiResponse<FormSnapshot>>, ApiError> {
    let controller = controller_for(registry, form_id).await?;
    let dto = dto.into_inner();
    controller
        .dispatch(ContactAction::UpdateField {
            field: dto.field,
            value: dto.value,
        })
        .await?;
    Ok(Json(ApiResponse::success(controller.snapshot().await)))
}

#[post("/contact/form/<form_id>/send-otp")]
pub async fn send_otp(
    registry: &State<SessionRegistry>,
    form_id: Uuid,
) -> Result<Json<ApiResponse<FormSnapshot>>, ApiError> {
    let controller = controller_for(registry, form_id).await?;
    controller.dispatch(ContactAction::RequestOtp).await?;
    Ok(Json(ApiResponse::success(controller.snapshot().await)))
}

#[post("/contact/form/<form_id>/verify-otp", data = "<dto>")]
pub async fn verify_otp(
    registry: &State<SessionRegistry>,
    form_id: Uuid,
    dto: Json<VerifyOtpDto>,
) -> Result<Json<ApiResponse<FormSnapshot>>, ApiError> {
    let controller = controller_for(registry, form_id).await?;
    controller
        .dispatch(ContactAction::VerifyOtp {
            code: dto.into_inner().otp,
        })
        .await?;
    Ok(Json(ApiResponse::success(controller.snapshot().await)))
}

#[post("/contact/form/<form_id>/resend-otp")]
pub async fn resend_otp(
    registry: &State<SessionRegistry>,
    form_id: Uuid,
) -> Result<Json<ApiResponse<FormSnapshot>>, ApiError> {
    let controller = controller_for(registry, form_id).await?;
    controller.dispatch(ContactAction::Resend).await?;
    Ok(Json(ApiResponse::success(controller.snapshot().await)))
}

#[post("/contact/form/<form_id>/submit")]
pub async fn submit_form(
    registry: &State<SessionRegistry>,
    form_id: Uuid,
) -> Result<Json<ApiResponse<FormSnapshot>>, ApiError> {
    let controller = controller_for(registry, form_id).await?;
    controller.dispatch(ContactAction::Submit).await?;
    Ok(Json(ApiResponse::success(controller.snapshot().await)))
}

#[post("/contact/form/<form_id>/reset")]
pub async fn reset_form(
    registry: &State<SessionRegistry>,
    form_id: Uuid,
) -> Result<Json<ApiResponse<FormSnapshot>>, ApiError> {
    let controller = controller_for(registry, form_id).await?;
    controller.dispatch(ContactAction::Reset).await?;
    Ok(Json(ApiResponse::success(controller.snapshot().await)))
}
