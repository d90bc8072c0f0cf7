//! Vendor presence and listing handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};

use keliling_service::presence::PresenceRequest;

use crate::dto::response::{PresenceResponse, VendorListResponse};
use crate::error::ApiError;
use crate::extractors::auth::AuthUser;
use crate::extractors::path::parse_vendor_id;
use crate::state::AppState;

/// POST /api/vendor/{id}/online (and the legacy /vendor/{id}/online)
///
/// Body `{"online": <any>}` sets the flag to the value's truthiness; an
/// empty body or one without `online` flips the stored flag.
pub async fn set_online(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<PresenceResponse>, ApiError> {
    let vendor_id = parse_vendor_id(&id)?;
    let request = PresenceRequest::from_body(&body)?;

    let vendor = state
        .presence_service
        .update_presence(auth.context(), vendor_id, request)
        .await?;

    Ok(Json(PresenceResponse::new(vendor)))
}

/// GET /api/vendors
pub async fn list_vendors(
    State(state): State<AppState>,
) -> Result<Json<VendorListResponse>, ApiError> {
    let vendors = state.vendor_service.list_vendors().await?;
    Ok(Json(VendorListResponse { ok: true, vendors }))
}
