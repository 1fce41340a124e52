use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use statica_core::{validate_site_id, DeployedSite};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CreateSiteRequest {
    pub id: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSiteRequest {
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SiteResponse {
    pub id: String,
    pub url: String,
}

impl From<DeployedSite> for SiteResponse {
    fn from(site: DeployedSite) -> Self {
        Self {
            id: site.id,
            url: site.url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ListSitesResponse {
    pub ids: Vec<String>,
}

/// Map body rejections to the API's error contract: anything unreadable
/// or undecodable is a 400, except an over-long body, which keeps 413.
fn bad_json(rejection: JsonRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::new(StatusCode::PAYLOAD_TOO_LARGE, rejection.body_text())
    } else {
        AppError::bad_request(rejection.body_text())
    }
}

pub async fn create_site_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateSiteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload.map_err(bad_json)?;
    validate_site_id(&req.id).map_err(AppError::bad_request)?;

    let site = state.service.create_site(&req.id, &req.content).await?;
    Ok(Json(SiteResponse::from(site)))
}

pub async fn get_site_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    validate_site_id(&id).map_err(AppError::bad_request)?;

    let site = state.service.get_site(&id).await?;
    Ok(Json(SiteResponse::from(site)))
}

pub async fn update_site_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateSiteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    validate_site_id(&id).map_err(AppError::bad_request)?;
    let Json(req) = payload.map_err(bad_json)?;

    let site = state.service.update_site(&id, &req.content).await?;
    Ok(Json(SiteResponse::from(site)))
}

pub async fn delete_site_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    validate_site_id(&id).map_err(AppError::bad_request)?;

    state.service.delete_site(&id).await?;
    Ok(StatusCode::OK)
}

pub async fn list_sites_handler(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let ids = state.service.list_sites().await?;
    Ok(Json(ListSitesResponse { ids }))
}
