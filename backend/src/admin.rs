use axum::extract::{Multipart, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{IntoResponse, Redirect};
use axum::{Form, Json};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth;
use crate::error::AppError;
use crate::gallery::{Gallery, GalleryAction};
use crate::models::{generate_slug, ImagesField, Property, PropertyInput};
use crate::state::AppState;
use crate::storage::{self, ImageFile};

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    if !auth::validate_credentials(&state.config, &form.email, &form.password) {
        info!("Rejected admin login");
        let cookie = auth::destroy_session(&state.config);
        return Ok((
            [(header::SET_COOKIE, cookie)],
            Redirect::to("/admin?error=invalid"),
        ));
    }

    info!("Admin logged in");
    let cookie = auth::create_session(&state.config)?;
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/admin")))
}

pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, auth::destroy_session(&state.config))],
        Redirect::to("/admin"),
    )
}

#[derive(Deserialize)]
pub struct AdminQuery {
    pub error: Option<String>,
}

/// Login view state for guests, the admin table for a signed-in admin.
#[derive(Serialize)]
pub struct AdminView {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Vec<Property>>,
}

pub async fn admin_view(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AdminQuery>,
) -> Result<Json<AdminView>, AppError> {
    if !auth::is_authenticated(&headers, &state.config) {
        return Ok(Json(AdminView {
            authenticated: false,
            error: query.error,
            properties: None,
        }));
    }

    let properties = state.repo.list().await?;
    Ok(Json(AdminView {
        authenticated: true,
        error: None,
        properties: Some(properties),
    }))
}

pub async fn list_properties(
    State(state): State<AppState>,
) -> Result<Json<Vec<Property>>, AppError> {
    let properties = state.repo.list().await?;
    info!("Loaded {} properties for admin", properties.len());
    Ok(Json(properties))
}

#[derive(Deserialize)]
pub struct SaveRequest {
    pub mode: String,
    pub id: Option<String>,
    pub payload: Option<Value>,
}

fn parse_id(id: Option<&str>) -> Result<Uuid, AppError> {
    match id.map(str::trim) {
        Some(id) if !id.is_empty() => {
            Uuid::parse_str(id).map_err(|_| AppError::BadRequest("Invalid id".into()))
        }
        _ => Err(AppError::BadRequest("Missing id".into())),
    }
}

fn parse_payload(payload: Option<Value>) -> Result<PropertyInput, AppError> {
    let payload = payload.ok_or_else(|| AppError::BadRequest("Missing payload".into()))?;
    serde_json::from_value(payload).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// Creates or updates one property.
pub async fn save_property(
    State(state): State<AppState>,
    Json(request): Json<SaveRequest>,
) -> Result<Json<Value>, AppError> {
    match request.mode.as_str() {
        "create" => {
            let mut input = parse_payload(request.payload)?;
            if input.slug.trim().is_empty() {
                input.slug = generate_slug();
            }
            let created = state.repo.insert(input.into_changes()?).await?;
            info!("Created property {} ({})", created.slug, created.id);
        }
        "update" => {
            let id = parse_id(request.id.as_deref())?;
            let changes = parse_payload(request.payload)?.into_changes()?;
            if state.repo.update(id, changes).await? {
                info!("Updated property {}", id);
            } else {
                warn!("Update matched no property with id {}", id);
            }
        }
        other => {
            warn!("Rejected save with mode {:?}", other);
            return Err(AppError::BadRequest("Invalid mode".into()));
        }
    }

    Ok(Json(json!({ "ok": true })))
}

#[derive(Deserialize)]
pub struct DeleteRequest {
    pub id: Option<String>,
}

pub async fn delete_property(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<Value>, AppError> {
    let id = parse_id(request.id.as_deref())?;
    if state.repo.delete(id).await? {
        info!("Deleted property {}", id);
    } else {
        warn!("Delete matched no property with id {}", id);
    }
    Ok(Json(json!({ "ok": true })))
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub urls: Vec<String>,
    pub failed: usize,
    /// Existing images followed by the new uploads.
    pub images: Vec<String>,
    pub images_field: String,
    pub banner: Option<&'static str>,
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::BadRequest(e.to_string())
}

/// Accepts a `slug` field, an optional `images` field with the current
/// list and any number of file parts.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut slug = String::new();
    let mut existing = String::new();
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "slug" => slug = field.text().await.map_err(multipart_error)?,
            "images" => existing = field.text().await.map_err(multipart_error)?,
            _ => {
                let Some(file_name) = field.file_name().map(str::to_string) else {
                    warn!("Ignoring multipart field {:?} without a file name", name);
                    continue;
                };
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                files.push(ImageFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
        }
    }

    let slug = slug.trim();
    if slug.is_empty() {
        return Err(AppError::BadRequest(
            "Fill in the slug before uploading images".into(),
        ));
    }

    info!("Uploading {} image(s) for {}", files.len(), slug);
    let report = storage::upload_images(state.storage.as_ref(), slug, files).await;

    let mut gallery = Gallery::parse(&existing);
    gallery.extend(report.urls.iter().cloned());

    Ok(Json(UploadResponse {
        banner: report.banner(),
        images_field: gallery.to_field(),
        images: gallery.into_vec(),
        urls: report.urls,
        failed: report.failed,
    }))
}

#[derive(Deserialize)]
pub struct GalleryEdit {
    pub images: ImagesField,
    pub action: GalleryAction,
    pub index: usize,
}

#[derive(Serialize)]
pub struct GalleryResponse {
    pub changed: bool,
    pub images: Vec<String>,
    pub images_field: String,
}

/// Reorders or removes one entry of the form's image list. Stored objects
/// are left untouched.
pub async fn edit_gallery(Json(edit): Json<GalleryEdit>) -> Json<GalleryResponse> {
    let mut gallery = match edit.images {
        ImagesField::List(list) => Gallery::from_urls(list),
        ImagesField::Text(text) => Gallery::parse(&text),
    };
    let changed = gallery.apply(edit.action, edit.index);

    Json(GalleryResponse {
        changed,
        images_field: gallery.to_field(),
        images: gallery.into_vec(),
    })
}
