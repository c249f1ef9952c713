use crate::ingest::Upload;
use crate::pages;
use crate::state::AppState;

use axum::response::{Html, Redirect};
use axum::{
    Json,
    extract::{Multipart, Path, Query, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use snapcode_core::prelude::*;

pub struct ApiError(anyhow::Error);

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

fn storage_status(err: &StorageError) -> (StatusCode, String) {
    match err {
        StorageError::NotFound(_) => (StatusCode::NOT_FOUND, "File not found".to_string()),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.0
            .downcast_ref::<IngestError>()
            .map(|ingest_err| match ingest_err {
                IngestError::InvalidAsset(msg) => {
                    (StatusCode::BAD_REQUEST, format!("Invalid file: {msg}"))
                }
                IngestError::Storage(storage_err) => storage_status(storage_err),
                _ => (StatusCode::INTERNAL_SERVER_ERROR, ingest_err.to_string()),
            })
            .or_else(|| self.0.downcast_ref::<StorageError>().map(storage_status))
            .or_else(|| {
                self.0
                    .downcast_ref::<MultipartError>()
                    .map(|e| (e.status(), format!("Invalid upload: {}", e.body_text())))
            })
            .unwrap_or_else(|| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal Server Error: {}", self.0),
                )
            })
            .into_response()
    }
}

/// Reads the `file` and optional `email` fields of an upload form.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, ApiError> {
    let mut file = None;
    let mut email = None;
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                file = Some((filename, data));
            }
            Some("email") => email = Some(field.text().await?),
            _ => {}
        }
    }

    let (filename, data) =
        file.ok_or_else(|| IngestError::InvalidAsset("No file uploaded".to_string()))?;
    Ok(Upload {
        filename,
        data,
        email,
    })
}

/// GET /
pub async fn index() -> Redirect {
    Redirect::to("/gallery")
}

/// POST /upload
/// Multipart form with `file` and optional `email`. Redirects to the code page.
pub async fn upload<S: AssetStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let upload = read_upload(multipart).await?;
    let receipt = state.ingestor.ingest(upload).await?;

    Ok(Redirect::to(&format!(
        "/qr/{}/{}",
        receipt.asset, receipt.code
    )))
}

/// POST /api/assets
/// Same form as `/upload`, answers with the receipt as JSON.
pub async fn upload_json<S: AssetStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let upload = read_upload(multipart).await?;
    let receipt = state.ingestor.ingest(upload).await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

fn file_response(name: &str, data: bytes::Bytes) -> Response {
    let mime = mime_guess::from_path(name).first_or_octet_stream();
    ([(header::CONTENT_TYPE, mime.to_string())], data).into_response()
}

/// GET /download/{filename}
pub async fn download_asset<S: AssetStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let data = state.ingestor.assets().read(&filename).await?;
    Ok(file_response(&filename, data))
}

/// GET /qrcodes/{filename}
pub async fn download_code<S: AssetStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let data = state.ingestor.codes().read(&filename).await?;
    Ok(file_response(&filename, data))
}

/// GET /qr/{filename}/{qr_file}
pub async fn show_code<S: AssetStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    Path((filename, qr_file)): Path<(String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.ingestor.assets().exists(&filename).await?
        || !state.ingestor.codes().exists(&qr_file).await?
    {
        return Err(StorageError::NotFound(format!("{filename}, {qr_file}")).into());
    }

    let url = snapcode_imaging::locator_url(state.ingestor.public_url(), &filename);
    Ok(Html(pages::show_code(&filename, &qr_file, &url).into_string()))
}

#[derive(serde::Deserialize)]
pub struct GalleryParams {
    #[serde(default)]
    search: String,
}

/// GET /gallery
pub async fn gallery<S: AssetStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    Query(params): Query<GalleryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let files = state.ingestor.gallery(&params.search).await?;
    Ok(Html(pages::gallery(&files, &params.search).into_string()))
}

/// GET /api/gallery
pub async fn gallery_json<S: AssetStore, N: Notifier>(
    State(state): State<AppState<S, N>>,
    Query(params): Query<GalleryParams>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.ingestor.gallery(&params.search).await?))
}
