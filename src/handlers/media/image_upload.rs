use actix_multipart::form::{tempfile::TempFile, MultipartForm};
use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::mime::Mime;
use actix_web::{web, HttpResponse};
use bytes::{Bytes, BytesMut};
use futures_util::TryStreamExt;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::media::UploadLimits;
use crate::middleware::auth::Claims;
use crate::models::common::ApiResponse;
use crate::models::error::AppError;
use crate::models::media::{ImageKind, MediaError, UploadResponse, UploadedFile};
use crate::services::media_host::MediaHost;

#[derive(Debug, MultipartForm)]
#[multipart(duplicate_field = "deny")]
pub struct SingleImageForm {
    pub image: Option<TempFile>,
}

/// An image that passed validation and is ready to store.
struct AcceptedImage {
    kind: ImageKind,
    data: Bytes,
}

#[tracing::instrument(name = "Upload image", skip(form, media_host, limits, claims), fields(caller = %claims.sub))]
pub async fn upload_image(
    MultipartForm(form): MultipartForm<SingleImageForm>,
    media_host: web::Data<dyn MediaHost>,
    limits: web::Data<UploadLimits>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, AppError> {
    let file = form
        .image
        .ok_or_else(|| AppError::Validation("An image file is required in field 'image'".to_string()))?;

    let accepted = validate_image(&file, &limits).await?;
    let stored = store_image(media_host.get_ref(), accepted).await?;

    tracing::info!("Stored image {} for {}", stored.key, claims.sub);
    Ok(HttpResponse::Created().json(UploadResponse { files: vec![stored] }))
}

/// Field names accepted by the multi-file upload. The second one is what
/// browsers send for `FormData.append("images[]", ..)`.
const MULTI_IMAGE_FIELDS: [&str; 2] = ["images", "images[]"];

/// Parts are read one at a time so the file count is enforced as soon as
/// one part too many starts, before any of its bytes are buffered.
#[tracing::instrument(name = "Upload images", skip(payload, media_host, limits, claims), fields(caller = %claims.sub))]
pub async fn upload_images(
    mut payload: Multipart,
    media_host: web::Data<dyn MediaHost>,
    limits: web::Data<UploadLimits>,
    claims: web::ReqData<Claims>,
) -> Result<HttpResponse, AppError> {
    // Nothing is stored unless every file is acceptable
    let mut accepted = Vec::new();

    while let Some(mut field) = payload.try_next().await.map_err(invalid_multipart)? {
        let is_image_field = field
            .content_disposition()
            .get_name()
            .map_or(false, |name| MULTI_IMAGE_FIELDS.contains(&name));
        if !is_image_field {
            continue;
        }

        if accepted.len() == limits.max_files {
            tracing::warn!("Rejecting upload from {}: more than {} files", claims.sub, limits.max_files);
            discard_remaining(field, payload, limits.drain_budget()).await;
            return Err(AppError::Validation(format!(
                "File limit exceeded: at most {} files per upload",
                limits.max_files
            )));
        }

        match read_image_field(&mut field, &limits).await {
            Ok(image) => accepted.push(image),
            Err(e) => {
                discard_remaining(field, payload, limits.drain_budget()).await;
                return Err(e);
            }
        }
    }

    if accepted.is_empty() {
        return Err(AppError::Validation(
            "At least one image file is required in field 'images'".to_string(),
        ));
    }

    let mut stored = Vec::with_capacity(accepted.len());
    for image in accepted {
        stored.push(store_image(media_host.get_ref(), image).await?);
    }

    tracing::info!("Stored {} images for {}", stored.len(), claims.sub);
    Ok(HttpResponse::Created().json(UploadResponse { files: stored }))
}

fn invalid_multipart(err: MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart upload: {}", err))
}

/// Type is checked from the part headers first, then the body is read with
/// the per-file cap applied chunk by chunk.
async fn read_image_field(field: &mut Field, limits: &UploadLimits) -> Result<AcceptedImage, AppError> {
    let kind = image_kind(
        field.content_type(),
        field.content_disposition().get_filename(),
    )?;

    let mut data = BytesMut::new();
    while let Some(chunk) = field.try_next().await.map_err(invalid_multipart)? {
        if data.len() + chunk.len() > limits.max_file_size {
            return Err(too_large(limits));
        }
        data.extend_from_slice(&chunk);
    }

    if data.is_empty() {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }

    Ok(AcceptedImage { kind, data: data.freeze() })
}

/// Consumes what is left of a rejected request without keeping it, so the
/// client receives the error instead of a reset connection. Gives up once
/// `budget` bytes have been skipped.
async fn discard_remaining(mut field: Field, mut payload: Multipart, budget: usize) {
    let mut skipped = 0usize;
    loop {
        while let Ok(Some(chunk)) = field.try_next().await {
            skipped += chunk.len();
            if skipped > budget {
                return;
            }
        }
        match payload.try_next().await {
            Ok(Some(next)) => field = next,
            _ => return,
        }
    }
}

async fn validate_image(file: &TempFile, limits: &UploadLimits) -> Result<AcceptedImage, AppError> {
    let kind = image_kind(file.content_type.as_ref(), file.file_name.as_deref())?;

    if file.size == 0 {
        return Err(AppError::Validation("Uploaded file is empty".to_string()));
    }
    if file.size > limits.max_file_size {
        return Err(too_large(limits));
    }

    let data = tokio::fs::read(file.file.path()).await.map_err(|e| {
        tracing::error!("Failed to read uploaded file: {}", e);
        AppError::Validation("Uploaded file could not be read".to_string())
    })?;

    Ok(AcceptedImage { kind, data: Bytes::from(data) })
}

fn image_kind(declared: Option<&Mime>, file_name: Option<&str>) -> Result<ImageKind, AppError> {
    let kind = match declared {
        Some(mime) => ImageKind::from_mime(mime.essence_str()),
        // No part header: fall back to the file name
        None => file_name
            .and_then(|name| name.rsplit_once('.'))
            .and_then(|(_, ext)| ImageKind::from_extension(ext)),
    };

    kind.ok_or_else(|| {
        AppError::Validation(format!(
            "Only JPEG, PNG, WEBP and GIF images are allowed (got {})",
            declared.map_or("unknown type", |mime| mime.essence_str())
        ))
    })
}

fn too_large(limits: &UploadLimits) -> AppError {
    AppError::Validation(format!(
        "File too large: maximum size is {} bytes",
        limits.max_file_size
    ))
}

async fn store_image(host: &dyn MediaHost, image: AcceptedImage) -> Result<UploadedFile, AppError> {
    let sha256 = format!("{:x}", Sha256::digest(&image.data));
    let key = format!("{}.{}", Uuid::new_v4(), image.kind.extension());
    let size = image.data.len() as u64;

    let url = host.put(&key, image.data, image.kind.mime()).await?;

    Ok(UploadedFile {
        url,
        key,
        size,
        content_type: image.kind.mime().to_string(),
        sha256,
    })
}

#[tracing::instrument(name = "Serve media", skip(media_host))]
pub async fn serve_media(
    path: web::Path<String>,
    media_host: web::Data<dyn MediaHost>,
) -> Result<HttpResponse, AppError> {
    let key = path.into_inner();

    match media_host.get(&key).await {
        Ok((data, content_type)) => Ok(HttpResponse::Ok().content_type(content_type).body(data)),
        Err(MediaError::NotFound(_)) | Err(MediaError::InvalidKey(_)) => Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_with_message("File not found", "NotFoundError"))),
        Err(e) => Err(e.into()),
    }
}
