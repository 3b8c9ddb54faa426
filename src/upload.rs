use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use futures_util::StreamExt;
use log::{error, info};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct DeleteUploadRequest {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// Unique name for a stored upload: epoch millis plus a short random
/// fragment, original extension preserved.
pub fn unique_filename(original: &str, now_millis: i64, fragment: &str) -> String {
    match Path::new(original).extension().and_then(|e| e.to_str()) {
        Some(ext) if !ext.is_empty() => format!("{}_{}.{}", now_millis, fragment, ext),
        _ => format!("{}_{}", now_millis, fragment),
    }
}

/// Extract the bare stored filename from a client-supplied `/uploads/...`
/// path. `None` for anything outside the uploads prefix or containing path
/// separators or parent references.
pub fn upload_basename(image_url: &str) -> Option<&str> {
    let name = image_url.strip_prefix("/uploads/")?;
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.contains("..") {
        return None;
    }
    Some(name)
}

/// POST /upload — stores the first file field of the multipart body under the
/// upload directory and answers the public path.
pub async fn upload_file(data: web::Data<AppState>, mut payload: Multipart) -> impl Responder {
    while let Some(item) = payload.next().await {
        let mut field = match item {
            Ok(field) => field,
            Err(e) => {
                error!("Malformed multipart payload: {}", e);
                return HttpResponse::BadRequest().body("Malformed multipart payload");
            }
        };

        let original = match field
            .content_disposition()
            .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
        {
            Some(name) => name,
            // Not a file part; keep scanning for one.
            None => continue,
        };

        let fragment = Uuid::new_v4().simple().to_string();
        let stored = unique_filename(&original, Utc::now().timestamp_millis(), &fragment[..8]);
        let dest = Path::new(&data.config.upload_dir).join(&stored);

        let mut file = match File::create(&dest) {
            Ok(file) => file,
            Err(e) => {
                error!("Error creating upload file {:?}: {}", dest, e);
                return HttpResponse::InternalServerError().body("Error storing file");
            }
        };

        while let Some(chunk) = field.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    error!("Error reading upload stream: {}", e);
                    return HttpResponse::InternalServerError().body("Error storing file");
                }
            };
            if let Err(e) = file.write_all(&chunk) {
                error!("Error writing upload file {:?}: {}", dest, e);
                return HttpResponse::InternalServerError().body("Error storing file");
            }
        }

        info!("Stored upload {} as {}", original, stored);
        return HttpResponse::Ok().json(json!({ "filePath": format!("/uploads/{}", stored) }));
    }

    HttpResponse::BadRequest().body("No file provided")
}

/// DELETE /delete — removes a previously uploaded file by its public path.
/// Removal failures all answer the same way; the cause is only logged.
pub async fn delete_upload(
    data: web::Data<AppState>,
    payload: web::Json<DeleteUploadRequest>,
) -> impl Responder {
    let name = match upload_basename(&payload.image_url) {
        Some(name) => name,
        None => return HttpResponse::BadRequest().body("Invalid upload path"),
    };
    let target = Path::new(&data.config.upload_dir).join(name);
    match fs::remove_file(&target) {
        Ok(()) => HttpResponse::Ok().json(json!({ "deleted": name })),
        Err(e) => {
            error!("Could not remove upload {:?}: {}", target, e);
            HttpResponse::NotFound().body("Could not delete file")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_keeps_extension() {
        assert_eq!(
            unique_filename("photo.JPG", 1700000000000, "abcd1234"),
            "1700000000000_abcd1234.JPG"
        );
    }

    #[test]
    fn filename_without_extension() {
        assert_eq!(
            unique_filename("rawblob", 1700000000000, "abcd1234"),
            "1700000000000_abcd1234"
        );
    }

    #[test]
    fn basename_accepts_plain_upload_paths() {
        assert_eq!(
            upload_basename("/uploads/1700_ab.png"),
            Some("1700_ab.png")
        );
    }

    #[test]
    fn basename_rejects_traversal_and_foreign_paths() {
        assert!(upload_basename("/uploads/../etc/passwd").is_none());
        assert!(upload_basename("/uploads/a/b.png").is_none());
        assert!(upload_basename("/etc/passwd").is_none());
        assert!(upload_basename("/uploads/").is_none());
    }
}
