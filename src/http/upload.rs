//! Multipart product forms and image storage.

use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use axum::{body::Bytes, extract::Multipart};
use chrono::Utc;
use tracing::{info, warn};

use crate::error::AppError;

pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];
pub const UPLOAD_URL_PREFIX: &str = "/static/uploads";

/// Extension after the last `.`, compared case-insensitively.
pub fn allowed_file(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ALLOWED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Strip directories and keep only `[A-Za-z0-9._-]`.
pub fn secure_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| match c {
            c if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' => c,
            _ => '_',
        })
        .collect();
    let trimmed = cleaned.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Write the image under `dir` and return its public URL.
pub async fn store_image(dir: &Path, filename: &str, data: &[u8]) -> Result<String, AppError> {
    let now = Utc::now();
    let stored = format!("{}.{:06}_{}", now.timestamp(), now.timestamp_subsec_micros(), secure_filename(filename));

    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(dir.join(&stored), data).await?;
    info!(file = %stored, bytes = data.len(), "Stored product image");

    Ok(format!("{UPLOAD_URL_PREFIX}/{stored}"))
}

/// Remove an image written by [`store_image`]. Failures are only logged.
pub async fn discard_image(dir: &Path, url: &str) {
    let Some(stored) = url.strip_prefix(UPLOAD_URL_PREFIX).map(|name| name.trim_start_matches('/')) else {
        return;
    };
    if let Err(e) = tokio::fs::remove_file(dir.join(stored)).await {
        warn!(file = %stored, error = %e, "Failed to remove unused image");
    }
}

/// An accepted upload held in memory until the request is known to succeed.
#[derive(Debug)]
pub struct PendingImage {
    filename: String,
    data: Bytes,
}

/// Text fields of a product form plus an accepted, not yet stored, upload.
#[derive(Debug, Default)]
pub struct ProductForm {
    fields: HashMap<String, String>,
    image: Option<PendingImage>,
}

impl ProductForm {
    /// Nothing touches the disk here; see [`ProductForm::store_image`].
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = ProductForm::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if name == "image" {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                if filename.is_empty() {
                    continue;
                }
                if !allowed_file(&filename) {
                    warn!(%filename, "Ignoring upload with disallowed extension");
                    continue;
                }
                form.image = Some(PendingImage { filename, data });
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Trimmed value of a field; blank counts as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|v| v.trim()).filter(|v| !v.is_empty())
    }

    /// Whether the field was sent at all, blank or not.
    pub fn submitted(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn parse<T: FromStr>(&self, name: &str) -> Result<Option<T>, AppError> {
        self.text(name)
            .map(|value| {
                value
                    .parse()
                    .map_err(|_| AppError::bad_request(format!("invalid {name}: {value}")))
            })
            .transpose()
    }

    /// Write the accepted upload, if any, and return its URL.
    pub async fn store_image(&self, dir: &Path) -> Result<Option<String>, AppError> {
        match &self.image {
            Some(image) => Ok(Some(store_image(dir, &image.filename, &image.data).await?)),
            None => Ok(None),
        }
    }

    /// The stored upload first, then a non-empty `image_url` field.
    pub fn image_url(&self, stored: Option<&str>) -> Option<String> {
        stored
            .or_else(|| self.text("image_url"))
            .map(str::to_string)
    }

    #[cfg(test)]
    pub fn with_fields(pairs: &[(&str, &str)]) -> Self {
        Self {
            fields: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            image: None,
        }
    }
}
