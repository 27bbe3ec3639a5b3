use crate::envelope;
use crate::errors::{ApiError, ServiceError, ServiceResult};
use crate::models::UploadReceipt;
use crate::state::ApiContext;
use reqwest::multipart::{Form, Part};
use std::path::Path;
use tracing::info;

/// Largest CSV the backend accepts.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

const UPLOAD_PATH: &str = "/upload-csv";

/// Client onboarding: pushes sales CSV exports to the backend.
pub struct UploadService<'a> {
    ctx: &'a ApiContext,
}

impl<'a> UploadService<'a> {
    pub fn new(ctx: &'a ApiContext) -> Self {
        Self { ctx }
    }

    /// Uploads `contents` as `file_name`. With `replace_data` the backend
    /// drops the previous dataset first. Not retried.
    pub async fn upload_csv(
        &self,
        file_name: &str,
        contents: Vec<u8>,
        replace_data: bool,
    ) -> ServiceResult<UploadReceipt> {
        let file_name = file_name.trim();
        validate_csv(file_name, contents.len() as u64)?;

        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/csv")
            .map_err(|err| ServiceError::from(ApiError::from(err)))?;
        let form = Form::new().part("file", part);
        let body = self
            .ctx
            .authed_multipart(
                UPLOAD_PATH,
                &[("replace_data", replace_data.to_string())],
                form,
            )
            .await?;

        let value = body.into_value();
        envelope::ensure_success(&value)?;
        let receipt: UploadReceipt =
            serde_json::from_value(value).map_err(|err| ServiceError::Decode(err.to_string()))?;
        info!(
            "uploaded {file_name}: {} rows saved, {} row errors",
            receipt.details.saved_rows, receipt.details.errors_count
        );
        Ok(receipt)
    }

    /// Reads the file at `path` and uploads it under its own file name. The
    /// size is checked before the file is read.
    pub async fn upload_file(
        &self,
        path: &Path,
        replace_data: bool,
    ) -> ServiceResult<UploadReceipt> {
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
            .to_string();
        let metadata = tokio::fs::metadata(path).await.map_err(|err| {
            ServiceError::validation(format!("cannot read {}: {err}", path.display()))
        })?;
        validate_csv(&file_name, metadata.len())?;

        let contents = tokio::fs::read(path).await.map_err(|err| {
            ServiceError::validation(format!("cannot read {}: {err}", path.display()))
        })?;
        self.upload_csv(&file_name, contents, replace_data).await
    }
}

/// Local checks run before any bytes leave the machine.
pub fn validate_csv(file_name: &str, size: u64) -> ServiceResult<()> {
    if !file_name.to_lowercase().ends_with(".csv") {
        return Err(ServiceError::validation("file must be a CSV (.csv)"));
    }
    if size == 0 {
        return Err(ServiceError::validation("file is empty"));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ServiceError::validation(format!(
            "file is too large: {size} bytes, max {MAX_UPLOAD_BYTES}"
        )));
    }
    Ok(())
}
