use crate::api::error::AppError;
use crate::utils::validation::{validate_file_size, validate_mime_type};
use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Result of a successful file placement.
#[derive(Debug, Clone)]
pub struct PlacedFile {
    /// Generated storage name, unique within the patient directory
    pub filename: String,
    /// Full path the bytes were written to
    pub path: PathBuf,
    /// Byte count actually written
    pub size: usize,
    /// Normalized MIME type (parameters stripped, lowercased)
    pub mime_type: String,
}

#[async_trait]
pub trait AttachmentStorage: Send + Sync {
    /// Validates an uploaded file (type first, then size) and writes it
    /// under the patient's directory in a single whole-buffer write.
    async fn place(
        &self,
        patient_id: i32,
        original_name: &str,
        mime_type: &str,
        declared_size: usize,
        data: &[u8],
    ) -> Result<PlacedFile, AppError>;

    /// Reads a stored file back. A missing file surfaces as NotFound even
    /// while metadata for it still exists.
    async fn read(&self, path: &str) -> Result<Vec<u8>, AppError>;

    /// Removes a stored file. A file that is already absent is logged and
    /// treated as success so metadata deletion can proceed regardless.
    async fn remove(&self, path: &str) -> Result<(), AppError>;
}

/// Filesystem-backed attachment storage, partitioned per patient id under
/// `<root>/patients/<id>/`.
pub struct LocalStorage {
    root: PathBuf,
    max_file_size: usize,
}

impl LocalStorage {
    pub fn new(root: PathBuf, max_file_size: usize) -> Self {
        Self {
            root,
            max_file_size,
        }
    }

    fn patient_dir(&self, patient_id: i32) -> PathBuf {
        self.root.join("patients").join(patient_id.to_string())
    }
}

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// `<millisecond timestamp>-<random base-36 token>` with the original
/// extension preserved. Collision-resistant without a transactional
/// sequence: two uploads in the same millisecond still differ in token.
fn generate_filename(original_name: &str) -> String {
    let timestamp = Utc::now().timestamp_millis();
    let token: String = {
        let mut rng = rand::thread_rng();
        (0..11)
            .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
            .collect()
    };

    match Path::new(original_name).extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{timestamp}-{token}.{ext}"),
        None => format!("{timestamp}-{token}"),
    }
}

#[async_trait]
impl AttachmentStorage for LocalStorage {
    async fn place(
        &self,
        patient_id: i32,
        original_name: &str,
        mime_type: &str,
        declared_size: usize,
        data: &[u8],
    ) -> Result<PlacedFile, AppError> {
        // Declared type and size are what get checked, in this order.
        let mime_type = validate_mime_type(mime_type)?;
        validate_file_size(declared_size, self.max_file_size)?;

        let dir = self.patient_dir(patient_id);
        tokio::fs::create_dir_all(&dir).await?;

        let filename = generate_filename(original_name);
        let path = dir.join(&filename);
        tokio::fs::write(&path, data).await?;

        Ok(PlacedFile {
            filename,
            path,
            size: data.len(),
            mime_type,
        })
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>, AppError> {
        match tokio::fs::read(path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(AppError::NotFound(
                "File not found on storage".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, path: &str) -> Result<(), AppError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("File already absent during delete: {}", path);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
