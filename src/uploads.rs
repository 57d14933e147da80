//! Local-disk storage for profile photos and store banners.

use std::path::{Path, PathBuf};

use actix_multipart::Multipart;
use anyhow::{Context, Result};
use futures_util::StreamExt;

use crate::error::{ApiError, ApiResult};

/// Kind of image being stored; decides the file-name suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Foto,
    Banner,
}

/// A file part received from a multipart form.
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// `user_{id}.{ext}` or `user_{id}_banner.{ext}`.
pub fn stored_name(usuario_id: i32, slot: Slot, original: &str) -> String {
    let ext = extension(original);
    match slot {
        Slot::Foto => format!("user_{usuario_id}.{ext}"),
        Slot::Banner => format!("user_{usuario_id}_banner.{ext}"),
    }
}

/// Lower-cased alphanumeric extension of `name`; `bin` when there is none.
fn extension(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "bin".into())
}

/// Largest accepted image upload.
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

fn append_limited(bytes: &mut Vec<u8>, chunk: &[u8], limit: usize) -> ApiResult<()> {
    if bytes.len() + chunk.len() > limit {
        return Err(ApiError::bad_request(format!(
            "Arquivo excede o limite de {} MB",
            limit / (1024 * 1024)
        )));
    }
    bytes.extend_from_slice(chunk);
    Ok(())
}

/// Pulls the `file` part out of a multipart body. `None` if the form had no file.
pub async fn read_file_field(mut payload: Multipart) -> ApiResult<Option<UploadedFile>> {
    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| ApiError::bad_request(format!("multipart inválido: {e}")))?;

        let filename = field
            .content_disposition()
            .filter(|cd| cd.get_name() == Some("file"))
            .and_then(|cd| cd.get_filename().map(String::from));

        let Some(filename) = filename else {
            // Drain unrelated parts.
            while let Some(chunk) = field.next().await {
                chunk.map_err(|e| ApiError::bad_request(format!("multipart inválido: {e}")))?;
            }
            continue;
        };

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let data = chunk.map_err(|e| ApiError::bad_request(format!("multipart inválido: {e}")))?;
            append_limited(&mut bytes, &data, MAX_UPLOAD_BYTES)?;
        }
        return Ok(Some(UploadedFile { filename, bytes }));
    }
    Ok(None)
}

/// Writes `file` into `dir` under its stored name, overwriting any previous upload.
pub async fn store(dir: &Path, usuario_id: i32, slot: Slot, file: &UploadedFile) -> Result<String> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating upload dir {}", dir.display()))?;

    let name = stored_name(usuario_id, slot, &file.filename);
    let path: PathBuf = dir.join(&name);
    tokio::fs::write(&path, &file.bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))?;

    log::info!("stored upload {} ({} bytes)", path.display(), file.bytes.len());
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uploads_over_the_limit_are_bad_requests() {
        let mut bytes = Vec::new();
        append_limited(&mut bytes, &vec![0u8; 600 * 1024], MAX_UPLOAD_BYTES).unwrap();
        assert!(append_limited(&mut bytes, &vec![0u8; 400 * 1024], 1024 * 1024).is_ok());
        assert_eq!(bytes.len(), 1000 * 1024);
        assert!(matches!(
            append_limited(&mut bytes, &vec![0u8; 100 * 1024], 1024 * 1024),
            Err(ApiError::BadRequest(_))
        ));
        assert_eq!(bytes.len(), 1000 * 1024);
    }

    #[test]
    fn names_are_keyed_by_user() {
        assert_eq!(stored_name(4, Slot::Foto, "me.PNG"), "user_4.png");
        assert_eq!(stored_name(4, Slot::Banner, "shop.banner.jpg"), "user_4_banner.jpg");
    }

    #[test]
    fn unsafe_or_missing_extensions_fall_back() {
        assert_eq!(stored_name(1, Slot::Foto, "noext"), "user_1.bin");
        assert_eq!(stored_name(1, Slot::Foto, "evil./../x"), "user_1.bin");
    }

    #[tokio::test]
    async fn store_overwrites_previous_upload() {
        let dir = std::env::temp_dir().join(format!("topdecked-uploads-{}", std::process::id()));
        let first = UploadedFile {
            filename: "a.png".into(),
            bytes: b"one".to_vec(),
        };
        let second = UploadedFile {
            filename: "b.png".into(),
            bytes: b"two".to_vec(),
        };

        let n1 = store(&dir, 9, Slot::Foto, &first).await.unwrap();
        let n2 = store(&dir, 9, Slot::Foto, &second).await.unwrap();
        assert_eq!(n1, n2);
        assert_eq!(std::fs::read(dir.join(&n2)).unwrap(), b"two");

        std::fs::remove_dir_all(&dir).ok();
    }
}
