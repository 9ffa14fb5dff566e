use std::path::{Path, PathBuf};

use axum_typed_multipart::FieldData;
use tempfile::NamedTempFile;
use ulid::Ulid;

use crate::{error::Error, types::StorageContext};

const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

fn extension_of(file_name: Option<&str>) -> Result<String, Error> {
    let extension = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .ok_or_else(|| Error::InvalidArgument(String::from("Uploaded file has no extension")))?;

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(Error::InvalidArgument(format!(
            "Unsupported image type: .{}",
            extension
        )));
    }

    Ok(extension)
}

/// Moves an uploaded image into `<uploads_dir>/<folder>/` under a fresh ULID
/// name and returns the public path it is served from.
pub async fn persist_image(
    storage: &StorageContext,
    folder: &str,
    file: FieldData<NamedTempFile>,
) -> Result<String, Error> {
    let extension = extension_of(file.metadata.file_name.as_deref())?;
    let file_name = format!("{}.{}", Ulid::new(), extension);
    let directory = PathBuf::from(&storage.uploads_dir).join(folder);

    tokio::fs::create_dir_all(&directory).await.map_err(|err| {
        tracing::error!("Failed to create upload directory {:?}: {}", directory, err);
        Error::Internal(String::from("Failed to store uploaded file"))
    })?;

    let destination = directory.join(&file_name);
    if let Err(err) = file.contents.persist(&destination) {
        // rename fails across filesystems; fall back to copying
        tokio::fs::copy(err.file.path(), &destination)
            .await
            .map_err(|copy_err| {
                tracing::error!(
                    "Failed to persist upload to {:?}: {} / {}",
                    destination,
                    err.error,
                    copy_err
                );
                Error::Internal(String::from("Failed to store uploaded file"))
            })?;
    }

    Ok(format!("/uploads/{}/{}", folder, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_known_image_extensions() {
        assert_eq!(extension_of(Some("pizza.JPG")).unwrap(), "jpg");
        assert_eq!(extension_of(Some("dir/burger.webp")).unwrap(), "webp");
    }

    #[test]
    fn rejects_other_files() {
        assert!(matches!(
            extension_of(Some("notes.txt")),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(extension_of(None), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            extension_of(Some("noext")),
            Err(Error::InvalidArgument(_))
        ));
    }
}
