use std::path::Path;

use mime_guess::MimeGuess;

use crate::error::ClientError;
use crate::error::Result;

/// One file ready to be sent as a multipart part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its content type from the extension.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ClientError::io(path, source))?;
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| "upload".to_string());
        let content_type = MimeGuess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }
}

/// Files picked through one named file input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachmentGroup {
    pub field_name: String,
    pub files: Vec<Attachment>,
}

impl AttachmentGroup {
    pub fn new(field_name: impl Into<String>, files: Vec<Attachment>) -> Self {
        Self {
            field_name: field_name.into(),
            files,
        }
    }

    pub async fn from_paths<P: AsRef<Path>>(
        field_name: impl Into<String>,
        paths: &[P],
    ) -> Result<Self> {
        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            files.push(Attachment::from_path(path.as_ref()).await?);
        }
        Ok(Self::new(field_name, files))
    }

    /// Pair every file with the form key it is sent under.
    pub fn keyed(&self) -> impl Iterator<Item = (String, &Attachment)> {
        field_keys(&self.field_name, self.files.len())
            .into_iter()
            .zip(self.files.iter())
    }

    /// Like [`AttachmentGroup::keyed`], but hands out the files themselves.
    pub fn into_keyed(self) -> impl Iterator<Item = (String, Attachment)> {
        field_keys(&self.field_name, self.files.len())
            .into_iter()
            .zip(self.files)
    }
}

/// Form keys for `count` files under `field_name`: the first file keeps the
/// plain name, later ones get `-1`, `-2`, ... appended.
pub fn field_keys(field_name: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            if i == 0 {
                field_name.to_string()
            } else {
                format!("{field_name}-{i}")
            }
        })
        .collect()
}
