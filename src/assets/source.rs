use std::{
    borrow::Cow,
    io::Cursor,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::foundation::error::{OverlayError, OverlayResult};

#[derive(Clone)]
enum SourceData {
    Bytes(Arc<[u8]>),
    File(PathBuf),
}

/// Named handle to encoded image data.
///
/// The handle is cheap to clone and is shared read-only across concurrent compositor calls.
/// File-backed sources are read lazily when the image is decoded, so IO failures surface as
/// [`OverlayError::Decode`] from the render that needed them.
#[derive(Clone)]
pub struct ImageSource {
    name: String,
    data: SourceData,
}

impl std::fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("ImageSource");
        s.field("name", &self.name);
        match &self.data {
            SourceData::Bytes(b) => s.field("bytes_len", &b.len()),
            SourceData::File(p) => s.field("path", p),
        };
        s.finish()
    }
}

impl ImageSource {
    /// Wrap in-memory encoded image bytes under a display name.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            data: SourceData::Bytes(bytes.into()),
        }
    }

    /// Reference an image file on disk. The display name is the file name without its extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name: display_name_from_filename(&file_name),
            data: SourceData::File(path),
        }
    }

    /// Display name used for result tagging and archive entry names.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Backing file path, for file-backed sources.
    pub fn path(&self) -> Option<&Path> {
        match &self.data {
            SourceData::File(p) => Some(p),
            SourceData::Bytes(_) => None,
        }
    }

    /// Read the intrinsic pixel size from the image header without decoding pixels.
    pub fn probe_dimensions(&self) -> OverlayResult<(u32, u32)> {
        let bytes = self.load_bytes()?;
        self.probe_loaded(&bytes)
    }

    /// Header probe over bytes already returned by `load_bytes`.
    pub(crate) fn probe_loaded(&self, bytes: &[u8]) -> OverlayResult<(u32, u32)> {
        image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| OverlayError::decode(format!("'{}': {e}", self.name)))?
            .into_dimensions()
            .map_err(|e| OverlayError::decode(format!("'{}': {e}", self.name)))
    }

    pub(crate) fn load_bytes(&self) -> OverlayResult<Cow<'_, [u8]>> {
        match &self.data {
            SourceData::Bytes(b) => Ok(Cow::Borrowed(&b[..])),
            SourceData::File(p) => std::fs::read(p).map(Cow::Owned).map_err(|e| {
                OverlayError::decode(format!("failed to read '{}': {e}", p.display()))
            }),
        }
    }
}

/// Strip a trailing file extension from `file_name`.
///
/// Only the last `.ext` segment is removed, and only when it is non-empty:
/// `"sofa.v2.jpg"` becomes `"sofa.v2"`, while `"noext"` and `"trailing."` are returned unchanged.
pub fn display_name_from_filename(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(dot) => {
            let ext = &file_name[dot + 1..];
            if ext.is_empty() || ext.contains('/') {
                file_name.to_string()
            } else {
                file_name[..dot].to_string()
            }
        }
        None => file_name.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
