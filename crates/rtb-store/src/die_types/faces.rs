//! Turning persisted face references into faces.

use std::path::{Path, PathBuf};

use rtb_core::Face;

use crate::error::{StoreError, StoreResult};

/// Resolves a custom face reference to something that can be shown.
pub trait FaceLoader {
    /// Load the face stored under `reference`.
    fn load_face(&self, reference: &str) -> StoreResult<Face>;
}

/// Accepts every reference as-is. Used where images are never decoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceFaceLoader;

impl FaceLoader for ReferenceFaceLoader {
    fn load_face(&self, reference: &str) -> StoreResult<Face> {
        Ok(Face::Image(reference.to_string()))
    }
}

/// Treats references as image file paths, relative to a base directory.
#[derive(Debug, Clone)]
pub struct FileFaceLoader {
    base: PathBuf,
}

impl FileFaceLoader {
    /// Resolve relative references against `base`.
    pub fn new(base: impl AsRef<Path>) -> Self {
        Self {
            base: base.as_ref().to_path_buf(),
        }
    }
}

impl FaceLoader for FileFaceLoader {
    fn load_face(&self, reference: &str) -> StoreResult<Face> {
        let path = self.base.join(reference);
        if !path.is_file() {
            return Err(StoreError::NotFound(format!(
                "face image {}",
                path.display()
            )));
        }
        Ok(Face::Image(path.display().to_string()))
    }
}
