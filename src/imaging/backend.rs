//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the resize delegate of the build: the rest of
//! the crate only ever asks it for thumbnails. The production
//! implementation is [`RustBackend`](super::rust_backend::RustBackend).

use super::params::ThumbnailParams;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    /// The source image could not be opened or read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Decoding, encoding or writing the thumbnail failed.
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Write an aspect-preserving thumbnail fitted into the params' bounding box.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::cell::RefCell;

    /// Mock backend that records operations without executing them.
    ///
    /// Thumbnails are "written" as a small placeholder file so the gallery's
    /// freshness checks see a real output on disk.
    #[derive(Default)]
    pub struct MockBackend {
        pub operations: RefCell<Vec<RecordedThumbnail>>,
        pub fail_thumbnails: bool,
        /// Source filenames that fail to open, as if permission were denied.
        pub unreadable: Vec<String>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedThumbnail {
        pub source: String,
        pub output: String,
        pub max_width: u32,
        pub max_height: u32,
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                fail_thumbnails: true,
                ..Self::default()
            }
        }

        pub fn unreadable(filenames: &[&str]) -> Self {
            Self {
                unreadable: filenames.iter().map(|f| f.to_string()).collect(),
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedThumbnail> {
            self.operations.borrow().clone()
        }

        pub fn thumbnail_count(&self) -> usize {
            self.operations.borrow().len()
        }
    }

    impl ImageBackend for MockBackend {
        fn thumbnail(&self, params: &ThumbnailParams) -> Result<(), BackendError> {
            self.operations.borrow_mut().push(RecordedThumbnail {
                source: params.source.to_string_lossy().to_string(),
                output: params.output.to_string_lossy().to_string(),
                max_width: params.max_width,
                max_height: params.max_height,
            });
            let name = params.source.file_name().and_then(|n| n.to_str());
            if name.is_some_and(|n| self.unreadable.iter().any(|u| u == n)) {
                return Err(BackendError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "permission denied",
                )));
            }
            if self.fail_thumbnails {
                return Err(BackendError::ProcessingFailed("mock failure".to_string()));
            }
            std::fs::write(&params.output, b"thumb")?;
            Ok(())
        }
    }

    #[test]
    fn mock_records_thumbnail_and_writes_placeholder() {
        let tmp = tempfile::TempDir::new().unwrap();
        let output = tmp.path().join("thumb.jpg");
        let backend = MockBackend::new();

        backend
            .thumbnail(&ThumbnailParams {
                source: "/source.jpg".into(),
                output: output.clone(),
                max_width: 400,
                max_height: 400,
                quality: super::super::params::Quality::default(),
            })
            .unwrap();

        assert!(output.exists());
        assert_eq!(backend.thumbnail_count(), 1);
        let op = &backend.get_operations()[0];
        assert_eq!(op.source, "/source.jpg");
        assert_eq!((op.max_width, op.max_height), (400, 400));
    }
}
