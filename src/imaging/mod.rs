//! Image processing for post photo galleries, in pure Rust.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Thumbnail** | `image` decode → fit into bounding box → Lanczos3 resize → encode |
//! | **Freshness** | source vs. thumbnail mtime |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend};
pub use calculations::calculate_fit_dimensions;
pub use operations::{ThumbnailConfig, ThumbnailStatus, ensure_thumbnail};
pub use params::{Quality, ThumbnailParams};
pub use rust_backend::{RustBackend, supported_input_extensions};
