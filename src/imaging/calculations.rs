//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate the dimensions of an image scaled to fit inside a bounding box.
///
/// The aspect ratio is preserved and images already inside the box are left
/// at their original size (never upscaled). Neither edge drops below 1px.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `bounds` - Bounding box (max width, max height)
///
/// # Examples
/// ```
/// # use postbake::imaging::calculate_fit_dimensions;
/// // 1600x1200 into 400x400 → 400x300
/// assert_eq!(calculate_fit_dimensions((1600, 1200), (400, 400)), (400, 300));
///
/// // Already small enough → unchanged
/// assert_eq!(calculate_fit_dimensions((200, 100), (400, 400)), (200, 100));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    if src_w == 0 || src_h == 0 || (src_w <= max_w && src_h <= max_h) {
        return source;
    }

    let scale = f64::min(max_w as f64 / src_w as f64, max_h as f64 / src_h as f64);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, max_w.max(1));
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, max_h.max(1));
    (w, h)
}
