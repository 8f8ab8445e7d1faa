//! Output dimension resolution.
//!
//! All functions here are pure and testable without any I/O or images.

/// Compute the final output dimensions for one image.
///
/// - No target: the original size.
/// - Both targets with `keep_aspect_ratio == false`: the targets verbatim.
/// - A target width (alone, or with the aspect lock on): height follows the
///   source ratio. Width wins when both are given with the lock on.
/// - Only a target height: width follows the source ratio.
///
/// Each axis is clamped to at least 1. Inputs are expected to be positive.
///
/// ```
/// # use recast_core::pipeline::dimensions::resolve;
/// assert_eq!(resolve(800, 600, Some(400), None, true), (400, 300));
/// assert_eq!(resolve(800, 600, Some(400), Some(100), false), (400, 100));
/// ```
pub fn resolve(
    original_width: u32,
    original_height: u32,
    target_width: Option<u32>,
    target_height: Option<u32>,
    keep_aspect_ratio: bool,
) -> (u32, u32) {
    let (width, height) = match (target_width, target_height) {
        (None, None) => return (original_width, original_height),
        (Some(w), Some(h)) if !keep_aspect_ratio => (w, h),
        (Some(w), _) => (w, scale(w, original_height, original_width)),
        (None, Some(h)) => (scale(h, original_width, original_height), h),
    };
    (width.max(1), height.max(1))
}

/// `round(value * numerator / denominator)` in floating point.
fn scale(value: u32, numerator: u32, denominator: u32) -> u32 {
    (value as f64 * numerator as f64 / denominator as f64).round() as u32
}

/// Width/height input pair with an aspect-ratio lock.
///
/// Holds the raw text of both fields and keeps them in sync the way a resize
/// form does: with the lock on, editing one field rewrites the other from the
/// source ratio. [`ResizeFields::targets`] turns the text into request values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeFields {
    pub width: String,
    pub height: String,
    pub keep_aspect_ratio: bool,
}

impl Default for ResizeFields {
    fn default() -> Self {
        Self {
            width: String::new(),
            height: String::new(),
            keep_aspect_ratio: true,
        }
    }
}

impl ResizeFields {
    /// The width field changed. `original` is the reference image's size.
    pub fn edit_width(&mut self, raw: &str, original: (u32, u32)) {
        self.width = raw.to_string();
        if !self.keep_aspect_ratio {
            return;
        }
        match parse_positive(raw) {
            Some(w) => self.height = scale(w, original.1, original.0).to_string(),
            None if raw.is_empty() => self.height.clear(),
            None => {}
        }
    }

    /// The height field changed.
    pub fn edit_height(&mut self, raw: &str, original: (u32, u32)) {
        self.height = raw.to_string();
        if !self.keep_aspect_ratio {
            return;
        }
        match parse_positive(raw) {
            Some(h) => self.width = scale(h, original.0, original.1).to_string(),
            None if raw.is_empty() => self.width.clear(),
            None => {}
        }
    }

    /// The lock was toggled. Turning it on re-derives height from width, or
    /// width from height when width is not set.
    pub fn set_keep_aspect_ratio(&mut self, keep: bool, original: (u32, u32)) {
        self.keep_aspect_ratio = keep;
        if !keep {
            return;
        }
        if let Some(w) = parse_positive(&self.width) {
            self.height = scale(w, original.1, original.0).to_string();
        } else if let Some(h) = parse_positive(&self.height) {
            self.width = scale(h, original.0, original.1).to_string();
        }
    }

    /// Parsed `(target_width, target_height)`; empty or invalid text is `None`.
    pub fn targets(&self) -> (Option<u32>, Option<u32>) {
        (parse_positive(&self.width), parse_positive(&self.height))
    }
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|v| *v > 0)
}
