//! Static table of output formats and what the pipeline can do with them.
//!
//! This is the single source of truth for which targets are legal. The
//! converter consults it before touching any pixels.

use crate::types::TargetFormat;

/// What the pipeline can do for one target format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatCapability {
    pub format: TargetFormat,
    /// MIME type of the encoded output, if the format is known
    pub mime_type: Option<&'static str>,
    /// Whether output can be produced at all
    pub encodable: bool,
    /// Whether the encoder takes a quality parameter
    pub uses_quality: bool,
    /// Whether a source already in this format is copied through unchanged.
    /// Only true for vector formats.
    pub passthrough_if_same_format: bool,
}

impl FormatCapability {
    fn raster(format: TargetFormat, mime_type: &'static str, uses_quality: bool) -> Self {
        Self {
            format,
            mime_type: Some(mime_type),
            encodable: true,
            uses_quality,
            passthrough_if_same_format: false,
        }
    }

    fn unavailable(format: TargetFormat, mime_type: Option<&'static str>) -> Self {
        Self {
            format,
            mime_type,
            encodable: false,
            uses_quality: false,
            passthrough_if_same_format: false,
        }
    }

    /// Whether this is a vector target (only reachable via pass-through).
    pub fn is_vector(&self) -> bool {
        self.passthrough_if_same_format
    }

    pub fn extension(&self) -> &str {
        self.format.extension()
    }
}

/// Look up the capability descriptor for a target format.
pub fn capability(format: &TargetFormat) -> FormatCapability {
    match format {
        TargetFormat::Jpg => FormatCapability::raster(TargetFormat::Jpg, "image/jpeg", true),
        TargetFormat::Png => FormatCapability::raster(TargetFormat::Png, "image/png", false),
        TargetFormat::Webp => FormatCapability::raster(TargetFormat::Webp, "image/webp", true),
        TargetFormat::Gif => FormatCapability::raster(TargetFormat::Gif, "image/gif", false),
        TargetFormat::Bmp => FormatCapability::raster(TargetFormat::Bmp, "image/bmp", false),
        TargetFormat::Svg => FormatCapability {
            format: TargetFormat::Svg,
            mime_type: Some(SVG_MIME),
            encodable: true,
            uses_quality: false,
            passthrough_if_same_format: true,
        },
        TargetFormat::Tiff => FormatCapability::unavailable(TargetFormat::Tiff, Some("image/tiff")),
        TargetFormat::Avif => FormatCapability::unavailable(TargetFormat::Avif, Some("image/avif")),
        TargetFormat::Unknown(id) => {
            FormatCapability::unavailable(TargetFormat::Unknown(id.clone()), None)
        }
    }
}

/// MIME type of SVG sources and output.
pub const SVG_MIME: &str = "image/svg+xml";

/// Every format the table knows about, in display order.
pub fn known_formats() -> Vec<FormatCapability> {
    [
        TargetFormat::Jpg,
        TargetFormat::Png,
        TargetFormat::Webp,
        TargetFormat::Gif,
        TargetFormat::Bmp,
        TargetFormat::Svg,
        TargetFormat::Tiff,
        TargetFormat::Avif,
    ]
    .iter()
    .map(capability)
    .collect()
}

/// Formats that can actually be produced.
pub fn supported_formats() -> Vec<FormatCapability> {
    known_formats().into_iter().filter(|c| c.encodable).collect()
}
