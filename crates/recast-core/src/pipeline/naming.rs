//! Output artifact naming: `<sanitized-base-name>_converted.<extension>`.

use crate::types::TargetFormat;

/// Suffix appended to every converted file's base name.
pub const CONVERTED_SUFFIX: &str = "_converted";

/// Build the output filename for a converted source file.
///
/// The base name is everything before the last `.`; a name with no dot, or
/// whose only dot is the first character, is used whole. Every character
/// outside `[A-Za-z0-9_-]` is replaced by `_`, one for one.
pub fn output_filename(source_filename: &str, format: &TargetFormat) -> String {
    format!(
        "{}{}.{}",
        sanitize(base_name(source_filename)),
        CONVERTED_SUFFIX,
        format.extension().to_lowercase()
    )
}

fn base_name(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) if idx > 0 => &filename[..idx],
        _ => filename,
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
