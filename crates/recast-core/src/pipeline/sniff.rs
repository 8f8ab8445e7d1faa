//! MIME type detection from leading bytes, with an extension fallback.

use std::path::Path;

use super::capability::SVG_MIME;

/// Derive a MIME type for an input.
///
/// Magic bytes win; when they match nothing known the file extension decides.
/// Returns `application/octet-stream` when neither is recognised, which
/// ingestion then drops as a non-image.
pub fn sniff_mime(bytes: &[u8], filename: &str) -> String {
    if let Some(mime) = mime_from_header(bytes) {
        return mime.to_string();
    }
    if looks_like_svg(bytes) {
        return SVG_MIME.to_string();
    }
    mime_from_extension(filename)
        .unwrap_or("application/octet-stream")
        .to_string()
}

/// Check if the header bytes match a known raster format.
fn mime_from_header(header: &[u8]) -> Option<&'static str> {
    if header.len() < 4 {
        return None;
    }

    if header.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    if header.starts_with(&[0x89, b'P', b'N', b'G']) {
        return Some("image/png");
    }
    if header.starts_with(b"GIF8") {
        return Some("image/gif");
    }
    // RIFF....WEBP
    if header.starts_with(b"RIFF") && header.len() >= 12 && &header[8..12] == b"WEBP" {
        return Some("image/webp");
    }
    if header.starts_with(b"BM") {
        return Some("image/bmp");
    }
    // TIFF: II (little-endian) or MM (big-endian) followed by version 42
    let is_tiff_le = header.starts_with(&[b'I', b'I', 0x2A, 0x00]);
    let is_tiff_be = header.starts_with(&[b'M', b'M', 0x00, 0x2A]);
    if is_tiff_le || is_tiff_be {
        return Some("image/tiff");
    }
    // ISO-BMFF ftyp box at offset 4; only the AVIF brands are images we know
    if header.len() >= 12 && &header[4..8] == b"ftyp" {
        return match &header[8..12] {
            b"avif" | b"avis" => Some("image/avif"),
            _ => None,
        };
    }

    None
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let text = String::from_utf8_lossy(head);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    text.starts_with("<svg") || (text.starts_with("<?xml") && text.contains("<svg"))
}

fn mime_from_extension(filename: &str) -> Option<&'static str> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())?
        .to_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => SVG_MIME,
        "tif" | "tiff" => "image/tiff",
        "avif" => "image/avif",
        _ => return None,
    };
    Some(mime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{jpeg_bytes, png_bytes, SAMPLE_SVG};

    #[test]
    fn test_magic_bytes_jpeg() {
        assert_eq!(sniff_mime(&jpeg_bytes(2, 2), "noext"), "image/jpeg");
    }

    #[test]
    fn test_magic_bytes_png_beat_extension() {
        assert_eq!(sniff_mime(&png_bytes(2, 2), "mislabelled.jpg"), "image/png");
    }

    #[test]
    fn test_magic_bytes_webp() {
        let header = [b'R', b'I', b'F', b'F', 0, 0, 0, 0, b'W', b'E', b'B', b'P'];
        assert_eq!(sniff_mime(&header, "x"), "image/webp");
    }

    #[test]
    fn test_magic_bytes_tiff_both_orders() {
        assert_eq!(sniff_mime(&[b'I', b'I', 0x2A, 0x00, 0, 0], "x"), "image/tiff");
        assert_eq!(sniff_mime(&[b'M', b'M', 0x00, 0x2A, 0, 0], "x"), "image/tiff");
    }

    #[test]
    fn test_bare_ii_falls_back_to_extension() {
        let header = [b'I', b'I', 0x00, 0x00, 0, 0, 0, 0];
        assert_eq!(sniff_mime(&header, "scan.TIF"), "image/tiff");
        assert_eq!(sniff_mime(&header, "scan.bin"), "application/octet-stream");
    }

    #[test]
    fn test_avif_brand() {
        let header = [0, 0, 0, 0x1C, b'f', b't', b'y', b'p', b'a', b'v', b'i', b'f'];
        assert_eq!(sniff_mime(&header, "x"), "image/avif");
    }

    #[test]
    fn test_svg_by_content_or_extension() {
        assert_eq!(sniff_mime(SAMPLE_SVG.as_bytes(), "drawing"), SVG_MIME);
        let xml = b"<?xml version=\"1.0\"?>\n<svg xmlns=\"http://www.w3.org/2000/svg\"/>";
        assert_eq!(sniff_mime(xml, "drawing.txt"), SVG_MIME);
        assert_eq!(sniff_mime(b"<!-- comment -->", "icon.SVG"), SVG_MIME);
    }

    #[test]
    fn test_unknown_input() {
        assert_eq!(sniff_mime(b"plain text", "notes.txt"), "application/octet-stream");
        assert_eq!(sniff_mime(b"", "empty"), "application/octet-stream");
    }
}
