//! The `recast formats` command: prints the capability table.

use recast_core::pipeline::{known_formats, FormatCapability};

/// Print every known target format with what the pipeline can do for it.
pub fn execute() -> anyhow::Result<()> {
    println!("{}", render_table(&known_formats()));
    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn render_table(formats: &[FormatCapability]) -> String {
    let mut out = format!(
        "{:<8}{:<16}{:<8}{:<9}{}\n",
        "FORMAT", "MIME", "ENCODE", "QUALITY", "NOTES"
    );
    for cap in formats {
        let notes = if cap.is_vector() {
            "pass-through from the same format only"
        } else if !cap.encodable {
            "not available as output"
        } else {
            ""
        };
        out.push_str(&format!(
            "{:<8}{:<16}{:<8}{:<9}{}\n",
            cap.format.to_string(),
            cap.mime_type.unwrap_or("-"),
            yes_no(cap.encodable),
            yes_no(cap.uses_quality),
            notes
        ));
    }
    out.trim_end().to_string()
}
