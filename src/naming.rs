//! Export filename convention.
//!
//! Every exported file is named `poster_<tag>_<width>x<height>.<ext>`:
//! - `poster_acme_1920x1080.png`
//! - `poster_summer-sale_2480x3508.jpg`
//!
//! The tag is free text from the job file, so it is reduced to a safe slug
//! first. Dimensions are the actual output pixel size after the minimum-size
//! floor, never the preview size.

use crate::imaging::ExportFormat;

/// Tag used when the configured one has no usable characters.
pub const FALLBACK_TAG: &str = "export";

/// Reduce a free-text tag to `[a-z0-9-]`, with runs of anything else
/// collapsed to a single dash.
///
/// - `"Acme Corp"` → `"acme-corp"`
/// - `"  --Summer__Sale!! "` → `"summer-sale"`
/// - `"4k"` → `"4k"`
/// - `"???"` → `"export"`
pub fn sanitize_tag(tag: &str) -> String {
    let mut slug = String::with_capacity(tag.len());
    let mut pending_dash = false;
    for c in tag.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        FALLBACK_TAG.to_string()
    } else {
        slug
    }
}

/// Build the download filename for one export.
pub fn export_filename(tag: &str, width: u32, height: u32, format: ExportFormat) -> String {
    format!(
        "poster_{}_{}x{}.{}",
        sanitize_tag(tag),
        width,
        height,
        format.extension()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_tag_is_kept() {
        assert_eq!(sanitize_tag("acme"), "acme");
        assert_eq!(sanitize_tag("4k"), "4k");
    }

    #[test]
    fn tag_is_lowercased() {
        assert_eq!(sanitize_tag("ACME"), "acme");
    }

    #[test]
    fn spaces_become_dashes() {
        assert_eq!(sanitize_tag("Acme Corp"), "acme-corp");
    }

    #[test]
    fn runs_of_separators_collapse() {
        assert_eq!(sanitize_tag("  --Summer__Sale!! "), "summer-sale");
    }

    #[test]
    fn path_separators_are_stripped() {
        assert_eq!(sanitize_tag("../etc/passwd"), "etc-passwd");
    }

    #[test]
    fn non_ascii_is_dropped() {
        assert_eq!(sanitize_tag("café bar"), "caf-bar");
    }

    #[test]
    fn empty_tag_falls_back() {
        assert_eq!(sanitize_tag(""), FALLBACK_TAG);
        assert_eq!(sanitize_tag("???"), FALLBACK_TAG);
    }

    #[test]
    fn png_filename() {
        assert_eq!(
            export_filename("acme", 1920, 1080, ExportFormat::Png),
            "poster_acme_1920x1080.png"
        );
    }

    #[test]
    fn jpeg_filename_uses_jpg_extension() {
        assert_eq!(
            export_filename("Summer Sale", 2480, 3508, ExportFormat::Jpeg),
            "poster_summer-sale_2480x3508.jpg"
        );
    }
}
