use crate::models::{SourceFile, OUTPUT_EXTENSION};

/// Longest first, so `.oxps` is never shadowed by `.xps`.
pub const TRIGGER_EXTENSIONS: [&str; 2] = [".oxps", ".xps"];
pub const TRIGGER_MEDIA_TYPES: [&str; 2] = ["application/oxps", "application/vnd.ms-xpsdocument"];

/// The trigger extension `name` ends with, compared case-insensitively.
pub fn trigger_extension(name: &str) -> Option<&'static str> {
    TRIGGER_EXTENSIONS.iter().copied().find(|ext| {
        name.len() >= ext.len()
            && name
                .get(name.len() - ext.len()..)
                .map(|tail| tail.eq_ignore_ascii_case(ext))
                .unwrap_or(false)
    })
}

pub fn is_trigger_media_type(media_type: &str) -> bool {
    let essence = media_type.split(';').next().unwrap_or("").trim();
    TRIGGER_MEDIA_TYPES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(essence))
}

pub fn needs_conversion(name: &str, media_type: Option<&str>) -> bool {
    trigger_extension(name).is_some() || media_type.map(is_trigger_media_type).unwrap_or(false)
}

/// Output name for a converted file: the trigger extension is swapped for
/// `.pdf`; a name without one (matched on media type) gets `.pdf` appended.
pub fn converted_filename(name: &str) -> String {
    match trigger_extension(name) {
        Some(ext) => format!("{}{}", &name[..name.len() - ext.len()], OUTPUT_EXTENSION),
        None => format!("{}{}", name, OUTPUT_EXTENSION),
    }
}

impl SourceFile {
    pub fn needs_conversion(&self) -> bool {
        needs_conversion(&self.name, self.media_type.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_triggers_case_insensitively() {
        assert!(needs_conversion("statement.OXPS", None));
        assert!(needs_conversion("eob.Xps", Some("application/octet-stream")));
        assert!(!needs_conversion("remit.pdf", Some("application/pdf")));
        assert!(!needs_conversion("xps", None));
        assert!(!needs_conversion("notes.xpsx", None));
    }

    #[test]
    fn test_media_type_triggers() {
        assert!(needs_conversion("upload", Some("application/oxps")));
        assert!(needs_conversion("upload", Some("Application/VND.MS-XPSDocument")));
        assert!(needs_conversion("upload", Some("application/oxps; charset=binary")));
        assert!(!needs_conversion("upload", Some("image/png")));
        assert!(!needs_conversion("upload", None));
    }

    #[test]
    fn test_converted_filename_replaces_only_the_extension() {
        assert_eq!(converted_filename("report.oxps"), "report.pdf");
        assert_eq!(converted_filename("scan.v2.xps"), "scan.v2.pdf");
        assert_eq!(converted_filename("CLAIM.XPS"), "CLAIM.pdf");
        assert_eq!(converted_filename("xps.archive.oxps"), "xps.archive.pdf");
        assert_eq!(converted_filename("upload"), "upload.pdf");
    }

    #[test]
    fn test_non_ascii_names_do_not_panic() {
        assert!(!needs_conversion("résumé", None));
        assert_eq!(converted_filename("résumé.xps"), "résumé.pdf");
    }
}
