//! Client-side file-type filtering for uploads.
//!
//! The service only ingests office-style reference documents. Everything
//! else is rejected here, before any request is built.

/// Media types the ingestion pipeline accepts.
const ACCEPTED_MEDIA_TYPES: [&str; 5] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-powerpoint",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
];

/// Filename extensions the ingestion pipeline accepts.
const ACCEPTED_EXTENSIONS: [&str; 5] = ["pdf", "doc", "docx", "ppt", "pptx"];

/// Returns true when a file is acceptable for upload.
///
/// A file passes when its declared media type is one of the accepted types,
/// or when its filename carries an accepted extension. Case-insensitive on
/// the extension.
pub fn is_supported_document(filename: &str, media_type: Option<&str>) -> bool {
    if let Some(media_type) = media_type
        && ACCEPTED_MEDIA_TYPES.contains(&media_type)
    {
        return true;
    }
    filename
        .rsplit_once('.')
        .map(|(_, extension)| {
            let extension = extension.to_ascii_lowercase();
            ACCEPTED_EXTENSIONS.contains(&extension.as_str())
        })
        .unwrap_or(false)
}

/// Guesses the media type for a filename from its extension.
pub fn detect_media_type(filename: &str) -> Option<String> {
    mime_guess::from_path(filename)
        .first()
        .map(|mime| mime.essence_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_document_extensions() {
        assert!(is_supported_document("notes.pdf", None));
        assert!(is_supported_document("REPORT.DOCX", None));
        assert!(is_supported_document("deck.pptx", None));
        assert!(is_supported_document("legacy.doc", None));
        assert!(is_supported_document("legacy.ppt", None));
    }

    #[test]
    fn accepts_declared_media_type_with_odd_filename() {
        assert!(is_supported_document("export", Some("application/pdf")));
    }

    #[test]
    fn rejects_everything_else() {
        assert!(!is_supported_document("report.exe", None));
        assert!(!is_supported_document("archive.zip", Some("application/zip")));
        assert!(!is_supported_document("noextension", None));
    }

    #[test]
    fn detects_media_type_from_extension() {
        assert_eq!(
            detect_media_type("notes.pdf").as_deref(),
            Some("application/pdf")
        );
    }
}
