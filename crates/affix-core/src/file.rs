//! Uploaded file representation.

use bytes::Bytes;

/// A file handed to an uploader for staging.
///
/// The payload is kept as [`Bytes`] so cloning a file (for staging plus
/// retention in a store) stays cheap.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    filename: String,
    content_type: Option<String>,
    data: Bytes,
}

impl UploadedFile {
    /// Create a file from a name and raw payload.
    pub fn new(filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data: data.into(),
        }
    }

    /// Attach a MIME content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// The filename as supplied by the caller, untrusted.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Lowercased extension of the supplied filename, if any.
    pub fn extension(&self) -> Option<String> {
        let name = self.sanitized_filename();
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    /// Filename reduced to its final path segment with traversal sequences
    /// stripped. Uploaders should persist this, never the raw filename.
    pub fn sanitized_filename(&self) -> String {
        let name = self
            .filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or("")
            .trim();
        if name.is_empty() || name == "." || name == ".." {
            "unnamed".to_string()
        } else {
            name.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_lowercased() {
        let file = UploadedFile::new("Photo.JPG", &b"x"[..]);
        assert_eq!(file.extension().as_deref(), Some("jpg"));
    }

    #[test]
    fn test_extension_absent() {
        assert_eq!(UploadedFile::new("README", &b"x"[..]).extension(), None);
        assert_eq!(UploadedFile::new(".gitignore", &b"x"[..]).extension(), None);
        assert_eq!(UploadedFile::new("archive.", &b"x"[..]).extension(), None);
    }

    #[test]
    fn test_sanitized_filename_strips_paths() {
        let file = UploadedFile::new("../../etc/passwd", &b"x"[..]);
        assert_eq!(file.sanitized_filename(), "passwd");

        let file = UploadedFile::new("C:\\Users\\me\\cv.pdf", &b"x"[..]);
        assert_eq!(file.sanitized_filename(), "cv.pdf");
    }

    #[test]
    fn test_sanitized_filename_refuses_empty() {
        assert_eq!(UploadedFile::new("", &b"x"[..]).sanitized_filename(), "unnamed");
        assert_eq!(UploadedFile::new("..", &b"x"[..]).sanitized_filename(), "unnamed");
        assert_eq!(UploadedFile::new("uploads/", &b"x"[..]).sanitized_filename(), "unnamed");
    }

    #[test]
    fn test_content_type_builder() {
        let file = UploadedFile::new("a.png", &b"x"[..]).with_content_type("image/png");
        assert_eq!(file.content_type(), Some("image/png"));
        assert_eq!(file.size(), 1);
    }
}
