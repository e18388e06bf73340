use serde::{Deserialize, Serialize};

/// Broad category of a file, derived from its media type.
///
/// Presentation layers use it to pick an icon when no image preview exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    Pdf,
    Word,
    Spreadsheet,
    Text,
    Other,
}

impl FileKind {
    pub fn from_media_type(media_type: &str) -> Self {
        let media_type = media_type.to_lowercase();
        if media_type.starts_with("image/") {
            FileKind::Image
        } else if media_type.contains("pdf") {
            FileKind::Pdf
        } else if media_type.contains("word") {
            FileKind::Word
        } else if media_type.contains("excel") || media_type.contains("spreadsheet") {
            FileKind::Spreadsheet
        } else if media_type.contains("text") {
            FileKind::Text
        } else {
            FileKind::Other
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::Pdf => "pdf",
            FileKind::Word => "word",
            FileKind::Spreadsheet => "spreadsheet",
            FileKind::Text => "text",
            FileKind::Other => "file",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_media_type() {
        assert_eq!(FileKind::from_media_type("image/webp"), FileKind::Image);
        assert_eq!(FileKind::from_media_type("application/pdf"), FileKind::Pdf);
        assert_eq!(
            FileKind::from_media_type(
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            ),
            FileKind::Word
        );
        assert_eq!(
            FileKind::from_media_type("application/vnd.ms-excel"),
            FileKind::Spreadsheet
        );
        assert_eq!(
            FileKind::from_media_type(
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            ),
            FileKind::Spreadsheet
        );
        assert_eq!(FileKind::from_media_type("text/csv"), FileKind::Text);
        assert_eq!(FileKind::from_media_type("application/zip"), FileKind::Other);
    }
}
