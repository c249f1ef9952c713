use crate::error::IngestError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of media kinds accepted for upload.
///
/// Resolved once from the uploaded filename; everything downstream (branding
/// eligibility, stored extension, media type) is decided by the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Jpg,
    Jpeg,
    Png,
    Mp4,
    Mov,
    Gif,
}

impl AssetKind {
    pub const ALL: [AssetKind; 6] = [
        AssetKind::Jpg,
        AssetKind::Jpeg,
        AssetKind::Png,
        AssetKind::Mp4,
        AssetKind::Mov,
        AssetKind::Gif,
    ];

    /// Lowercase extension used for the stored filename.
    pub fn extension(self) -> &'static str {
        match self {
            AssetKind::Jpg => "jpg",
            AssetKind::Jpeg => "jpeg",
            AssetKind::Png => "png",
            AssetKind::Mp4 => "mp4",
            AssetKind::Mov => "mov",
            AssetKind::Gif => "gif",
        }
    }

    /// Still images get the branding overlay; motion kinds are stored as uploaded.
    pub fn is_still(self) -> bool {
        matches!(self, AssetKind::Jpg | AssetKind::Jpeg | AssetKind::Png)
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            AssetKind::Jpg | AssetKind::Jpeg => "image/jpeg",
            AssetKind::Png => "image/png",
            AssetKind::Mp4 => "video/mp4",
            AssetKind::Mov => "video/quicktime",
            AssetKind::Gif => "image/gif",
        }
    }

    pub fn is_video(self) -> bool {
        self.mime_type().starts_with("video/")
    }

    /// Matches a bare extension, ignoring ASCII case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.extension().eq_ignore_ascii_case(ext))
    }

    /// Resolves the kind from the text after the last `.` of `filename`.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        Self::from_extension(ext)
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Validates an uploaded filename, rejecting it before anything is persisted.
pub fn validate(filename: &str) -> Result<AssetKind, IngestError> {
    AssetKind::from_filename(filename).ok_or_else(|| {
        IngestError::InvalidAsset(format!("'{filename}' is not an allowed file type"))
    })
}

/// Filename of a stored asset: `<token>.<ext>`.
pub fn asset_file_name(token: &str, kind: AssetKind) -> String {
    format!("{token}.{}", kind.extension())
}

/// Filename of the locator image belonging to `token`.
pub fn code_file_name(token: &str) -> String {
    format!("{token}.png")
}

/// Names handed in from the outside must stay inside their store directory.
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.contains("..")
}
