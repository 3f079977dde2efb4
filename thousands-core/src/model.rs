//! Row, document and transfer types shared by the migration pipeline.

use std::fmt;

use camino::Utf8PathBuf;
use serde::Serialize;

use crate::point::Coordinates;

/// A ridge as read from the relational source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RidgeRow {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl RidgeRow {
    /// Metadata document written to the ridge directory.
    #[must_use]
    pub fn meta(&self) -> RidgeMeta {
        RidgeMeta {
            name: self.name.clone(),
            color: self.color.clone(),
        }
    }
}

/// Contents of a ridge's `_meta` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RidgeMeta {
    pub name: String,
    pub color: String,
}

/// One row of the summits/images left join.
///
/// The first eight columns identify the summit; the trailing three describe
/// at most one image. A summit with several images arrives as several rows
/// sharing the same [`SummitKey`].
#[derive(Debug, Clone, PartialEq)]
pub struct SummitRow {
    pub id: String,
    pub ridge_id: String,
    pub name: String,
    pub name_alt: Option<String>,
    pub height: i32,
    pub description: Option<String>,
    pub interpretation: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub image: Option<String>,
    pub preview: Option<String>,
    pub comment: Option<String>,
}

impl SummitRow {
    /// Parent key made of exactly the non-image columns.
    #[must_use]
    pub fn key(&self) -> SummitKey {
        SummitKey {
            id: self.id.clone(),
            ridge_id: self.ridge_id.clone(),
            name: self.name.clone(),
            name_alt: self.name_alt.clone(),
            height: self.height,
            description: self.description.clone(),
            interpretation: self.interpretation.clone(),
            coordinates: self.coordinates,
        }
    }

    /// Image and preview file names when both are present.
    ///
    /// Rows missing either file are treated as carrying no image.
    #[must_use]
    pub fn image_files(&self) -> Option<(&str, &str)> {
        match (self.image.as_deref(), self.preview.as_deref()) {
            (Some(image), Some(preview)) => Some((image, preview)),
            _ => None,
        }
    }
}

/// The eight parent columns shared by every joined row of one summit.
#[derive(Debug, Clone, PartialEq)]
pub struct SummitKey {
    pub id: String,
    pub ridge_id: String,
    pub name: String,
    pub name_alt: Option<String>,
    pub height: i32,
    pub description: Option<String>,
    pub interpretation: Option<String>,
    pub coordinates: Option<Coordinates>,
}

impl SummitKey {
    /// Start an export document for this summit with no images yet.
    #[must_use]
    pub fn document(&self) -> SummitDocument {
        SummitDocument {
            name: self.name.clone(),
            name_alt: self.name_alt.clone(),
            height: self.height,
            description: self.description.clone(),
            interpretation: self.interpretation.clone(),
            coordinates: self.coordinates,
            images: Vec::new(),
        }
    }
}

/// Nested per-summit export document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummitDocument {
    pub name: String,
    pub name_alt: Option<String>,
    pub height: i32,
    pub description: Option<String>,
    pub interpretation: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub images: Vec<ImageRef>,
}

/// Reference from a summit document to a stored image and its preview.
///
/// `url` and `preview_url` are object-store keys, never local file names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRef {
    pub url: String,
    pub preview_url: String,
    pub comment: Option<String>,
}

/// A local file queued for upload under an object-store key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransferTask {
    /// Local path of the asset.
    pub source: Utf8PathBuf,
    /// Destination object key.
    pub key: String,
}

impl TransferTask {
    /// Build a task for `source` stored under `key`.
    pub fn new(source: impl Into<Utf8PathBuf>, key: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            key: key.into(),
        }
    }
}

/// A user as read from the relational source, including avatar file names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: i64,
    pub oauth_id: String,
    pub src: i64,
    pub name: String,
    pub image: Option<String>,
    pub preview: Option<String>,
}

impl UserRow {
    /// The mirrored user record without image columns.
    #[must_use]
    pub fn user(&self) -> User {
        User {
            id: self.id,
            oauth_id: self.oauth_id.clone(),
            src: self.src,
            name: self.name.clone(),
        }
    }

    /// Avatar files paired with their size slot, medium first.
    ///
    /// Nothing is returned unless the full-size image is set; a missing
    /// preview only drops the small slot.
    #[must_use]
    pub fn image_slots(&self) -> Vec<(ImageSize, &str)> {
        let Some(image) = self.image.as_deref().filter(|name| !name.is_empty()) else {
            return Vec::new();
        };
        let mut slots = vec![(ImageSize::Medium, image)];
        if let Some(preview) = self.preview.as_deref().filter(|name| !name.is_empty()) {
            slots.push((ImageSize::Small, preview));
        }
        slots
    }
}

/// A user row in the mirror store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub oauth_id: String,
    pub src: i64,
    pub name: String,
}

/// Size slot of a user image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSize {
    /// Full-size avatar, stored as `M`.
    Medium,
    /// Preview avatar, stored as `S`.
    Small,
}

impl ImageSize {
    /// Single-letter code used in keys and the mirror store.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Medium => "M",
            Self::Small => "S",
        }
    }

    /// Parse a single-letter size code.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "M" => Some(Self::Medium),
            "S" => Some(Self::Small),
            _ => None,
        }
    }
}

impl fmt::Display for ImageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Association row linking a user to one of their stored images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserImage {
    pub user_id: i64,
    pub size: ImageSize,
    pub url: String,
}

/// A recorded ascent of a summit by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClimbRow {
    pub user_id: i64,
    pub summit_id: String,
    pub comment: Option<String>,
    pub year: Option<i32>,
    pub month: Option<i32>,
    pub day: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn summit_row() -> SummitRow {
        SummitRow {
            id: "elbrus".into(),
            ridge_id: "caucasus".into(),
            name: "Elbrus".into(),
            name_alt: None,
            height: 5642,
            description: Some("Highest summit".into()),
            interpretation: None,
            coordinates: Some(Coordinates::new(43.3499, 42.4453)),
            image: Some("e.jpg".into()),
            preview: Some("e_p.jpg".into()),
            comment: Some("West".into()),
        }
    }

    #[rstest]
    fn key_ignores_image_columns(summit_row: SummitRow) {
        let mut sibling = summit_row.clone();
        sibling.image = Some("other.jpg".into());
        sibling.comment = None;
        assert_eq!(summit_row.key(), sibling.key());
    }

    #[rstest]
    #[case(Some("a.jpg"), None)]
    #[case(None, Some("a_p.jpg"))]
    #[case(None, None)]
    fn incomplete_image_columns_mean_no_image(
        mut summit_row: SummitRow,
        #[case] image: Option<&str>,
        #[case] preview: Option<&str>,
    ) {
        summit_row.image = image.map(str::to_owned);
        summit_row.preview = preview.map(str::to_owned);
        assert_eq!(summit_row.image_files(), None);
    }

    #[rstest]
    #[case(
        Some("u.jpg"),
        Some("u_p.jpg"),
        vec![(ImageSize::Medium, "u.jpg"), (ImageSize::Small, "u_p.jpg")]
    )]
    #[case(Some("u.jpg"), None, vec![(ImageSize::Medium, "u.jpg")])]
    #[case(None, Some("u_p.jpg"), vec![])]
    #[case(Some(""), Some("u_p.jpg"), vec![])]
    fn user_image_slots_require_full_image(
        #[case] image: Option<&str>,
        #[case] preview: Option<&str>,
        #[case] expected: Vec<(ImageSize, &str)>,
    ) {
        let row = UserRow {
            id: 1,
            oauth_id: "oauth".into(),
            src: 1,
            name: "Climber".into(),
            image: image.map(str::to_owned),
            preview: preview.map(str::to_owned),
        };
        assert_eq!(row.image_slots(), expected);
    }

    #[test]
    fn image_size_codes() {
        assert_eq!(ImageSize::Medium.to_string(), "M");
        assert_eq!(ImageSize::Small.code(), "S");
        assert_eq!(ImageSize::from_code("M"), Some(ImageSize::Medium));
        assert_eq!(ImageSize::from_code("XL"), None);
    }
}
