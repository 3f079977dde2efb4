//! Object key naming for summit and user images.
//!
//! Keys are derived only from their inputs: the same entity id and comment
//! always produce the same key. Uniqueness across the images of one summit
//! comes from the positional index appended by [`summit_image_keys`].

use crate::model::ImageSize;

/// Object key prefix for summit images.
pub const SUMMIT_PREFIX: &str = "summits";
/// Object key prefix for user images.
pub const USER_PREFIX: &str = "users";
/// File extension of every stored image.
pub const IMAGE_EXTENSION: &str = "jpg";

/// Transliterate Russian Cyrillic into Latin script.
///
/// Case is preserved, hard and soft signs are dropped and every character
/// outside the Russian alphabet passes through unchanged.
///
/// # Examples
/// ```
/// use thousands_core::transliterate;
///
/// assert_eq!(transliterate("Вид на Эльбрус"), "Vid na Elbrus");
/// assert_eq!(transliterate("Щучье"), "Schuche");
/// ```
#[must_use]
pub fn transliterate(text: &str) -> String {
    let mut latin = String::with_capacity(text.len());
    for ch in text.chars() {
        match latin_for(ch) {
            Some(replacement) => latin.push_str(replacement),
            None => latin.push(ch),
        }
    }
    latin
}

fn latin_for(ch: char) -> Option<&'static str> {
    let lower = ch.to_lowercase().next().unwrap_or(ch);
    let latin = match lower {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' | 'ё' | 'э' => "e",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'ю' => "ju",
        'я' => "ja",
        _ => return None,
    };
    if lower == ch {
        Some(latin)
    } else {
        Some(capitalised(latin))
    }
}

fn capitalised(latin: &'static str) -> &'static str {
    match latin {
        "a" => "A",
        "b" => "B",
        "v" => "V",
        "g" => "G",
        "d" => "D",
        "e" => "E",
        "zh" => "Zh",
        "z" => "Z",
        "i" => "I",
        "j" => "J",
        "k" => "K",
        "l" => "L",
        "m" => "M",
        "n" => "N",
        "o" => "O",
        "p" => "P",
        "r" => "R",
        "s" => "S",
        "t" => "T",
        "u" => "U",
        "f" => "F",
        "h" => "H",
        "ts" => "Ts",
        "ch" => "Ch",
        "sh" => "Sh",
        "sch" => "Sch",
        "y" => "Y",
        "ju" => "Ju",
        "ja" => "Ja",
        other => other,
    }
}

/// Derive the key stem shared by an image and its preview.
///
/// The comment is transliterated, lowercased, whitespace becomes `_` and any
/// character that is not ASCII alphanumeric, `_`, `-` or `.` is dropped. The
/// result is prefixed with the entity id. A missing or empty comment yields
/// the bare id.
///
/// # Examples
/// ```
/// use thousands_core::image_key_stem;
///
/// assert_eq!(image_key_stem("s1", Some("Вид")), "s1_vid");
/// assert_eq!(image_key_stem("s1", Some("North face")), "s1_north_face");
/// assert_eq!(image_key_stem("s1", None), "s1");
/// ```
#[must_use]
pub fn image_key_stem(entity_id: &str, comment: Option<&str>) -> String {
    let label = comment.map(normalise_label).unwrap_or_default();
    if label.is_empty() {
        entity_id.to_owned()
    } else {
        format!("{entity_id}_{label}")
    }
}

fn normalise_label(comment: &str) -> String {
    transliterate(comment)
        .chars()
        .flat_map(char::to_lowercase)
        .filter_map(|ch| {
            if ch.is_whitespace() {
                Some('_')
            } else if ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.') {
                Some(ch)
            } else {
                None
            }
        })
        .collect()
}

/// Object keys for one summit image and its preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummitImageKeys {
    /// Key of the full-size image.
    pub url: String,
    /// Key of the preview image.
    pub preview_url: String,
}

/// Build the keys for the `index`-th image of a summit.
///
/// # Examples
/// ```
/// use thousands_core::summit_image_keys;
///
/// let keys = summit_image_keys("s1", Some("Вид"), 0);
/// assert_eq!(keys.url, "summits/s1_vid_0.jpg");
/// assert_eq!(keys.preview_url, "summits/s1_vid_0_preview.jpg");
/// ```
#[must_use]
pub fn summit_image_keys(summit_id: &str, comment: Option<&str>, index: usize) -> SummitImageKeys {
    let stem = image_key_stem(summit_id, comment);
    SummitImageKeys {
        url: format!("{SUMMIT_PREFIX}/{stem}_{index}.{IMAGE_EXTENSION}"),
        preview_url: format!("{SUMMIT_PREFIX}/{stem}_{index}_preview.{IMAGE_EXTENSION}"),
    }
}

/// Build the key of a user's image in the given size slot.
///
/// # Examples
/// ```
/// use thousands_core::{ImageSize, user_image_key};
///
/// assert_eq!(user_image_key(42, ImageSize::Medium), "users/42_M.jpg");
/// ```
#[must_use]
pub fn user_image_key(user_id: i64, size: ImageSize) -> String {
    format!("{USER_PREFIX}/{user_id}_{size}.{IMAGE_EXTENSION}")
}
