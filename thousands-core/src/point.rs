//! Decoding of geometric point values read from the relational source.
//!
//! Postgres renders a `point` column as `(x,y)`. The exporter only ever needs
//! four decimal digits, so both components are rounded while decoding.

use geo::Coord;
use serde::ser::{Serialize, SerializeTuple, Serializer};
use thiserror::Error;

/// Number of decimal digits kept for each coordinate component.
pub const COORDINATE_PRECISION: i32 = 4;

/// A decoded two-component point rounded to [`COORDINATE_PRECISION`] digits.
///
/// Serialises as a two element sequence `[x, y]`.
///
/// # Examples
/// ```
/// use thousands_core::Coordinates;
///
/// let point = Coordinates::new(45.12345, 7.6789);
/// assert_eq!(point.x(), 45.1235);
/// assert_eq!(point.y(), 7.6789);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates(Coord<f64>);

impl Coordinates {
    /// Construct coordinates, rounding both components.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self(Coord {
            x: round_component(x),
            y: round_component(y),
        })
    }

    /// First component of the point.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.0.x
    }

    /// Second component of the point.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.0.y
    }
}

impl Serialize for Coordinates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.0.x)?;
        tuple.serialize_element(&self.0.y)?;
        tuple.end()
    }
}

/// Errors raised when decoding a point value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PointDecodeError {
    /// The text could not be split into exactly two finite numbers.
    #[error("bad point representation: {raw:?}")]
    MalformedCoordinate {
        /// Raw text received from the source.
        raw: String,
    },
}

/// Decode a textual point such as `"(45.12345,7.6789)"`.
///
/// Absent input decodes to `None`. Each component is rounded half away from
/// zero to four decimal digits.
///
/// # Examples
/// ```
/// use thousands_core::{PointDecodeError, decode_point};
///
/// let point = decode_point(Some("(45.12345,7.6789)"))?.expect("point present");
/// assert_eq!((point.x(), point.y()), (45.1235, 7.6789));
/// assert_eq!(decode_point(None)?, None);
/// assert!(decode_point(Some("(1,2,3)")).is_err());
/// # Ok::<(), PointDecodeError>(())
/// ```
pub fn decode_point(raw: Option<&str>) -> Result<Option<Coordinates>, PointDecodeError> {
    let Some(text) = raw else {
        return Ok(None);
    };
    let malformed = || PointDecodeError::MalformedCoordinate {
        raw: text.to_owned(),
    };

    let inner = text.trim().trim_start_matches('(').trim_end_matches(')');
    let mut parts = inner.split(',');
    let (Some(first), Some(second), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };
    let x = parse_component(first).ok_or_else(malformed)?;
    let y = parse_component(second).ok_or_else(malformed)?;
    Ok(Some(Coordinates::new(x, y)))
}

fn parse_component(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn round_component(value: f64) -> f64 {
    let scale = 10_f64.powi(COORDINATE_PRECISION);
    (value * scale).round() / scale
}
