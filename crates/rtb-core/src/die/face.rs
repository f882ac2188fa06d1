//! Face representations and the helpers that generate them.

use std::fmt;

/// Asset drawn behind every generic text face.
pub const GENERIC_OUTLINE: &str = "generic_die_outline";

/// How a single die face is shown.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Face {
    /// Built-in artwork, identified by asset name (e.g. `d6_3`).
    Asset(String),
    /// Text drawn over the shared [`GENERIC_OUTLINE`].
    Text(String),
    /// A user-supplied image, identified by the reference the face loader resolved.
    Image(String),
}

impl Face {
    /// True for generic text faces.
    pub fn is_generic(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asset(name) => write!(f, "[{name}]"),
            Self::Text(text) => write!(f, "{text}"),
            Self::Image(source) => write!(f, "<{source}>"),
        }
    }
}

/// Where a custom die's face comes from, as persisted in its definition file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FaceSource {
    /// No explicit image; the generic face for this value is used.
    Generic(i32),
    /// An opaque image reference handed to the face loader.
    Custom(String),
}

impl FaceSource {
    /// Decode a persisted field. The empty string means no explicit image.
    pub fn from_field(value: i32, field: &str) -> Self {
        if field.is_empty() {
            Self::Generic(value)
        } else {
            Self::Custom(field.to_string())
        }
    }

    /// The persisted field for this source.
    pub fn as_field(&self) -> &str {
        match self {
            Self::Generic(_) => "",
            Self::Custom(reference) => reference,
        }
    }

    /// True if this face has a user-supplied image.
    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}

/// The generic face for a value: its number over the shared outline.
pub fn generic_face(value: i32) -> Face {
    Face::Text(value.to_string())
}

/// One face per result in `min..=max`.
///
/// `explicit[i]` (if present) is used for result `min + i`; every other
/// result falls back to [`generic_face`].
pub fn build_faces(min: i32, max: i32, explicit: Option<&[Option<Face>]>) -> Vec<Face> {
    (min..=max)
        .map(|value| {
            let index = (value - min) as usize;
            explicit
                .and_then(|faces| faces.get(index))
                .and_then(Clone::clone)
                .unwrap_or_else(|| generic_face(value))
        })
        .collect()
}

/// A separate "unrolled" face showing the range, e.g. `2-6`.
///
/// Returns `None` when the die starts at 1 or has an explicit image for its
/// maximum result; the maximum face is then used as the config face.
pub fn build_config_face(min: i32, max: i32, explicit: Option<&[Option<Face>]>) -> Option<Face> {
    let max_index = (max - min) as usize;
    let has_max_image = explicit
        .and_then(|faces| faces.get(max_index))
        .is_some_and(Option::is_some);
    if min == 1 || has_max_image {
        return None;
    }
    Some(Face::Text(format!("{min}-{max}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_faces_fill_gaps() {
        let explicit = vec![None, Some(Face::Image("two.png".into())), None];
        let faces = build_faces(1, 3, Some(&explicit));
        assert_eq!(
            faces,
            vec![
                Face::Text("1".into()),
                Face::Image("two.png".into()),
                Face::Text("3".into()),
            ]
        );
    }

    #[test]
    fn no_explicit_faces() {
        let faces = build_faces(-1, 1, None);
        assert_eq!(faces.len(), 3);
        assert!(faces.iter().all(Face::is_generic));
        assert_eq!(faces[0], Face::Text("-1".into()));
    }

    #[test]
    fn config_face_only_for_ranges_not_starting_at_one() {
        assert_eq!(build_config_face(1, 6, None), None);
        assert_eq!(build_config_face(2, 6, None), Some(Face::Text("2-6".into())));
        assert_eq!(build_config_face(0, 9, None), Some(Face::Text("0-9".into())));
    }

    #[test]
    fn explicit_max_face_suppresses_config_face() {
        let explicit = vec![None, None, Some(Face::Image("top.png".into()))];
        assert_eq!(build_config_face(2, 4, Some(&explicit)), None);
        let explicit = vec![Some(Face::Image("low.png".into())), None, None];
        assert!(build_config_face(2, 4, Some(&explicit)).is_some());
    }

    #[test]
    fn face_source_fields() {
        assert_eq!(FaceSource::from_field(3, ""), FaceSource::Generic(3));
        let custom = FaceSource::from_field(3, "content://faces/3");
        assert!(custom.is_custom());
        assert_eq!(custom.as_field(), "content://faces/3");
        assert_eq!(FaceSource::Generic(1).as_field(), "");
    }
}
