//! Die types and single-die rolls.
//!
//! A [`DieType`] produces an integer uniformly from `min_result..=max_result`
//! and carries one [`Face`] per result. Placeholders stand in for names that
//! could not be resolved; they have no faces and refuse to roll.

pub mod face;

use std::fmt;

use rand::Rng;
use rand::rngs::StdRng;

pub use face::{Face, FaceSource, build_config_face, build_faces, generic_face};

use crate::error::{PoolError, PoolResult};

/// Most results a single die type may have.
pub const MAX_FACES: usize = 10_000;

/// A named range of results with a face per result.
///
/// Equality compares name and range only.
#[derive(Debug, Clone)]
pub struct DieType {
    name: String,
    min_result: i32,
    max_result: i32,
    faces: Vec<Face>,
    config_face: Option<Face>,
    face_sources: Vec<FaceSource>,
    is_placeholder: bool,
}

impl DieType {
    /// Create a die type with fully specified faces and no separate config face.
    pub fn new(
        name: impl Into<String>,
        min_result: i32,
        max_result: i32,
        faces: Vec<Face>,
    ) -> PoolResult<Self> {
        let name = name.into();
        check_range(&name, min_result, max_result, faces.len())?;
        Ok(Self {
            face_sources: (min_result..=max_result).map(FaceSource::Generic).collect(),
            name,
            min_result,
            max_result,
            faces,
            config_face: None,
            is_placeholder: false,
        })
    }

    /// Create a user-defined die type.
    ///
    /// `sources` holds one entry per result. `loaded` holds the face the
    /// loader produced for each custom source (or `None` where the generic
    /// face applies); its length must also match the range.
    pub fn custom(
        name: impl Into<String>,
        min_result: i32,
        max_result: i32,
        sources: Vec<FaceSource>,
        loaded: Vec<Option<Face>>,
    ) -> PoolResult<Self> {
        let name = name.into();
        check_range(&name, min_result, max_result, sources.len())?;
        if loaded.len() != sources.len() {
            return Err(PoolError::InvariantViolation(format!(
                "die \"{name}\" has {} face sources but {} loaded faces",
                sources.len(),
                loaded.len()
            )));
        }
        let faces = build_faces(min_result, max_result, Some(&loaded));
        let config_face = build_config_face(min_result, max_result, Some(&loaded));
        Ok(Self {
            name,
            min_result,
            max_result,
            faces,
            config_face,
            face_sources: sources,
            is_placeholder: false,
        })
    }

    /// A stand-in for a die type name that could not be resolved.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            min_result: 0,
            max_result: 0,
            faces: Vec::new(),
            config_face: None,
            face_sources: Vec::new(),
            is_placeholder: true,
        }
    }

    /// The unique name of this type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lowest possible result.
    pub fn min_result(&self) -> i32 {
        self.min_result
    }

    /// Highest possible result.
    pub fn max_result(&self) -> i32 {
        self.max_result
    }

    /// True if this is a placeholder for an unresolved name.
    pub fn is_placeholder(&self) -> bool {
        self.is_placeholder
    }

    /// Faces in result order.
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Face sources in result order.
    pub fn face_sources(&self) -> &[FaceSource] {
        &self.face_sources
    }

    /// True if any face uses a user-supplied image.
    pub fn has_custom_faces(&self) -> bool {
        self.face_sources.iter().any(FaceSource::is_custom)
    }

    /// The face shown for `result`, or `None` outside the range.
    pub fn face_for_result(&self, result: i32) -> Option<&Face> {
        self.index_of(result).and_then(|i| self.faces.get(i))
    }

    /// The source of the face for `result`, or `None` outside the range.
    pub fn face_source_for_result(&self, result: i32) -> Option<&FaceSource> {
        self.index_of(result).and_then(|i| self.face_sources.get(i))
    }

    /// The face used to show an unrolled die: the config face if there is
    /// one, otherwise the face for the maximum result.
    pub fn config_face(&self) -> Option<&Face> {
        self.config_face
            .as_ref()
            .or_else(|| self.face_for_result(self.max_result))
    }

    /// Roll the die.
    pub fn roll(&self, rng: &mut StdRng) -> PoolResult<DieRollResult> {
        self.ensure_real("roll")?;
        let number = rng.random_range(self.min_result..=self.max_result);
        self.result_for(number)
    }

    /// The result shown in menus and previews: the maximum value with the config face.
    pub fn config_result(&self) -> PoolResult<DieRollResult> {
        self.ensure_real("compute a config result for")?;
        let face = self.config_face().cloned().ok_or_else(|| {
            PoolError::InvariantViolation(format!("die \"{}\" has no faces", self.name))
        })?;
        Ok(DieRollResult {
            number: self.max_result,
            face,
        })
    }

    fn result_for(&self, number: i32) -> PoolResult<DieRollResult> {
        let face = self.face_for_result(number).cloned().ok_or_else(|| {
            PoolError::InvariantViolation(format!(
                "die \"{}\" has no face for {number}",
                self.name
            ))
        })?;
        Ok(DieRollResult { number, face })
    }

    fn ensure_real(&self, action: &str) -> PoolResult<()> {
        if self.is_placeholder {
            return Err(PoolError::InvalidOperation(format!(
                "cannot {action} placeholder die \"{}\"",
                self.name
            )));
        }
        Ok(())
    }

    fn index_of(&self, result: i32) -> Option<usize> {
        if (self.min_result..=self.max_result).contains(&result) {
            Some((result - self.min_result) as usize)
        } else {
            None
        }
    }
}

impl PartialEq for DieType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.min_result == other.min_result
            && self.max_result == other.max_result
    }
}

impl Eq for DieType {}

impl fmt::Display for DieType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_placeholder {
            write!(f, "{} (missing)", self.name)
        } else {
            write!(f, "{} ({}-{})", self.name, self.min_result, self.max_result)
        }
    }
}

fn check_range(name: &str, min: i32, max: i32, faces: usize) -> PoolResult<()> {
    if min > max {
        return Err(PoolError::InvariantViolation(format!(
            "minimum {min} is above maximum {max} in die \"{name}\""
        )));
    }
    let span = i64::from(max) - i64::from(min) + 1;
    if span > MAX_FACES as i64 {
        return Err(PoolError::InvariantViolation(format!(
            "die \"{name}\" has {span} results, more than the limit of {MAX_FACES}"
        )));
    }
    let expected = span as usize;
    if faces != expected {
        return Err(PoolError::InvariantViolation(format!(
            "die \"{name}\" needs {expected} faces, got {faces}"
        )));
    }
    Ok(())
}

/// The outcome of rolling a single die.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DieRollResult {
    /// The value rolled.
    pub number: i32,
    /// The face showing that value.
    pub face: Face,
}
