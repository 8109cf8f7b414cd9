//! Generation parameters accepted by the remote job system.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Minimum face count the remote system accepts.
pub const MIN_FACE_COUNT: i64 = 40_000;

/// Maximum face count the remote system accepts.
pub const MAX_FACE_COUNT: i64 = 500_000;

/// Generation style understood by the remote pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerateStyle {
    #[default]
    Normal,
    LowPoly,
    Geometry,
    Sketch,
}

impl GenerateStyle {
    /// Wire value expected by the submission endpoint.
    #[must_use]
    pub fn as_api_string(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::LowPoly => "LowPoly",
            Self::Geometry => "Geometry",
            Self::Sketch => "Sketch",
        }
    }
}

impl FromStr for GenerateStyle {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "lowpoly" | "low-poly" => Ok(Self::LowPoly),
            "geometry" => Ok(Self::Geometry),
            "sketch" => Ok(Self::Sketch),
            other => Err(format!(
                "unknown style '{other}' (expected normal, lowpoly, geometry, or sketch)"
            )),
        }
    }
}

impl fmt::Display for GenerateStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_api_string())
    }
}

/// Tunable parameters for one generation request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Request physically-based-rendering textures. Ignored by the remote
    /// system for `Geometry` style, so it is forced off there.
    pub enable_pbr: bool,
    /// Target face count for the generated mesh.
    pub face_count: Option<i64>,
    /// Generation style.
    pub style: GenerateStyle,
}

impl GenerationOptions {
    /// Validates option ranges and resolves style interactions.
    ///
    /// # Errors
    ///
    /// Returns a message when `face_count` is outside the accepted range.
    pub fn validated(mut self) -> Result<Self, String> {
        if let Some(count) = self.face_count
            && !(MIN_FACE_COUNT..=MAX_FACE_COUNT).contains(&count)
        {
            return Err(format!(
                "face_count {count} out of range ({MIN_FACE_COUNT}-{MAX_FACE_COUNT})"
            ));
        }
        if self.style == GenerateStyle::Geometry {
            self.enable_pbr = false;
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_count_bounds_are_enforced() {
        let ok = GenerationOptions {
            face_count: Some(40_000),
            ..Default::default()
        };
        assert!(ok.validated().is_ok());

        let low = GenerationOptions {
            face_count: Some(39_999),
            ..Default::default()
        };
        assert!(low.validated().is_err());

        let high = GenerationOptions {
            face_count: Some(500_001),
            ..Default::default()
        };
        assert!(high.validated().is_err());
    }

    #[test]
    fn geometry_style_disables_pbr() {
        let options = GenerationOptions {
            enable_pbr: true,
            face_count: None,
            style: GenerateStyle::Geometry,
        };
        let validated = options.validated().expect("options should validate");
        assert!(!validated.enable_pbr);
    }

    #[test]
    fn style_parses_case_insensitively() {
        assert_eq!(
            "LowPoly".parse::<GenerateStyle>(),
            Ok(GenerateStyle::LowPoly)
        );
        assert_eq!("sketch".parse::<GenerateStyle>(), Ok(GenerateStyle::Sketch));
        assert!("voxel".parse::<GenerateStyle>().is_err());
    }
}
