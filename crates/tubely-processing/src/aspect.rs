//! Aspect-ratio classification of video streams.

use std::fmt;

use crate::error::DimensionError;

const LANDSCAPE_RATIO: f64 = 16.0 / 9.0;
const PORTRAIT_RATIO: f64 = 9.0 / 16.0;
const TOLERANCE: f64 = 0.1;

/// Orientation bucket a video is filed under in object storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AspectClass {
    Landscape,
    Portrait,
    Other,
}

impl AspectClass {
    /// Object-key prefix, including the trailing slash.
    pub fn prefix(&self) -> &'static str {
        match self {
            AspectClass::Landscape => "landscape/",
            AspectClass::Portrait => "portrait/",
            AspectClass::Other => "other/",
        }
    }
}

impl fmt::Display for AspectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AspectClass::Landscape => "landscape",
            AspectClass::Portrait => "portrait",
            AspectClass::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Classify a frame size as 16:9, 9:16 or anything else.
///
/// Both dimensions must be positive.
pub fn classify(width: i64, height: i64) -> Result<AspectClass, DimensionError> {
    if width <= 0 || height <= 0 {
        return Err(DimensionError { width, height });
    }

    let ratio = width as f64 / height as f64;
    if (ratio - LANDSCAPE_RATIO).abs() <= TOLERANCE {
        Ok(AspectClass::Landscape)
    } else if (ratio - PORTRAIT_RATIO).abs() <= TOLERANCE {
        Ok(AspectClass::Portrait)
    } else {
        Ok(AspectClass::Other)
    }
}
