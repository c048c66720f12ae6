// ============================================================================
// reelfix-core/src/processing/media_properties.rs
// ============================================================================
//
// MEDIA PROPERTIES: Probed Attributes of the Primary Video Stream
//
// The probe adapter fills a MediaProperties from ffprobe output; the decision
// engine reads it. Anything the probe could not determine stays at its
// "unknown" value (zero dimensions, None), which the decision engine treats
// conservatively.

use std::fmt;
use std::str::FromStr;

/// A `num:den` ratio as reported by ffprobe for SAR/DAR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AspectRatio {
    pub num: u32,
    pub den: u32,
}

impl AspectRatio {
    pub fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    /// True for a usable non-square ratio: both terms positive and unequal.
    ///
    /// `0:1` is ffprobe's "undefined" and never counts as non-square.
    pub fn is_non_square(&self) -> bool {
        self.num > 0 && self.den > 0 && self.num != self.den
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.num, self.den)
    }
}

impl FromStr for AspectRatio {
    type Err = ();

    /// Parses `N:D` (ffprobe also writes `N/D` in some builds).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (num, den) = s.split_once(':').or_else(|| s.split_once('/')).ok_or(())?;
        let num = num.trim().parse::<u32>().map_err(|_| ())?;
        let den = den.trim().parse::<u32>().map_err(|_| ())?;
        Ok(Self { num, den })
    }
}

/// Attributes of a file's first video stream.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MediaProperties {
    pub width: u32,
    pub height: u32,
    /// Sample aspect ratio; `None` when absent, `N/A` or malformed.
    pub sar: Option<AspectRatio>,
    /// Display aspect ratio, kept verbatim for logging.
    pub dar: Option<String>,
    /// Lower-case codec name, e.g. `h264`.
    pub codec: Option<String>,
}

impl MediaProperties {
    /// Both dimensions are known.
    pub fn has_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl fmt::Display for MediaProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)?;
        if let Some(sar) = self.sar {
            write!(f, " SAR {sar}")?;
        }
        if let Some(dar) = &self.dar {
            write!(f, " DAR {dar}")?;
        }
        if let Some(codec) = &self.codec {
            write!(f, " {codec}")?;
        }
        Ok(())
    }
}
