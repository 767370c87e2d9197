use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Ball position as reported over the data channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CoordinatePair {
    pub x: i32,
    pub y: i32,
}

impl CoordinatePair {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Per-axis absolute distance to another pair.
    pub fn abs_diff(self, other: CoordinatePair) -> (u32, u32) {
        (self.x.abs_diff(other.x), self.y.abs_diff(other.y))
    }
}

impl From<(i32, i32)> for CoordinatePair {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoordinateParseError {
    #[error("coordinate message is not valid UTF-8")]
    Utf8,
    #[error("expected \"x,y\", got {0:?}")]
    MissingSeparator(String),
    #[error("invalid {axis} component {value:?}")]
    InvalidComponent { axis: char, value: String },
}

/// `"x,y"`: base-10 integers, no whitespace.
impl fmt::Display for CoordinatePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for CoordinatePair {
    type Err = CoordinateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| CoordinateParseError::MissingSeparator(s.to_owned()))?;

        Ok(Self {
            x: parse_component('x', x)?,
            y: parse_component('y', y)?,
        })
    }
}

impl TryFrom<&[u8]> for CoordinatePair {
    type Error = CoordinateParseError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let text = std::str::from_utf8(bytes).map_err(|_| CoordinateParseError::Utf8)?;
        text.parse()
    }
}

fn parse_component(axis: char, value: &str) -> Result<i32, CoordinateParseError> {
    let invalid = || CoordinateParseError::InvalidComponent {
        axis,
        value: value.to_owned(),
    };

    // i32::from_str accepts a leading '+', the wire format does not.
    if value.starts_with('+') {
        return Err(invalid());
    }
    value.parse().map_err(|_| invalid())
}
