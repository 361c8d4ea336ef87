//! Dimension role classification.
//!
//! ROMS output names its axes by convention (`ocean_time`, `s_rho`,
//! `eta_rho`, `xi_u`, ...). Roles are assigned once when the catalog opens,
//! so nothing downstream has to match on names again.

use std::fmt;

/// What a dimension represents in an ocean-model grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionRole {
    /// Temporal axis.
    Time,
    /// Vertical levels (sigma layers, sediment beds, depth).
    Vertical,
    /// First horizontal axis (rows, ROMS `eta_*`).
    HorizontalY,
    /// Second horizontal axis (columns, ROMS `xi_*`).
    HorizontalX,
}

impl DimensionRole {
    /// Classify a dimension by its declared name.
    ///
    /// Returns `None` for names outside the allow-list.
    pub fn classify(name: &str) -> Option<Self> {
        match name {
            "ocean_time" | "time" => Some(Self::Time),
            "s_rho" | "s_w" | "Nbed" | "depth" | "z" | "level" => Some(Self::Vertical),
            "y" | "lat" | "latitude" => Some(Self::HorizontalY),
            "x" | "lon" | "longitude" => Some(Self::HorizontalX),
            _ if name.ends_with("_time") => Some(Self::Time),
            _ if name.starts_with("eta_") => Some(Self::HorizontalY),
            _ if name.starts_with("xi_") => Some(Self::HorizontalX),
            _ => None,
        }
    }

    /// Whether this is one of the two horizontal axes.
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Self::HorizontalY | Self::HorizontalX)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Vertical => "vertical",
            Self::HorizontalY => "horizontal-y",
            Self::HorizontalX => "horizontal-x",
        }
    }
}

impl fmt::Display for DimensionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A named dimension with its length and classified role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dimension {
    pub name: String,
    pub len: usize,
    pub role: Option<DimensionRole>,
}

impl Dimension {
    /// Create a dimension, classifying its role from the name.
    pub fn new(name: impl Into<String>, len: usize) -> Self {
        let name = name.into();
        let role = DimensionRole::classify(&name);
        Self { name, len, role }
    }

    pub fn is_time(&self) -> bool {
        self.role == Some(DimensionRole::Time)
    }
}
