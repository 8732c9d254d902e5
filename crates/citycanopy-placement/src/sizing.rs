//! Tree dimensions derived from a total height.

use serde::{Deserialize, Serialize};

/// Share of the total height taken by the trunk
pub const TRUNK_HEIGHT_FRACTION: f64 = 0.4;
/// Share of the total height taken by the canopy
pub const CANOPY_HEIGHT_FRACTION: f64 = 0.6;

/// Trunk radius used by [`TreeSizing::Fixed`]
pub const FIXED_TRUNK_SIZE: f64 = 0.4;
/// Canopy radius used by [`TreeSizing::Fixed`]
pub const FIXED_CANOPY_SIZE: f64 = 2.5;

/// How footprint sizes follow from height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeSizing {
    /// Footprints scale with the total height, within clamps
    #[default]
    Proportional,
    /// Constant trunk and canopy radii
    Fixed,
}

/// Heights and footprint sizes (meters) for one tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeDimensions {
    pub total_height: f64,
    pub trunk_height: f64,
    pub canopy_height: f64,
    pub trunk_size: f64,
    pub canopy_size: f64,
}

impl TreeSizing {
    pub fn dimensions(self, total_height: f64) -> TreeDimensions {
        let (trunk_size, canopy_size) = match self {
            TreeSizing::Proportional => (
                (total_height * 0.025).clamp(0.15, 0.8),
                (total_height * 0.18).clamp(1.0, 6.0),
            ),
            TreeSizing::Fixed => (FIXED_TRUNK_SIZE, FIXED_CANOPY_SIZE),
        };

        TreeDimensions {
            total_height,
            trunk_height: total_height * TRUNK_HEIGHT_FRACTION,
            canopy_height: total_height * CANOPY_HEIGHT_FRACTION,
            trunk_size,
            canopy_size,
        }
    }
}
