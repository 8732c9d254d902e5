//! Named 7-color ramps, low to high.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Colors per palette
pub const PALETTE_SIZE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    #[default]
    Energy,
    Temperature,
    Traffic,
    Rainbow,
}

impl Palette {
    pub const ALL: [Palette; 4] = [
        Palette::Energy,
        Palette::Temperature,
        Palette::Traffic,
        Palette::Rainbow,
    ];

    pub fn colors(self) -> [&'static str; PALETTE_SIZE] {
        match self {
            Palette::Energy => [
                "#1a9850", "#66bd63", "#a6d96a", "#fee08b", "#fdae61", "#f46d43", "#d73027",
            ],
            Palette::Temperature => [
                "#313695", "#4575b4", "#74add1", "#fee090", "#f46d43", "#d73027", "#a50026",
            ],
            Palette::Traffic => [
                "#00a651", "#8dc63f", "#fff200", "#fbb040", "#f7941d", "#ed1c24", "#7f0000",
            ],
            Palette::Rainbow => [
                "#6e40aa", "#4c6edb", "#23abd8", "#1ddfa3", "#52f667", "#aff05b", "#fe4b83",
            ],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Palette::Energy => "energy",
            Palette::Temperature => "temperature",
            Palette::Traffic => "traffic",
            Palette::Rainbow => "rainbow",
        }
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Palette {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Palette::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown palette: {}", s))
    }
}
