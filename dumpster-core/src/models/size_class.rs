use serde::{Deserialize, Serialize};

/// Container capacity in cubic yards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SizeClass {
    #[serde(rename = "5")]
    Yards5,
    #[serde(rename = "10")]
    Yards10,
    #[serde(rename = "15")]
    Yards15,
    #[serde(rename = "20")]
    Yards20,
    #[serde(rename = "30")]
    Yards30,
    #[serde(rename = "40")]
    Yards40,
}

impl SizeClass {
    pub const ALL: [Self; 6] = [
        Self::Yards5,
        Self::Yards10,
        Self::Yards15,
        Self::Yards20,
        Self::Yards30,
        Self::Yards40,
    ];

    pub fn cubic_yards(&self) -> u32 {
        match self {
            Self::Yards5 => 5,
            Self::Yards10 => 10,
            Self::Yards15 => 15,
            Self::Yards20 => 20,
            Self::Yards30 => 30,
            Self::Yards40 => 40,
        }
    }

    pub fn from_cubic_yards(yards: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.cubic_yards() == yards)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yards5 => "5",
            Self::Yards10 => "10",
            Self::Yards15 => "15",
            Self::Yards20 => "20",
            Self::Yards30 => "30",
            Self::Yards40 => "40",
        }
    }

    /// Accepts `"20"` as well as `"20yd"` / `"20 yd"`.
    pub fn parse(s: &str) -> Option<Self> {
        let digits = s.trim().trim_end_matches("yd").trim();
        digits.parse().ok().and_then(Self::from_cubic_yards)
    }
}

impl std::fmt::Display for SizeClass {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        write!(f, "{} yd", self.cubic_yards())
    }
}
