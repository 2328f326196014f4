use serde::{Deserialize, Serialize};

/// Geographic pricing zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceArea {
    NassauSuffolk,
    EastRiverhead,
}

impl ServiceArea {
    pub const ALL: [Self; 2] = [Self::NassauSuffolk, Self::EastRiverhead];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NassauSuffolk => "nassau-suffolk",
            Self::EastRiverhead => "east-riverhead",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "nassau-suffolk" => Some(Self::NassauSuffolk),
            "east-riverhead" => Some(Self::EastRiverhead),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NassauSuffolk => "Nassau/Suffolk County",
            Self::EastRiverhead => "East of Riverhead",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::NassauSuffolk => "Main service area",
            Self::EastRiverhead => "Extended service area",
        }
    }
}

impl std::fmt::Display for ServiceArea {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
