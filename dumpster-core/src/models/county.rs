use serde::{Deserialize, Serialize};

/// Sales-tax jurisdiction. An address whose county cannot be determined is
/// represented as `Option<County>::None` by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum County {
    Nassau,
    Suffolk,
}

impl County {
    /// Scan order used by county detection.
    pub const ALL: [Self; 2] = [Self::Nassau, Self::Suffolk];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nassau => "nassau",
            Self::Suffolk => "suffolk",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nassau" => Some(Self::Nassau),
            "suffolk" => Some(Self::Suffolk),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Nassau => "Nassau County",
            Self::Suffolk => "Suffolk County",
        }
    }
}

impl std::fmt::Display for County {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
