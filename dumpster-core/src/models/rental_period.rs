use serde::{Deserialize, Serialize};

/// Rental duration tier. Prices in the table assume the 7-day tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum RentalPeriod {
    #[serde(rename = "3-day")]
    ThreeDay,
    #[default]
    #[serde(rename = "7-day")]
    SevenDay,
    #[serde(rename = "14-day")]
    FourteenDay,
    #[serde(rename = "30-day")]
    ThirtyDay,
}

impl RentalPeriod {
    pub const ALL: [Self; 4] = [Self::ThreeDay, Self::SevenDay, Self::FourteenDay, Self::ThirtyDay];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ThreeDay => "3-day",
            Self::SevenDay => "7-day",
            Self::FourteenDay => "14-day",
            Self::ThirtyDay => "30-day",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }

    pub fn days(&self) -> u32 {
        match self {
            Self::ThreeDay => 3,
            Self::SevenDay => 7,
            Self::FourteenDay => 14,
            Self::ThirtyDay => 30,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ThreeDay => "3 Days",
            Self::SevenDay => "7 Days",
            Self::FourteenDay => "14 Days",
            Self::ThirtyDay => "30 Days",
        }
    }
}

impl std::fmt::Display for RentalPeriod {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
