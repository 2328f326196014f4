use serde::{Deserialize, Serialize};

/// Settlement channel. Card prices carry processing fees, so the price
/// table orders them credit > debit > cash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    Cash,
    Debit,
    Credit,
}

impl PaymentMethod {
    pub const ALL: [Self; 3] = [Self::Cash, Self::Debit, Self::Credit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(Self::Cash),
            "debit" => Some(Self::Debit),
            "credit" => Some(Self::Credit),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Debit => "Debit Card",
            Self::Credit => "Credit Card",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Cash => "Best price",
            Self::Debit => "Includes tax",
            Self::Credit => "Includes tax + processing",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
