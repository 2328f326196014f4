use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{MaterialType, PaymentMethod, RentalPeriod, ServiceArea, SizeClass};

/// Lifecycle of a submitted quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuoteStatus {
    #[default]
    Pending,
    Confirmed,
    Scheduled,
    Delivered,
    PickedUp,
    Cancelled,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Scheduled => "scheduled",
            Self::Delivered => "delivered",
            Self::PickedUp => "picked-up",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "scheduled" => Some(Self::Scheduled),
            "delivered" => Some(Self::Delivered),
            "picked-up" => Some(Self::PickedUp),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether a quote in this status may move to `next`. Any open quote
    /// can be cancelled; otherwise the lifecycle only moves forward one step.
    pub fn can_transition_to(
        &self,
        next: Self,
    ) -> bool {
        use QuoteStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Confirmed, Scheduled)
                | (Scheduled, Delivered)
                | (Delivered, PickedUp)
                | (Pending | Confirmed | Scheduled, Cancelled)
        )
    }
}

/// A stored quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRecord {
    pub id: i64,
    pub reference_number: String,
    pub status: QuoteStatus,

    // Selections
    pub service_area: ServiceArea,
    pub material: MaterialType,
    pub size: SizeClass,
    pub rental_period: RentalPeriod,
    pub payment_method: PaymentMethod,

    // Customer
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub delivery_lat: Option<f64>,
    pub delivery_lng: Option<f64>,
    pub photos: Vec<String>,

    // Calculated values
    pub base_price: Decimal,
    pub duration_modifier: Decimal,
    pub tax_amount: Decimal,
    pub tax_rate: Decimal,
    pub county: String,
    pub referral_discount: Decimal,
    pub total_price: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For creating new quotes (no id, status or timestamps)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewQuoteRecord {
    pub reference_number: String,
    pub service_area: ServiceArea,
    pub material: MaterialType,
    pub size: SizeClass,
    pub rental_period: RentalPeriod,
    pub payment_method: PaymentMethod,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub delivery_lat: Option<f64>,
    pub delivery_lng: Option<f64>,
    pub photos: Vec<String>,
    pub base_price: Decimal,
    pub duration_modifier: Decimal,
    pub tax_amount: Decimal,
    pub tax_rate: Decimal,
    pub county: String,
    pub referral_discount: Decimal,
    pub total_price: Decimal,
}
