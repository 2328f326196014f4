//! The record handed to the persistence and notification collaborators
//! once a quote is submitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calculations::{PricedQuote, QuoteBreakdown};
use crate::models::{ContactInfo, DeliveryAddress, NewQuoteRecord};

const REFERENCE_PREFIX: &str = "SW";
const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Builds a customer-facing reference such as `SW-MBX3K2QF-7Q2A`.
///
/// The middle part is the submission time in milliseconds, the suffix four
/// base-36 characters taken from `entropy`.
pub fn reference_number(
    submitted_at: DateTime<Utc>,
    entropy: u32,
) -> String {
    let millis = u64::try_from(submitted_at.timestamp_millis()).unwrap_or_default();
    let suffix = format!("{:0>4}", to_base36(u64::from(entropy) % 36u64.pow(4)));
    format!("{REFERENCE_PREFIX}-{}-{suffix}", to_base36(millis))
}

/// A completed quote, ready to be stored and confirmed to the customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSubmission {
    pub reference_number: String,
    pub contact: ContactInfo,
    pub delivery_address: DeliveryAddress,
    pub photos: Vec<String>,
    pub quote: PricedQuote,
}

impl QuoteSubmission {
    /// Breakdown rounded to cents, as stored and emailed.
    pub fn rounded_breakdown(&self) -> QuoteBreakdown {
        self.quote.breakdown.rounded()
    }

    /// Converts to the persistence shape. Money is rounded to cents; the
    /// tax rate is stored exactly.
    pub fn to_new_record(&self) -> NewQuoteRecord {
        let breakdown = self.rounded_breakdown();
        let selection = &self.quote.selection;

        NewQuoteRecord {
            reference_number: self.reference_number.clone(),
            service_area: selection.area,
            material: selection.material,
            size: selection.size,
            rental_period: selection.rental_period,
            payment_method: selection.payment,
            customer_name: self.contact.name.trim().to_string(),
            customer_email: self.contact.email.trim().to_string(),
            customer_phone: self.contact.phone.trim().to_string(),
            delivery_address: self.delivery_address.address.clone(),
            delivery_lat: Some(self.delivery_address.coordinates.lat),
            delivery_lng: Some(self.delivery_address.coordinates.lng),
            photos: self.photos.clone(),
            base_price: breakdown.subtotal,
            duration_modifier: breakdown.duration_modifier,
            tax_amount: breakdown.tax,
            tax_rate: breakdown.tax_rate,
            county: self.quote.tax.county_label.clone(),
            referral_discount: breakdown.applied_discount,
            total_price: breakdown.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn base36_encodes_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "Z");
        assert_eq!(to_base36(36), "10");
        assert_eq!(to_base36(1_295), "ZZ");
    }

    #[test]
    fn reference_number_has_prefix_time_and_padded_suffix() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

        let reference = reference_number(at, 5);

        assert_eq!(reference, format!("SW-{}-0005", to_base36(1_700_000_000_000)));
    }

    #[test]
    fn reference_suffix_is_always_four_characters() {
        let at = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

        let reference = reference_number(at, u32::MAX);

        let suffix = reference.rsplit('-').next().unwrap();
        assert_eq!(suffix.len(), 4);
    }
}
