//! JSON input files for the `quote`, `submit` and `route` commands.
//!
//! ## Quote requests
//!
//! A quote file is either a request object that answers every wizard step:
//!
//! | Field               | Required | Notes                                        |
//! |---------------------|----------|----------------------------------------------|
//! | `area`              | yes      | `nassau-suffolk` or `east-riverhead`         |
//! | `address`           | yes      | geocoded address with `components`           |
//! | `material`          | yes      | e.g. `trees-brush`                           |
//! | `size`              | yes      | `"5"`, `"10"`, ... `"40"` (cubic yards)       |
//! | `rental_period`     | no       | `3-day`, `7-day` (default), `14-day`, `30-day` |
//! | `payment`           | yes      | `cash`, `debit` or `credit`                  |
//! | `contact`           | submit   | `name`, `email`, `phone`                     |
//! | `photos`            | no       | up to 5 references                           |
//! | `referral_discount` | no       | requested credit, default 0                  |
//!
//! or a list of raw wizard commands, replayed in order:
//!
//! ```json
//! [
//!   {"command": "set-delivery-address", "value": {"address": "1 Main St", "coordinates": {"lat": 40.9, "lng": -72.6}}},
//!   {"command": "select-service-area", "value": "nassau-suffolk"},
//!   {"command": "select-material", "value": "trees-brush"}
//! ]
//! ```
//!
//! ## Route inputs
//!
//! The schedule is a list of delivery stops. Directions, when supplied, are
//! the collaborator's `{"legs": [...]}` response for the final stop order.

use std::path::Path;

use anyhow::{Context, Result};
use dumpster_core::{
    ContactInfo, DeliveryAddress, MaterialType, PaymentMethod, QuoteCatalog, QuoteWizard,
    RentalPeriod, ServiceArea, SizeClass, WizardCommand, WizardError,
};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Answers for every wizard step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub area: ServiceArea,
    pub address: Option<DeliveryAddress>,
    pub material: MaterialType,
    pub size: SizeClass,
    #[serde(default)]
    pub rental_period: RentalPeriod,
    pub payment: PaymentMethod,
    #[serde(default)]
    pub contact: Option<ContactInfo>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub referral_discount: Decimal,
}

impl QuoteRequest {
    /// The commands a customer would issue to fill in this request.
    pub fn commands(&self) -> Vec<WizardCommand> {
        let mut commands = vec![
            WizardCommand::SetDeliveryAddress(self.address.clone()),
            WizardCommand::SelectServiceArea(self.area),
            WizardCommand::SelectMaterial(self.material),
            WizardCommand::SelectSize(self.size),
            WizardCommand::SetRentalPeriod(self.rental_period),
            WizardCommand::SetPaymentMethod(self.payment),
        ];
        if let Some(contact) = &self.contact {
            commands.push(WizardCommand::Next);
            commands.push(WizardCommand::SubmitContact(contact.clone()));
        }
        commands.extend(self.photos.iter().cloned().map(WizardCommand::AddPhoto));
        if !self.referral_discount.is_zero() {
            commands.push(WizardCommand::SetReferralDiscount(self.referral_discount));
        }
        commands
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuoteInput {
    Commands(Vec<WizardCommand>),
    Request(Box<QuoteRequest>),
}

impl QuoteInput {
    pub fn into_commands(self) -> Vec<WizardCommand> {
        match self {
            QuoteInput::Commands(commands) => commands,
            QuoteInput::Request(request) => request.commands(),
        }
    }
}

/// Replays `commands` against a fresh wizard, stopping at the first
/// rejected command.
pub fn run_wizard(
    catalog: &QuoteCatalog,
    commands: impl IntoIterator<Item = WizardCommand>,
) -> Result<QuoteWizard<'_>, WizardError> {
    let mut wizard = QuoteWizard::new(catalog);
    for command in commands {
        let step = wizard.apply(command)?;
        debug!(%step, "wizard step");
    }
    Ok(wizard)
}

/// Reads and deserializes a JSON file.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to open: {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse JSON: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use dumpster_core::{Coordinates, WizardStep};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn suffolk_address() -> DeliveryAddress {
        DeliveryAddress::new(
            "12 Oak St, Riverhead, NY",
            Coordinates::new(40.917, -72.662),
            [(
                "administrative_area_level_2".to_string(),
                "Suffolk County".to_string(),
            )]
            .into_iter()
            .collect(),
        )
    }

    fn request() -> QuoteRequest {
        QuoteRequest {
            area: ServiceArea::NassauSuffolk,
            address: Some(suffolk_address()),
            material: MaterialType::TreesBrush,
            size: SizeClass::Yards10,
            rental_period: RentalPeriod::FourteenDay,
            payment: PaymentMethod::Cash,
            contact: None,
            photos: Vec::new(),
            referral_discount: Decimal::ZERO,
        }
    }

    // =========================================================================
    // Request replay
    // =========================================================================

    #[test]
    fn request_without_contact_stops_at_duration() {
        let catalog = QuoteCatalog::standard();

        let wizard = run_wizard(&catalog, request().commands()).unwrap();

        assert_eq!(wizard.step(), WizardStep::Duration);
        assert_eq!(wizard.running_price(), Some(dec!(575)));
    }

    #[test]
    fn request_with_contact_reaches_review() {
        let catalog = QuoteCatalog::standard();
        let mut req = request();
        req.contact = Some(ContactInfo::new("Pat Doe", "pat@example.com", "631-555-0100"));
        req.photos = vec!["yard.jpg".to_string()];
        req.referral_discount = dec!(25);

        let wizard = run_wizard(&catalog, req.commands()).unwrap();

        assert_eq!(wizard.step(), WizardStep::Review);
        assert_eq!(wizard.draft().photos().to_vec(), vec!["yard.jpg".to_string()]);
        assert_eq!(wizard.draft().referral_discount(), dec!(25));
    }

    #[test]
    fn missing_address_keeps_wizard_on_first_step() {
        let catalog = QuoteCatalog::standard();
        let mut req = request();
        req.address = None;

        let wizard = run_wizard(&catalog, req.commands()).unwrap();

        assert_eq!(wizard.step(), WizardStep::ServiceArea);
    }

    #[test]
    fn unsupported_size_is_rejected() {
        let catalog = QuoteCatalog::standard();
        let mut req = request();
        req.size = SizeClass::Yards5;

        let result = run_wizard(&catalog, req.commands());

        assert!(matches!(result, Err(WizardError::SizeUnavailable { .. })));
    }

    // =========================================================================
    // JSON shapes
    // =========================================================================

    #[test]
    fn request_json() {
        let json = r#"{
            "area": "nassau-suffolk",
            "address": {
                "address": "12 Oak St, Riverhead, NY",
                "coordinates": {"lat": 40.917, "lng": -72.662},
                "components": {"administrative_area_level_2": "Suffolk County"}
            },
            "material": "trees-brush",
            "size": "10",
            "rental_period": "14-day",
            "payment": "cash"
        }"#;

        let input: QuoteInput = serde_json::from_str(json).unwrap();

        assert_eq!(input, QuoteInput::Request(Box::new(request())));
    }

    #[test]
    fn command_list_json() {
        let json = r#"[
            {"command": "select-service-area", "value": "east-riverhead"},
            {"command": "next"},
            {"command": "set-referral-discount", "value": "10.50"}
        ]"#;

        let input: QuoteInput = serde_json::from_str(json).unwrap();

        assert_eq!(
            input.into_commands(),
            vec![
                WizardCommand::SelectServiceArea(ServiceArea::EastRiverhead),
                WizardCommand::Next,
                WizardCommand::SetReferralDiscount(dec!(10.50)),
            ]
        );
    }
}
