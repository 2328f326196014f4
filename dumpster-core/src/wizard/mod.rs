//! The six-step quote wizard.
//!
//! A [`QuoteWizard`] owns one [`QuoteDraft`] and borrows the pricing
//! [`QuoteCatalog`]. The draft is changed only through [`WizardCommand`]s so
//! every transition goes through the same checks:
//!
//! | Step | Requires to advance |
//! |------|---------------------|
//! | 1 Service area | area and delivery address |
//! | 2 Material | material offered in the area |
//! | 3 Size | size priced for the material |
//! | 4 Duration | rental period |
//! | 5 Contact | valid stored contact |
//! | 6 Review | payment method, fully priced combination |
//!
//! Area, material and size are "select and advance" commands. Rental period
//! and payment method are plain setters so the customer can compare prices
//! before moving on.

mod submission;
mod validation;

pub use submission::{QuoteSubmission, reference_number};
pub use validation::{
    ContactErrors, ContactField, PHONE_DIGITS, is_valid_email, is_valid_phone, validate_contact,
};

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::calculations::{PricedQuote, PricingError, QuoteCatalog, QuoteSelection, detect_county};
use crate::models::{
    ContactInfo, County, DeliveryAddress, MaterialType, PaymentMethod, RentalPeriod, ServiceArea,
    SizeClass,
};

/// Most photo references a draft may carry.
pub const MAX_PHOTOS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    ServiceArea,
    Material,
    Size,
    Duration,
    Contact,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 6] = [
        Self::ServiceArea,
        Self::Material,
        Self::Size,
        Self::Duration,
        Self::Contact,
        Self::Review,
    ];

    /// One-based position shown to the customer.
    pub fn number(&self) -> u8 {
        match self {
            Self::ServiceArea => 1,
            Self::Material => 2,
            Self::Size => 3,
            Self::Duration => 4,
            Self::Contact => 5,
            Self::Review => 6,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == n)
    }

    pub fn next(&self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn previous(&self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::ServiceArea => "Service Area",
            Self::Material => "Material",
            Self::Size => "Dumpster Size",
            Self::Duration => "Rental Duration",
            Self::Contact => "Contact Info",
            Self::Review => "Review & Submit",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{} ({})", self.title(), self.number())
    }
}

/// Customer selections gathered by the wizard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteDraft {
    step: WizardStep,
    service_area: Option<ServiceArea>,
    delivery_address: Option<DeliveryAddress>,
    material: Option<MaterialType>,
    size: Option<SizeClass>,
    rental_period: RentalPeriod,
    payment_method: Option<PaymentMethod>,
    contact: ContactInfo,
    photos: Vec<String>,
    referral_discount: Decimal,
}

impl Default for QuoteDraft {
    fn default() -> Self {
        Self {
            step: WizardStep::ServiceArea,
            service_area: None,
            delivery_address: None,
            material: None,
            size: None,
            rental_period: RentalPeriod::SevenDay,
            payment_method: None,
            contact: ContactInfo::default(),
            photos: Vec::new(),
            referral_discount: Decimal::ZERO,
        }
    }
}

impl QuoteDraft {
    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn service_area(&self) -> Option<ServiceArea> {
        self.service_area
    }

    pub fn delivery_address(&self) -> Option<&DeliveryAddress> {
        self.delivery_address.as_ref()
    }

    pub fn material(&self) -> Option<MaterialType> {
        self.material
    }

    pub fn size(&self) -> Option<SizeClass> {
        self.size
    }

    pub fn rental_period(&self) -> RentalPeriod {
        self.rental_period
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn photos(&self) -> &[String] {
        &self.photos
    }

    /// Requested referral credit. The applied amount may be smaller.
    pub fn referral_discount(&self) -> Decimal {
        self.referral_discount
    }
}

/// Every way a draft can change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "kebab-case")]
pub enum WizardCommand {
    /// Select and advance.
    SelectServiceArea(ServiceArea),
    SetDeliveryAddress(Option<DeliveryAddress>),
    /// Select and advance.
    SelectMaterial(MaterialType),
    /// Select and advance.
    SelectSize(SizeClass),
    SetRentalPeriod(RentalPeriod),
    SetPaymentMethod(PaymentMethod),
    /// Validates and stores contact fields, advancing on success.
    SubmitContact(ContactInfo),
    AddPhoto(String),
    RemovePhoto(usize),
    SetReferralDiscount(Decimal),
    Next,
    Back,
    GoTo(WizardStep),
    Reset,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("step {0} is incomplete")]
    StepIncomplete(WizardStep),

    #[error("invalid contact details: {0}")]
    InvalidContact(ContactErrors),

    #[error("{material} is not offered in {area}")]
    MaterialUnavailable {
        area: ServiceArea,
        material: MaterialType,
    },

    #[error("{size} {material} is not offered in {area}")]
    SizeUnavailable {
        area: ServiceArea,
        material: MaterialType,
        size: SizeClass,
    },

    #[error("no {0} selected")]
    MissingSelection(&'static str),

    #[error("review is the last step")]
    NoNextStep,

    #[error("a quote may carry at most {max} photos")]
    TooManyPhotos { max: usize },

    #[error("no photo at index {0}")]
    PhotoIndexOutOfRange(usize),

    #[error("referral discount cannot be negative: {0}")]
    NegativeDiscount(Decimal),

    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// One quoting session.
#[derive(Debug, Clone)]
pub struct QuoteWizard<'a> {
    catalog: &'a QuoteCatalog,
    draft: QuoteDraft,
}

impl<'a> QuoteWizard<'a> {
    pub fn new(catalog: &'a QuoteCatalog) -> Self {
        Self {
            catalog,
            draft: QuoteDraft::default(),
        }
    }

    pub fn draft(&self) -> &QuoteDraft {
        &self.draft
    }

    pub fn step(&self) -> WizardStep {
        self.draft.step
    }

    pub fn catalog(&self) -> &'a QuoteCatalog {
        self.catalog
    }

    /// Whether `step`'s required fields are complete.
    pub fn can_advance(
        &self,
        step: WizardStep,
    ) -> bool {
        let d = &self.draft;
        let resolver = self.catalog.resolver();

        match step {
            WizardStep::ServiceArea => d.service_area.is_some() && d.delivery_address.is_some(),
            WizardStep::Material => match (d.service_area, d.material) {
                (Some(area), Some(material)) => !resolver.available_sizes(area, material).is_empty(),
                _ => false,
            },
            WizardStep::Size => match (d.service_area, d.material, d.size) {
                (Some(area), Some(material), Some(size)) => resolver.is_available(area, material, size),
                _ => false,
            },
            WizardStep::Duration => true,
            WizardStep::Contact => validate_contact(&d.contact).is_ok(),
            WizardStep::Review => self
                .selection()
                .is_ok_and(|s| resolver.resolve_base_price(s.area, s.material, s.size, s.payment).is_some()),
        }
    }

    /// Applies `command` and returns the step the wizard is on afterwards.
    ///
    /// A rejected command leaves the draft unchanged.
    pub fn apply(
        &mut self,
        command: WizardCommand,
    ) -> Result<WizardStep, WizardError> {
        debug!(step = %self.draft.step, ?command, "applying wizard command");

        match command {
            WizardCommand::SelectServiceArea(area) => {
                self.select_service_area(area);
                self.rewind_to_incomplete();
                self.advance_from(WizardStep::ServiceArea);
            }
            WizardCommand::SetDeliveryAddress(address) => {
                self.draft.delivery_address = address;
                self.rewind_to_incomplete();
            }
            WizardCommand::SelectMaterial(material) => {
                self.select_material(material)?;
                self.rewind_to_incomplete();
                self.advance_from(WizardStep::Material);
            }
            WizardCommand::SelectSize(size) => {
                self.select_size(size)?;
                self.advance_from(WizardStep::Size);
            }
            WizardCommand::SetRentalPeriod(period) => {
                self.draft.rental_period = period;
            }
            WizardCommand::SetPaymentMethod(payment) => {
                self.draft.payment_method = Some(payment);
            }
            WizardCommand::SubmitContact(contact) => {
                validate_contact(&contact).map_err(WizardError::InvalidContact)?;
                self.draft.contact = contact;
                self.advance_from(WizardStep::Contact);
            }
            WizardCommand::AddPhoto(photo) => {
                if self.draft.photos.len() >= MAX_PHOTOS {
                    return Err(WizardError::TooManyPhotos { max: MAX_PHOTOS });
                }
                self.draft.photos.push(photo);
            }
            WizardCommand::RemovePhoto(index) => {
                if index >= self.draft.photos.len() {
                    return Err(WizardError::PhotoIndexOutOfRange(index));
                }
                self.draft.photos.remove(index);
            }
            WizardCommand::SetReferralDiscount(amount) => {
                if amount < Decimal::ZERO {
                    return Err(WizardError::NegativeDiscount(amount));
                }
                self.draft.referral_discount = amount;
            }
            WizardCommand::Next => {
                let current = self.draft.step;
                let next = current.next().ok_or(WizardError::NoNextStep)?;
                if let Some(step) = self.first_incomplete(next) {
                    return Err(WizardError::StepIncomplete(step));
                }
                self.draft.step = next;
            }
            WizardCommand::Back => {
                if let Some(previous) = self.draft.step.previous() {
                    self.draft.step = previous;
                }
            }
            WizardCommand::GoTo(target) => {
                if target > self.draft.step {
                    if let Some(step) = self.first_incomplete(target) {
                        return Err(WizardError::StepIncomplete(step));
                    }
                }
                self.draft.step = target;
            }
            WizardCommand::Reset => self.reset(),
        }

        Ok(self.draft.step)
    }

    pub fn reset(&mut self) {
        self.draft = QuoteDraft::default();
    }

    /// County detected from the delivery address, if any.
    pub fn county(&self) -> Option<County> {
        self.draft
            .delivery_address
            .as_ref()
            .and_then(|a| detect_county(&a.components))
    }

    /// The complete selection, or the first missing piece.
    pub fn selection(&self) -> Result<QuoteSelection, WizardError> {
        let d = &self.draft;
        Ok(QuoteSelection {
            area: d.service_area.ok_or(WizardError::MissingSelection("service area"))?,
            material: d.material.ok_or(WizardError::MissingSelection("material"))?,
            size: d.size.ok_or(WizardError::MissingSelection("size"))?,
            payment: d.payment_method.ok_or(WizardError::MissingSelection("payment method"))?,
            rental_period: d.rental_period,
        })
    }

    /// Running price shown while choosing: base price for the chosen payment
    /// method (cash until one is chosen) plus the duration modifier.
    pub fn running_price(&self) -> Option<Decimal> {
        let d = &self.draft;
        let selection = QuoteSelection {
            area: d.service_area?,
            material: d.material?,
            size: d.size?,
            payment: d.payment_method.unwrap_or(PaymentMethod::Cash),
            rental_period: d.rental_period,
        };
        self.catalog.resolver().price(&selection)
    }

    /// Fully priced quote for the current draft.
    pub fn quote(&self) -> Result<PricedQuote, WizardError> {
        let selection = self.selection()?;
        Ok(self
            .catalog
            .quote(&selection, self.county(), self.draft.referral_discount)?)
    }

    /// Builds the submission without touching the draft.
    ///
    /// # Errors
    ///
    /// [`WizardError::StepIncomplete`] for the first incomplete step, or the
    /// pricing error when the combination is not offered.
    pub fn prepare_submission(
        &self,
        reference_number: impl Into<String>,
    ) -> Result<QuoteSubmission, WizardError> {
        if let Some(step) = WizardStep::ALL.into_iter().find(|s| !self.can_advance(*s)) {
            return Err(WizardError::StepIncomplete(step));
        }
        let delivery_address = self
            .draft
            .delivery_address
            .clone()
            .ok_or(WizardError::StepIncomplete(WizardStep::ServiceArea))?;

        Ok(QuoteSubmission {
            reference_number: reference_number.into(),
            contact: self.draft.contact.clone(),
            delivery_address,
            photos: self.draft.photos.clone(),
            quote: self.quote()?,
        })
    }

    /// Builds the submission and resets the draft, handing the quote off
    /// for good. Callers that still have to store it should use
    /// [`QuoteWizard::prepare_submission`] and [`QuoteWizard::reset`] once
    /// the store succeeds.
    pub fn submit(
        &mut self,
        reference_number: impl Into<String>,
    ) -> Result<QuoteSubmission, WizardError> {
        let submission = self.prepare_submission(reference_number)?;
        info!(
            reference = %submission.reference_number,
            total = %submission.rounded_breakdown().total,
            "quote submitted"
        );
        self.reset();
        Ok(submission)
    }

    /// First step before `target` whose fields are incomplete.
    fn first_incomplete(
        &self,
        target: WizardStep,
    ) -> Option<WizardStep> {
        WizardStep::ALL
            .into_iter()
            .take_while(|s| *s < target)
            .find(|s| !self.can_advance(*s))
    }

    /// Moves back to the first incomplete step when an edit cleared a
    /// selection the current step depends on.
    fn rewind_to_incomplete(&mut self) {
        if let Some(step) = self.first_incomplete(self.draft.step) {
            debug!(from = %self.draft.step, to = %step, "selection cleared, returning to step");
            self.draft.step = step;
        }
    }

    fn advance_from(
        &mut self,
        step: WizardStep,
    ) {
        if self.draft.step == step && self.can_advance(step) {
            if let Some(next) = step.next() {
                self.draft.step = next;
            }
        }
    }

    fn select_service_area(
        &mut self,
        area: ServiceArea,
    ) {
        self.draft.service_area = Some(area);
        let resolver = self.catalog.resolver();

        if let Some(material) = self.draft.material {
            if resolver.available_sizes(area, material).is_empty() {
                self.draft.material = None;
                self.draft.size = None;
            }
        }
        if let (Some(material), Some(size)) = (self.draft.material, self.draft.size) {
            if !resolver.is_available(area, material, size) {
                self.draft.size = None;
            }
        }
    }

    fn select_material(
        &mut self,
        material: MaterialType,
    ) -> Result<(), WizardError> {
        let area = self
            .draft
            .service_area
            .ok_or(WizardError::MissingSelection("service area"))?;
        let resolver = self.catalog.resolver();

        if resolver.available_sizes(area, material).is_empty() {
            return Err(WizardError::MaterialUnavailable { area, material });
        }

        self.draft.material = Some(material);
        if let Some(size) = self.draft.size {
            if !resolver.is_available(area, material, size) {
                self.draft.size = None;
            }
        }
        Ok(())
    }

    fn select_size(
        &mut self,
        size: SizeClass,
    ) -> Result<(), WizardError> {
        let area = self
            .draft
            .service_area
            .ok_or(WizardError::MissingSelection("service area"))?;
        let material = self
            .draft
            .material
            .ok_or(WizardError::MissingSelection("material"))?;

        if !self.catalog.resolver().is_available(area, material, size) {
            return Err(WizardError::SizeUnavailable { area, material, size });
        }
        self.draft.size = Some(size);
        Ok(())
    }
}
