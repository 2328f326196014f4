use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw geocoder output keyed by component type (`route`, `locality`,
/// `administrative_area_level_2`, ...).
pub type AddressComponents = BTreeMap<String, String>;

/// Component that carries the county for US addresses.
pub const COUNTY_COMPONENT: &str = "administrative_area_level_2";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(
        lat: f64,
        lng: f64,
    ) -> Self {
        Self { lat, lng }
    }
}

/// A delivery address as resolved by the geocoding collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    /// Formatted street address.
    pub address: String,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub components: AddressComponents,
}

impl DeliveryAddress {
    pub fn new(
        address: impl Into<String>,
        coordinates: Coordinates,
        components: AddressComponents,
    ) -> Self {
        Self {
            address: address.into(),
            coordinates,
            components,
        }
    }
}
