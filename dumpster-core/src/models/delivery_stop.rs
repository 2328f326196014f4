use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Coordinates, SizeClass};

/// Two-hour delivery windows offered to customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeSlot {
    #[serde(rename = "8:00 AM - 10:00 AM")]
    Early,
    #[serde(rename = "10:00 AM - 12:00 PM")]
    MidMorning,
    #[serde(rename = "12:00 PM - 2:00 PM")]
    Midday,
    #[serde(rename = "2:00 PM - 4:00 PM")]
    Afternoon,
    #[serde(rename = "4:00 PM - 6:00 PM")]
    Late,
}

impl TimeSlot {
    pub const ALL: [Self; 5] = [
        Self::Early,
        Self::MidMorning,
        Self::Midday,
        Self::Afternoon,
        Self::Late,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Early => "8:00 AM - 10:00 AM",
            Self::MidMorning => "10:00 AM - 12:00 PM",
            Self::Midday => "12:00 PM - 2:00 PM",
            Self::Afternoon => "2:00 PM - 4:00 PM",
            Self::Late => "4:00 PM - 6:00 PM",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.label() == label.trim())
    }

    /// Start of the window, e.g. `"8:00 AM"`.
    pub fn start_label(&self) -> &'static str {
        self.label().split(" - ").next().unwrap_or_default()
    }
}

/// One scheduled delivery as shown to the route planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryStop {
    pub id: String,
    #[serde(default)]
    pub reference_number: String,
    #[serde(default)]
    pub customer_name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub time_slot: String,
    pub size: Option<SizeClass>,
}

impl DeliveryStop {
    /// Geometry is only usable when both components are present.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
            _ => None,
        }
    }

    pub fn has_geometry(&self) -> bool {
        self.coordinates().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_slot_parses_its_label() {
        for slot in TimeSlot::ALL {
            assert_eq!(TimeSlot::parse(slot.label()), Some(slot));
        }
        assert_eq!(TimeSlot::Afternoon.start_label(), "2:00 PM");
    }

    #[test]
    fn coordinates_require_both_components() {
        let mut stop = DeliveryStop {
            id: "a".into(),
            reference_number: String::new(),
            customer_name: String::new(),
            address: "1 Main St".into(),
            latitude: Some(40.7),
            longitude: None,
            delivery_date: None,
            time_slot: String::new(),
            size: None,
        };
        assert!(!stop.has_geometry());

        stop.longitude = Some(-73.1);
        assert_eq!(stop.coordinates(), Some(Coordinates::new(40.7, -73.1)));
    }
}
