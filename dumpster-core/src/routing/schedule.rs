//! Delivery schedule helpers.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};

use crate::models::DeliveryStop;

/// Days of notice required before a delivery can be moved.
pub const RESCHEDULE_LEAD_DAYS: u64 = 2;

/// Stops that can be routed on `date`: scheduled that day and with
/// coordinates. Stops without either are left for the plain list views.
pub fn stops_for_date(
    schedule: &[DeliveryStop],
    date: NaiveDate,
) -> Vec<DeliveryStop> {
    schedule
        .iter()
        .filter(|s| s.has_geometry() && s.delivery_date == Some(date))
        .cloned()
        .collect()
}

/// Every scheduled stop on `date`, with or without coordinates.
pub fn deliveries_on(
    schedule: &[DeliveryStop],
    date: NaiveDate,
) -> Vec<&DeliveryStop> {
    schedule
        .iter()
        .filter(|s| s.delivery_date == Some(date))
        .collect()
}

/// Number of deliveries per scheduled day.
pub fn deliveries_per_day(schedule: &[DeliveryStop]) -> BTreeMap<NaiveDate, usize> {
    let mut days = BTreeMap::new();
    for date in schedule.iter().filter_map(|s| s.delivery_date) {
        *days.entry(date).or_insert(0) += 1;
    }
    days
}

/// First day on or after `from` that has at least one delivery.
pub fn nearest_scheduled_day(
    schedule: &[DeliveryStop],
    from: NaiveDate,
) -> Option<NaiveDate> {
    schedule
        .iter()
        .filter_map(|s| s.delivery_date)
        .filter(|d| *d >= from)
        .min()
}

/// Earliest date a customer may move a delivery to.
pub fn earliest_reschedule_date(today: NaiveDate) -> NaiveDate {
    today
        .checked_add_days(Days::new(RESCHEDULE_LEAD_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

pub fn can_reschedule_to(
    today: NaiveDate,
    date: NaiveDate,
) -> bool {
    date >= earliest_reschedule_date(today)
}
