//! Pure route computations: ETA accumulation, stop reordering and the
//! geometry-only helpers (bounds, totals, map links).

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Coordinates, DeliveryStop};

const MAPS_DIR_URL: &str = "https://www.google.com/maps/dir/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("stop index {index} is out of range for {len} stops")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("order {order:?} is not a permutation of {len} stops")]
    InvalidOrder { order: Vec<usize>, len: usize },

    #[error("at least {required} stops with coordinates are needed, found {found}")]
    NotEnoughStops { required: usize, found: usize },
}

/// Travel distance as reported by the directions collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distance {
    pub text: String,
    #[serde(alias = "value")]
    pub meters: u64,
}

/// Travel time as reported by the directions collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelTime {
    pub text: String,
    #[serde(alias = "value")]
    pub seconds: u64,
}

/// One turn-by-turn instruction within a leg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteStep {
    pub instruction: String,
    pub distance: Option<Distance>,
    pub duration: Option<TravelTime>,
    #[serde(default)]
    pub maneuver: Option<String>,
}

/// Travel from the previous stop (or the depot) to the next stop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    #[serde(default)]
    pub start_address: String,
    #[serde(default)]
    pub end_address: String,
    pub distance: Option<Distance>,
    pub duration: Option<TravelTime>,
    #[serde(default)]
    pub steps: Vec<RouteStep>,
}

impl RouteLeg {
    /// Missing durations count as zero.
    pub fn duration_seconds(&self) -> u64 {
        self.duration.as_ref().map_or(0, |d| d.seconds)
    }

    pub fn distance_meters(&self) -> u64 {
        self.distance.as_ref().map_or(0, |d| d.meters)
    }
}

/// Sum of every leg's distance and travel time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTotals {
    pub meters: u64,
    pub seconds: u64,
}

impl RouteTotals {
    /// Distance in miles, one decimal place, e.g. `"12.4 mi"`.
    pub fn distance_label(&self) -> String {
        format!("{:.1} mi", self.meters as f64 / 1_609.344)
    }

    /// Travel time such as `"1 hr 5 mins"` or `"45 mins"`.
    pub fn duration_label(&self) -> String {
        let minutes = (self.seconds + 30) / 60;
        match (minutes / 60, minutes % 60) {
            (0, m) => format!("{m} mins"),
            (h, 0) => format!("{h} hr"),
            (h, m) => format!("{h} hr {m} mins"),
        }
    }
}

/// Rectangle enclosing a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south_west: Coordinates,
    pub north_east: Coordinates,
}

/// Arrival time at each stop.
///
/// `etas[i]` is `start` plus the duration of every leg up to and including
/// `legs[i]`. A leg without a duration contributes nothing but is never
/// skipped, so later ETAs still line up with their legs.
pub fn compute_etas(
    start: NaiveDateTime,
    legs: &[RouteLeg],
) -> Vec<NaiveDateTime> {
    legs.iter()
        .scan(0u64, |elapsed, leg| {
            *elapsed = elapsed.saturating_add(leg.duration_seconds());
            Some(add_seconds(start, *elapsed))
        })
        .collect()
}

fn add_seconds(
    start: NaiveDateTime,
    seconds: u64,
) -> NaiveDateTime {
    let delta = i64::try_from(seconds)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX);
    start.checked_add_signed(delta).unwrap_or(NaiveDateTime::MAX)
}

/// 12-hour clock display, e.g. `"8:30 AM"`.
pub fn format_eta(eta: NaiveDateTime) -> String {
    eta.format("%-I:%M %p").to_string()
}

/// Moves the stop at `from` to `to`, keeping everything else in order.
pub fn reorder<T: Clone>(
    stops: &[T],
    from: usize,
    to: usize,
) -> Result<Vec<T>, RouteError> {
    let len = stops.len();
    for index in [from, to] {
        if index >= len {
            return Err(RouteError::IndexOutOfRange { index, len });
        }
    }

    let mut reordered = stops.to_vec();
    let moved = reordered.remove(from);
    reordered.insert(to, moved);
    Ok(reordered)
}

/// Reorders `items` by `order`, where `order[i]` is the index of the item
/// that should end up at position `i`.
pub fn apply_order<T: Clone>(
    items: &[T],
    order: &[usize],
) -> Result<Vec<T>, RouteError> {
    let len = items.len();
    let mut seen = vec![false; len];
    let valid = order.len() == len
        && order.iter().all(|&i| {
            let fresh = i < len && !seen[i];
            if fresh {
                seen[i] = true;
            }
            fresh
        });

    if !valid {
        return Err(RouteError::InvalidOrder {
            order: order.to_vec(),
            len,
        });
    }
    Ok(order.iter().map(|&i| items[i].clone()).collect())
}

pub fn route_totals(legs: &[RouteLeg]) -> RouteTotals {
    legs.iter().fold(RouteTotals::default(), |acc, leg| RouteTotals {
        meters: acc.meters.saturating_add(leg.distance_meters()),
        seconds: acc.seconds.saturating_add(leg.duration_seconds()),
    })
}

/// Coordinates of the stops that have them, in route order.
pub fn stop_coordinates(stops: &[DeliveryStop]) -> Vec<Coordinates> {
    stops.iter().filter_map(DeliveryStop::coordinates).collect()
}

/// Bounding box of the stops with coordinates.
pub fn bounds(stops: &[DeliveryStop]) -> Option<Bounds> {
    let mut points = stop_coordinates(stops).into_iter();
    let first = points.next()?;

    Some(points.fold(
        Bounds {
            south_west: first,
            north_east: first,
        },
        |b, p| Bounds {
            south_west: Coordinates::new(b.south_west.lat.min(p.lat), b.south_west.lng.min(p.lng)),
            north_east: Coordinates::new(b.north_east.lat.max(p.lat), b.north_east.lng.max(p.lng)),
        },
    ))
}

/// Google Maps directions link through every stop with coordinates.
pub fn maps_url(stops: &[DeliveryStop]) -> Option<String> {
    let points = stop_coordinates(stops);
    if points.is_empty() {
        return None;
    }
    let path = points
        .iter()
        .map(|c| format!("{},{}", c.lat, c.lng))
        .collect::<Vec<_>>()
        .join("/");
    Some(format!("{MAPS_DIR_URL}{path}"))
}
