//! A single route-planning session.
//!
//! Directions are fetched outside the core. Each request carries the plan's
//! generation; any edit (reorder, optimized order, new day) bumps the
//! generation and drops cached directions, so a response for an older
//! generation is discarded when it arrives instead of overwriting newer
//! state.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::schedule::stops_for_date;
use super::sequencer::{
    Bounds, RouteError, RouteLeg, RouteTotals, apply_order, bounds, compute_etas, maps_url, reorder,
    route_totals,
};
use crate::models::{Coordinates, DeliveryStop};

/// Route start used when none is configured.
pub const DEFAULT_ROUTE_START: NaiveTime = match NaiveTime::from_hms_opt(8, 0, 0) {
    Some(t) => t,
    None => NaiveTime::MIN,
};

/// Stops needed before an optimized order can be requested.
pub const MIN_STOPS_TO_OPTIMIZE: usize = 2;

/// A stop position handed to the directions collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: String,
    pub address: String,
    pub coordinates: Coordinates,
}

/// What to ask the directions collaborator for, tagged with the
/// generation the answer must match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsRequest {
    pub generation: u64,
    pub waypoints: Vec<Waypoint>,
}

/// Directions collaborator response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directions {
    pub legs: Vec<RouteLeg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionsOutcome {
    Applied,
    /// The plan changed after the request was issued.
    Discarded,
    /// The response does not have one leg per routable stop.
    LegCountMismatch { expected: usize, received: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoutePlan {
    date: Option<NaiveDate>,
    stops: Vec<DeliveryStop>,
    start_time: NaiveTime,
    generation: u64,
    directions: Option<Directions>,
}

impl RoutePlan {
    /// Plan over `stops` in the given order. Stops without coordinates are
    /// kept for display but skipped by every geometry computation.
    pub fn new(stops: Vec<DeliveryStop>) -> Self {
        Self {
            date: None,
            stops,
            start_time: DEFAULT_ROUTE_START,
            generation: 0,
            directions: None,
        }
    }

    /// Plan for the routable stops scheduled on `date`.
    pub fn for_day(
        schedule: &[DeliveryStop],
        date: NaiveDate,
    ) -> Self {
        let mut plan = Self::new(stops_for_date(schedule, date));
        plan.date = Some(date);
        plan
    }

    pub fn with_start_time(
        mut self,
        start_time: NaiveTime,
    ) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn stops(&self) -> &[DeliveryStop] {
        &self.stops
    }

    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn directions(&self) -> Option<&Directions> {
        self.directions.as_ref()
    }

    /// Switches to another day, dropping the current stops and directions.
    pub fn select_day(
        &mut self,
        schedule: &[DeliveryStop],
        date: NaiveDate,
    ) {
        self.stops = stops_for_date(schedule, date);
        self.date = Some(date);
        self.invalidate();
    }

    /// Changing the start only shifts ETAs; cached legs stay valid.
    pub fn set_start_time(
        &mut self,
        start_time: NaiveTime,
    ) {
        self.start_time = start_time;
    }

    /// Moves one stop and invalidates cached directions.
    pub fn reorder(
        &mut self,
        from: usize,
        to: usize,
    ) -> Result<(), RouteError> {
        self.stops = reorder(&self.stops, from, to)?;
        self.invalidate();
        Ok(())
    }

    /// Issues a directions request for the current order. Any response to
    /// an earlier request becomes stale.
    pub fn directions_request(&mut self) -> Option<DirectionsRequest> {
        let waypoints = self.waypoints();
        if waypoints.is_empty() {
            return None;
        }
        self.generation += 1;
        Some(DirectionsRequest {
            generation: self.generation,
            waypoints,
        })
    }

    /// Issues a request for an optimized stop order.
    pub fn optimize_request(&mut self) -> Result<DirectionsRequest, RouteError> {
        let found = self.waypoints().len();
        if found < MIN_STOPS_TO_OPTIMIZE {
            return Err(RouteError::NotEnoughStops {
                required: MIN_STOPS_TO_OPTIMIZE,
                found,
            });
        }
        self.directions_request().ok_or(RouteError::NotEnoughStops {
            required: MIN_STOPS_TO_OPTIMIZE,
            found,
        })
    }

    /// Stores directions if they answer the latest request with one leg per
    /// routable stop.
    pub fn accept_directions(
        &mut self,
        generation: u64,
        directions: Directions,
    ) -> DirectionsOutcome {
        if generation != self.generation {
            warn!(
                generation,
                current = self.generation,
                "discarding stale directions"
            );
            return DirectionsOutcome::Discarded;
        }
        let expected = self.waypoints().len();
        let received = directions.legs.len();
        if received != expected {
            warn!(generation, expected, received, "rejecting directions with wrong leg count");
            return DirectionsOutcome::LegCountMismatch { expected, received };
        }
        debug!(generation, legs = directions.legs.len(), "accepted directions");
        self.directions = Some(directions);
        DirectionsOutcome::Applied
    }

    /// Applies an optimized order returned for request `generation`.
    ///
    /// `order[i]` indexes the request's waypoints. Stops without coordinates
    /// were not sent and keep their positions.
    pub fn apply_optimized_order(
        &mut self,
        generation: u64,
        order: &[usize],
    ) -> Result<DirectionsOutcome, RouteError> {
        if generation != self.generation {
            warn!(
                generation,
                current = self.generation,
                "discarding stale optimized order"
            );
            return Ok(DirectionsOutcome::Discarded);
        }

        let positions: Vec<usize> = self
            .stops
            .iter()
            .enumerate()
            .filter(|(_, s)| s.has_geometry())
            .map(|(i, _)| i)
            .collect();
        let routable: Vec<DeliveryStop> = positions.iter().map(|&i| self.stops[i].clone()).collect();
        let optimized = apply_order(&routable, order)?;

        for (position, stop) in positions.into_iter().zip(optimized) {
            self.stops[position] = stop;
        }
        self.invalidate();
        Ok(DirectionsOutcome::Applied)
    }

    /// Arrival time per stop, aligned with [`RoutePlan::stops`]. `None`
    /// everywhere until directions are accepted, and always `None` for
    /// stops without coordinates.
    pub fn etas(
        &self,
        date: NaiveDate,
    ) -> Vec<Option<NaiveDateTime>> {
        let Some(directions) = &self.directions else {
            return vec![None; self.stops.len()];
        };

        let mut etas = compute_etas(date.and_time(self.start_time), &directions.legs).into_iter();
        self.stops
            .iter()
            .map(|s| if s.has_geometry() { etas.next() } else { None })
            .collect()
    }

    /// Leg arriving at each stop, aligned like [`RoutePlan::etas`].
    pub fn legs(&self) -> Vec<Option<&RouteLeg>> {
        let Some(directions) = &self.directions else {
            return vec![None; self.stops.len()];
        };

        let mut legs = directions.legs.iter();
        self.stops
            .iter()
            .map(|s| if s.has_geometry() { legs.next() } else { None })
            .collect()
    }

    pub fn totals(&self) -> Option<RouteTotals> {
        self.directions.as_ref().map(|d| route_totals(&d.legs))
    }

    pub fn bounds(&self) -> Option<Bounds> {
        bounds(&self.stops)
    }

    pub fn maps_url(&self) -> Option<String> {
        maps_url(&self.stops)
    }

    fn waypoints(&self) -> Vec<Waypoint> {
        self.stops
            .iter()
            .filter_map(|s| {
                s.coordinates().map(|coordinates| Waypoint {
                    id: s.id.clone(),
                    address: s.address.clone(),
                    coordinates,
                })
            })
            .collect()
    }

    fn invalidate(&mut self) {
        self.generation += 1;
        self.directions = None;
    }
}
