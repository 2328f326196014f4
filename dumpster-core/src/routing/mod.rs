//! Delivery route sequencing.
//!
//! Everything here is synchronous. Directions and optimized orders come
//! from an external collaborator and are passed in already resolved.

pub mod plan;
pub mod schedule;
pub mod sequencer;

pub use plan::{
    DEFAULT_ROUTE_START, Directions, DirectionsOutcome, DirectionsRequest, MIN_STOPS_TO_OPTIMIZE,
    RoutePlan, Waypoint,
};
pub use schedule::{
    RESCHEDULE_LEAD_DAYS, can_reschedule_to, deliveries_on, deliveries_per_day,
    earliest_reschedule_date, nearest_scheduled_day, stops_for_date,
};
pub use sequencer::{
    Bounds, Distance, RouteError, RouteLeg, RouteStep, RouteTotals, TravelTime, apply_order, bounds,
    compute_etas, format_eta, maps_url, reorder, route_totals, stop_coordinates,
};
