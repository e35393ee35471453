//! Domain types for the normalized arrival schedule.

mod schedule;
mod tags;
pub mod weak_order;

pub use schedule::{Message, RouteEntry, Schedule, StopEntry, TrainPrediction};
pub use tags::{RouteTag, StopTag};
