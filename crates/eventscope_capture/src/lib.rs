//! Event catalog, observed scopes, and per-kind trackers for eventscope.
//!
//! This crate provides:
//! - [`EventCatalog`] - The kinds of event that can be tracked
//! - [`TargetScope`] - The observed object graph and its listener registry
//! - [`EventTracker`] / [`TrackerRegistry`] - One subscription per kind
//! - [`CapturedOccurrence`] - One observed event, handed to an [`OccurrenceSink`]
//!
//! # Flow
//!
//! ```text
//! host raises event ──► TargetScope ──► EventTracker (per kind)
//!                                            └──► OccurrenceSink
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod catalog;
pub mod kind;
pub mod occurrence;
pub mod scope;
pub mod tracker;

pub use catalog::{CatalogBuilder, DEFAULT_ENABLED_KINDS, EventCatalog};
pub use kind::{EventKind, KindId};
pub use occurrence::{CapturedOccurrence, OccurrenceSink};
pub use scope::{Listener, RaisedEvent, RouteStop, Subscription, TargetScope};
pub use tracker::{EventTracker, TrackerRegistry};
