//! Integration tests for the eventscope capture layer
//!
//! Tests the catalog, target scopes, and per-kind trackers together.

mod scope;
mod trackers;
