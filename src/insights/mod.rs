//! Stateless advice computed per request from rows already loaded for a user.
//!
//! Every function here is a single pass over a slice: no I/O, no state kept
//! between calls.

pub mod budget_recommendation;
pub mod rebalancing;
pub mod subscriptions;
pub mod tax;
