//! FootyPredict
//!
//! Daily football match predictions for a fixed set of competitions, derived
//! from recent scoring form with an independent-Poisson goal model and served
//! from a date-keyed cache.
//!
//! ## Architecture
//!
//! ```text
//! FixtureSource (football-data.org) → Engine (goal rates → score surface → Prediction)
//!                                          ↓
//!                     DateCache (one computation per date) ← Service (get / warm / refresh)
//!                                          ↓
//!                                  API (/predictions, /refresh)
//! ```

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod persist;
pub mod service;
pub mod types;

#[cfg(test)]
mod types_tests;
