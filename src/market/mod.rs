// ABOUTME: Marketplace module for GPU node rentals.
// ABOUTME: Client trait, HTTP implementation, data types, and the rental workflow guard.

mod client;
mod error;
mod guard;
mod types;

pub use client::{HttpMarketClient, MarketClient};
pub use error::{Error, Result};
pub use guard::RentalGuard;
pub use types::{CandidateFilters, ConnectionHint, Rental, RentalCandidate};
