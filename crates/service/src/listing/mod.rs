//! Listing lifecycle and query engine.
//!
//! All listing mutations flow through [`service::ListingService`]; reads go
//! through the same service so the lazy expiry sweep always runs first.

pub mod query;
pub mod repository;
pub mod service;

pub use query::{Facets, ListingFilter, SearchResult};
pub use repository::{ListingPatch, ListingRepository, NewListing, SeaOrmListingRepository};
pub use service::{CreateListingInput, ListingService, ListingView, UpdateListingInput};
