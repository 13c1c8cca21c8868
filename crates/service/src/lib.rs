//! Service layer providing business-oriented operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in `models` crate.
//! - Provides clear error types and documented interfaces.

pub mod errors;
pub mod expiry;
pub mod media;
pub mod pagination;
pub mod runtime;
pub mod listing;
pub mod category;
pub mod contact;
pub mod db;
#[cfg(test)]
pub mod test_support;
