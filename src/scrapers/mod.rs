//! Marketplace-specific scrapers

pub mod kleinanzeigen;
