// src/catalog/mod.rs
pub mod cache;
pub mod client;
pub mod profile;

pub use cache::{CacheStatus, Catalog, DatasetCache};
pub use client::{CatalogEntry, CatalogSource, PokeApiClient};
pub use profile::EntityProfile;
