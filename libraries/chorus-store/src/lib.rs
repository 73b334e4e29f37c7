//! Chorus Player - Record Store Client
//!
//! HTTP client for the hosted spreadsheet-style record store that backs the
//! player: tracks, artists, users, collections, and an auxiliary media-asset
//! table.
//!
//! Two layers:
//! - [`RecordStoreClient`] speaks the raw wire protocol: cursor-following
//!   list reads, formula filters, and batch upsert/patch by id.
//! - [`CatalogClient`] decodes rows into `chorus-core` types and exposes the
//!   typed operations the library layer consumes via the [`RemoteCatalog`]
//!   trait.
//!
//! # Example
//!
//! ```ignore
//! use chorus_store::{CatalogClient, RecordStoreClient, RemoteCatalog, StoreConfig};
//!
//! let config = StoreConfig::new("https://records.example.com/v0", "wsMusic", token);
//! let catalog = CatalogClient::new(RecordStoreClient::new(config)?);
//!
//! let user = catalog.login("listener@example.com", "secret").await?;
//! let artists = catalog.all_artists().await?;
//! ```

mod auth;
mod catalog;
mod client;
mod config;
mod error;
pub mod filter;

pub use catalog::{CatalogClient, CounterField, IdSetUpdate, RemoteCatalog, UserCollections};
pub use client::{ListOptions, RecordStoreClient, SortDirection, SortSpec};
pub use config::{StoreConfig, TableNames};
pub use error::{Result, StoreError};
pub use filter::{Filter, ID_BATCH_SIZE};
