//! Domain types
//!
//! Entities are normalized by record id. Mutable fields are the counters on
//! [`Track`] and the id sets / listening time on [`User`]; everything else is
//! read-only from the player's perspective.

mod artist;
mod asset;
mod collection;
mod track;
mod user;

pub use artist::{Artist, ArtistRef, SimpleArtist};
pub use asset::ImageAsset;
pub use collection::{Collection, CollectionKind};
pub use track::Track;
pub use user::User;
