//! Chorus Player - Core Types
//!
//! Domain types shared across the Chorus workspace, plus the decoders that
//! turn raw record-store rows into those types.
//!
//! The decoders form a strict parse-and-validate boundary: a row missing a
//! mandatory field decodes to [`Decoded::Skip`] with a reason, never to an
//! error. Cross-reference resolution (artist names on a track, track objects
//! on a collection) takes the relevant lookup table as an argument; decoders
//! never fetch anything themselves.

pub mod decode;
pub mod record;
pub mod types;

pub use decode::{
    decode_collection, decode_simple_artist, decode_track, decode_user, linked_ids, Decoded,
};
pub use record::Record;
pub use types::{
    Artist, ArtistRef, Collection, CollectionKind, ImageAsset, SimpleArtist, Track, User,
};
