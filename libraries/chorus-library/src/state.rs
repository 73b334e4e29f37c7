//! Shared mutable state behind the library facade.

use crate::cache::LibraryCache;
use crate::error::{LibraryError, Result};
use chorus_core::User;

/// The cache plus the signed-in user, guarded by one lock so mutations see a
/// consistent view of both.
#[derive(Debug, Default)]
pub struct LibraryState {
    /// Catalog cache
    pub cache: LibraryCache,

    /// Signed-in user, if any
    pub user: Option<User>,
}

impl LibraryState {
    /// Empty state with nobody signed in.
    pub fn new() -> Self {
        Self::default()
    }

    /// The signed-in user, or [`LibraryError::NotSignedIn`].
    pub fn signed_in_user(&self) -> Result<&User> {
        self.user.as_ref().ok_or(LibraryError::NotSignedIn)
    }

    /// Mutable access to the signed-in user, or [`LibraryError::NotSignedIn`].
    pub fn signed_in_user_mut(&mut self) -> Result<&mut User> {
        self.user.as_mut().ok_or(LibraryError::NotSignedIn)
    }
}
