//! Store configuration

/// Names of the logical tables in the remote workspace.
///
/// The player treats the store as five tables; deployments that renamed them
/// override the defaults here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    /// Track catalog
    pub tracks: String,

    /// Artist table
    pub artists: String,

    /// User accounts
    pub users: String,

    /// Playlists and albums
    pub collections: String,

    /// Auxiliary media assets
    pub media: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            tracks: "tracks".into(),
            artists: "artists".into(),
            users: "users".into(),
            collections: "collections".into(),
            media: "media".into(),
        }
    }
}

/// Connection settings for the remote record store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// API base URL, e.g. `https://records.example.com/v0`
    pub base_url: String,

    /// Workspace (base) identifier, the first path segment under the API root
    pub workspace: String,

    /// Static bearer credential
    pub token: String,

    /// Table names
    pub tables: TableNames,
}

impl StoreConfig {
    /// Configuration with default table names
    pub fn new(
        base_url: impl Into<String>,
        workspace: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            workspace: workspace.into(),
            token: token.into(),
            tables: TableNames::default(),
        }
    }
}
