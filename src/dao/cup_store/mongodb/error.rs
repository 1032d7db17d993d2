use mongodb::error::Error as MongoError;
use thiserror::Error;

/// Result alias for MongoDB DAO operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Errors raised by the MongoDB cup store.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// The offending URI.
        uri: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Client construction from options failed.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The initial connectivity ping never succeeded.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Ping attempts made before giving up.
        attempts: u32,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A health-check ping failed on an established connection.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Index bootstrap failed.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Target collection.
        collection: &'static str,
        /// Index description.
        index: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A write to one of the cup collections failed.
    #[error("failed to save {what} `{key}`")]
    Save {
        /// Record kind ("cup", "team", "match").
        what: &'static str,
        /// Natural key of the record.
        key: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A read from one of the cup collections failed.
    #[error("failed to load {what} `{key}`")]
    Load {
        /// Record kind ("cup", "team", "match").
        what: &'static str,
        /// Natural key of the record.
        key: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A delete from one of the cup collections failed.
    #[error("failed to delete {what} `{key}`")]
    Delete {
        /// Record kind ("cup", "team", "match").
        what: &'static str,
        /// Natural key of the record.
        key: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
}
