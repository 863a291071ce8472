//! Traits shared by models and stores

/// Primary key type
pub type Id = i64;

/// Records keyed by a database-assigned id; `None` until inserted
pub trait Identifiable {
    fn id(&self) -> Option<Id>;
}

/// A persisted domain record
pub trait Entity: Identifiable + Send + Sync {
    /// Name used in not-found and conflict messages
    const TYPE_NAME: &'static str;
}
