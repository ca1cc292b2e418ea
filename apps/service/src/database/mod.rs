/// Entry store - persisted list of monitored endpoints
///
/// The store is a single JSON file holding an array of entries. Older
/// installations wrote a bare array of addresses; those are upgraded in
/// place the first time they are loaded (see [`migrations`]).

pub mod error;
pub mod migrations;
pub mod models;
pub mod repository;

pub use error::StoreError;
pub use models::EndpointEntry;
pub use repository::EntryStore;
