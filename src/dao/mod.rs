/// Database model definitions.
pub mod models;
/// Roster and check-in event persistence.
pub mod roster_store;
/// Storage abstraction layer for database operations.
pub mod storage;
