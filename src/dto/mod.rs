use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Check-in events and confirmations.
pub mod checkin;
/// Team draws.
pub mod draw;
/// Health endpoint payloads.
pub mod health;
/// Roster edits and listings.
pub mod roster;
/// Server-Sent Events payloads.
pub mod sse;
/// Custom validators shared by request payloads.
pub mod validation;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
