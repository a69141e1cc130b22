/// Check-in events, invitation links and confirmation sync.
pub mod checkin_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Team draws over the present players.
pub mod draw_service;
/// Health check service.
pub mod health_service;
/// Roster management operations.
pub mod roster_service;
/// Server-Sent Events message generation.
pub mod sse_events;
/// Server-Sent Events broadcasting service.
pub mod sse_service;
/// Storage connection supervisor toggling degraded mode.
pub mod storage_supervisor;
/// Balanced team assignment engine.
pub mod team_sorter;
