//! Request/response payloads exchanged over the HTTP and SSE surfaces.

use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod cup;
pub mod health;
pub mod matches;
pub mod sse;
pub mod team;
pub mod validation;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
