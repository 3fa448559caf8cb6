// src/application/ports/time.rs
use chrono::{DateTime, Utc};

/// Timestamps slug change events.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
