//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep FFI/CLI layers decoupled from storage details.

pub mod allocator;
pub mod batch_service;
pub mod coordinate_service;
pub mod label_service;
pub mod stats_service;

/// Current wall-clock time in Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Trims an optional actor name; blank values become `None`.
pub(crate) fn normalize_actor(actor: Option<&str>) -> Option<String> {
    actor
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::normalize_actor;

    #[test]
    fn normalize_actor_drops_blank_values() {
        assert_eq!(normalize_actor(None), None);
        assert_eq!(normalize_actor(Some("   ")), None);
        assert_eq!(normalize_actor(Some(" EFO Admin ")).as_deref(), Some("EFO Admin"));
    }
}
