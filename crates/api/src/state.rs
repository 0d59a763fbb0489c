//! Shared application state.

use pollbox_core::PollService;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    /// Poll business logic.
    pub poll_service: PollService,
    /// Page size used when a list request does not specify one.
    pub default_page_size: u32,
}

impl AppState {
    /// Create application state.
    #[must_use]
    pub const fn new(poll_service: PollService, default_page_size: u32) -> Self {
        Self {
            poll_service,
            default_page_size,
        }
    }
}
