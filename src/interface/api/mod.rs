//! API interface implementations

pub mod meeting_dto;
pub mod meeting_handler;
pub mod metrics_handler;
pub mod router;
pub mod telephony_handler;

pub use meeting_handler::AppState;
pub use metrics_handler::{detached_handle, init_metrics};
pub use router::build_router;
