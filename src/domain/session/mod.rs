//! Session bounded context - passcode-keyed participant records

pub mod entity;
pub mod passcode;
pub mod repository;

pub use entity::{JoinMethod, SessionBinding, SessionKey, SessionRecord};
pub use passcode::generate_passcode;
pub use repository::SessionDirectory;
