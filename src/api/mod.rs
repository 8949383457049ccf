pub mod auth;
pub mod error;
pub mod router;
pub mod state;
pub mod students;

pub use error::{ApiError, ApiMessage};
pub use state::ApiState;
