mod api_error;
mod health;
mod rooms;

pub use api_error::ApiError;
pub use health::health;
pub use rooms::*;
