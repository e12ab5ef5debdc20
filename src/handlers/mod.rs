pub mod edit;
pub mod health;

pub use edit::edit_image;
pub use health::{health_check, metrics, readiness_check};
