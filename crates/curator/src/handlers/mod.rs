pub mod error;
pub mod health;
pub mod media;
pub mod params;
pub mod settings;
pub mod taxonomies;
pub mod users;

pub use error::AppError;
