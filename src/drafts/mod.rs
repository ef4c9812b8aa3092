pub mod dtos;
pub mod fallback;
pub mod handlers;

pub use handlers::create_draft;
