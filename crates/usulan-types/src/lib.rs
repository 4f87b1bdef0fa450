pub mod general;
pub mod utils;

pub use general::ValidEmail;
