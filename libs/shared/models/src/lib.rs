pub mod auth;
pub mod catalog;
pub mod notify;

pub use auth::*;
pub use catalog::*;
pub use notify::*;
