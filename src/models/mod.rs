//! Request and response bodies exposed over HTTP.

pub mod startup;
pub mod user;
pub mod validation;

pub use startup::*;
pub use user::*;
