pub mod founder;
pub mod startup;
pub mod user;

pub use founder::Entity as Founder;
pub use startup::Entity as Startup;
pub use user::Entity as User;
