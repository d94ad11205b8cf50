pub mod repo;

pub use repo::{User, UserRole};
