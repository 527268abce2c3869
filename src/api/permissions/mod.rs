pub mod context;
pub mod error;
pub mod guard;
pub mod interfaces;
pub mod resolver;
pub mod roles;
