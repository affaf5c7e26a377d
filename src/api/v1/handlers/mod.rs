pub mod admin;
pub mod echo;
pub mod health;
pub mod me;
