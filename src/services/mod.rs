pub mod cache;
pub mod identity;
