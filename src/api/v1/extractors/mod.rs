pub mod auth_ctx;
pub mod validated;
