pub mod adaptors;
pub mod ai;
pub mod auth;
pub mod email;
pub mod workflow;
