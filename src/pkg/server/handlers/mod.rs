pub mod admin;
pub mod assist;
pub mod auth;
pub mod probes;
pub mod resumes;
pub mod review;
