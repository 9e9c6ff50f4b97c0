pub mod err;
pub mod internal;
pub mod server;
