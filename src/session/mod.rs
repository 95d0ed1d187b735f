//! Editing Session
//!
//! Drives an editor over a line-delimited JSON protocol, so a host
//! application (the admin backend) can edit article content through it.

pub mod backend;
pub mod handlers;
pub mod protocol;
pub mod server;

pub use backend::Session;
pub use protocol::{Event, NoticeLevel, Request};
