//! CLI command implementations

pub mod init;
pub mod play;
pub mod serve;
pub mod status;
