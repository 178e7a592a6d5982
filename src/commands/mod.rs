//! Command implementations behind the CLI

pub mod build;
pub mod clean;
pub mod generate;
pub mod init;
pub mod list;
pub mod nav;
pub mod new;
pub mod postprocess;
pub mod timestamps;
