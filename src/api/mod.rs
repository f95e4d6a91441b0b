// Wire formats and the extraction daemon.

pub mod dto;
pub mod server;
