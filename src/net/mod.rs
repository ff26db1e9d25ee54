//! Network access for installer downloads.

pub mod download;

pub use download::Downloader;
