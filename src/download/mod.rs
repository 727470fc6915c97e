//! Vendor artifact URLs and downloads.

pub mod fetch;
pub mod urls;

pub use fetch::{Downloader, HttpDownloader, MockDownloader};
pub use urls::{build_url, build_url_for_arch};
