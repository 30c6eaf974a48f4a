//! Backup module - exports a CVAT project and downloads the archive.

mod client;
#[cfg(test)]
mod client_test;
mod error;
#[cfg(test)]
pub(crate) mod fake_server;
mod status;

pub use client::{BackupClient, archive_file_name, init_crypto};
pub use error::{BackupError, BackupResult};
pub use status::{ExportStarted, ExportStatus, RequestDetails};
