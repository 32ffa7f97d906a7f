//! Stage components: the work each stage performs.

mod data_ingestion;
mod download;
mod prepare_base_model;

pub use data_ingestion::DataIngestion;
pub use download::{Downloader, HttpDownloader};
pub use prepare_base_model::PrepareBaseModel;

#[cfg(test)]
pub(crate) use download::MockDownloader;
