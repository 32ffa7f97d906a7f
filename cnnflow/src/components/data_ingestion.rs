//! Dataset download and extraction.

use super::download::Downloader;
use crate::config::DataIngestionConfig;
use crate::constants::DRIVE_DOWNLOAD_PREFIX;
use crate::core::{ArtifactKind, StageArtifact};
use crate::errors::{ArchiveError, DownloadError, PipelineError};
use crate::utils::{create_directories, get_size};
use md5::{Digest, Md5};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Downloads the dataset archive and unpacks it.
///
/// Every call re-downloads and re-extracts; nothing is skipped when the
/// artifacts already exist.
pub struct DataIngestion {
    config: DataIngestionConfig,
    downloader: Arc<dyn Downloader>,
}

impl fmt::Debug for DataIngestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataIngestion")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DataIngestion {
    /// Creates the component.
    #[must_use]
    pub fn new(config: DataIngestionConfig, downloader: Arc<dyn Downloader>) -> Self {
        Self { config, downloader }
    }

    /// Returns the stage configuration.
    #[must_use]
    pub fn config(&self) -> &DataIngestionConfig {
        &self.config
    }

    /// Turns a Drive share link into a direct-download URL.
    ///
    /// The file id is the second-to-last `/`-separated segment, so
    /// `https://drive.google.com/file/d/<id>/view?usp=sharing` yields `<id>`.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidSourceUrl`] if the link has fewer than
    /// two segments or the id segment is empty.
    pub fn resolve_download_url(source_url: &str) -> Result<String, DownloadError> {
        let segments: Vec<&str> = source_url.trim().split('/').collect();
        let file_id = segments
            .len()
            .checked_sub(2)
            .and_then(|i| segments.get(i))
            .copied()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DownloadError::InvalidSourceUrl {
                url: source_url.to_string(),
            })?;
        Ok(format!("{DRIVE_DOWNLOAD_PREFIX}{file_id}"))
    }

    /// Downloads the archive to `local_data_file`.
    ///
    /// # Errors
    ///
    /// Returns the downloader's error unchanged, or an I/O error if the
    /// destination directory cannot be created or the file inspected.
    pub async fn download_file(&self) -> Result<StageArtifact, PipelineError> {
        let url = Self::resolve_download_url(&self.config.source_url)?;
        let dest = &self.config.local_data_file;
        if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_directories(&[parent], false)?;
        }

        info!(url = %url, dest = %dest.display(), "Downloading data");
        let bytes = self.downloader.download(&url, dest).await?;
        let size = get_size(dest)?;
        let md5 = file_md5(dest.clone()).await?;
        info!(
            dest = %dest.display(),
            bytes,
            size = %size,
            md5 = %md5,
            "Downloaded data"
        );

        Ok(StageArtifact::new(ArtifactKind::Archive, "archive", dest)
            .with_metadata("source_url", serde_json::json!(self.config.source_url))
            .with_metadata("bytes", serde_json::json!(bytes))
            .with_metadata("size", serde_json::json!(size))
            .with_metadata("md5", serde_json::json!(md5)))
    }

    /// Extracts every archive entry into `unzip_dir` and returns the entry
    /// count.
    ///
    /// Entry names are used as the zip library sanitizes them; no further
    /// checks on sizes or contents are made.
    ///
    /// # Errors
    ///
    /// Returns an [`ArchiveError`] if the archive cannot be opened or is
    /// corrupt, or an I/O error if `unzip_dir` cannot be created.
    pub async fn extractor(&self) -> Result<usize, PipelineError> {
        let archive = self.config.local_data_file.clone();
        let destination = self.config.unzip_dir.clone();
        create_directories(&[&destination], false)?;

        info!(
            archive = %archive.display(),
            destination = %destination.display(),
            "Extracting archive"
        );
        let entries = tokio::task::spawn_blocking(move || extract_zip(&archive, &destination))
            .await
            .map_err(|e| PipelineError::Internal(format!("extraction task failed: {e}")))??;
        info!(entries, "Extraction complete");

        Ok(entries)
    }
}

fn extract_zip(archive: &Path, destination: &Path) -> Result<usize, ArchiveError> {
    let extract_err = |source| ArchiveError::Extract {
        archive: archive.to_path_buf(),
        destination: destination.to_path_buf(),
        source,
    };
    let file = std::fs::File::open(archive).map_err(|source| ArchiveError::Open {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut zip = zip::ZipArchive::new(file).map_err(extract_err)?;
    let entries = zip.len();
    zip.extract(destination).map_err(extract_err)?;
    Ok(entries)
}

async fn file_md5(path: PathBuf) -> Result<String, PipelineError> {
    tokio::task::spawn_blocking(move || {
        let mut file = std::fs::File::open(&path).map_err(|e| PipelineError::io(&path, e))?;
        let mut hasher = Md5::new();
        std::io::copy(&mut file, &mut hasher).map_err(|e| PipelineError::io(&path, e))?;
        Ok(hex::encode(hasher.finalize()))
    })
    .await
    .map_err(|e| PipelineError::Internal(format!("checksum task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::MockDownloader;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const SHARE_LINK: &str = "https://drive.google.com/file/d/ABC123/view?usp=sharing";

    fn config(root: &Path) -> DataIngestionConfig {
        DataIngestionConfig {
            root_dir: root.join("data_ingestion"),
            source_url: SHARE_LINK.to_string(),
            local_data_file: root.join("data_ingestion/data.zip"),
            unzip_dir: root.join("data_ingestion"),
        }
    }

    fn write_zip(path: &Path, entries: &[(&str, &[u8])]) {
        let file = std::fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, body) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(body).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_resolve_download_url() {
        assert_eq!(
            DataIngestion::resolve_download_url(SHARE_LINK).unwrap(),
            "https://drive.google.com/uc?/export=download&id=ABC123"
        );
        assert_eq!(
            DataIngestion::resolve_download_url("https://host/d/XYZ/").unwrap(),
            "https://drive.google.com/uc?/export=download&id=XYZ"
        );
    }

    #[test]
    fn test_resolve_download_url_rejects_links_without_id() {
        for bad in ["ABC123", "https://host//view", ""] {
            assert!(matches!(
                DataIngestion::resolve_download_url(bad),
                Err(DownloadError::InvalidSourceUrl { .. })
            ));
        }
    }

    #[tokio::test]
    async fn test_download_file_uses_resolved_url() {
        let tmp = tempfile::tempdir().unwrap();
        let mut downloader = MockDownloader::new();
        downloader
            .expect_download()
            .withf(|url, _| url == "https://drive.google.com/uc?/export=download&id=ABC123")
            .times(1)
            .returning(|_, dest| {
                std::fs::write(dest, b"hello").unwrap();
                Ok(5)
            });

        let ingestion = DataIngestion::new(config(tmp.path()), Arc::new(downloader));
        let artifact = ingestion.download_file().await.unwrap();

        assert_eq!(artifact.kind, ArtifactKind::Archive);
        assert_eq!(artifact.metadata["bytes"], serde_json::json!(5));
        assert_eq!(
            artifact.metadata["md5"],
            serde_json::json!("5d41402abc4b2a76b9719d911017c592")
        );
        assert_eq!(artifact.metadata["size"], serde_json::json!("~ 0 KB"));
    }

    #[tokio::test]
    async fn test_download_errors_propagate_unchanged() {
        let tmp = tempfile::tempdir().unwrap();
        let mut downloader = MockDownloader::new();
        downloader.expect_download().returning(|url, _| {
            Err(DownloadError::Status {
                url: url.to_string(),
                status: 503,
            })
        });

        let ingestion = DataIngestion::new(config(tmp.path()), Arc::new(downloader));
        let err = ingestion.download_file().await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Download(DownloadError::Status { status: 503, .. })
        ));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_extractor_unpacks_every_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config(tmp.path());
        std::fs::create_dir_all(&cfg.root_dir).unwrap();
        write_zip(
            &cfg.local_data_file,
            &[
                ("Chicken-fecal-images/Coccidiosis/a.jpg", b"a"),
                ("Chicken-fecal-images/Healthy/b.jpg", b"bb"),
            ],
        );

        let ingestion = DataIngestion::new(cfg.clone(), Arc::new(MockDownloader::new()));
        let entries = ingestion.extractor().await.unwrap();

        assert_eq!(entries, 2);
        let extracted = cfg.unzip_dir.join("Chicken-fecal-images/Healthy/b.jpg");
        assert_eq!(std::fs::read(extracted).unwrap(), b"bb");
    }

    #[tokio::test]
    async fn test_extractor_rejects_corrupt_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config(tmp.path());
        std::fs::create_dir_all(&cfg.root_dir).unwrap();
        std::fs::write(&cfg.local_data_file, b"not a zip").unwrap();

        let ingestion = DataIngestion::new(cfg, Arc::new(MockDownloader::new()));
        let err = ingestion.extractor().await.unwrap_err();

        assert!(matches!(err, PipelineError::Archive(ArchiveError::Extract { .. })));
    }

    #[tokio::test]
    async fn test_extractor_without_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let ingestion = DataIngestion::new(config(tmp.path()), Arc::new(MockDownloader::new()));

        let err = ingestion.extractor().await.unwrap_err();
        assert!(matches!(err, PipelineError::Archive(ArchiveError::Open { .. })));
    }
}
