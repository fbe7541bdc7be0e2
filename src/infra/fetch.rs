// ============================================================
// Layer 6 - Dataset Fetcher
// ============================================================
// Makes sure a catalogued dataset is present on disk before
// the loader reads it:
//
//   <root>/<folder>/raw exists?  → nothing to do
//   otherwise                    → download <root>/<folder>.zip
//                                  extract it into <root>
//                                  rename <root>/<zip_folder> → <root>/<folder>
//                                  delete the zip
//
// The benchmark zips contain a single top-level folder named
// after the molecule set ("esol/"), which is why the rename
// step exists.
//
// Reference: reqwest blocking client, zip crate documentation

use anyhow::{bail, Context, Result};
use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
};

use crate::data::catalog::DatasetInfo;

pub struct DatasetFetcher {
    root: PathBuf,
}

impl DatasetFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Return the dataset folder, downloading it first when it is
    /// missing and `allow_download` is set.
    pub fn ensure(&self, info: &DatasetInfo, allow_download: bool) -> Result<PathBuf> {
        let target = self.root.join(info.folder());
        if target.join("raw").is_dir() {
            tracing::debug!("Dataset '{}' found at '{}'", info.name, target.display());
            return Ok(target);
        }
        if !allow_download {
            bail!(
                "Dataset '{}' not found at '{}' and downloading is disabled",
                info.name,
                target.display()
            );
        }

        fs::create_dir_all(&self.root)
            .with_context(|| format!("Cannot create data root '{}'", self.root.display()))?;
        let zip_path = self.root.join(format!("{}.zip", info.folder()));
        download(info.url, &zip_path)?;
        let folder = self.install_archive(info, &zip_path)?;
        discard_archive(&zip_path);
        Ok(folder)
    }

    /// Extract a downloaded archive and move it into place.
    pub fn install_archive(&self, info: &DatasetInfo, zip_path: &Path) -> Result<PathBuf> {
        let file = File::open(zip_path)
            .with_context(|| format!("Cannot open '{}'", zip_path.display()))?;
        let mut archive = zip::ZipArchive::new(file)
            .with_context(|| format!("'{}' is not a valid zip archive", zip_path.display()))?;

        tracing::info!("Extracting {} entries into '{}'", archive.len(), self.root.display());
        archive
            .extract(&self.root)
            .with_context(|| format!("Cannot extract '{}'", zip_path.display()))?;

        let extracted = self.root.join(info.zip_folder);
        let target    = self.root.join(info.folder());
        if extracted != target {
            if target.exists() {
                fs::remove_dir_all(&target)
                    .with_context(|| format!("Cannot replace '{}'", target.display()))?;
            }
            fs::rename(&extracted, &target).with_context(|| {
                format!("Cannot move '{}' to '{}'", extracted.display(), target.display())
            })?;
        }

        if !target.join("raw").is_dir() {
            bail!("Archive '{}' did not contain a raw/ folder", zip_path.display());
        }
        Ok(target)
    }
}

/// Remove the downloaded zip once extracted. A leftover archive
/// does not affect loading, so failure only warns.
fn discard_archive(zip_path: &Path) -> bool {
    match fs::remove_file(zip_path) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Cannot remove archive '{}': {}", zip_path.display(), e);
            false
        }
    }
}

fn download(url: &str, dest: &Path) -> Result<()> {
    tracing::info!("Downloading '{}'", url);
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .with_context(|| format!("Download of '{url}' failed"))?;

    let mut out = File::create(dest)
        .with_context(|| format!("Cannot create '{}'", dest.display()))?;
    let bytes = io::copy(&mut response, &mut out)
        .with_context(|| format!("Cannot write '{}'", dest.display()))?;

    tracing::info!("Downloaded {} bytes to '{}'", bytes, dest.display());
    Ok(())
}
