use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::utils::filesystem::{ensure_parent_dir_exists, recreate_dir, remove_existing};

pub const PART_FILE_NAME: &str = "part-00000.csv";
pub const SUCCESS_MARKER: &str = "_SUCCESS";

/// Where a cleaned table lands.
///
/// A destination ending in `.csv` is written as that single file. Anything
/// else is a table directory holding one part file plus a `_SUCCESS` marker
/// that only appears once the part file is complete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLayout {
    File(PathBuf),
    Directory(PathBuf),
}

impl OutputLayout {
    pub fn for_destination(destination: PathBuf) -> Self {
        let is_csv_file = destination
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));

        if is_csv_file {
            OutputLayout::File(destination)
        } else {
            OutputLayout::Directory(destination)
        }
    }

    pub fn destination(&self) -> &Path {
        match self {
            OutputLayout::File(path) | OutputLayout::Directory(path) => path,
        }
    }

    pub fn data_file(&self) -> PathBuf {
        match self {
            OutputLayout::File(path) => path.clone(),
            OutputLayout::Directory(dir) => dir.join(PART_FILE_NAME),
        }
    }

    /// Clears out the previous run's output and returns the file to write.
    pub async fn prepare(&self) -> Result<PathBuf> {
        match self {
            OutputLayout::File(path) => {
                ensure_parent_dir_exists(path).await?;
                remove_existing(path).await?;
            }
            OutputLayout::Directory(dir) => recreate_dir(dir).await?,
        }
        Ok(self.data_file())
    }

    pub async fn commit(&self) -> Result<()> {
        if let OutputLayout::Directory(dir) = self {
            tokio::fs::write(dir.join(SUCCESS_MARKER), b"").await?;
        }
        Ok(())
    }

    /// Removes anything a failed run left behind.
    pub async fn discard(&self) -> Result<()> {
        remove_existing(self.destination()).await
    }
}
