use anyhow::{Result, anyhow};
use std::path::Path;
use tokio::fs::{create_dir_all, metadata, remove_dir_all, remove_file};

pub async fn ensure_parent_dir_exists(path: &Path) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow!("Output directory not found for {}", path.display()))?;
    if !parent.as_os_str().is_empty() {
        create_dir_all(parent).await?;
    }
    Ok(())
}

/// Removes whatever is at `path` and leaves an empty directory in its place.
pub async fn recreate_dir(path: &Path) -> Result<()> {
    remove_existing(path).await?;
    create_dir_all(path).await?;
    Ok(())
}

/// Removes a file or directory tree at `path`, if anything is there.
pub async fn remove_existing(path: &Path) -> Result<()> {
    match metadata(path).await {
        Ok(meta) if meta.is_dir() => remove_dir_all(path).await?,
        Ok(_) => remove_file(path).await?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
