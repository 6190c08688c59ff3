use crate::errors::AppError;
use crate::models::AppData;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, info};

/// Reads the item store. A missing file is a fresh install; an unreadable
/// one is logged and replaced by an empty store on the next write.
pub async fn load_data(path: &Path) -> AppData {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!("no data file at {}, starting empty", path.display());
            return AppData::default();
        }
        Err(err) => {
            error!("failed to read data file {}: {err}", path.display());
            return AppData::default();
        }
    };

    match serde_json::from_slice::<AppData>(&bytes) {
        Ok(data) => data,
        Err(err) => {
            error!("failed to parse data file {}: {err}", path.display());
            AppData::default()
        }
    }
}

/// Writes the store to a sibling `.tmp` file, then renames it over `path`.
pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, payload).await?;
    fs::rename(&tmp, path).await?;
    debug!(
        items = data.items.len(),
        notifications = data.notifications.len(),
        "persisted {}",
        path.display()
    );
    Ok(())
}
