//! Native open/save dialogs for downloads and logo/scan image files.
//!
//! Dialogs sit behind [`FileDialogs`] so UI tests can run without a desktop session.

use std::{
    fs,
    path::{Path, PathBuf},
};

/// Image extensions offered by the open dialog.
pub const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "gif", "bmp", "webp", "tiff", "tif"];

/// A file the user picked, read fully into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

pub trait FileDialogs {
    /// Asks where to save `bytes`, suggesting `file_name`.
    ///
    /// Returns the written path, or `None` if the user cancelled.
    fn save(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<Option<PathBuf>>;

    /// Asks for an image file to open. `None` if cancelled or unreadable.
    fn pick_image(&self, title: &str) -> Option<PickedFile>;
}

/// Dialogs backed by the platform file chooser.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemDialogs;

impl FileDialogs for SystemDialogs {
    fn save(&self, file_name: &str, bytes: &[u8]) -> std::io::Result<Option<PathBuf>> {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        let Some(path) = rfd::FileDialog::new()
            .set_file_name(file_name)
            .add_filter(extension.to_uppercase(), &[extension])
            .save_file()
        else {
            log::debug!("Save dialog cancelled");
            return Ok(None);
        };

        fs::write(&path, bytes)?;
        log::info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(Some(path))
    }

    fn pick_image(&self, title: &str) -> Option<PickedFile> {
        let path = rfd::FileDialog::new()
            .add_filter("Image", &IMAGE_EXTENSIONS)
            .set_title(title)
            .pick_file()?;

        log::info!("User selected file: {}", path.display());
        read_picked(&path)
    }
}

fn read_picked(path: &Path) -> Option<PickedFile> {
    match fs::read(path) {
        Ok(bytes) => Some(PickedFile {
            name: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            bytes,
        }),
        Err(e) => {
            log::warn!("Failed to read file {}: {e}", path.display());
            None
        }
    }
}

/// Dialogs that are always cancelled. Used when there is no desktop to ask.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDialogs;

impl FileDialogs for NoDialogs {
    fn save(&self, file_name: &str, _bytes: &[u8]) -> std::io::Result<Option<PathBuf>> {
        log::debug!("No dialog available to save {file_name}");
        Ok(None)
    }

    fn pick_image(&self, _title: &str) -> Option<PickedFile> {
        None
    }
}
