use crate::error::Result;
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Location of a stored certificate inside `certs_dir`.
///
/// Rows keep the path that was current when the image was rendered; only its
/// file name is trusted, so a moved certificates directory keeps working.
pub(crate) fn certificate_file_path(certs_dir: &Path, stored: &str) -> Option<PathBuf> {
    let name = Path::new(stored).file_name()?;
    Some(certs_dir.join(name))
}

/// Removes the image of a certificate. A file that is already gone is not an error.
pub(crate) fn remove_certificate_file(certs_dir: &Path, stored: &str) -> Result<()> {
    let Some(path) = certificate_file_path(certs_dir, stored) else {
        warn!("Certificate path '{stored}' has no file name, nothing to remove");
        return Ok(());
    };
    match std::fs::remove_file(&path) {
        Ok(()) => {
            debug!("Removed certificate file {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("Certificate file {} was already missing", path.display());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
