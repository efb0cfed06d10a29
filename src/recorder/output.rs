//! Output file allocation for recordings.

use chrono::Local;
use std::io;
use std::path::{Path, PathBuf};

/// Allocate a fresh output path under `<root>/video/`, keyed by the current
/// local time at seconds resolution: `VID_ddMMyyyy_HHmmss.mp4`. The
/// directory is created if missing; the file itself is created by the
/// driver once recording starts.
pub fn new_output_file(root: &Path) -> io::Result<PathBuf> {
    let dir = root.join("video");
    std::fs::create_dir_all(&dir)?;
    let stamp = Local::now().format("%d%m%Y_%H%M%S");
    Ok(dir.join(format!("VID_{stamp}.mp4")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_embeds_timestamp_and_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let path = new_output_file(tmp.path()).unwrap();

        assert_eq!(path.parent().unwrap(), tmp.path().join("video"));
        assert!(path.parent().unwrap().is_dir());

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("VID_"));
        assert!(name.ends_with(".mp4"));
        // VID_ + ddMMyyyy + _ + HHmmss + .mp4
        assert_eq!(name.len(), "VID_".len() + 8 + 1 + 6 + ".mp4".len());
    }
}
