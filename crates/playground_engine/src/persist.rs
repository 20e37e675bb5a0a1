use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

/// Base name of the file holding the most recent frame.
pub const LATEST_FRAME_STEM: &str = "latest_frame";

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("frame directory missing or not writable: {0}")]
    FrameDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure the frame directory exists; create if missing.
pub fn ensure_frame_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        if !dir.is_dir() {
            return Err(PersistError::FrameDir(format!(
                "{} is not a directory",
                dir.display()
            )));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::FrameDir(e.to_string()))?;
    }
    Ok(())
}

/// Guesses a file extension from the image's magic bytes.
pub fn image_extension(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G']) {
        "png"
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "jpg"
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        "webp"
    } else {
        "bin"
    }
}

/// Keeps exactly one image on disk: the last frame stored.
///
/// Each write goes to a temp file in the same directory and is renamed over
/// the target, so readers never see a half-written frame.
pub struct FrameStore {
    dir: PathBuf,
}

impl FrameStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn store(&self, image: &[u8]) -> Result<PathBuf, PersistError> {
        ensure_frame_dir(&self.dir)?;

        let target = self
            .dir
            .join(format!("{LATEST_FRAME_STEM}.{}", image_extension(image)));
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(image)?;
        tmp.flush()?;

        tmp.persist(&target).map_err(|e| PersistError::Io(e.error))?;
        self.remove_stale(&target);
        Ok(target)
    }

    // A format switch (png -> jpg) would otherwise leave the old frame behind.
    fn remove_stale(&self, keep: &Path) {
        for ext in ["png", "jpg", "webp", "bin"] {
            let candidate = self.dir.join(format!("{LATEST_FRAME_STEM}.{ext}"));
            if candidate != keep && candidate.exists() {
                let _ = fs::remove_file(candidate);
            }
        }
    }
}
