//! Extraction of the bundled migration app

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::debug;

/// Writes the migration app's files into a directory
#[cfg_attr(test, mockall::automock)]
pub trait Unpacker: Send + Sync {
    fn unpack(&self, dest_dir: &Path) -> io::Result<()>;
}

/// [`Unpacker`] for a gzip-compressed tarball on disk
#[derive(Debug, Clone)]
pub struct TarballUnpacker {
    archive: PathBuf,
}

impl TarballUnpacker {
    pub fn new(archive: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
        }
    }

    pub fn archive(&self) -> &Path {
        &self.archive
    }
}

impl Unpacker for TarballUnpacker {
    fn unpack(&self, dest_dir: &Path) -> io::Result<()> {
        debug!(archive = %self.archive.display(), dest = %dest_dir.display(), "Unpacking migration app");
        let file = File::open(&self.archive)?;
        Archive::new(GzDecoder::new(file)).unpack(dest_dir)
    }
}
