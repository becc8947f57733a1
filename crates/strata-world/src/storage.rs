//! On-disk layout of a world directory.
//!
//! ```text
//! <root>/level<ext>
//! <root>/players/<name><ext>
//! <root>/<b36(cx & 63)>/<b36(cz & 63)>/c.<b36(cx)>.<b36(cz)><ext>
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use strata_tag::{Compound, TagFormat};
use strata_voxel::{ChunkCoord, base36};

use crate::error::WorldError;

/// Reads and writes tag trees under a world directory.
#[derive(Clone)]
pub struct Storage {
    root: PathBuf,
    format: Arc<dyn TagFormat>,
}

impl Storage {
    pub fn new(root: impl Into<PathBuf>, format: Arc<dyn TagFormat>) -> Self {
        Self {
            root: root.into(),
            format,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn format(&self) -> &dyn TagFormat {
        self.format.as_ref()
    }

    pub fn chunk_path(&self, coord: ChunkCoord) -> PathBuf {
        let (x, z) = (i64::from(coord.x), i64::from(coord.z));
        self.root
            .join(base36(x & 63))
            .join(base36(z & 63))
            .join(format!(
                "c.{}.{}{}",
                base36(x),
                base36(z),
                self.format.extension()
            ))
    }

    pub fn level_path(&self) -> PathBuf {
        self.root.join(format!("level{}", self.format.extension()))
    }

    /// Callers validate `name` first.
    pub fn player_path(&self, name: &str) -> PathBuf {
        self.root
            .join("players")
            .join(format!("{name}{}", self.format.extension()))
    }

    /// Reads and decodes `path`. A missing or empty file is `Ok(None)`.
    pub fn read(&self, path: &Path) -> Result<Option<Compound>, WorldError> {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if bytes.is_empty() {
            return Ok(None);
        }
        self.format
            .decode(&bytes)
            .map(Some)
            .map_err(|source| WorldError::StorageCorruption {
                path: path.to_path_buf(),
                source,
            })
    }

    /// Encodes `root` and replaces `path` with it.
    ///
    /// The bytes go to a sibling temporary file that is renamed over the
    /// target, so a crash mid-write leaves the previous version intact.
    pub fn write(&self, path: &Path, root: &Compound) -> Result<(), WorldError> {
        let bytes = self
            .format
            .encode(root)
            .map_err(|source| WorldError::Encode {
                path: path.to_path_buf(),
                source,
            })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
