use crate::naming::{NamingScheme, SampleKey};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use std::io::ErrorKind;
use facegate_core::{Error, Result};
use image::{ImageFormat, RgbImage};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A sample file found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSample {
    pub key: SampleKey,
    pub path: PathBuf,
}

/// One dataset split: a directory of images named by a [`NamingScheme`]
#[derive(Debug, Clone)]
pub struct SampleStore {
    dir: PathBuf,
    scheme: NamingScheme,
}

impl SampleStore {
    pub fn new<P: AsRef<Path>>(dir: P, scheme: NamingScheme) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            scheme,
        }
    }

    #[inline]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[inline]
    pub fn path_for(&self, key: SampleKey) -> PathBuf {
        self.dir.join(self.scheme.file_name(key))
    }

    /// All sample files, sorted by key. Files with the scheme's extension
    /// but an unparsable name are skipped with a warning.
    pub fn scan(&self) -> Result<Vec<StoredSample>> {
        let mut samples = Vec::new();

        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            match self.scheme.parse(name) {
                Some(key) => samples.push(StoredSample {
                    key,
                    path: entry.path(),
                }),
                None if self.scheme.has_extension(name) => {
                    warn!("Skipping sample with unrecognized name {:?} in {:?}", name, self.dir);
                }
                None => {}
            }
        }

        samples.sort_by_key(|s| s.key);
        Ok(samples)
    }

    /// Decode a stored image. Failure here means the dataset is corrupt.
    pub fn read(&self, path: &Path) -> Result<RgbImage> {
        let image = image::open(path)
            .map_err(|e| Error::Image(format!("{}: {}", path.display(), e)))?;
        Ok(image.to_rgb8())
    }

    /// Encode `image` and write it at `key`'s path in one atomic step.
    /// An existing file at that key is never overwritten; that case is
    /// reported as [`Error::SampleExists`].
    pub fn write(&self, key: SampleKey, image: &RgbImage) -> Result<PathBuf> {
        let format = ImageFormat::from_extension(&self.scheme.extension).ok_or_else(|| {
            Error::InvalidConfig(format!("unsupported image extension {:?}", self.scheme.extension))
        })?;

        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), format)?;

        let path = self.path_for(key);
        AtomicFile::new(&path, OverwriteBehavior::DisallowOverwrite)
            .write(|f| f.write_all(&bytes))
            .map_err(|e| match e {
                atomicwrites::Error::Internal(e) if e.kind() == ErrorKind::AlreadyExists => {
                    Error::SampleExists(path.display().to_string())
                }
                e => Error::Storage(format!("{}: {}", path.display(), e)),
            })?;

        debug!("Wrote sample {} to {:?}", key, path);
        Ok(path)
    }

    /// Remove the files for `keys`; returns how many were removed.
    /// Missing files are logged and skipped.
    pub fn remove(&self, keys: &[SampleKey]) -> Result<usize> {
        let mut removed = 0;
        for &key in keys {
            let path = self.path_for(key);
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Removed sample {} at {:?}", key, path);
                    removed += 1;
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    warn!("Sample {} already missing at {:?}", key, path);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facegate_core::Uid;

    fn store() -> (tempfile::TempDir, SampleStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SampleStore::new(dir.path(), NamingScheme::default());
        (dir, store)
    }

    fn image(shade: u8) -> RgbImage {
        RgbImage::from_pixel(8, 8, image::Rgb([shade, shade, shade]))
    }

    #[test]
    fn test_write_scan_read() {
        let (_dir, store) = store();
        store.write(SampleKey::new(Uid(1), 1), &image(10)).unwrap();
        store.write(SampleKey::new(Uid(0), 0), &image(20)).unwrap();
        store.write(SampleKey::new(Uid(1), 0), &image(30)).unwrap();

        let keys: Vec<SampleKey> = store.scan().unwrap().into_iter().map(|s| s.key).collect();
        assert_eq!(
            keys,
            vec![
                SampleKey::new(Uid(0), 0),
                SampleKey::new(Uid(1), 0),
                SampleKey::new(Uid(1), 1),
            ]
        );

        let path = store.path_for(SampleKey::new(Uid(1), 1));
        let read = store.read(&path).unwrap();
        assert_eq!(read.dimensions(), (8, 8));
    }

    #[test]
    fn test_write_never_overwrites() {
        let (_dir, store) = store();
        let key = SampleKey::new(Uid(2), 0);
        store.write(key, &image(1)).unwrap();
        assert!(matches!(store.write(key, &image(2)), Err(Error::SampleExists(_))));
    }

    #[test]
    fn test_scan_ignores_foreign_files() {
        let (dir, store) = store();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::write(dir.path().join("face.jpg"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("0001.0000.jpg.d")).unwrap();
        store.write(SampleKey::new(Uid(3), 0), &image(5)).unwrap();

        let samples = store.scan().unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].key, SampleKey::new(Uid(3), 0));
    }

    #[test]
    fn test_remove_counts_and_skips_missing() {
        let (_dir, store) = store();
        store.write(SampleKey::new(Uid(1), 0), &image(5)).unwrap();
        store.write(SampleKey::new(Uid(1), 1), &image(5)).unwrap();

        let removed = store
            .remove(&[
                SampleKey::new(Uid(1), 0),
                SampleKey::new(Uid(1), 1),
                SampleKey::new(Uid(1), 2),
            ])
            .unwrap();
        assert_eq!(removed, 2);
        assert!(store.scan().unwrap().is_empty());
    }

    #[test]
    fn test_scan_skips_non_canonical_names() {
        let (dir, store) = store();
        image(5).save(dir.path().join("1.0.jpg")).unwrap();
        image(5).save(dir.path().join("01.0000.jpg")).unwrap();
        store.write(SampleKey::new(Uid(1), 0), &image(5)).unwrap();

        let samples = store.scan().unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].path, store.path_for(SampleKey::new(Uid(1), 0)));
    }

    #[test]
    fn test_read_corrupt_image_fails() {
        let (dir, store) = store();
        let path = dir.path().join("0000.0000.jpg");
        std::fs::write(&path, b"not a jpeg").unwrap();
        assert!(matches!(store.read(&path), Err(Error::Image(_))));
    }
}
