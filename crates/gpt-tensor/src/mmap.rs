use std::fs::File;
use std::marker::PhantomData;
use std::mem::size_of;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use memmap2::Mmap;

use crate::dtype::Element;
use crate::error::{Result, TensorError};
use crate::storage::Storage;

/// A read-only memory mapping of a whole file, viewed as elements of `T`.
///
/// Weight files are raw and headerless: the bytes are the row-major element
/// values and the shape comes from the caller. A trailing partial element,
/// if any, is not addressable.
///
/// There is no `StorageMut` impl. A mapped weight table cannot be written
/// through a tensor.
pub struct MmapStorage<T: Element> {
    mmap: Mmap,
    path: PathBuf,
    len: u32,
    _elem: PhantomData<T>,
}

impl<T: Element> MmapStorage<T> {
    /// Map the file at `path`.
    ///
    /// The file handle is closed before returning; the mapping stays valid
    /// until the storage is dropped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|source| TensorError::FileOpen {
            path: path.clone(),
            source,
        })?;
        let byte_size = file
            .metadata()
            .map_err(|source| TensorError::Stat {
                path: path.clone(),
                source,
            })?
            .len();
        log::info!("load {}: {} bytes", path.display(), byte_size);

        // The file is opened read-only and the mapping is never written.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|source| TensorError::Map {
            path: path.clone(),
            source,
        })?;

        let n_elem = mmap.len() / size_of::<T>();
        let len = u32::try_from(n_elem).map_err(|_| TensorError::TooLarge {
            path: path.clone(),
            len: n_elem,
        })?;
        log::debug!("{} mapped as {} x {}", path.display(), len, T::DTYPE);

        Ok(MmapStorage {
            mmap,
            path,
            len,
            _elem: PhantomData,
        })
    }

    /// Convenience for `Rc::new(MmapStorage::load(path)?)`.
    pub fn open(path: impl AsRef<Path>) -> Result<Rc<Self>> {
        Ok(Rc::new(Self::load(path)?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the mapped file in bytes.
    pub fn byte_size(&self) -> usize {
        self.mmap.len()
    }

    /// The mapped elements. Mappings are page aligned, so the cast is valid
    /// for every element type.
    pub fn as_slice(&self) -> &[T] {
        let bytes = &self.mmap[..self.len as usize * size_of::<T>()];
        bytemuck::cast_slice(bytes)
    }
}

impl<T: Element> Storage for MmapStorage<T> {
    type Elem = T;

    fn len(&self) -> u32 {
        self.len
    }

    #[inline]
    fn at(&self, index: u32) -> T {
        debug_assert!(
            index < self.len,
            "index {} out of range for {} ({} elements)",
            index,
            self.path.display(),
            self.len
        );
        let start = index as usize * size_of::<T>();
        bytemuck::pod_read_unaligned(&self.mmap[start..start + size_of::<T>()])
    }
}

impl<T: Element> std::fmt::Debug for MmapStorage<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MmapStorage")
            .field("path", &self.path)
            .field("dtype", &T::DTYPE)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use half::f16;
    use tempfile::NamedTempFile;

    fn write_weights<T: Element>(values: &[T]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytemuck::cast_slice(values)).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_f32_file() {
        let file = write_weights(&[1.0f32, 2.5, -3.0, 4.0]);
        let storage = MmapStorage::<f32>::load(file.path()).unwrap();
        assert_eq!(storage.len(), 4);
        assert_eq!(storage.byte_size(), 16);
        assert_eq!(storage.path(), file.path());
        assert_eq!(storage.at(1), 2.5);
        assert_eq!(storage.to_vec(), vec![1.0, 2.5, -3.0, 4.0]);
    }

    #[test]
    fn test_trailing_partial_element_is_ignored() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytemuck::cast_slice(&[7u32, 9u32])).unwrap();
        file.write_all(&[0xAB, 0xCD]).unwrap();
        file.flush().unwrap();

        let storage = MmapStorage::<u32>::load(file.path()).unwrap();
        assert_eq!(storage.byte_size(), 10);
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.as_slice(), &[7, 9]);
    }

    #[test]
    fn test_load_f16_file() {
        let values = [f16::from_f32(0.5), f16::from_f32(-2.0)];
        let file = write_weights(&values);
        let storage = MmapStorage::<f16>::open(file.path()).unwrap();
        assert_eq!(storage.len(), 2);
        assert_eq!(storage.at(1).to_f32(), -2.0);
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.weight");
        let err = MmapStorage::<f32>::load(&path).unwrap_err();
        match err {
            TensorError::FileOpen { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected FileOpen, got {other:?}"),
        }
    }

    #[test]
    fn test_open_error_message_names_path() {
        let err = MmapStorage::<f32>::load("/nonexistent/models/wte.weight").unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to open file: /nonexistent/models/wte.weight"
        );
    }

    #[test]
    fn test_directory_is_map_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = MmapStorage::<f32>::load(dir.path()).unwrap_err();
        match err {
            TensorError::Map { path, .. } => assert_eq!(path, dir.path()),
            other => panic!("expected Map, got {other:?}"),
        }
    }

    #[test]
    fn test_at_matches_as_slice() {
        let values: Vec<f32> = (0..33).map(|v| v as f32 * 0.25).collect();
        let file = write_weights(&values);
        let storage = MmapStorage::<f32>::load(file.path()).unwrap();
        for i in 0..storage.len() {
            assert_eq!(storage.at(i), storage.as_slice()[i as usize]);
        }
    }

    #[test]
    fn test_mapping_outlives_file_handle() {
        let file = write_weights(&[1u32, 2, 3]);
        let storage = MmapStorage::<u32>::open(file.path()).unwrap();
        let path = file.path().to_path_buf();
        drop(file);
        assert!(!path.exists());
        assert_eq!(storage.to_vec(), vec![1, 2, 3]);
    }
}
