use std::{
    fmt::Display,
    path::{Path, PathBuf},
    sync::Arc,
};

use bytes::Bytes;
use futures::{Stream, TryFutureExt as _, TryStreamExt as _};
use sha2::{Digest, Sha256};
use tokio::{fs, io::AsyncWriteExt as _};
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

use super::{
    Store, StoreInfo, ValidPath,
    error::{StoreError, StoreResult},
};

#[inline]
fn hex(bytes: &[u8]) -> String {
    base16ct::lower::encode_string(bytes)
}

async fn cleanup<E: Display>(path: &Path, error: E) -> Result<(), E> {
    error!("Failed to store file to tmp path {path:?}: {error}");
    fs::remove_file(path)
        .await
        .map_err(|e| error!("Failed to remove file {path:?}: {e}"))
        .ok();
    Err(error)
}

struct FileStoreInner {
    root: PathBuf,
}

#[derive(Clone)]
pub struct FileStore {
    inner: Arc<FileStoreInner>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            inner: Arc::new(FileStoreInner { root: root.into() }),
        }
    }

    async fn prepare_path(&self, path: &ValidPath) -> StoreResult<(PathBuf, PathBuf)> {
        let final_path = self.inner.root.join(path.as_ref());
        if final_path.is_dir() {
            return Err(StoreError::InvalidPath);
        }
        if let Some(parent_dir) = final_path.parent() {
            if !fs::try_exists(parent_dir).await? {
                fs::create_dir_all(parent_dir).await?;
            }
        }
        let tmp_path = final_path.with_extension("tmp");
        Ok((final_path, tmp_path))
    }
}

impl Store for FileStore {
    async fn store_data(&self, path: &ValidPath, data: &[u8]) -> StoreResult<StoreInfo> {
        let (final_path, tmp_path) = self.prepare_path(path).await?;
        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(data)
            .or_else(|e| cleanup(&tmp_path, e))
            .await?;
        // rename only after content has hit the disk, so a record never
        // references a half-written blob
        file.sync_all().or_else(|e| cleanup(&tmp_path, e)).await?;
        fs::rename(&tmp_path, &final_path).await?;
        let digest = Sha256::digest(data);
        let size = data.len() as u64;
        debug!("Stored {size} bytes to {final_path:?}");
        Ok(StoreInfo {
            final_path: path.clone(),
            size,
            hash: hex(&digest),
        })
    }

    async fn load_data(
        &self,
        path: &ValidPath,
    ) -> Result<impl Stream<Item = StoreResult<Bytes>> + 'static, StoreError> {
        let final_path = self.inner.root.join(path.as_ref());
        let file = fs::File::open(&final_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(path.as_ref().to_string())
            } else {
                e.into()
            }
        })?;
        let stream = ReaderStream::new(file).map_err(StoreError::from);
        Ok(stream)
    }

    async fn remove_data(&self, path: &ValidPath) -> StoreResult<()> {
        let final_path = self.inner.root.join(path.as_ref());
        fs::remove_file(&final_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::NotFound(path.as_ref().to_string())
            } else {
                e.into()
            }
        })
    }

    async fn size(&self, path: &ValidPath) -> StoreResult<u64> {
        let final_path = self.inner.root.join(path.as_ref());
        let meta = fs::metadata(&final_path).await?;
        Ok(meta.len())
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt as _;

    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 3)]
    async fn test_store() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let content = b"neco tady je";
        let store = FileStore::new(tmp_dir.path());
        let store2 = store.clone();
        // test to move store to other thread
        let validated_path = ValidPath::new("usulans/sampul.jpg").unwrap();
        let validated_path2 = validated_path.clone();
        let handle =
            tokio::spawn(async move { store2.store_data(&validated_path2, content).await });
        let res = handle.await.unwrap().unwrap();
        assert_eq!(res.size, 12);
        assert_eq!(res.final_path, validated_path);
        assert!(tmp_dir.path().join("usulans/sampul.jpg").exists());
        assert_eq!(
            fs::read(tmp_dir.path().join("usulans/sampul.jpg"))
                .await
                .unwrap(),
            content
        );
        assert_eq!(store.size(&validated_path).await.unwrap(), 12);
    }

    #[tokio::test]
    async fn test_remove() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp_dir.path());
        let path = ValidPath::new("usulans/mizet.png").unwrap();
        store.store_data(&path, b"data").await.unwrap();
        assert!(tmp_dir.path().join("usulans/mizet.png").exists());

        store.remove_data(&path).await.unwrap();
        assert!(!tmp_dir.path().join("usulans/mizet.png").exists());

        let err = store.remove_data(&path).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_load() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let data: Vec<u8> = (0..100 * 1024).map(|_| rand::random::<u8>()).collect();
        let path = ValidPath::new("usulans/velky.gif").unwrap();
        let store = FileStore::new(tmp_dir.path());
        store.store_data(&path, &data).await.unwrap();

        let mut stream = store.load_data(&path).await.unwrap();
        let mut loaded = Vec::with_capacity(data.len());
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.unwrap();
            loaded.extend_from_slice(&chunk);
        }
        assert_eq!(loaded, data);

        let missing = ValidPath::new("usulans/neni.jpg").unwrap();
        let err = store.load_data(&missing).await.err().unwrap();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
