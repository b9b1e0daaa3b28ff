//! Penyimpanan file upload (foto siswa).
//!
//! Path yang dikembalikan `put` selalu relatif terhadap root penyimpanan,
//! dipisah dengan `/`, misalnya `folder-gambar/3f2a....jpg`. Path itulah yang
//! disimpan di kolom `foto`.

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Path absolut atau mengandung `..`
    #[error("Path tidak valid: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Simpan `data` di bawah `folder` dengan nama acak, kembalikan path relatifnya.
    async fn put(&self, folder: &str, data: &[u8], extension: &str) -> StorageResult<String>;

    /// Hapus file. Path yang sudah tidak ada dianggap berhasil.
    async fn delete(&self, path: &str) -> StorageResult<()>;

    async fn exists(&self, path: &str) -> StorageResult<bool>;
}

/// Tolak path yang bisa keluar dari root upload.
pub fn check_relative_path(path: &str) -> StorageResult<()> {
    let p = Path::new(path);
    let ok = !path.is_empty()
        && !path.starts_with('/')
        && !path.starts_with('\\')
        && p.components().all(|c| matches!(c, Component::Normal(_)));
    if ok {
        Ok(())
    } else {
        Err(StorageError::InvalidPath(path.to_string()))
    }
}

fn generate_name(folder: &str, extension: &str) -> String {
    format!(
        "{}/{}.{}",
        folder.trim_matches('/'),
        Uuid::new_v4().simple(),
        extension
    )
}

/// Blob store di filesystem lokal, default `./uploads`.
pub struct LocalBlobStore {
    root: PathBuf,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, path: &str) -> StorageResult<PathBuf> {
        check_relative_path(path)?;
        Ok(self.root.join(path))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, folder: &str, data: &[u8], extension: &str) -> StorageResult<String> {
        let rel = generate_name(folder, extension);
        let full = self.full_path(&rel)?;
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(&full, data).await?;
        log::debug!("blob tersimpan: {} ({} bytes)", full.display(), data.len());
        Ok(rel)
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        let full = self.full_path(path)?;
        match fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let full = self.full_path(path)?;
        Ok(fs::try_exists(&full).await?)
    }
}

/// Blob store di memori untuk pengujian handler.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: tokio::sync::RwLock<std::collections::HashMap<String, Vec<u8>>>,
}

#[cfg(test)]
impl MemoryBlobStore {
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }
}

#[cfg(test)]
#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, folder: &str, data: &[u8], extension: &str) -> StorageResult<String> {
        let rel = generate_name(folder, extension);
        check_relative_path(&rel)?;
        self.blobs.write().await.insert(rel.clone(), data.to_vec());
        Ok(rel)
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        check_relative_path(path)?;
        self.blobs.write().await.remove(path);
        Ok(())
    }

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        check_relative_path(path)?;
        Ok(self.blobs.read().await.contains_key(path))
    }
}
