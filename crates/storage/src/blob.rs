//! On-disk blob persistence.
//!
//! Layout: `<base>/<user_id>/<normalised storage key>`. Keys are normalised
//! lexically before touching the filesystem; anything that would resolve
//! outside the user's directory is refused without side effects.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::BlobStore;

#[cfg(unix)]
const DIR_MODE: u32 = 0o750;
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

/// Blob store rooted at a base directory.
pub struct FileStore {
    base: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `base`, creating the directory if needed.
    pub fn new(base: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base = base.into();
        std::fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    /// Resolve `(user_id, storage_key)` to a path strictly inside the user's
    /// directory.
    fn resolve(&self, user_id: Uuid, storage_key: &str) -> Result<PathBuf, StoreError> {
        let relative = normalise_key(storage_key)?;
        let user_root = self.base.join(user_id.to_string());
        let full = user_root.join(relative);
        // The lexical clean leaves no parent components, so this holds by
        // construction; keep the guard as the last line of defence.
        if !full.starts_with(&user_root) {
            return Err(StoreError::PathTraversal);
        }
        Ok(full)
    }

    fn user_root(&self, user_id: Uuid) -> PathBuf {
        self.base.join(user_id.to_string())
    }

    #[cfg(unix)]
    async fn apply_dir_modes(&self, user_root: &Path, leaf_dir: &Path) -> std::io::Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let mut dir = leaf_dir.to_path_buf();
        while dir.starts_with(user_root) {
            tokio::fs::set_permissions(&dir, std::fs::Permissions::from_mode(DIR_MODE)).await?;
            if dir == *user_root {
                break;
            }
            match dir.parent() {
                Some(parent) => dir = parent.to_path_buf(),
                None => break,
            }
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for FileStore {
    async fn save(&self, user_id: Uuid, storage_key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let full = self.resolve(user_id, storage_key)?;
        let user_root = self.user_root(user_id);

        let parent = full.parent().unwrap_or(&user_root).to_path_buf();
        tokio::fs::create_dir_all(&parent).await?;
        #[cfg(unix)]
        self.apply_dir_modes(&user_root, &parent).await?;

        tokio::fs::write(&full, bytes).await?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&full, std::fs::Permissions::from_mode(FILE_MODE)).await?;
        }
        Ok(())
    }

    async fn load(&self, user_id: Uuid, storage_key: &str) -> Result<Vec<u8>, StoreError> {
        let full = self.resolve(user_id, storage_key)?;
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(StoreError::BlobNotFound),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, user_id: Uuid, storage_key: &str) -> Result<(), StoreError> {
        let full = self.resolve(user_id, storage_key)?;
        match tokio::fs::remove_file(&full).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        }

        // Best-effort cleanup of now-empty parents, stopping at the user
        // root. A non-empty directory simply ends the walk.
        let user_root = self.user_root(user_id);
        let mut dir = full.parent().map(Path::to_path_buf);
        while let Some(current) = dir {
            if current == user_root || !current.starts_with(&user_root) {
                break;
            }
            if tokio::fs::remove_dir(&current).await.is_err() {
                break;
            }
            dir = current.parent().map(Path::to_path_buf);
        }
        Ok(())
    }
}

/// Normalise a storage key into a safe relative path: backslashes become
/// slashes, empty and `.` segments drop out, and `..` may not climb past the
/// key's own root.
fn normalise_key(storage_key: &str) -> Result<PathBuf, StoreError> {
    let unified = storage_key.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(StoreError::PathTraversal);
                }
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return Err(StoreError::PathTraversal);
    }
    Ok(segments.iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, FileStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path().join("blobs")).unwrap();
        (tmp, store)
    }

    #[test]
    fn keys_normalise() {
        assert_eq!(
            normalise_key("docs/taxes.pdf").unwrap(),
            PathBuf::from("docs/taxes.pdf")
        );
        assert_eq!(
            normalise_key("./docs//2024/../2025/report.txt").unwrap(),
            PathBuf::from("docs/2025/report.txt")
        );
        assert_eq!(
            normalise_key("windows\\style\\key.bin").unwrap(),
            PathBuf::from("windows/style/key.bin")
        );
        assert_eq!(normalise_key("/rooted/key").unwrap(), PathBuf::from("rooted/key"));
    }

    #[test]
    fn traversal_keys_are_refused() {
        for key in ["../../../etc/passwd", "..", "a/../..", "", ".", "./"] {
            assert!(
                matches!(normalise_key(key), Err(StoreError::PathTraversal)),
                "key {key:?} must be refused"
            );
        }
    }

    #[tokio::test]
    async fn save_load_delete_roundtrip() {
        let (_tmp, store) = store();
        let user = Uuid::new_v4();

        store.save(user, "docs/a.txt", b"hello").await.unwrap();
        assert_eq!(store.load(user, "docs/a.txt").await.unwrap(), b"hello");

        store.delete(user, "docs/a.txt").await.unwrap();
        assert!(matches!(
            store.load(user, "docs/a.txt").await.unwrap_err(),
            StoreError::BlobNotFound
        ));
        // Idempotent.
        store.delete(user, "docs/a.txt").await.unwrap();
    }

    #[tokio::test]
    async fn traversal_leaves_no_trace() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::new(tmp.path().join("blobs")).unwrap();
        let user = Uuid::new_v4();

        let err = store
            .save(user, "../../../etc/passwd", b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::PathTraversal));
        // Not even the user directory appears.
        assert!(!tmp.path().join("blobs").join(user.to_string()).exists());
    }

    #[tokio::test]
    async fn delete_prunes_empty_parents_but_not_user_root() {
        let (_tmp, store) = store();
        let user = Uuid::new_v4();

        store.save(user, "a/b/c.txt", b"x").await.unwrap();
        store.save(user, "a/keep.txt", b"y").await.unwrap();

        store.delete(user, "a/b/c.txt").await.unwrap();
        let user_root = store.user_root(user);
        assert!(!user_root.join("a/b").exists());
        // `a` still holds keep.txt.
        assert!(user_root.join("a/keep.txt").exists());

        store.delete(user, "a/keep.txt").await.unwrap();
        assert!(!user_root.join("a").exists());
        assert!(user_root.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn modes_are_restrictive() {
        use std::os::unix::fs::PermissionsExt;

        let (_tmp, store) = store();
        let user = Uuid::new_v4();
        store.save(user, "docs/a.txt", b"x").await.unwrap();

        let file_mode = std::fs::metadata(store.user_root(user).join("docs/a.txt"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(file_mode & 0o777, FILE_MODE);

        let dir_mode = std::fs::metadata(store.user_root(user).join("docs"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(dir_mode & 0o777, DIR_MODE);
    }

    #[tokio::test]
    async fn same_key_different_users_do_not_collide() {
        let (_tmp, store) = store();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store.save(alice, "shared.txt", b"alice").await.unwrap();
        store.save(bob, "shared.txt", b"bob").await.unwrap();

        assert_eq!(store.load(alice, "shared.txt").await.unwrap(), b"alice");
        assert_eq!(store.load(bob, "shared.txt").await.unwrap(), b"bob");
    }
}
