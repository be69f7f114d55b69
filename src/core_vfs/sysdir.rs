use super::{FileInfo, Node, ReadStream, VfsError, WriteStream};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};

/// A virtual filesystem node mounted from a system filesystem folder.
pub struct SysFolderNode {
    path: PathBuf,
    label: String,
}

impl SysFolderNode {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path.to_string_lossy().into_owned();
        SysFolderNode { path, label }
    }

    pub fn with_label(path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        SysFolderNode {
            path: path.into(),
            label: label.into(),
        }
    }

    /// Joins a sub-path under the root, segment by segment. Sub-paths
    /// arrive pre-screened by the mount tree, but a backend must not
    /// trust that: empty and `.` segments are skipped, `..` is refused.
    fn full_path(&self, sub: &str) -> Result<PathBuf, VfsError> {
        let mut full = self.path.clone();
        for seg in sub.split('/') {
            match seg {
                "" | "." => continue,
                ".." => return Err(VfsError::NoPermission),
                _ => full.push(seg),
            }
        }
        Ok(full)
    }
}

fn info_from_metadata(name: String, meta: &std::fs::Metadata) -> FileInfo {
    let modified = meta
        .modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or(DateTime::UNIX_EPOCH);
    FileInfo {
        name,
        size: meta.len(),
        modified,
        is_directory: meta.is_dir(),
    }
}

fn display_name(full: &Path) -> String {
    full.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "/".to_string())
}

#[async_trait]
impl Node for SysFolderNode {
    fn name(&self) -> String {
        format!("sysfolder:{}", self.label)
    }

    async fn list(&self, folder: &str) -> Result<Vec<FileInfo>, VfsError> {
        let full = self.full_path(folder)?;

        let meta = fs::metadata(&full).await?;
        if !meta.is_dir() {
            return Err(VfsError::NotFolder);
        }

        let mut entries = fs::read_dir(&full).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let meta = match entry.metadata().await {
                Ok(meta) => meta,
                Err(_) => continue,
            };
            files.push(info_from_metadata(
                entry.file_name().to_string_lossy().into_owned(),
                &meta,
            ));
        }
        Ok(files)
    }

    async fn stat(&self, file: &str) -> Result<FileInfo, VfsError> {
        let full = self.full_path(file)?;
        let meta = fs::metadata(&full).await?;
        Ok(info_from_metadata(display_name(&full), &meta))
    }

    async fn read_file(&self, file: &str) -> Result<ReadStream, VfsError> {
        let full = self.full_path(file)?;
        let f = File::open(&full).await?;
        Ok(Box::new(f))
    }

    async fn write_file(&self, file: &str) -> Result<WriteStream, VfsError> {
        let full = self.full_path(file)?;
        let f = File::create(&full).await?;
        Ok(Box::new(f))
    }

    async fn append_file(&self, file: &str) -> Result<WriteStream, VfsError> {
        let full = self.full_path(file)?;
        let f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&full)
            .await?;
        Ok(Box::new(f))
    }

    async fn delete_file(&self, file: &str) -> Result<(), VfsError> {
        let full = self.full_path(file)?;
        fs::remove_file(&full).await?;
        Ok(())
    }

    async fn make_directory(&self, dir: &str) -> Result<(), VfsError> {
        let full = self.full_path(dir)?;
        fs::create_dir_all(&full).await?;
        Ok(())
    }

    async fn remove_directory(&self, dir: &str) -> Result<(), VfsError> {
        let full = self.full_path(dir)?;
        fs::remove_dir(&full).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ferroftpd-sysdir-{}-{}", tag, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn list_and_stat() {
        let dir = scratch_dir("list");
        std::fs::write(dir.join("a.txt"), b"Hello, world!").unwrap();
        std::fs::create_dir(dir.join("sub")).unwrap();

        let node = SysFolderNode::new(&dir);
        let mut files = node.list("").await.unwrap();
        files.sort_by(|l, r| l.name.cmp(&r.name));
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].name, "a.txt");
        assert_eq!(files[0].size, 13);
        assert!(!files[0].is_directory);
        assert!(files[1].is_directory);

        let info = node.stat("a.txt").await.unwrap();
        assert_eq!(info.name, "a.txt");
        assert_eq!(info.size, 13);

        assert!(matches!(node.list("a.txt").await, Err(VfsError::NotFolder)));
        assert!(matches!(node.stat("nope").await, Err(VfsError::NotFound)));
    }

    #[tokio::test]
    async fn read_write_append_delete() {
        let dir = scratch_dir("rw");
        let node = SysFolderNode::new(&dir);

        let mut w = node.write_file("f").await.unwrap();
        w.write_all(b"one").await.unwrap();
        w.shutdown().await.unwrap();
        drop(w);

        let mut a = node.append_file("f").await.unwrap();
        a.write_all(b"two").await.unwrap();
        a.shutdown().await.unwrap();
        drop(a);

        let mut r = node.read_file("f").await.unwrap();
        let mut contents = String::new();
        r.read_to_string(&mut contents).await.unwrap();
        assert_eq!(contents, "onetwo");

        node.make_directory("d/e").await.unwrap();
        assert!(node.stat("d/e").await.unwrap().is_directory);
        node.remove_directory("d/e").await.unwrap();
        assert!(matches!(node.stat("d/e").await, Err(VfsError::NotFound)));

        node.delete_file("f").await.unwrap();
        assert!(matches!(node.read_file("f").await, Err(VfsError::NotFound)));
    }

    #[tokio::test]
    async fn rejects_parent_traversal() {
        let dir = scratch_dir("dotdot");
        let node = SysFolderNode::new(&dir);
        assert!(matches!(
            node.stat("../escape").await,
            Err(VfsError::NoPermission)
        ));
        assert!(matches!(
            node.read_file("a/../../escape").await,
            Err(VfsError::NoPermission)
        ));
    }
}
