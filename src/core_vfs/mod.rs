pub mod mount_file;
pub mod sysdir;
pub mod tree;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

pub use mount_file::tree_from_file;
pub use sysdir::SysFolderNode;
pub use tree::{MountError, NodeTree};

/// A single directory entry, as produced by stat/list and consumed by the
/// MLST/MLSD/LIST/SIZE/MDTM formatters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
    pub is_directory: bool,
}

/// Errors a filesystem backend can surface. The session maps these onto
/// FTP reply codes (NotFolder picks 501 in list context, the rest 550).
#[derive(Error, Debug)]
pub enum VfsError {
    #[error("file or directory not found")]
    NotFound,

    #[error("file or directory already exists")]
    Exists,

    #[error("permission denied")]
    NoPermission,

    #[error("listing a non-folder")]
    NotFolder,

    #[error("filesystem error: {0}")]
    Other(String),
}

impl From<std::io::Error> for VfsError {
    fn from(e: std::io::Error) -> Self {
        use std::io::ErrorKind;
        match e.kind() {
            ErrorKind::NotFound => VfsError::NotFound,
            ErrorKind::AlreadyExists => VfsError::Exists,
            ErrorKind::PermissionDenied => VfsError::NoPermission,
            ErrorKind::NotADirectory => VfsError::NotFolder,
            _ => VfsError::Other(e.to_string()),
        }
    }
}

pub type ReadStream = Box<dyn AsyncRead + Send + Unpin>;
pub type WriteStream = Box<dyn AsyncWrite + Send + Unpin>;

/// A node (folder) in the virtual filesystem.
///
/// The file/dir parameters are relative paths with no leading slash and
/// no relative marks like `..`; backends reject anything else.
///
/// All methods must be safe to call from multiple tasks simultaneously.
#[async_trait]
pub trait Node: Send + Sync {
    /// Name to be printed for a human reader to identify the node.
    fn name(&self) -> String;

    /// Lists the files under a folder of the node.
    async fn list(&self, folder: &str) -> Result<Vec<FileInfo>, VfsError>;

    /// Stats a single file under the node.
    async fn stat(&self, file: &str) -> Result<FileInfo, VfsError>;

    /// Opens the file for reading. The stream is closed by drop after the
    /// transfer.
    async fn read_file(&self, file: &str) -> Result<ReadStream, VfsError>;

    /// Opens the file for writing, truncating an existing one.
    /// The stream is shut down and closed after the transfer.
    async fn write_file(&self, file: &str) -> Result<WriteStream, VfsError>;

    /// Opens the file for appending, creating it if missing.
    async fn append_file(&self, file: &str) -> Result<WriteStream, VfsError>;

    /// Deletes a single file.
    async fn delete_file(&self, file: &str) -> Result<(), VfsError>;

    /// Makes a new directory (or directories) under this node.
    async fn make_directory(&self, dir: &str) -> Result<(), VfsError>;

    /// Removes a directory.
    async fn remove_directory(&self, dir: &str) -> Result<(), VfsError>;
}
