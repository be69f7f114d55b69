use super::{FileInfo, Node, ReadStream, VfsError, WriteStream};
use async_trait::async_trait;
use chrono::DateTime;
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Errors arising when mounting a node.
#[derive(Error, Debug)]
pub enum MountError {
    #[error("error mounting \"{node}\" onto {path}: mount path contains leaf")]
    PathHasLeaf { path: String, node: String },

    #[error("error mounting \"{node}\" onto {path}: mount leaf not empty")]
    LeafHasChild { path: String, node: String },

    #[error("error mounting \"{node}\" onto {path}: mount leaf exists")]
    LeafExists { path: String, node: String },
}

/// Trims a single leading `/` and any trailing `/`s. The special input
/// `/` becomes the empty string.
fn strip_slash(path: &str) -> &str {
    let path = path.trim_end_matches('/');
    path.strip_prefix('/').unwrap_or(path)
}

struct TreeNode {
    /// Complete virtual path of this node, with `/` at the beginning
    /// and the end. Kept for diagnostics and sub-path rewriting.
    complete_path: String,

    /// A bound backend,
    backend: Option<Arc<dyn Node>>,
    /// or children. Never both.
    children: HashMap<String, TreeNode>,
}

/// The mount tree: routes virtual paths to backend filesystem nodes.
///
/// Routing consumes path segments left to right and stops at the first
/// node with a bound backend; the remaining suffix is handed to that
/// backend as its sub-path. A node that routing stops at without a
/// backend is a directory of the virtual namespace itself.
///
/// `NodeTree` satisfies [`Node`], so a whole tree can stand behind any
/// path, but mounting a tree into another tree is discouraged.
pub struct NodeTree {
    root: TreeNode,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    pub fn new() -> Self {
        NodeTree {
            root: TreeNode {
                complete_path: "/".to_string(),
                backend: None,
                children: HashMap::new(),
            },
        }
    }

    /// Routes a path to `(node, sub-path)`: walks segments left to right
    /// and stops at the first node carrying a backend, or at the branch
    /// the path ends on. The sub-path is the residual suffix below the
    /// node, without a leading slash. `None` means the path leaves the
    /// tree, or contains a `..` segment.
    fn route(&self, stripped: &str) -> Option<(&TreeNode, String)> {
        let segs: Vec<&str> = stripped.split('/').filter(|s| !s.is_empty()).collect();
        if segs.iter().any(|s| *s == "..") {
            return None;
        }

        let mut cur = &self.root;
        let mut consumed = 0;
        while cur.backend.is_none() && consumed < segs.len() {
            cur = cur.children.get(segs[consumed])?;
            consumed += 1;
        }

        let sub = segs[consumed..].join("/");
        debug!(
            "tree: route \"{}\" -> node \"{}\", sub-path \"{}\"",
            stripped, cur.complete_path, sub
        );
        Some((cur, sub))
    }

    /// Mounts a backend node at the given virtual path, creating branch
    /// nodes along the way.
    ///
    /// Must not be called concurrently with lookups; the server mounts
    /// everything before starting.
    pub fn mount(&mut self, path: &str, node: Arc<dyn Node>) -> Result<(), MountError> {
        let stripped = strip_slash(path).to_string();
        debug!("tree: mounting \"{}\" onto \"{}\"", node.name(), path);

        let mut cur = &mut self.root;
        for seg in stripped.split('/') {
            if seg.is_empty() {
                continue;
            }

            if cur.backend.is_some() {
                return Err(MountError::PathHasLeaf {
                    path: path.to_string(),
                    node: node.name(),
                });
            }

            let complete = format!("{}{}/", cur.complete_path, seg);
            cur = cur
                .children
                .entry(seg.to_string())
                .or_insert_with(|| TreeNode {
                    complete_path: complete,
                    backend: None,
                    children: HashMap::new(),
                });
        }

        if !cur.children.is_empty() {
            return Err(MountError::LeafHasChild {
                path: path.to_string(),
                node: node.name(),
            });
        }
        if cur.backend.is_some() {
            return Err(MountError::LeafExists {
                path: path.to_string(),
                node: node.name(),
            });
        }

        cur.backend = Some(node);
        Ok(())
    }

    /// Routes to a bound backend; anything that ends on a branch is not
    /// a mutable object of the virtual filesystem.
    fn route_backend(&self, path: &str) -> Result<(&Arc<dyn Node>, String), VfsError> {
        match self.route(strip_slash(path)) {
            Some((node, sub)) => match &node.backend {
                Some(backend) => Ok((backend, sub)),
                None => Err(VfsError::NotFound),
            },
            None => Err(VfsError::NotFound),
        }
    }

    /// Synthesized directory entry for a branch of the virtual namespace.
    fn synthetic_dir(name: &str) -> FileInfo {
        FileInfo {
            name: name.to_string(),
            size: 0,
            modified: DateTime::UNIX_EPOCH,
            is_directory: true,
        }
    }
}

#[async_trait]
impl Node for NodeTree {
    fn name(&self) -> String {
        "nodetree".to_string()
    }

    async fn list(&self, folder: &str) -> Result<Vec<FileInfo>, VfsError> {
        let stripped = strip_slash(folder);
        let (node, sub) = self.route(stripped).ok_or(VfsError::NotFound)?;

        if let Some(backend) = &node.backend {
            return backend.list(&sub).await;
        }

        // We have only folders in a virtual namespace.
        Ok(node
            .children
            .keys()
            .map(|label| Self::synthetic_dir(label))
            .collect())
    }

    async fn stat(&self, file: &str) -> Result<FileInfo, VfsError> {
        let stripped = strip_slash(file);
        let (node, sub) = self.route(stripped).ok_or(VfsError::NotFound)?;

        if let Some(backend) = &node.backend {
            return backend.stat(&sub).await;
        }

        let name = match stripped.rsplit('/').next() {
            Some("") | None => "/",
            Some(last) => last,
        };
        Ok(Self::synthetic_dir(name))
    }

    async fn read_file(&self, file: &str) -> Result<ReadStream, VfsError> {
        let (backend, sub) = self.route_backend(file)?;
        backend.read_file(&sub).await
    }

    async fn write_file(&self, file: &str) -> Result<WriteStream, VfsError> {
        let (backend, sub) = self.route_backend(file)?;
        backend.write_file(&sub).await
    }

    async fn append_file(&self, file: &str) -> Result<WriteStream, VfsError> {
        let (backend, sub) = self.route_backend(file)?;
        backend.append_file(&sub).await
    }

    async fn delete_file(&self, file: &str) -> Result<(), VfsError> {
        let (backend, sub) = self.route_backend(file)?;
        backend.delete_file(&sub).await
    }

    async fn make_directory(&self, dir: &str) -> Result<(), VfsError> {
        let (backend, sub) = self.route_backend(dir)?;
        backend.make_directory(&sub).await
    }

    async fn remove_directory(&self, dir: &str) -> Result<(), VfsError> {
        let (backend, sub) = self.route_backend(dir)?;
        backend.remove_directory(&sub).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every delegated call so tests can assert which backend
    /// got hit and with which sub-path.
    struct RecordingNode {
        label: String,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingNode {
        fn new(label: &str) -> Arc<Self> {
            Arc::new(RecordingNode {
                label: label.to_string(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Node for RecordingNode {
        fn name(&self) -> String {
            self.label.clone()
        }

        async fn list(&self, folder: &str) -> Result<Vec<FileInfo>, VfsError> {
            self.calls.lock().unwrap().push(format!("list:{}", folder));
            Ok(Vec::new())
        }

        async fn stat(&self, file: &str) -> Result<FileInfo, VfsError> {
            self.calls.lock().unwrap().push(format!("stat:{}", file));
            Ok(FileInfo {
                name: file.to_string(),
                size: 7,
                modified: DateTime::UNIX_EPOCH,
                is_directory: false,
            })
        }

        async fn read_file(&self, file: &str) -> Result<ReadStream, VfsError> {
            self.calls.lock().unwrap().push(format!("read:{}", file));
            Ok(Box::new(&b"data"[..]))
        }

        async fn write_file(&self, _file: &str) -> Result<WriteStream, VfsError> {
            Err(VfsError::NoPermission)
        }

        async fn append_file(&self, _file: &str) -> Result<WriteStream, VfsError> {
            Err(VfsError::NoPermission)
        }

        async fn delete_file(&self, _file: &str) -> Result<(), VfsError> {
            Ok(())
        }

        async fn make_directory(&self, _dir: &str) -> Result<(), VfsError> {
            Ok(())
        }

        async fn remove_directory(&self, _dir: &str) -> Result<(), VfsError> {
            Ok(())
        }
    }

    fn assert_branch_xor_leaf(node: &TreeNode) {
        assert!(
            node.backend.is_none() || node.children.is_empty(),
            "node {} has both a backend and children",
            node.complete_path
        );
        for child in node.children.values() {
            assert_branch_xor_leaf(child);
        }
    }

    #[test]
    fn strip_slash_normalizes() {
        assert_eq!(strip_slash("/"), "");
        assert_eq!(strip_slash(""), "");
        assert_eq!(strip_slash("/a/b"), "a/b");
        assert_eq!(strip_slash("/a/b///"), "a/b");
        assert_eq!(strip_slash("a/b/"), "a/b");
    }

    #[tokio::test]
    async fn branch_list_synthesizes_children() {
        let x = RecordingNode::new("x");
        let y = RecordingNode::new("y");
        let mut tree = NodeTree::new();
        tree.mount("/a/b", x.clone()).unwrap();
        tree.mount("/a/c", y.clone()).unwrap();

        let mut listing = tree.list("/a").await.unwrap();
        listing.sort_by(|l, r| l.name.cmp(&r.name));
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].name, "b");
        assert_eq!(listing[1].name, "c");
        assert!(listing.iter().all(|f| f.is_directory));
        assert!(x.calls().is_empty());
        assert!(y.calls().is_empty());
    }

    #[tokio::test]
    async fn leaf_list_delegates_with_residual_path() {
        let x = RecordingNode::new("x");
        let mut tree = NodeTree::new();
        tree.mount("/a/b", x.clone()).unwrap();

        tree.list("/a/b").await.unwrap();
        tree.list("/a/b/sub/dir").await.unwrap();
        assert_eq!(x.calls(), vec!["list:", "list:sub/dir"]);
    }

    #[tokio::test]
    async fn routing_ignores_slash_noise() {
        let x = RecordingNode::new("x");
        let mut tree = NodeTree::new();
        tree.mount("/a/b", x.clone()).unwrap();

        for path in ["/a/b/f", "a/b/f", "/a/b/f/", "//a//b//f"] {
            let info = tree.stat(path).await.unwrap();
            assert_eq!(info.name, "f");
        }
        assert_eq!(x.calls(), vec!["stat:f"; 4]);
    }

    #[tokio::test]
    async fn branch_stat_is_synthetic_directory() {
        let x = RecordingNode::new("x");
        let mut tree = NodeTree::new();
        tree.mount("/a/b", x.clone()).unwrap();

        let info = tree.stat("/a").await.unwrap();
        assert!(info.is_directory);
        assert_eq!(info.name, "a");

        let root = tree.stat("/").await.unwrap();
        assert!(root.is_directory);
        assert_eq!(root.name, "/");
        assert!(x.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_paths_and_dotdot_are_not_found() {
        let mut tree = NodeTree::new();
        tree.mount("/a/b", RecordingNode::new("x")).unwrap();

        assert!(matches!(tree.stat("/nope").await, Err(VfsError::NotFound)));
        assert!(matches!(
            tree.stat("/a/../a/b/f").await,
            Err(VfsError::NotFound)
        ));
        assert!(matches!(
            tree.read_file("/a").await,
            Err(VfsError::NotFound)
        ));
        assert!(matches!(
            tree.delete_file("/a").await,
            Err(VfsError::NotFound)
        ));
    }

    #[test]
    fn mount_error_taxonomy() {
        let n = RecordingNode::new("n");

        let mut tree = NodeTree::new();
        tree.mount("/a", n.clone()).unwrap();
        assert!(matches!(
            tree.mount("/a/b", n.clone()),
            Err(MountError::PathHasLeaf { .. })
        ));

        let mut tree = NodeTree::new();
        tree.mount("/a/b", n.clone()).unwrap();
        assert!(matches!(
            tree.mount("/a", n.clone()),
            Err(MountError::LeafHasChild { .. })
        ));

        let mut tree = NodeTree::new();
        tree.mount("/a", n.clone()).unwrap();
        assert!(matches!(
            tree.mount("/a", n.clone()),
            Err(MountError::LeafExists { .. })
        ));
    }

    #[tokio::test]
    async fn backend_at_root_takes_everything() {
        let x = RecordingNode::new("x");
        let mut tree = NodeTree::new();
        tree.mount("/", x.clone()).unwrap();

        tree.stat("/deep/path/file").await.unwrap();
        assert_eq!(x.calls(), vec!["stat:deep/path/file"]);
    }

    #[test]
    fn branch_and_leaf_never_mix() {
        let n = RecordingNode::new("n");
        let mut tree = NodeTree::new();
        tree.mount("/a/b/c", n.clone()).unwrap();
        tree.mount("/a/b/d", n.clone()).unwrap();
        tree.mount("/e", n.clone()).unwrap();
        let _ = tree.mount("/a/b", n.clone());
        let _ = tree.mount("/a/b/c/deeper", n.clone());
        assert_branch_xor_leaf(&tree.root);
    }
}
