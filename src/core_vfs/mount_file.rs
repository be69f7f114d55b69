use super::{NodeTree, SysFolderNode};
use anyhow::{Context, Result};
use log::{info, warn};
use std::fs;
use std::sync::Arc;

/// Builds a mount tree from a listing file.
///
/// The file is composed of lines that are empty, begin with `#`, or are
/// of the form
///
/// ```text
/// [virtual mount path]:[system folder path]
/// ```
///
/// A TVFS path has no colons, so the first colon ends the target.
/// Lines that fail to parse or mount are logged and skipped.
pub fn tree_from_file(filename: &str) -> Result<NodeTree> {
    let contents = fs::read_to_string(filename)
        .with_context(|| format!("Failed to read mount file: {}", filename))?;

    let mut tree = NodeTree::new();
    for (lnum, line) in contents.lines().enumerate() {
        let lnum = lnum + 1;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((target, folder)) = line.split_once(':') else {
            warn!("mount file line {}: format error (no separator)", lnum);
            continue;
        };
        info!(
            "mount file line {}: target=\"{}\", folder=\"{}\"",
            lnum, target, folder
        );

        if let Err(e) = tree.mount(target, Arc::new(SysFolderNode::new(folder))) {
            warn!("mount file line {}: mount error: {}", lnum, e);
        }
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_vfs::Node;

    #[tokio::test]
    async fn parses_lines_and_skips_bad_ones() {
        let dir = std::env::temp_dir().join(format!("ferroftpd-mountfile-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("one")).unwrap();
        std::fs::create_dir_all(dir.join("two")).unwrap();

        let listing = dir.join("mounts.conf");
        std::fs::write(
            &listing,
            format!(
                "# comment\n\n/a/b:{}\n/a/c:{}\nbroken-line\n",
                dir.join("one").display(),
                dir.join("two").display()
            ),
        )
        .unwrap();

        let tree = tree_from_file(listing.to_str().unwrap()).unwrap();
        let mut names: Vec<String> = tree
            .list("/a")
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(tree_from_file("/nonexistent/mounts.conf").is_err());
    }
}
