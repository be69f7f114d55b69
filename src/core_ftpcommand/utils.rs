/// Assembles the virtual path a path-bearing command refers to.
///
/// An argument starting with `/` is taken absolute; anything else is
/// appended to the working directory. Joining under the root collapses
/// the would-be `//name` to `/name`. An empty argument refers to the
/// working directory itself.
pub fn resolve_path(cwd: &str, arg: &str) -> String {
    if arg.is_empty() {
        cwd.to_string()
    } else if arg.starts_with('/') {
        arg.to_string()
    } else if cwd == "/" {
        format!("/{}", arg)
    } else {
        format!("{}/{}", cwd, arg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_arguments_win() {
        assert_eq!(resolve_path("/anywhere", "/d/f"), "/d/f");
    }

    #[test]
    fn relative_arguments_join_cwd() {
        assert_eq!(resolve_path("/a/b", "c.txt"), "/a/b/c.txt");
        assert_eq!(resolve_path("/a/b", "c/d"), "/a/b/c/d");
    }

    #[test]
    fn root_join_does_not_double_slash() {
        assert_eq!(resolve_path("/", "name"), "/name");
    }

    #[test]
    fn empty_argument_is_cwd() {
        assert_eq!(resolve_path("/a", ""), "/a");
        assert_eq!(resolve_path("/", ""), "/");
    }
}
