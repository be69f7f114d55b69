use super::{AccessLevel, Authenticator};
use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;

/// An authenticator backed by a text file.
///
/// The file has lines that are either empty, begin with `#`, or of the
/// form
///
/// ```text
/// [username]:[password]:[mode]
/// ```
///
/// where mode is `r` (read-only) or `rw` (read-write). The first colon
/// ends the username and the last one starts the mode, so the password
/// may itself contain colons. Usernames are unique; later lines
/// overwrite earlier ones.
pub struct FileAuth {
    users: HashMap<String, (String, AccessLevel)>,
}

impl FileAuth {
    pub fn from_file(filename: &str) -> Result<Self> {
        let contents = fs::read_to_string(filename)
            .with_context(|| format!("Failed to read auth file: {}", filename))?;
        Ok(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let mut users = HashMap::new();

        for (lnum, line) in contents.lines().enumerate() {
            let lnum = lnum + 1;
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (first, last) = match (line.find(':'), line.rfind(':')) {
                (Some(first), Some(last)) if first != last => (first, last),
                _ => {
                    warn!("auth file line {}: format error (not enough separators)", lnum);
                    continue;
                }
            };

            let username = &line[..first];
            let password = &line[first + 1..last];
            let mode = &line[last + 1..];
            debug!(
                "auth file line {}: user={}, len(pass)={}, mode={}",
                lnum,
                username,
                password.len(),
                mode
            );

            let level = match mode {
                "r" => AccessLevel::ReadOnly,
                "rw" => AccessLevel::ReadWrite,
                _ => {
                    warn!("auth file line {}: format error (unknown mode \"{}\")", lnum, mode);
                    continue;
                }
            };

            users.insert(username.to_string(), (password.to_string(), level));
        }

        FileAuth { users }
    }
}

impl Authenticator for FileAuth {
    fn login(&self, username: &str, password: &str) -> AccessLevel {
        match self.users.get(username) {
            Some((pass, level)) if pass == password => *level,
            _ => AccessLevel::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_modes() {
        let auth = FileAuth::parse("alice:secret:rw\nbob:hunter2:r\n");
        assert_eq!(auth.login("alice", "secret"), AccessLevel::ReadWrite);
        assert_eq!(auth.login("bob", "hunter2"), AccessLevel::ReadOnly);
        assert_eq!(auth.login("alice", "wrong"), AccessLevel::None);
        assert_eq!(auth.login("carol", "secret"), AccessLevel::None);
    }

    #[test]
    fn password_may_contain_colons() {
        let auth = FileAuth::parse("bob:pa:ss:word:rw\n");
        assert_eq!(auth.login("bob", "pa:ss:word"), AccessLevel::ReadWrite);
    }

    #[test]
    fn comments_blanks_and_bad_lines_skipped() {
        let auth = FileAuth::parse("# users\n\nalice:secret:rw\nnocolons\nbad:mode:x\n");
        assert_eq!(auth.login("alice", "secret"), AccessLevel::ReadWrite);
        assert_eq!(auth.login("nocolons", ""), AccessLevel::None);
        assert_eq!(auth.login("bad", "mode"), AccessLevel::None);
    }

    #[test]
    fn later_lines_override_earlier() {
        let auth = FileAuth::parse("dave:one:r\ndave:two:rw\n");
        assert_eq!(auth.login("dave", "one"), AccessLevel::None);
        assert_eq!(auth.login("dave", "two"), AccessLevel::ReadWrite);
    }

    #[test]
    fn empty_password_entry_preauthorizes() {
        let auth = FileAuth::parse("guest::r\n");
        assert_eq!(auth.login("guest", ""), AccessLevel::ReadOnly);
    }
}
