use crate::core_vfs::FileInfo;
use chrono::{DateTime, Utc};

/// Formats a timestamp the way MDTM and the MLSX `modify` fact want it:
/// `YYYYMMDDhhmmss` in UTC, second resolution.
pub fn ftp_time(t: &DateTime<Utc>) -> String {
    t.format("%Y%m%d%H%M%S").to_string()
}

fn file_type_str(is_directory: bool) -> &'static str {
    if is_directory {
        "dir"
    } else {
        "file"
    }
}

/// Formats one RFC 3659 fact line body, without line terminator:
/// `type=…;size=…;modify=…; <name>`.
pub fn format_mlsx(file: &FileInfo) -> String {
    format!(
        "type={};size={};modify={}; {}",
        file_type_str(file.is_directory),
        file.size,
        ftp_time(&file.modified),
        file.name
    )
}

/// Formats one `ls -l` style LIST line, CRLF terminated.
///
/// The permission column comes from the session access level, not from
/// the backend, so the caller passes it in.
pub fn format_list_line(file: &FileInfo, permstr: &str) -> String {
    format!(
        "{}{} 1 user group {:>12} {} {}\r\n",
        if file.is_directory { 'd' } else { '-' },
        permstr,
        file.size,
        file.modified.format("%b %e %Y"),
        file.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> FileInfo {
        FileInfo {
            name: "f".to_string(),
            size: 42,
            modified: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
            is_directory: false,
        }
    }

    #[test]
    fn mdtm_time() {
        assert_eq!(ftp_time(&sample().modified), "20240102030405");
    }

    #[test]
    fn mlsx_line() {
        assert_eq!(
            format_mlsx(&sample()),
            "type=file;size=42;modify=20240102030405; f"
        );
    }

    #[test]
    fn list_line() {
        let line = format_list_line(&sample(), "r--r--r--");
        assert_eq!(line, "-r--r--r-- 1 user group           42 Jan  2 2024 f\r\n");

        let dir = FileInfo {
            name: "docs".to_string(),
            size: 4096,
            modified: sample().modified,
            is_directory: true,
        };
        let line = format_list_line(&dir, "rw-rw-rw-");
        assert!(line.starts_with("drw-rw-rw- 1 user group "));
        assert!(line.ends_with(" docs\r\n"));
    }
}
