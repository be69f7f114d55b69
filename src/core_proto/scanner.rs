use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Reads CRLF-terminated lines from the control connection.
///
/// FTP is strictly Telnet based, so lines end at `\r\n` exactly.
/// A lone `\n` or `\r` belongs to the line body and never terminates it.
pub struct CrlfLineReader<R> {
    inner: R,
}

impl<R> CrlfLineReader<R>
where
    R: AsyncBufRead + Unpin,
{
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Returns the next line without its CRLF terminator, or `None` at EOF.
    /// An unterminated trailing fragment at EOF is discarded.
    pub async fn next_line(&mut self) -> Result<Option<String>, std::io::Error> {
        let mut line: Vec<u8> = Vec::new();
        loop {
            let n = self.inner.read_until(b'\n', &mut line).await?;
            if n == 0 {
                return Ok(None);
            }
            if line.ends_with(b"\r\n") {
                line.truncate(line.len() - 2);
                return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
            }
            // A lone '\n'; keep reading until a real CRLF shows up.
        }
    }
}

/// Splits a command line into the uppercased command word and the
/// parameter string after exactly one space. The parameter may itself
/// contain spaces.
pub fn split_command(line: &str) -> (String, String) {
    match line.find(' ') {
        Some(i) => (line[..i].to_ascii_uppercase(), line[i + 1..].to_string()),
        None => (line.to_ascii_uppercase(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::BufReader;

    async fn lines_of(input: &str) -> Vec<String> {
        let mut reader = CrlfLineReader::new(BufReader::new(input.as_bytes()));
        let mut out = Vec::new();
        while let Some(line) = reader.next_line().await.unwrap() {
            out.push(line);
        }
        out
    }

    #[tokio::test]
    async fn splits_at_crlf() {
        assert_eq!(
            lines_of("USER anonymous\r\nPASS x\r\n").await,
            vec!["USER anonymous", "PASS x"]
        );
    }

    #[tokio::test]
    async fn lone_lf_does_not_split() {
        assert_eq!(lines_of("a\nb\r\n").await, vec!["a\nb"]);
    }

    #[tokio::test]
    async fn lone_cr_does_not_split() {
        assert_eq!(lines_of("a\rb\r\n").await, vec!["a\rb"]);
    }

    #[tokio::test]
    async fn unterminated_tail_discarded() {
        assert_eq!(lines_of("QUIT\r\nleftover").await, vec!["QUIT"]);
    }

    #[test]
    fn command_split() {
        assert_eq!(
            split_command("stor some file.txt"),
            ("STOR".to_string(), "some file.txt".to_string())
        );
        assert_eq!(split_command("PASV"), ("PASV".to_string(), String::new()));
    }
}
