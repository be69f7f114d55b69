use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Feature lines advertised by FEAT. Each line carries the leading space
/// required by RFC 2389.
pub const FEATURES: &str = " UTF8\r\n MDTM\r\n SIZE\r\n TVFS\r\n MLST type;size;modify;\r\n";

/// Returns the reply text for an FTP reply code.
///
/// A `%s` in the text is a placeholder filled in by [`send_reply_with`].
/// Asking for a code that is not in the table is a programming error,
/// so this panics instead of returning a Result.
pub fn reply_template(code: u16) -> &'static str {
    match code {
        200 => "Command okay.",
        500 => "Syntax error, command unrecognized.",
        501 => "Syntax error in parameters or arguments.",
        202 => "Command not implemented, superfluous at this site.",
        502 => "Command not implemented.",
        503 => "Bad sequence of commands.",
        504 => "Command not implemented for that parameter.",

        110 => "%s = %s",
        211 => "%s",
        212 => "%s",
        213 => "%s",
        214 => "(Sorry, no help available)",
        215 => "%s",

        120 => "Service ready in %s minutes.",
        220 => "Service ready.",
        221 => "Service closing control connection.",
        421 => "Service not available, closing control connection.",

        125 => "Data connection already open; transfer starting.",
        225 => "Data connection open; no transfer in progress.",
        425 => "Can't open data connection.",
        226 => "Closing data connection.",
        426 => "Connection closed; transfer aborted.",
        227 => "Entering Passive Mode (%s).",

        230 => "User logged in, proceed.",
        530 => "Not logged in.",
        331 => "User name okay, need password.",
        332 => "Need account for login.",
        532 => "Need account for storing files.",

        150 => "File status okay; about to open data connection.",
        250 => "Requested file action okay, completed.",
        257 => "\"%s\" created.",
        350 => "Requested file action pending further information.",
        450 => "Requested file action not taken.",
        550 => "Requested action not taken.",
        451 => "Requested action aborted. Local error in processing.",
        551 => "Requested action aborted. Page type unknown.",
        452 => "Requested action not taken.",
        552 => "Requested file action aborted.",
        553 => "Requested action not taken.",

        _ => panic!("reply_template: {} is not a valid reply code", code),
    }
}

/// Renders a single reply line, `"<code> <body>\r\n"`.
pub fn format_reply(code: u16, param: Option<&str>) -> String {
    let template = reply_template(code);
    let body = match param {
        Some(p) => template.replacen("%s", p, 1),
        None => template.to_string(),
    };
    format!("{} {}\r\n", code, body)
}

/// Sends a single reply line to the client.
///
/// The line is rendered into one buffer and written with a single
/// `write_all` so a concurrently finishing transfer task cannot
/// interleave bytes into the middle of it.
pub async fn send_reply<W>(writer: &Arc<Mutex<W>>, code: u16) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin + Send,
{
    send_raw(writer, format_reply(code, None).as_bytes()).await
}

/// Sends a single reply line with a parameter substituted into the template.
pub async fn send_reply_with<W>(
    writer: &Arc<Mutex<W>>,
    code: u16,
    param: &str,
) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin + Send,
{
    send_raw(writer, format_reply(code, Some(param)).as_bytes()).await
}

/// Writes a pre-rendered chunk (multi-line replies, FEAT body) to the client
/// in one locked write.
pub async fn send_raw<W>(writer: &Arc<Mutex<W>>, message: &[u8]) -> Result<(), std::io::Error>
where
    W: AsyncWrite + Unpin + Send,
{
    let mut writer = writer.lock().await;
    writer.write_all(message).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_reply() {
        assert_eq!(format_reply(220, None), "220 Service ready.\r\n");
        assert_eq!(format_reply(200, None), "200 Command okay.\r\n");
    }

    #[test]
    fn reply_with_param() {
        assert_eq!(format_reply(213, Some("42")), "213 42\r\n");
        assert_eq!(
            format_reply(257, Some("/dir")),
            "257 \"/dir\" created.\r\n"
        );
        assert_eq!(
            format_reply(227, Some("127,0,0,1,248,213")),
            "227 Entering Passive Mode (127,0,0,1,248,213).\r\n"
        );
    }

    #[test]
    #[should_panic]
    fn unknown_code_panics() {
        reply_template(299);
    }

    #[tokio::test]
    async fn single_write() {
        let buf: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        send_reply(&buf, 220).await.unwrap();
        send_reply_with(&buf, 213, "17").await.unwrap();
        let written = buf.lock().await;
        assert_eq!(&written[..], &b"220 Service ready.\r\n213 17\r\n"[..]);
    }
}
