// Rust guideline compliant 2026-10-18

//! Live SMTP connector.
//!
//! Plain-text SMTP (RFC 5321) over `tokio::net::TcpStream`: greeting, `EHLO`
//! (falling back to `HELO`), `MAIL FROM`, `RCPT TO`, `DATA`, `QUIT`. No
//! STARTTLS and no authentication.
//!
//! Bodies go out as `7bit` when they are short-lined ASCII, as `8bit` with
//! `BODY=8BITMIME` when the server advertises it, and as base64 otherwise.
//! Non-ASCII subjects become RFC 2047 encoded words.

use std::future::Future;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use tokio::io::{AsyncBufReadExt as _, AsyncWriteExt as _, BufReader};
use tokio::net::TcpStream;

use crate::smtp_client::{Connection, Connector, Email, SmtpError, SmtpServerAddress, validate_address};

/// Per-step timeout of the live connector.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const CLIENT_NAME: &str = "localhost";

// RFC 5321 line limit, CRLF excluded.
const MAX_LINE_OCTETS: usize = 998;
const BASE64_LINE_CHARS: usize = 76;
// 45 bytes encode to 60 characters; with `=?utf-8?B?` and `?=` a word stays under 75.
const ENCODED_WORD_BYTES: usize = 45;

/// Connector opening real TCP connections.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    timeout: Duration,
}

impl TcpConnector {
    /// Connector with [`DEFAULT_TIMEOUT`].
    #[must_use]
    pub fn new() -> Self {
        Self { timeout: DEFAULT_TIMEOUT }
    }

    /// Override the per-step timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl Connector for TcpConnector {
    type Connection = TcpConnection;

    async fn connect(&self, server: &SmtpServerAddress) -> Result<TcpConnection, SmtpError> {
        let timeout = self.timeout;
        with_timeout("connect", timeout, async {
            let stream = TcpStream::connect((server.host.as_str(), server.port)).await?;
            let mut connection =
                TcpConnection { stream: BufReader::new(stream), timeout, eight_bit_mime: false };
            connection.expect_reply("greeting", &[220]).await?;
            match connection.command("EHLO", &format!("EHLO {CLIENT_NAME}"), &[250]).await {
                Ok(lines) => connection.eight_bit_mime = advertises(&lines, "8BITMIME"),
                Err(error) => {
                    tracing::debug!(%error, "smtp_tcp.ehlo_refused");
                    connection.command("HELO", &format!("HELO {CLIENT_NAME}"), &[250]).await?;
                }
            }
            tracing::debug!(server = %server, eight_bit_mime = connection.eight_bit_mime, "smtp_tcp.connected");
            Ok::<_, SmtpError>(connection)
        })
        .await
    }
}

/// An open SMTP session.
#[derive(Debug)]
pub struct TcpConnection {
    stream: BufReader<TcpStream>,
    timeout: Duration,
    eight_bit_mime: bool,
}

impl Connection for TcpConnection {
    async fn send(&mut self, email: &Email) -> Result<(), SmtpError> {
        validate_address(&email.from)?;
        validate_address(&email.to)?;
        let encoding = BodyEncoding::choose(&email.text, self.eight_bit_mime);
        let mail_from = match encoding {
            BodyEncoding::EightBit => format!("MAIL FROM:<{}> BODY=8BITMIME", email.from),
            BodyEncoding::SevenBit | BodyEncoding::Base64 => format!("MAIL FROM:<{}>", email.from),
        };

        let timeout = self.timeout;
        with_timeout("send", timeout, async {
            self.command("MAIL", &mail_from, &[250]).await?;
            self.command("RCPT", &format!("RCPT TO:<{}>", email.to), &[250, 251]).await?;
            self.command("DATA", "DATA", &[354]).await?;
            let message = format_message(email, &message_id(email), encoding);
            self.stream.get_mut().write_all(message.as_bytes()).await?;
            self.stream.get_mut().write_all(b"\r\n.\r\n").await?;
            self.expect_reply("message", &[250]).await?;
            Ok::<_, SmtpError>(())
        })
        .await
    }

    async fn close(mut self) {
        let timeout = self.timeout;
        let quit = with_timeout("close", timeout, self.command("QUIT", "QUIT", &[221])).await;
        if let Err(error) = quit {
            tracing::debug!(%error, "smtp_tcp.quit_failed");
        }
        if let Err(error) = self.stream.get_mut().shutdown().await {
            tracing::debug!(%error, "smtp_tcp.shutdown_failed");
        }
    }
}

impl TcpConnection {
    async fn command(&mut self, verb: &str, line: &str, accepted: &[u16]) -> Result<Vec<String>, SmtpError> {
        tracing::trace!(verb, "smtp_tcp.command");
        let stream = self.stream.get_mut();
        stream.write_all(line.as_bytes()).await?;
        stream.write_all(b"\r\n").await?;
        self.expect_reply(verb, accepted).await
    }

    /// Read one (possibly multi-line) reply and check its code. Returns the
    /// text of every reply line.
    async fn expect_reply(&mut self, step: &str, accepted: &[u16]) -> Result<Vec<String>, SmtpError> {
        let mut text = Vec::new();
        loop {
            let mut line = String::new();
            if self.stream.read_line(&mut line).await? == 0 {
                return Err(SmtpError::MalformedReply { line: "<connection closed>".to_owned() });
            }
            let line = line.trim_end_matches(['\r', '\n']);
            let (code, last, rest) = parse_reply_line(line)?;
            text.push(rest.to_owned());
            if last {
                if accepted.contains(&code) {
                    return Ok(text);
                }
                return Err(SmtpError::Rejected {
                    command: step.to_owned(),
                    code,
                    message: text.join(" "),
                });
            }
        }
    }
}

/// Split `250-text` / `250 text` into code, last-line flag and text.
fn parse_reply_line(line: &str) -> Result<(u16, bool, &str), SmtpError> {
    let malformed = || SmtpError::MalformedReply { line: line.to_owned() };
    let code = line.get(..3).and_then(|c| c.parse::<u16>().ok()).ok_or_else(malformed)?;
    match line.as_bytes().get(3) {
        None => Ok((code, true, "")),
        Some(b' ') => Ok((code, true, &line[4..])),
        Some(b'-') => Ok((code, false, &line[4..])),
        Some(_) => Err(malformed()),
    }
}

async fn with_timeout<T>(
    step: &'static str,
    timeout: Duration,
    future: impl Future<Output = Result<T, SmtpError>>,
) -> Result<T, SmtpError> {
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_elapsed) => Err(SmtpError::Timeout { step, timeout }),
    }
}

// EHLO reply lines after the first name one extension each.
fn advertises(ehlo_lines: &[String], extension: &str) -> bool {
    ehlo_lines
        .iter()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .any(|keyword| keyword.eq_ignore_ascii_case(extension))
}

fn message_id(email: &Email) -> String {
    let domain = email.from.rsplit_once('@').map_or(CLIENT_NAME, |(_, domain)| domain);
    format!("<{}@{domain}>", uuid::Uuid::new_v4())
}

/// `Content-Transfer-Encoding` of the message body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyEncoding {
    SevenBit,
    EightBit,
    Base64,
}

impl BodyEncoding {
    fn choose(text: &str, eight_bit_mime: bool) -> Self {
        // One extra octet for a dot-stuffed line.
        let short_lines = body_lines(text).all(|line| line.len() < MAX_LINE_OCTETS);
        match (short_lines, text.is_ascii(), eight_bit_mime) {
            (true, true, _) => Self::SevenBit,
            (true, false, true) => Self::EightBit,
            _ => Self::Base64,
        }
    }

    fn header(self) -> &'static str {
        match self {
            Self::SevenBit => "7bit",
            Self::EightBit => "8bit",
            Self::Base64 => "base64",
        }
    }
}

fn body_lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|line| line.trim_end_matches('\r'))
}

/// Render the RFC 5322 message: headers, blank line, CRLF body (dot-stuffed
/// or base64). Does not include the terminating `.` line.
fn format_message(email: &Email, message_id: &str, encoding: BodyEncoding) -> String {
    let headers = [
        ("Date", Utc::now().to_rfc2822()),
        ("Message-ID", message_id.to_owned()),
        ("From", email.from.clone()),
        ("To", email.to.clone()),
        ("Subject", encode_subject(&email.subject)),
        ("MIME-Version", "1.0".to_owned()),
        ("Content-Type", "text/plain; charset=utf-8".to_owned()),
        ("Content-Transfer-Encoding", encoding.header().to_owned()),
    ];
    let mut message: String =
        headers.iter().map(|(name, value)| format!("{name}: {value}\r\n")).collect();
    message.push_str("\r\n");

    let body: Vec<String> = match encoding {
        BodyEncoding::SevenBit | BodyEncoding::EightBit => body_lines(&email.text)
            .map(|line| if line.starts_with('.') { format!(".{line}") } else { line.to_owned() })
            .collect(),
        BodyEncoding::Base64 => {
            let canonical = body_lines(&email.text).collect::<Vec<_>>().join("\r\n");
            let encoded: Vec<char> = BASE64.encode(canonical).chars().collect();
            encoded.chunks(BASE64_LINE_CHARS).map(|chunk| chunk.iter().collect()).collect()
        }
    };
    message.push_str(&body.join("\r\n"));
    message
}

/// Single-line subject; RFC 2047 `B` encoded words, folded, when it is not
/// short ASCII.
fn encode_subject(subject: &str) -> String {
    let subject = subject.replace(['\r', '\n'], " ");
    if subject.is_ascii() && subject.len() + "Subject: ".len() <= MAX_LINE_OCTETS {
        return subject;
    }

    let mut words = Vec::new();
    let mut chunk = String::new();
    for ch in subject.chars() {
        if chunk.len() + ch.len_utf8() > ENCODED_WORD_BYTES {
            words.push(encoded_word(&chunk));
            chunk.clear();
        }
        chunk.push(ch);
    }
    if !chunk.is_empty() {
        words.push(encoded_word(&chunk));
    }
    words.join("\r\n ")
}

fn encoded_word(text: &str) -> String {
    format!("=?utf-8?B?{}?=", BASE64.encode(text))
}
