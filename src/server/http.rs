// src/server/http.rs

//! Minimal HTTP/1.1 handling for the dev server: one request per
//! connection, `GET`/`HEAD` only, plus the long-lived reload event stream.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, trace};

use crate::server::mime;
use crate::server::reload::ReloadHub;

/// Path browsers subscribe to for reload events.
pub const RELOAD_ENDPOINT: &str = "/__assetflow/reload";

const MAX_HEADER_LINES: usize = 100;
/// Upper bound on the request line plus headers.
const MAX_HEAD_BYTES: u64 = 8 * 1024;
const KEEPALIVE: Duration = Duration::from_secs(30);

const RELOAD_SCRIPT: &str = concat!(
    "<script>(function(){var s=new EventSource(\"",
    "/__assetflow/reload",
    "\");s.addEventListener(\"reload\",function(){window.location.reload();});})();</script>\n"
);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    /// Raw request target with any query string removed.
    pub path: String,
}

#[derive(Debug)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub location: Option<String>,
    pub body: Vec<u8>,
}

impl Response {
    fn ok(content_type: &'static str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type,
            location: None,
            body,
        }
    }

    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: "text/plain; charset=utf-8",
            location: None,
            body: body.as_bytes().to_vec(),
        }
    }

    fn redirect(location: String) -> Self {
        Self {
            status: 301,
            content_type: "text/plain; charset=utf-8",
            location: Some(location),
            body: Vec::new(),
        }
    }

    pub fn to_bytes(&self, head_only: bool) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nCache-Control: no-cache\r\nConnection: close\r\n",
            self.status,
            reason(self.status),
            self.content_type,
            self.body.len()
        );
        if let Some(location) = &self.location {
            head.push_str(&format!("Location: {location}\r\n"));
        }
        head.push_str("\r\n");

        let mut out = head.into_bytes();
        if !head_only {
            out.extend_from_slice(&self.body);
        }
        out
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        301 => "Moved Permanently",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        _ => "Internal Server Error",
    }
}

/// Parse `GET /path?query HTTP/1.1`.
pub fn parse_request_line(line: &str) -> Option<Request> {
    let mut parts = line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?;
    let version = parts.next()?;
    if !version.starts_with("HTTP/1.") || !target.starts_with('/') {
        return None;
    }
    let path = target.split(['?', '#']).next().unwrap_or("/").to_string();
    Some(Request { method, path })
}

pub fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Map a URL path onto `root`. `None` for anything that would leave it.
pub fn resolve_path(root: &Path, url_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode(url_path)?;
    let mut out = root.to_path_buf();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => continue,
            ".." => return None,
            s if s.contains('\\') || s.contains(':') || s.contains('\0') => return None,
            s => out.push(s),
        }
    }
    Some(out)
}

/// Insert the reload script before the last `</body>`, or append it.
pub fn inject_reload_script(html: &[u8]) -> Vec<u8> {
    let lower = html.to_ascii_lowercase();
    let needle = b"</body>";
    let at = lower
        .windows(needle.len())
        .rposition(|w| w == needle)
        .unwrap_or(html.len());

    let mut out = Vec::with_capacity(html.len() + RELOAD_SCRIPT.len());
    out.extend_from_slice(&html[..at]);
    out.extend_from_slice(RELOAD_SCRIPT.as_bytes());
    out.extend_from_slice(&html[at..]);
    out
}

pub async fn respond(root: &Path, req: &Request) -> Response {
    if req.method != "GET" && req.method != "HEAD" {
        return Response::text(405, "method not allowed\n");
    }

    let Some(mut path) = resolve_path(root, &req.path) else {
        return Response::text(404, "not found\n");
    };

    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_dir() => {
            if !req.path.ends_with('/') {
                return Response::redirect(format!("{}/", req.path));
            }
            path.push("index.html");
        }
        Ok(_) => {}
        Err(_) if path.extension().is_none() => {
            // Pretty permalinks: `/about` -> `about.html`.
            path.set_extension("html");
        }
        Err(_) => {}
    }

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let content_type = mime::content_type(&path);
            let body = if content_type == mime::HTML {
                inject_reload_script(&bytes)
            } else {
                bytes
            };
            Response::ok(content_type, body)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Response::text(404, "not found\n"),
        Err(e) => {
            debug!(?path, error = %e, "failed to read file");
            Response::text(500, "internal error\n")
        }
    }
}

/// Read the request line and drain the headers, never more than
/// `MAX_HEAD_BYTES` in total.
async fn read_head<R>(reader: R) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
{
    let mut reader = reader.take(MAX_HEAD_BYTES);
    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await? == 0 {
        return Ok(None);
    }

    let mut line = String::new();
    for _ in 0..MAX_HEADER_LINES {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 || line == "\r\n" || line == "\n" {
            break;
        }
    }

    Ok(Some(request_line))
}

pub async fn handle_connection(stream: TcpStream, root: &Path, hub: &ReloadHub) -> Result<()> {
    let (read_half, mut writer) = stream.into_split();

    let Some(line) = read_head(BufReader::new(read_half)).await? else {
        return Ok(());
    };

    let Some(request) = parse_request_line(line.trim_end()) else {
        writer.write_all(&Response::text(400, "bad request\n").to_bytes(false)).await?;
        return Ok(());
    };
    trace!(method = %request.method, path = %request.path, "request");

    if request.path == RELOAD_ENDPOINT && request.method == "GET" {
        return stream_events(&mut writer, hub).await;
    }

    let response = respond(root, &request).await;
    debug!(status = response.status, path = %request.path, "response");
    writer
        .write_all(&response.to_bytes(request.method == "HEAD"))
        .await?;
    writer.shutdown().await?;
    Ok(())
}

async fn stream_events<W>(writer: &mut W, hub: &ReloadHub) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    // Subscribe before acknowledging so a reload sent right after the client
    // sees the preamble is not missed.
    let mut rx = hub.subscribe();

    writer
        .write_all(
            b"HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nCache-Control: no-cache\r\nConnection: keep-alive\r\n\r\n: connected\n\n",
        )
        .await?;
    writer.flush().await?;

    let mut keepalive = tokio::time::interval(KEEPALIVE);
    keepalive.tick().await;

    loop {
        tokio::select! {
            msg = rx.recv() => match msg {
                Ok(_) => {
                    writer.write_all(b"event: reload\ndata: reload\n\n").await?;
                    writer.flush().await?;
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
            _ = keepalive.tick() => {
                // Surfaces dead clients as a write error.
                writer.write_all(b": ping\n\n").await?;
                writer.flush().await?;
            }
        }
    }

    Ok(())
}
