use std::collections::HashMap;

use thiserror::Error;

use crate::http::request::{Method, Request};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestParseError {
    #[error("malformed request line")]
    InvalidRequest,
    #[error("unsupported method")]
    InvalidMethod,
    #[error("malformed header line")]
    InvalidHeader,
    #[error("invalid Content-Length")]
    InvalidContentLength,
    #[error("request headers too large")]
    HeadersTooLarge,
    /// More bytes are needed before a full request is available
    #[error("incomplete request")]
    Incomplete,
}

/// Largest request head (request line plus headers) a client may send.
pub const MAX_HEADER_BYTES: usize = 8192;

/// Parses one request from the front of `buf`, returning it together with
/// the number of bytes consumed.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), RequestParseError> {
    let Some(headers_end) = find_headers_end(buf) else {
        return Err(if buf.len() > MAX_HEADER_BYTES {
            RequestParseError::HeadersTooLarge
        } else {
            RequestParseError::Incomplete
        });
    };
    if headers_end > MAX_HEADER_BYTES {
        return Err(RequestParseError::HeadersTooLarge);
    }
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + 4..];

    let headers_str =
        std::str::from_utf8(header_bytes).map_err(|_| RequestParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    let request_line = lines.next().ok_or(RequestParseError::InvalidRequest)?;
    let mut parts = request_line.split_whitespace();

    let method_str = parts.next().ok_or(RequestParseError::InvalidRequest)?;
    let path = parts.next().ok_or(RequestParseError::InvalidRequest)?;
    let version = parts.next().ok_or(RequestParseError::InvalidRequest)?;

    let method = Method::parse(method_str).ok_or(RequestParseError::InvalidMethod)?;

    let mut headers = HashMap::new();
    for line in lines {
        if line.is_empty() {
            continue;
        }
        let (key, value) = line
            .split_once(':')
            .ok_or(RequestParseError::InvalidHeader)?;
        headers.insert(key.trim().to_string(), value.trim().to_string());
    }

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("Content-Length"))
        .map(|(_, v)| {
            v.parse::<usize>()
                .map_err(|_| RequestParseError::InvalidContentLength)
        })
        .transpose()?
        .unwrap_or(0);

    if body_bytes.len() < content_length {
        return Err(RequestParseError::Incomplete);
    }

    let request = Request {
        method,
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body: body_bytes[..content_length].to_vec(),
    };

    Ok((request, headers_end + 4 + content_length))
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}
