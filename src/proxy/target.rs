//! Target path normalization and outbound URL composition.

use url::Url;

use crate::error::GatewayError;

const API_PREFIX: &str = "/api";

/// Resolve the target path the backend will receive.
///
/// A missing leading slash is added and a path not starting with `/api` gets
/// the prefix. Dot segments (including their `%2e` forms) and escaped
/// unreserved characters are then resolved, so access checks and the
/// outbound URL see the same path. A path that resolves outside `/api` is
/// rejected.
pub fn normalize_target(path: &str) -> Result<String, GatewayError> {
    let path = path.replace('\\', "/");
    let path = if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    };

    let prefixed = if path.starts_with(API_PREFIX) {
        path
    } else {
        format!("{API_PREFIX}{path}")
    };

    match resolve_segments(&prefixed) {
        Some(resolved) if resolved == prefixed || is_under_api(&resolved) => Ok(resolved),
        _ => Err(GatewayError::InvalidPath(prefixed)),
    }
}

fn is_under_api(path: &str) -> bool {
    path == API_PREFIX || path.starts_with("/api/")
}

/// Drop `.` and `..` segments. `None` when `..` climbs above the root.
fn resolve_segments(path: &str) -> Option<String> {
    let mut segments: Vec<String> = Vec::new();
    let mut trailing_slash = false;

    for raw in path.split('/').skip(1) {
        let segment = decode_unreserved(raw);
        trailing_slash = false;
        match segment.as_str() {
            "." => trailing_slash = true,
            ".." => {
                segments.pop()?;
                trailing_slash = true;
            }
            _ => segments.push(segment),
        }
    }

    let mut resolved = format!("/{}", segments.join("/"));
    if trailing_slash && !segments.is_empty() {
        resolved.push('/');
    }
    Some(resolved)
}

/// Decode `%XX` escapes of unreserved characters; other escapes stay as-is.
fn decode_unreserved(segment: &str) -> String {
    let bytes = segment.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let decoded = hex_value(bytes[i + 1])
                .zip(hex_value(bytes[i + 2]))
                .map(|(hi, lo)| (hi << 4) | lo)
                .filter(|b| is_unreserved(*b));
            if let Some(b) = decoded {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

/// The configured backend base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOrigin {
    base: String,
}

impl BackendOrigin {
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(raw)?;
        Ok(Self {
            base: url.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.base
    }

    /// `<origin><target>[?query]`. `target` should come from
    /// [`normalize_target`]; remaining percent-encoding is preserved.
    pub fn join(&self, target: &str, query: Option<&str>) -> Result<Url, GatewayError> {
        let mut raw = format!("{}{}", self.base, target);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            raw.push('?');
            raw.push_str(query);
        }
        Url::parse(&raw).map_err(|e| GatewayError::InvalidRequest(format!("{raw}: {e}")))
    }
}
