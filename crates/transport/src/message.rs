//! Request and response values exchanged with a [`Transport`](crate::Transport).

use std::fmt::{Debug, Display, Formatter, Result as FmtResult};

/// Authorization credential issued by the (external) login flow.
///
/// Always sent as a bearer token. The token itself never appears in `Debug`
/// output, so it's safe to log a [`Session`](crate::Session).
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);
impl Credential {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}
impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("Credential(<redacted>)")
    }
}

/// A `GET` request relative to the service root.
///
/// Path segments and query values are kept unencoded; encoding is the
/// transport's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    segments: Vec<String>,
    query: Vec<(String, String)>,
}
impl Request {
    pub fn get<S: ToString>(segments: impl IntoIterator<Item = S>) -> Self {
        Self {
            segments: segments.into_iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
        }
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }
}
impl Display for Request {
    /// Unencoded, human-readable form, e.g. `/search?q=annual report`.
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        if self.segments.is_empty() {
            f.write_str("/")?;
        }
        for (i, (key, value)) in self.query.iter().enumerate() {
            let separator = if i == 0 { '?' } else { '&' };
            write!(f, "{separator}{key}={value}")?;
        }
        Ok(())
    }
}

/// How a client should interpret a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// Any 2xx.
    Success,
    /// 401 or 403: the credential was rejected.
    Unauthorized,
    /// 404.
    NotFound,
    /// 415: the service refuses to render this content.
    UnsupportedMediaType,
    /// Any other non-2xx status.
    Other(u16),
}

/// A fully-buffered response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    content_type: Option<String>,
    body: Vec<u8>,
}
impl Response {
    pub fn new(status: u16, content_type: Option<String>, body: impl Into<Vec<u8>>) -> Self {
        Self { status, content_type, body: body.into() }
    }

    /// A `200 OK` with the given declared content type.
    pub fn ok(content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(200, Some(content_type.into()), body)
    }

    /// A `200 OK` JSON response.
    pub fn json(body: impl Into<Vec<u8>>) -> Self {
        Self::ok("application/json", body)
    }

    /// A response with no declared content type and an empty body.
    pub fn status_only(status: u16) -> Self {
        Self::new(status, None, Vec::new())
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Declared `Content-Type` header, verbatim (parameters included).
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn status_class(&self) -> StatusClass {
        match self.status {
            _ if self.is_success() => StatusClass::Success,
            401 | 403 => StatusClass::Unauthorized,
            404 => StatusClass::NotFound,
            415 => StatusClass::UnsupportedMediaType,
            other => StatusClass::Other(other),
        }
    }
}
