use std::fmt;
use std::io::Read;
use std::time::Duration;

use log::debug;
use reqwest::blocking::{Body, Client};

use crate::cloud::error::TransportError;
use crate::security::scrub_credentials;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
        }
    }
}

/// Request body handed to the transport.
pub enum RequestBody {
    Empty,
    /// Streamed from `reader`. With a known `length` the transport must send
    /// exactly that `Content-Length` instead of chunked encoding.
    Reader {
        reader: Box<dyn Read + Send>,
        length: Option<u64>,
    },
}

impl RequestBody {
    pub fn content_length(&self) -> Option<u64> {
        match self {
            RequestBody::Empty => Some(0),
            RequestBody::Reader { length, .. } => *length,
        }
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestBody::Empty => write!(f, "Empty"),
            RequestBody::Reader { length, .. } => {
                f.debug_struct("Reader").field("length", length).finish()
            }
        }
    }
}

/// One request against the storage endpoint, addressed by path.
#[derive(Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: RequestBody,
}

impl HttpRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn headers(mut self, headers: Vec<(&'static str, String)>) -> Self {
        self.headers.extend(headers);
        self
    }

    pub fn body(mut self, reader: impl Read + Send + 'static, length: Option<u64>) -> Self {
        self.body = RequestBody::Reader {
            reader: Box::new(reader),
            length,
        };
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Status and body text of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal authenticated request capability the uploaders depend on.
///
/// Implementations block until the response has been read and must not
/// retry on their own.
#[cfg_attr(test, mockall::automock)]
pub trait HttpTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking reqwest transport bound to one storage endpoint.
pub struct HttpClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpClient {
    /// Create a client for `base_url`.
    ///
    /// A `timeout` of `None` disables the per-request timeout, which large
    /// single-part uploads may need.
    pub fn new(
        base_url: &str,
        auth_token: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl HttpTransport for HttpClient {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = self.url_for(&request.path);
        debug!("{} {} (content length {:?})",
               request.method, scrub_credentials(&url), request.body.content_length());

        let mut builder = match request.method {
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
        };

        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }

        builder = match request.body {
            RequestBody::Empty => builder.body(Vec::<u8>::new()),
            RequestBody::Reader { reader, length: Some(length) } => {
                builder.body(Body::sized(reader, length))
            }
            RequestBody::Reader { reader, length: None } => builder.body(Body::new(reader)),
        };

        let response = builder.send().map_err(|e| {
            if e.is_body() {
                TransportError::BodyInterrupted(e)
            } else {
                TransportError::Http(e)
            }
        })?;
        let status = response.status().as_u16();
        let body = response.text()?;

        debug!("{} answered HTTP {}", scrub_credentials(&url), status);
        Ok(HttpResponse { status, body })
    }
}
