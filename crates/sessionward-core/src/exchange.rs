//! The HTTP exchange passed through the security pipeline.
//!
//! An [`HttpExchange`] is the host server's view of one request/response pair
//! while it is being authenticated. Typed attachments (pending challenges,
//! identity contexts) ride along in its [`Extensions`].

use axum::http::{Extensions, HeaderMap, HeaderValue, Method, StatusCode, Uri, header::COOKIE};

/// A request/response pair in flight.
#[derive(Debug)]
pub struct HttpExchange {
    method: Method,
    uri: Uri,
    request_headers: HeaderMap,
    status: StatusCode,
    response_headers: HeaderMap,
    extensions: Extensions,
}

impl Default for HttpExchange {
    fn default() -> Self {
        Self::new(Method::GET, Uri::from_static("/"))
    }
}

impl HttpExchange {
    /// Creates an exchange for the given request line with a `200 OK` response.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            request_headers: HeaderMap::new(),
            status: StatusCode::OK,
            response_headers: HeaderMap::new(),
            extensions: Extensions::new(),
        }
    }

    /// Adds a request header.
    #[must_use]
    pub fn with_request_header(mut self, name: &'static str, value: HeaderValue) -> Self {
        self.request_headers.append(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn request_headers(&self) -> &HeaderMap {
        &self.request_headers
    }

    pub fn request_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.request_headers
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    pub fn response_headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.response_headers
    }

    /// Typed attachments carried by this exchange.
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Returns the value of the named request cookie, if present and non-empty.
    pub fn cookie(&self, name: &str) -> Option<String> {
        for header in self.request_headers.get_all(COOKIE) {
            let Ok(header) = header.to_str() else {
                continue;
            };
            for cookie in header.split(';') {
                let cookie = cookie.trim();
                if let Some((cookie_name, value)) = cookie.split_once('=')
                    && cookie_name.trim() == name
                {
                    let value = value.trim();
                    if !value.is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }

        None
    }
}
