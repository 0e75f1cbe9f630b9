//! Cookie-carrying request helper.

use axum::{
    Router,
    body::Body,
    http::{Method, Request, Response, header},
};
use serde_json::Value;
use tower::ServiceExt;

/// Sends requests through a router, carrying the session cookie between
/// them like a browser tab would.
pub struct TestClient {
    router: Router,
    cookie_name: &'static str,
    cookie: Option<String>,
}

impl TestClient {
    #[must_use]
    pub const fn new(router: Router, cookie_name: &'static str) -> Self {
        Self {
            router,
            cookie_name,
            cookie: None,
        }
    }

    /// Forget the session, as a new browser would.
    pub fn clear_cookie(&mut self) {
        self.cookie = None;
    }

    /// Send a request, attaching and then updating the session cookie.
    pub async fn send(&mut self, mut request: Request<Body>) -> Response<Body> {
        if let Some(cookie) = &self.cookie {
            if let Ok(value) = cookie.parse() {
                request.headers_mut().insert(header::COOKIE, value);
            }
        }

        let response = match self.router.clone().oneshot(request).await {
            Ok(response) => response,
            Err(never) => match never {},
        };

        for set_cookie in response.headers().get_all(header::SET_COOKIE) {
            let Ok(raw) = set_cookie.to_str() else { continue };
            let pair = raw.split(';').next().unwrap_or_default();
            if let Some(value) = pair.strip_prefix(&format!("{}=", self.cookie_name)) {
                self.cookie = (!value.is_empty()).then(|| pair.to_string());
            }
        }

        response
    }

    fn build(method: Method, path: &str, content_type: Option<&str>, body: Body) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        builder.body(body).expect("valid request")
    }

    pub async fn get(&mut self, path: &str) -> Response<Body> {
        self.send(Self::build(Method::GET, path, None, Body::empty())).await
    }

    pub async fn delete(&mut self, path: &str) -> Response<Body> {
        self.send(Self::build(Method::DELETE, path, None, Body::empty())).await
    }

    pub async fn post_json(&mut self, path: &str, json: &Value) -> Response<Body> {
        self.json(Method::POST, path, json).await
    }

    pub async fn put_json(&mut self, path: &str, json: &Value) -> Response<Body> {
        self.json(Method::PUT, path, json).await
    }

    async fn json(&mut self, method: Method, path: &str, json: &Value) -> Response<Body> {
        let request = Self::build(
            method,
            path,
            Some("application/json"),
            Body::from(json.to_string()),
        );
        self.send(request).await
    }

    /// POST an `application/x-www-form-urlencoded` body.
    pub async fn post_form(&mut self, path: &str, body: &str) -> Response<Body> {
        let request = Self::build(
            Method::POST,
            path,
            Some("application/x-www-form-urlencoded"),
            Body::from(body.to_string()),
        );
        self.send(request).await
    }

    /// POST a `multipart/form-data` body built with [`Multipart`].
    pub async fn post_multipart(&mut self, path: &str, form: Multipart) -> Response<Body> {
        let content_type = form.content_type();
        let request = Self::build(Method::POST, path, Some(&content_type), Body::from(form.finish()));
        self.send(request).await
    }
}

/// Minimal multipart body builder.
pub struct Multipart {
    body: Vec<u8>,
}

const BOUNDARY: &str = "oeiras-test-boundary";

impl Default for Multipart {
    fn default() -> Self {
        Self::new()
    }
}

impl Multipart {
    #[must_use]
    pub const fn new() -> Self {
        Self { body: Vec::new() }
    }

    #[must_use]
    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    #[must_use]
    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    fn finish(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        self.body
    }
}

/// Read a response body as JSON.
///
/// # Panics
///
/// Panics if the body is not JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let text = body_text(response).await;
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("expected JSON body ({e}): {text}"))
}

/// Read a response body as text.
///
/// # Panics
///
/// Panics if the body cannot be read or is not UTF-8.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body");
    String::from_utf8(bytes.to_vec()).expect("UTF-8 body")
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}
