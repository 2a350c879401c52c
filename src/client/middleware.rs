// File: ./src/client/middleware.rs
//! Tower middleware that makes requests look like they come from a desktop browser.
//! The schedule site turns away clients with unfamiliar user agents.
use http::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderName, USER_AGENT};
use http::{HeaderValue, Request};
use std::task::{Context, Poll};
use tower_layer::Layer;
use tower_service::Service;

pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
pub const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
pub const BROWSER_ACCEPT_LANGUAGE: &str = "zh-TW,zh;q=0.9,en-US;q=0.8,en;q=0.7";

#[derive(Clone, Debug)]
pub struct BrowserHeadersLayer {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl BrowserHeadersLayer {
    pub fn new(headers: Vec<(HeaderName, HeaderValue)>) -> Self {
        Self { headers }
    }

    pub fn browser() -> Self {
        Self::new(vec![
            (USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT)),
            (ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT)),
            (
                ACCEPT_LANGUAGE,
                HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
            ),
        ])
    }
}

impl<S> Layer<S> for BrowserHeadersLayer {
    type Service = BrowserHeadersService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BrowserHeadersService {
            inner,
            headers: self.headers.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct BrowserHeadersService<S> {
    inner: S,
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl<S, ReqBody> Service<Request<ReqBody>> for BrowserHeadersService<S>
where
    S: Service<Request<ReqBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        for (name, value) in &self.headers {
            // Headers set explicitly on the request win.
            if !req.headers().contains_key(name) {
                req.headers_mut().insert(name.clone(), value.clone());
            }
        }
        self.inner.call(req)
    }
}
