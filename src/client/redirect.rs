// File: ./src/client/redirect.rs
//! Follows `Location` redirects for idempotent fetches.
use http::{Request, Response, Uri};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower_layer::Layer;
use tower_service::Service;

pub const DEFAULT_MAX_REDIRECTS: usize = 5;

/// Resolves a `Location` value against the URI that produced it. Relative
/// locations inherit scheme and authority from `base`.
pub fn resolve_location(base: &Uri, location: &str) -> Option<Uri> {
    let parts = location.parse::<Uri>().ok()?.into_parts();
    let mut builder = Uri::builder();

    match (parts.scheme, base.scheme()) {
        (Some(scheme), _) => builder = builder.scheme(scheme),
        (None, Some(s)) => builder = builder.scheme(s.clone()),
        (None, None) => {}
    }
    match (parts.authority, base.authority()) {
        (Some(authority), _) => builder = builder.authority(authority),
        (None, Some(a)) => builder = builder.authority(a.clone()),
        (None, None) => {}
    }
    builder = builder.path_and_query(parts.path_and_query.as_ref().map_or("/", |pq| pq.as_str()).to_string());

    builder.build().ok()
}

#[derive(Clone, Debug)]
pub struct FollowRedirectLayer {
    max_redirects: usize,
}

impl FollowRedirectLayer {
    pub fn new(max_redirects: usize) -> Self {
        Self { max_redirects }
    }
}

impl Default for FollowRedirectLayer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REDIRECTS)
    }
}

impl<S> Layer<S> for FollowRedirectLayer {
    type Service = FollowRedirectService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        FollowRedirectService {
            inner,
            max_redirects: self.max_redirects,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FollowRedirectService<S> {
    inner: S,
    max_redirects: usize,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for FollowRedirectService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: std::error::Error + Send + Sync + 'static,
    ReqBody: Clone + Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let mut inner = self.inner.clone();
        let max_redirects = self.max_redirects;

        Box::pin(async move {
            let mut current = req;
            let mut hops = 0;

            loop {
                let retry = current.clone();
                let response = inner.call(current).await?;

                if hops >= max_redirects || !response.status().is_redirection() {
                    return Ok(response);
                }

                let next = response
                    .headers()
                    .get(http::header::LOCATION)
                    .and_then(|loc| loc.to_str().ok())
                    .and_then(|loc| resolve_location(retry.uri(), loc));

                match next {
                    Some(uri) => {
                        log::debug!("Following redirect {} -> {}", retry.uri(), uri);
                        current = retry;
                        *current.uri_mut() = uri;
                        hops += 1;
                    }
                    None => return Ok(response),
                }
            }
        })
    }
}
