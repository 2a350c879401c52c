// File: src/client/core.rs
use crate::client::middleware::{BrowserHeadersLayer, BrowserHeadersService};
use crate::client::redirect::{FollowRedirectLayer, FollowRedirectService};
use crate::error::{PresaleError, Result};

use http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tower::{ServiceBuilder, ServiceExt};
use tower_service::Service;

pub type HttpsClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, String>;

/// Client used for the schedule page: browser headers plus redirect following.
pub type WebClient = BrowserHeadersService<FollowRedirectService<HttpsClient>>;

/// Plain HTTPS client with the system's native roots. Plain http is also
/// accepted so local endpoints work.
pub fn https_client() -> HttpsClient {
    let mut root_store = rustls::RootCertStore::empty();
    let result = rustls_native_certs::load_native_certs();
    for err in &result.errors {
        log::debug!("Skipping unreadable system certificate: {}", err);
    }
    root_store.add_parsable_certificates(result.certs);
    if root_store.is_empty() {
        log::warn!("No valid system certificates found; HTTPS requests will fail.");
    }

    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    let https_connector = HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http()
        .enable_http1()
        .build();

    Client::builder(TokioExecutor::new()).build(https_connector)
}

pub fn web_client() -> WebClient {
    ServiceBuilder::new()
        .layer(BrowserHeadersLayer::browser())
        .layer(FollowRedirectLayer::default())
        .service(https_client())
}

/// Sends one request through `service` and returns status and body text.
pub async fn send<S>(service: S, req: Request<String>) -> Result<(StatusCode, String)>
where
    S: Service<Request<String>, Response = Response<Incoming>>,
    S::Error: std::fmt::Debug,
{
    let response = service
        .oneshot(req)
        .await
        .map_err(|e| PresaleError::Http(format!("{:?}", e)))?;
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .map_err(|e| PresaleError::Http(format!("reading body: {}", e)))?
        .to_bytes();
    Ok((status, String::from_utf8_lossy(&bytes).into_owned()))
}
