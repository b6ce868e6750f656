//! HTTP server implementation
//!
//! hyper http1 with TokioIo; one task per connection. Requests are routed by
//! `(method, path)` after the body has been collected.

use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{HeaderMap, Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::auth::JwtValidator;
use crate::config::Args;
use crate::db::LedgerStore;
use crate::reddit::ContentGateway;
use crate::routes::{self, json_response, BoxBody, MAX_BODY_BYTES};
use crate::services::LedgerConfig;
use crate::types::KarmaError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    /// Ledger persistence (MongoDB, or memory in dev mode)
    pub store: Arc<dyn LedgerStore>,
    /// Reddit read API
    pub reddit: Arc<dyn ContentGateway>,
    pub jwt: JwtValidator,
    pub ledger: LedgerConfig,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        args: Args,
        store: Arc<dyn LedgerStore>,
        reddit: Arc<dyn ContentGateway>,
        jwt: JwtValidator,
    ) -> Self {
        let ledger = args.ledger_config();
        Self {
            args,
            store,
            reddit,
            jwt,
            ledger,
            started_at: Instant::now(),
        }
    }
}

/// Run the HTTP server until the process exits
pub async fn run(state: Arc<AppState>) -> Result<(), KarmaError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Karmicup listening on {}", state.args.listen);

    if state.args.dev_mode {
        warn!("Development mode enabled - dev JWT secret accepted");
    }

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, service)
                        .await
                    {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!(peer = %addr, method = %method, path = %path, "Request");

    let (parts, body) = req.into_parts();

    let declared_len = parts
        .headers
        .get(hyper::header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    if declared_len > MAX_BODY_BYTES {
        return Ok(too_large());
    }

    // Chunked bodies carry no Content-Length; the limit applies while reading
    let body = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(BodyError::TooLarge) => {
            warn!(peer = %addr, path = %path, "Request body over limit");
            return Ok(too_large());
        }
        Err(BodyError::Read(e)) => {
            warn!(peer = %addr, error = %e, "Failed to read request body");
            return Ok(json_response(
                StatusCode::BAD_REQUEST,
                &json!({ "error": "Failed to read request body" }),
            ));
        }
    };

    Ok(dispatch(&state, &method, &path, &parts.headers, &body).await)
}

/// Why a request body could not be read
#[derive(Debug)]
pub(crate) enum BodyError {
    /// More than `MAX_BODY_BYTES` arrived
    TooLarge,
    Read(String),
}

/// Collect a body, giving up as soon as it exceeds `MAX_BODY_BYTES`
pub(crate) async fn read_body<B>(body: B) -> Result<Bytes, BodyError>
where
    B: Body<Data = Bytes>,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(BodyError::TooLarge),
        Err(e) => Err(BodyError::Read(e.to_string())),
    }
}

fn too_large() -> Response<BoxBody> {
    json_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        &json!({ "error": "Request body too large" }),
    )
}

/// Route a request to its handler
pub async fn dispatch(
    state: &AppState,
    method: &Method,
    path: &str,
    headers: &HeaderMap,
    body: &Bytes,
) -> Response<BoxBody> {
    let path = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };

    match (method, path) {
        (&Method::OPTIONS, _) => routes::cors_preflight(),

        (&Method::GET, "/health") => routes::handle_health(state),
        (&Method::GET, "/version") => routes::handle_version(),

        (&Method::GET, "/api/me") => routes::handle_me(state, headers).await,
        (&Method::POST, "/api/onboarding/complete") | (&Method::PATCH, "/api/settings/update") => {
            routes::handle_link_reddit(state, headers, body).await
        }

        (&Method::POST, "/api/submissions/create") => {
            routes::handle_create_submission(state, headers, body).await
        }
        (&Method::POST, "/api/submissions/verify") => {
            routes::handle_verify_submission(state, headers, body).await
        }
        (&Method::PATCH, "/api/submissions/modify") => {
            routes::handle_modify_submission(state, headers, body).await
        }
        (&Method::GET, "/api/submissions/mine") => routes::handle_my_submissions(state, headers).await,
        (&Method::GET, "/api/submissions/feed") => routes::handle_feed(state, headers).await,

        _ => routes::not_found_response(path),
    }
}
