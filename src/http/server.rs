//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the gateway handler
//! - Wire up middleware (request ID, tracing, timeout, concurrency limit)
//! - Evaluate the routing engine once per request
//! - Answer redirects and manifest requests directly
//! - Forward passed and rewritten requests to the renderer
//! - Swap in reloaded configuration atomically

use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, Uri},
    response::Response,
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use url::Url;

use crate::config::{ConfigError, GatewayConfig, ValidationError};
use crate::http::headers;
use crate::http::request::{raw_request, request_id};
use crate::http::response;
use crate::manifest::{ManifestCatalog, MANIFEST_PATH};
use crate::observability::metrics;
use crate::routing::{RawRequest, RoutingDecision, RoutingEngine};

/// Everything a request needs, compiled from one configuration.
///
/// Requests load one snapshot and use it throughout; reloads replace the
/// whole snapshot.
#[derive(Debug)]
pub struct GatewaySnapshot {
    pub engine: RoutingEngine,
    pub manifests: ManifestCatalog,
    /// `host[:port]` of the renderer.
    pub upstream_authority: String,
    pub trust_forwarded_proto: bool,
}

impl GatewaySnapshot {
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        let upstream_authority = upstream_authority(&config.upstream.url).ok_or_else(|| {
            ConfigError::Validation(vec![ValidationError::UpstreamUrl(
                config.upstream.url.clone(),
            )])
        })?;

        Ok(Self {
            engine: RoutingEngine::from_config(&config.routing),
            manifests: ManifestCatalog::from_config(&config.branding),
            upstream_authority,
            trust_forwarded_proto: config.listener.trust_forwarded_proto,
        })
    }
}

fn upstream_authority(url: &str) -> Option<String> {
    let url = Url::parse(url).ok()?;
    let host = url.host_str()?;
    Some(match url.port_or_known_default() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub snapshot: Arc<ArcSwap<GatewaySnapshot>>,
    pub client: Client<HttpConnector, Body>,
}

/// HTTP server for the tenant gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    snapshot: Arc<ArcSwap<GatewaySnapshot>>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, ConfigError> {
        let snapshot = Arc::new(ArcSwap::from_pointee(GatewaySnapshot::from_config(&config)?));

        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.timeouts.connect_secs)));
        let client = Client::builder(TokioExecutor::new()).build(connector);

        let state = AppState {
            snapshot: snapshot.clone(),
            client,
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            snapshot,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id(request.headers()),
                    )
                }),
            )
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections));

        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(middleware)
    }

    /// Run the server until `shutdown` fires, applying configs from
    /// `config_updates` as they arrive.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            main_domain = ?self.config.routing.main_domain,
            upstream = %self.config.upstream.url,
            "HTTP server starting"
        );

        let snapshot = self.snapshot.clone();
        tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                apply_config(&snapshot, &config);
            }
        });

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Replace the live snapshot. Listener settings are not reloadable.
pub fn apply_config(snapshot: &ArcSwap<GatewaySnapshot>, config: &GatewayConfig) {
    match GatewaySnapshot::from_config(config) {
        Ok(next) => {
            snapshot.store(Arc::new(next));
            metrics::record_reload();
            tracing::info!(
                main_domain = ?config.routing.main_domain,
                tenants = ?config.routing.allowed_tenants,
                "Routing configuration reloaded"
            );
        }
        Err(e) => tracing::error!(error = %e, "Rejected reloaded configuration"),
    }
}

/// Main gateway handler.
/// Evaluates the routing engine, then redirects, serves or forwards.
async fn gateway_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let snapshot = state.snapshot.load_full();
    let raw = raw_request(&request, snapshot.trust_forwarded_proto);

    if !snapshot.engine.in_scope(&raw.path) {
        return forward(&state, &snapshot, request, &raw, None).await;
    }

    let eval = snapshot.engine.evaluate(&raw);
    metrics::record_decision(eval.rule, &eval.decision);

    tracing::debug!(
        request_id = %request_id(request.headers()),
        host = %eval.host.hostname,
        path = %raw.path,
        tenant = ?eval.tenant.tenant,
        locale = ?eval.locale.locale,
        rule = %eval.rule,
        outcome = eval.decision.outcome(),
        "Routing decision"
    );

    match eval.decision {
        RoutingDecision::Pass => {
            if raw.path == MANIFEST_PATH
                && snapshot.manifests.enabled()
                && matches!(*request.method(), Method::GET | Method::HEAD)
            {
                let tenant = eval.tenant.tenant.as_deref().filter(|_| eval.tenant.is_allowed);
                return snapshot.manifests.respond(tenant);
            }
            forward(&state, &snapshot, request, &raw, None).await
        }
        RoutingDecision::Redirect { status, target_url } => {
            tracing::info!(
                request_id = %request_id(request.headers()),
                rule = %eval.rule,
                status = status.status_code().as_u16(),
                location = %target_url,
                "Redirecting"
            );
            response::redirect(status, &target_url)
        }
        RoutingDecision::Rewrite {
            internal_path,
            tenant_header,
        } => {
            let rewrite = Rewrite {
                path: &internal_path,
                tenant: &tenant_header,
            };
            forward(&state, &snapshot, request, &raw, Some(rewrite)).await
        }
    }
}

struct Rewrite<'a> {
    path: &'a str,
    tenant: &'a str,
}

/// Forward a request to the renderer, optionally under a rewritten path.
async fn forward(
    state: &AppState,
    snapshot: &GatewaySnapshot,
    request: Request<Body>,
    raw: &RawRequest,
    rewrite: Option<Rewrite<'_>>,
) -> Response {
    let start = Instant::now();
    let (mut parts, body) = request.into_parts();
    let id = request_id(&parts.headers).to_string();

    let path = rewrite.as_ref().map_or(raw.path.as_str(), |r| r.path);
    let path_and_query = match &raw.query {
        Some(q) => format!("{path}?{q}"),
        None => path.to_string(),
    };

    let uri = Uri::builder()
        .scheme("http")
        .authority(snapshot.upstream_authority.as_str())
        .path_and_query(path_and_query.as_str())
        .build();
    let uri = match uri {
        Ok(uri) => uri,
        Err(e) => {
            tracing::warn!(request_id = %id, error = %e, "Could not build upstream uri");
            return response::bad_gateway();
        }
    };
    parts.uri = uri;

    headers::strip_hop_by_hop(&mut parts.headers);
    headers::set_forwarded(&mut parts.headers, &raw.host_header, raw.scheme);
    // Only the gateway may name the tenant.
    parts.headers.remove(snapshot.engine.tenant_header());
    if let Some(rewrite) = &rewrite {
        headers::set_tenant(&mut parts.headers, snapshot.engine.tenant_header(), rewrite.tenant);
    }

    match state.client.request(Request::from_parts(parts, body)).await {
        Ok(upstream) => {
            metrics::record_upstream(upstream.status().as_u16(), start);

            let (mut parts, body) = upstream.into_parts();
            headers::strip_hop_by_hop(&mut parts.headers);
            if let Some(rewrite) = &rewrite {
                headers::set_tenant(
                    &mut parts.headers,
                    snapshot.engine.tenant_header(),
                    rewrite.tenant,
                );
            }
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(request_id = %id, error = %e, "Upstream error");
            metrics::record_upstream(502, start);
            response::bad_gateway()
        }
    }
}
