use crate::blog::BlogSchedulerHandle;
use crate::db::DbActorHandle;
use crate::keys::KeyStore;
use crate::providers::Providers;
use crate::server::guards::auth::RequireAdminKey;
use crate::server::routes::{admin, blog, images, plan};

use axum::{
    Router,
    extract::Request,
    http::{HeaderName, HeaderValue, Method, StatusCode, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
};
use base64::Engine as _;
use rand::RngCore;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// 12 random bytes as unpadded base64url (16 chars).
fn new_request_id() -> String {
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Client-supplied id if usable, otherwise a fresh one.
fn request_id_of(req: &Request) -> String {
    req.headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(new_request_id, str::to_string)
}

#[derive(Clone)]
pub struct ForgeState {
    pub providers: Providers,
    pub store: Arc<dyn KeyStore>,
    pub db: DbActorHandle,
    pub blog: BlogSchedulerHandle,
    pub admin_key: Arc<str>,
}

impl ForgeState {
    pub fn new(
        providers: Providers,
        db: DbActorHandle,
        blog: BlogSchedulerHandle,
        admin_key: Arc<str>,
    ) -> Self {
        Self {
            store: providers.accountant.store().clone(),
            providers,
            db,
            blog,
            admin_key,
        }
    }
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let request_id = request_id_of(&req);
    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let mut resp = next.run(req).await;

    // Echo the id so clients can quote it in reports.
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status().as_u16();
    let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    macro_rules! log_request {
        ($level:ident) => {
            $level!(
                status,
                request_id = %request_id,
                method = %method,
                path = %path,
                latency_ms,
                user_agent = %user_agent,
                "request served"
            )
        };
    }
    if resp.status().is_server_error() {
        log_request!(error);
    } else if resp.status().is_client_error() {
        log_request!(warn);
    } else {
        log_request!(info);
    }

    resp
}

/// Browser front end access. No configured origins means any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o.trim()).ok())
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}

pub fn forge_router(state: ForgeState, cors_origins: &[String]) -> Router {
    let public = Router::new()
        .merge(plan::router())
        .merge(images::router())
        .merge(blog::router());

    let admin = admin::router().layer(middleware::from_extractor_with_state::<RequireAdminKey, _>(
        state.clone(),
    ));

    Router::new()
        .merge(public)
        .merge(admin)
        .fallback(not_found_handler)
        .with_state(state)
        .layer(cors_layer(cors_origins))
        .layer(middleware::from_fn(access_log))
}
