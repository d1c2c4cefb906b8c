//! Route table construction.
//!
//! # Responsibilities
//! - Register one axum route per distinct inbound path
//! - Merge handlers that share a path but differ by method
//! - Answer 400 on the parent path of parameterised routes
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Templates are compiled once and shared by `Arc`

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::handler::Handler;
use axum::http::{HeaderMap, Uri};
use axum::response::IntoResponse;
use axum::routing::MethodRouter;
use axum::Router;

use crate::http::server::AppState;
use crate::proxy::endpoints::{Endpoint, HttpMethod};
use crate::proxy::error::ProxyError;
use crate::proxy::forward::{forward, CompiledEndpoint};

type Routes = BTreeMap<String, MethodRouter<AppState>>;

fn add<H, T>(routes: &mut Routes, path: &str, method: HttpMethod, handler: H)
where
    H: Handler<T, AppState>,
    T: 'static,
{
    let existing = routes.remove(path).unwrap_or_else(MethodRouter::new);
    routes.insert(path.to_string(), existing.on(method.as_filter(), handler));
}

/// Build the router for `endpoints`.
pub fn proxy_routes(endpoints: &'static [Endpoint]) -> Router<AppState> {
    let mut routes = Routes::new();
    let mut taken: BTreeSet<(String, HttpMethod)> = BTreeSet::new();

    for endpoint in endpoints {
        let compiled = Arc::new(CompiledEndpoint::new(endpoint));
        let handler = move |State(state): State<AppState>,
                            uri: Uri,
                            headers: HeaderMap,
                            body: Result<Bytes, BytesRejection>| {
            let compiled = compiled.clone();
            async move { forward(state, compiled, uri, headers, body).await }
        };
        add(&mut routes, endpoint.route, endpoint.method, handler);
        taken.insert((endpoint.route.to_string(), endpoint.method));
    }

    // `DELETE /api/saved-queries` and friends: the caller forgot the parameter.
    for endpoint in endpoints {
        let compiled = CompiledEndpoint::new(endpoint);
        let (Some(parent), Some(name)) = (compiled.route.parent(), compiled.route.param_names().next())
        else {
            continue;
        };
        for path in [parent.clone(), format!("{}/", parent.trim_end_matches('/'))] {
            if !taken.insert((path.clone(), endpoint.method)) {
                continue;
            }
            let name = name.to_string();
            let handler = move || {
                let name = name.clone();
                async move { ProxyError::MissingParameter(name).into_response() }
            };
            add(&mut routes, &path, endpoint.method, handler);
        }
    }

    for path in routes.keys() {
        tracing::debug!(path = %path, "Registered proxy route");
    }

    routes
        .into_iter()
        .fold(Router::new(), |router, (path, methods)| router.route(&path, methods))
}
