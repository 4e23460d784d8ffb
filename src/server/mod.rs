//! Local server driving one interactive session

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::SiteConfig;
use crate::content::{Loader, SiteSource};
use crate::helpers::decode_fragment;
use crate::render::page::{render_page, LinkMode, PageContext};
use crate::render::DetailView;
use crate::session::{LoadTicket, Session};
use crate::Site;

/// Server state
struct ServerState {
    site: Site,
    loader: Loader<SiteSource>,
    session: Mutex<Session>,
    stylesheet: String,
}

/// JSON answer to API calls; absent parts are left untouched by the client
#[derive(Debug, Default, Serialize)]
struct ApiResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    list: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fragment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stale: bool,
}

impl ApiResponse {
    fn with_detail(mut self, detail: &DetailView) -> Self {
        self.meta = Some(detail.meta_html());
        self.content = Some(detail.body_html());
        self
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Deserialize)]
struct OpenParams {
    #[serde(default)]
    fragment: String,
}

/// Start the server
pub async fn start(site: &Site, ip: &str, port: u16, open: bool) -> Result<()> {
    let app = app(site).await?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router, loading the initial post before serving
pub async fn app(site: &Site) -> Result<Router> {
    let loader = site.loader()?;
    let (mut session, ticket) = Session::start(&site.catalog, None);
    if let Some(ticket) = ticket {
        let result = loader.load(&ticket.descriptor).await;
        session.complete(&ticket, result);
    }

    let local_root = loader.source().local_root().map(|p| p.to_path_buf());
    let state = Arc::new(ServerState {
        site: site.clone(),
        loader,
        session: Mutex::new(session),
        stylesheet: site.stylesheet()?,
    });

    let router = Router::new()
        .route("/", get(index_handler))
        .route("/highlight.css", get(stylesheet_handler))
        .route("/api/search", get(search_handler))
        .route("/api/select/:index", post(select_handler))
        .route("/api/open", get(open_handler))
        .with_state(state);

    let router = match local_root {
        Some(root) => serve_content(router, &root, &site.config),
        None => router,
    };

    Ok(router.layer(TraceLayer::new_for_http()))
}

/// Serve the posts and assets directories of a local content root
///
/// Nothing else under the root (the config, the public dir) is exposed.
fn serve_content(mut router: Router, root: &FsPath, config: &SiteConfig) -> Router {
    let mut mounted: Vec<String> = Vec::new();
    for dir in [
        config.posts_dir.clone(),
        format!("{}assets", config.asset_prefix),
    ] {
        let dir = dir.trim_matches('/').to_string();
        if dir.is_empty() || dir == "." {
            tracing::warn!("Not serving the whole content root {:?}", root);
            continue;
        }
        let overlaps = mounted.iter().any(|m| {
            m == &dir || dir.starts_with(&format!("{}/", m)) || m.starts_with(&format!("{}/", dir))
        });
        if overlaps {
            continue;
        }
        tracing::debug!("Serving {:?} at /{}", root.join(&dir), dir);
        router = router.nest_service(&format!("/{}", dir), ServeDir::new(root.join(&dir)));
        mounted.push(dir);
    }
    router
}

async fn index_handler(State(state): State<Arc<ServerState>>) -> Html<String> {
    let session = state.session.lock().await;
    let list = session.list_view();
    Html(render_page(&PageContext {
        config: &state.site.config,
        list: &list,
        detail: session.detail(),
        query: session.query(),
        mode: LinkMode::Fragment,
        stylesheet: "/highlight.css",
    }))
}

async fn stylesheet_handler(State(state): State<Arc<ServerState>>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        state.stylesheet.clone(),
    )
        .into_response()
}

async fn search_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<SearchParams>,
) -> Json<ApiResponse> {
    let mut session = state.session.lock().await;
    let list = session.search(&state.site.catalog, &params.q);
    Json(ApiResponse {
        list: Some(list.to_html(LinkMode::Fragment)),
        ..Default::default()
    })
}

async fn select_handler(
    State(state): State<Arc<ServerState>>,
    Path(index): Path<usize>,
) -> Response {
    let ticket = state.session.lock().await.select(index);
    match ticket {
        Some(ticket) => Json(run_load(&state, ticket).await).into_response(),
        None => (StatusCode::NOT_FOUND, Json(ApiResponse::default())).into_response(),
    }
}

async fn open_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<OpenParams>,
) -> Response {
    let source_ref = decode_fragment(&params.fragment);
    let ticket = state
        .session
        .lock()
        .await
        .select_source(&state.site.catalog, &source_ref);
    match ticket {
        Some(ticket) => Json(run_load(&state, ticket).await).into_response(),
        None => {
            tracing::debug!("No post for fragment {:?}", params.fragment);
            (StatusCode::NOT_FOUND, Json(ApiResponse::default())).into_response()
        }
    }
}

/// Load outside the session lock, then apply the result if still current
async fn run_load(state: &ServerState, ticket: LoadTicket) -> ApiResponse {
    let result = state.loader.load(&ticket.descriptor).await;
    let fragment = result.as_ref().ok().map(|post| post.fragment.clone());

    let mut session = state.session.lock().await;
    let list = Some(session.list_view().to_html(LinkMode::Fragment));
    let query = Some(session.query().to_string());
    match session.complete(&ticket, result) {
        Some(detail) => ApiResponse {
            list,
            fragment,
            query,
            ..Default::default()
        }
        .with_detail(&detail),
        None => ApiResponse {
            stale: true,
            ..Default::default()
        },
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
