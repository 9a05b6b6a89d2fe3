#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::ConnectInfo;
use axum::routing::{get, post, put};
use tokio::sync::mpsc;

use shortkey::api::handlers::{
    edit_link_handler, health_handler, redirect_handler, shorten_handler, stats_handler,
    stats_list_handler,
};
use shortkey::application::interceptors::InterceptorRegistry;
use shortkey::application::services::{FloodGuard, LinkService, StatsService};
use shortkey::domain::click_event::ClickEvent;
use shortkey::domain::entities::NewLink;
use shortkey::domain::repositories::{LinkRepository, StatsRepository};
use shortkey::infrastructure::cache::NullCache;
use shortkey::infrastructure::persistence::{MemoryLinkRepository, MemoryStatsRepository};
use shortkey::state::AppState;
use shortkey::utils::codec::Alphabet;

pub const BASE_URL: &str = "https://sho.rt";

/// Options controlling the service under test.
pub struct TestOptions {
    pub flood_delay_seconds: u64,
    pub flood_ip_whitelist: Vec<String>,
    pub unique_urls: bool,
    pub reserved: Vec<String>,
    pub admin_token: Option<String>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            flood_delay_seconds: 0,
            flood_ip_whitelist: vec![],
            unique_urls: true,
            reserved: vec![
                "api".to_string(),
                "health".to_string(),
                "admin".to_string(),
                "static".to_string(),
            ],
            admin_token: None,
        }
    }
}

/// A fully wired application over the in-memory backend.
pub struct TestContext {
    pub state: AppState,
    pub links: Arc<MemoryLinkRepository>,
    pub stats: Arc<MemoryStatsRepository>,
    pub click_rx: mpsc::Receiver<ClickEvent>,
}

pub fn create_test_state() -> TestContext {
    create_test_state_with(TestOptions::default())
}

pub fn create_test_state_with(options: TestOptions) -> TestContext {
    let links = Arc::new(MemoryLinkRepository::new());
    let stats = Arc::new(MemoryStatsRepository::new());
    let (click_tx, click_rx) = mpsc::channel(100);

    let links_dyn: Arc<dyn LinkRepository> = links.clone();
    let stats_dyn: Arc<dyn StatsRepository> = stats.clone();

    let flood_guard = FloodGuard::new(
        links_dyn.clone(),
        options.flood_delay_seconds,
        options.flood_ip_whitelist,
    );

    let link_service = Arc::new(LinkService::new(
        links_dyn.clone(),
        flood_guard,
        Arc::new(InterceptorRegistry::new()),
        Alphabet::lowercase(),
        options.reserved,
        BASE_URL.to_string(),
        options.unique_urls,
    ));
    let stats_service = Arc::new(StatsService::new(links_dyn, stats_dyn));

    let state = AppState::new(
        link_service,
        stats_service,
        Arc::new(NullCache),
        click_tx,
        options.admin_token,
        false,
    );

    TestContext {
        state,
        links,
        stats,
        click_rx,
    }
}

/// Full route set with a mocked peer address, mirroring `routes::app_router`
/// minus the rate-limit layer (tests drive the domain flood guard instead).
pub fn test_router(state: AppState) -> Router {
    Router::new()
        .route("/{keyword}", get(redirect_handler))
        .route("/health", get(health_handler))
        .route("/api/shorten", post(shorten_handler))
        .route("/api/stats", get(stats_list_handler))
        .route("/api/stats/{keyword}", get(stats_handler))
        .route("/api/links/{keyword}", put(edit_link_handler))
        .layer(MockConnectInfoLayer::default())
        .with_state(state)
}

pub async fn create_test_link(links: &MemoryLinkRepository, keyword: &str, url: &str) {
    links
        .insert(NewLink {
            keyword: keyword.to_string(),
            long_url: url.to_string(),
            title: String::new(),
            creator_ip: "127.0.0.1".to_string(),
        })
        .await
        .unwrap();
}

/// Injects a fixed peer address so handlers can extract `ConnectInfo`.
#[derive(Clone)]
pub struct MockConnectInfoLayer {
    addr: SocketAddr,
}

impl Default for MockConnectInfoLayer {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:12345".parse().unwrap(),
        }
    }
}

impl<S> tower::Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService {
            inner,
            addr: self.addr,
        }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
    addr: SocketAddr,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(ConnectInfo(self.addr));
        self.inner.call(req)
    }
}
