//! In-process stand-in for the monitoring service.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path as UrlPath, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use hchk::ping::Sleeper;
use hchk::Settings;
use serde_json::{json, Value};

#[derive(Debug, Default)]
struct Inner {
    base_url: String,
    next_id: u32,
    /// Creation request payloads, in order.
    created: Vec<Value>,
    /// Check codes of received pings, in order.
    pings: Vec<String>,
    user_agents: Vec<String>,
    /// Statuses for the next pings; 200 once exhausted.
    ping_statuses: VecDeque<u16>,
    create_error: Option<String>,
}

type SharedState = Arc<Mutex<Inner>>;

#[derive(Clone)]
pub struct FakeService {
    addr: SocketAddr,
    inner: SharedState,
}

impl FakeService {
    pub async fn start() -> Self
    {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let inner = Arc::new(Mutex::new(Inner {
            base_url: format!("http://{}", addr),
            ..Default::default()
        }));

        let router = Router::new()
            .route("/api/v1/checks/", post(create_check))
            .route("/ping/{code}", get(ping))
            .route("/slow/{code}", get(slow_ping))
            .with_state(inner.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        FakeService { addr, inner }
    }

    pub fn base_url(&self) -> String
    {
        format!("http://{}", self.addr)
    }

    pub fn ping_url(&self, code: &str) -> String
    {
        format!("http://{}/ping/{}", self.addr, code)
    }

    pub fn slow_url(&self, code: &str) -> String
    {
        format!("http://{}/slow/{}", self.addr, code)
    }

    pub fn script_pings(&self, statuses: impl IntoIterator<Item = u16>)
    {
        self.inner.lock().unwrap().ping_statuses.extend(statuses);
    }

    pub fn fail_creation(&self, error: &str)
    {
        self.inner.lock().unwrap().create_error = Some(error.to_string());
    }

    pub fn created(&self) -> Vec<Value>
    {
        self.inner.lock().unwrap().created.clone()
    }

    pub fn pings(&self) -> Vec<String>
    {
        self.inner.lock().unwrap().pings.clone()
    }

    pub fn user_agents(&self) -> Vec<String>
    {
        self.inner.lock().unwrap().user_agents.clone()
    }

    pub fn settings(&self, config_path: &Path) -> Settings
    {
        Settings {
            config_path: config_path.to_path_buf(),
            api_url: self.base_url(),
            api_key: None,
        }
    }
}

async fn create_check(State(inner): State<SharedState>, headers: HeaderMap, Json(payload): Json<Value>) -> (StatusCode, Json<Value>)
{
    let mut inner = inner.lock().unwrap();
    record_user_agent(&mut inner, &headers);
    inner.created.push(payload);

    if let Some(error) = &inner.create_error {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": error })));
    }

    inner.next_id += 1;
    let ping_url = format!("{}/ping/check-{}", inner.base_url, inner.next_id);
    (StatusCode::CREATED, Json(json!({ "ping_url": ping_url })))
}

async fn ping(State(inner): State<SharedState>, headers: HeaderMap, UrlPath(code): UrlPath<String>) -> StatusCode
{
    let mut inner = inner.lock().unwrap();
    record_user_agent(&mut inner, &headers);
    inner.pings.push(code);
    let status = inner.ping_statuses.pop_front().unwrap_or(200);
    StatusCode::from_u16(status).unwrap()
}

async fn slow_ping(UrlPath(_code): UrlPath<String>) -> StatusCode
{
    tokio::time::sleep(Duration::from_secs(5)).await;
    StatusCode::OK
}

fn record_user_agent(inner: &mut Inner, headers: &HeaderMap)
{
    let ua = headers.get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    inner.user_agents.push(ua.to_string());
}


/// Records backoff delays instead of sleeping.
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper(Arc<Mutex<Vec<Duration>>>);

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<u64>
    {
        self.0.lock().unwrap().iter().map(Duration::as_secs).collect()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) -> impl Future<Output = ()>
    {
        self.0.lock().unwrap().push(delay);
        std::future::ready(())
    }
}

/// An address nobody listens on.
pub async fn closed_port_url() -> String
{
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/ping/gone", addr)
}
