//! HTTP 服务器模块
//!
//! 提供图编辑和算法调用的 REST API

use crate::config::ServerConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::report::Report;
use crate::session::Session;
use axum::{
    body::Body,
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// 应用状态
///
/// 会话由互斥锁保护，同一时刻只有一个请求访问图。
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<Session>>,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }
}

/// 构建路由
pub fn router(state: AppState) -> Router {
    Router::new()
        // 健康检查
        .route("/health", get(health_check))
        // 指标
        .route("/metrics", get(metrics_handler))
        // 图
        .route("/graph", get(get_graph).delete(clear_graph))
        .route("/nodes", post(add_node))
        .route("/edges", post(add_edge))
        // 图算法
        .route("/algorithm/mst", post(mst))
        .route("/algorithm/shortest-path", post(shortest_path))
        .route("/algorithm/max-flow", post(max_flow))
        // 日志
        .route("/log", get(log_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// 启动服务器
pub async fn start_server(config: ServerConfig, session: Session) -> Result<()> {
    let app = router(AppState::new(session));

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Server(format!("绑定地址失败: {}", e)))?;
    tracing::info!(%addr, "graphlab 服务器已启动");

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Server(format!("服务器错误: {}", e)))?;

    Ok(())
}

// ==================== 处理器 ====================

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Prometheus 格式指标
async fn metrics_handler(State(state): State<AppState>) -> Response {
    let prom = state.session.lock().metrics().to_prometheus();

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        Body::from(prom.content),
    )
        .into_response()
}

/// 图快照
async fn get_graph(State(state): State<AppState>) -> Response {
    let snapshot = state.session.lock().snapshot();
    ApiResponse::success(snapshot).into_response()
}

/// 清空图
async fn clear_graph(State(state): State<AppState>) -> Response {
    let mut session = state.session.lock();
    session.clear();
    ApiResponse::success(session.snapshot()).into_response()
}

/// 添加节点请求
#[derive(Debug, Deserialize)]
pub struct NodeRequest {
    pub name: String,
}

async fn add_node(State(state): State<AppState>, payload: Payload<NodeRequest>) -> Response {
    let result = json_body(payload).and_then(|req| state.session.lock().add_node(&req.name));
    respond(result.map(|id| serde_json::json!({ "id": id })))
}

/// 添加边请求
#[derive(Debug, Deserialize)]
pub struct EdgeRequest {
    pub source: String,
    pub target: String,
    pub weight: i64,
}

async fn add_edge(State(state): State<AppState>, payload: Payload<EdgeRequest>) -> Response {
    let result = json_body(payload).and_then(|req| {
        state
            .session
            .lock()
            .add_edge(&req.source, &req.target, req.weight)
    });
    respond(result)
}

/// 算法结果及其报告
#[derive(Debug, Serialize)]
pub struct AlgorithmResponse<T> {
    pub result: T,
    pub report: Report,
}

async fn mst(State(state): State<AppState>) -> Response {
    let (result, report) = state.session.lock().run_mst();
    ApiResponse::success(AlgorithmResponse { result, report }).into_response()
}

/// 最短路径请求
#[derive(Debug, Deserialize)]
pub struct PathRequest {
    pub start: String,
    pub end: String,
}

async fn shortest_path(State(state): State<AppState>, payload: Payload<PathRequest>) -> Response {
    let result = json_body(payload)
        .and_then(|req| state.session.lock().run_shortest_path(&req.start, &req.end));
    respond(result.map(|(result, report)| AlgorithmResponse { result, report }))
}

/// 最大流请求
#[derive(Debug, Deserialize)]
pub struct MaxFlowRequest {
    pub source: String,
    pub sink: String,
}

async fn max_flow(State(state): State<AppState>, payload: Payload<MaxFlowRequest>) -> Response {
    let result = json_body(payload)
        .and_then(|req| state.session.lock().run_max_flow(&req.source, &req.sink));
    respond(result.map(|(result, report)| AlgorithmResponse { result, report }))
}

/// 日志查询参数
#[derive(Debug, Deserialize)]
pub struct LogQuery {
    #[serde(default = "default_log_limit")]
    pub limit: usize,
}

fn default_log_limit() -> usize {
    50
}

async fn log_handler(
    State(state): State<AppState>,
    query: std::result::Result<Query<LogQuery>, QueryRejection>,
) -> Response {
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => return Error::Validation(rejection.body_text()).into_response(),
    };
    let entries = state.session.lock().history().recent(query.limit);
    ApiResponse::success(entries).into_response()
}

/// JSON 请求体，解析失败时保留 axum 的拒绝原因
type Payload<T> = std::result::Result<Json<T>, JsonRejection>;

/// 请求体格式或字段类型错误都按校验错误返回
fn json_body<T>(payload: Payload<T>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| Error::Validation(rejection.body_text()))
}

fn respond<T: Serialize>(result: Result<T>) -> Response {
    match result {
        Ok(data) => ApiResponse::success(data).into_response(),
        Err(e) => e.into_response(),
    }
}

/// 错误类别对应的 HTTP 状态码
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Duplicate => StatusCode::CONFLICT,
        ErrorKind::NoPath => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let kind = self.kind();
        (status_for(kind), Json(ApiResponse::<()>::error(&self))).into_response()
    }
}

/// API 响应
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            kind: None,
        }
    }

    pub fn error(err: &Error) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(err.to_string()),
            kind: Some(err.kind()),
        }
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EngineConfig, Seed};
    use crate::metrics::Metrics;
    use axum::http::{Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(seed: Seed) -> Router {
        let config = EngineConfig {
            seed,
            log_capacity: 16,
        };
        let session = Session::from_config(&config)
            .unwrap()
            .with_metrics(Arc::new(Metrics::new()));
        router(AppState::new(session))
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(Seed::Demo);
        let (status, body) = send(&app, Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_graph_snapshot() {
        let app = app(Seed::Demo);
        let (status, body) = send(&app, Method::GET, "/graph", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["nodes"], json!(["A", "B", "C"]));
        assert_eq!(body["data"]["edges"][0]["weight"], 10);
    }

    #[tokio::test]
    async fn test_build_and_query() {
        let app = app(Seed::Empty);

        for name in ["s", "a", "b", "t"] {
            let (status, _) = send(&app, Method::POST, "/nodes", Some(json!({ "name": name }))).await;
            assert_eq!(status, StatusCode::OK);
        }
        for (s, t, w) in [("s", "a", 3), ("s", "b", 2), ("a", "t", 2), ("b", "t", 3), ("a", "b", 1)] {
            let (status, body) = send(
                &app,
                Method::POST,
                "/edges",
                Some(json!({ "source": s, "target": t, "weight": w })),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["success"], true);
        }

        let (status, body) = send(
            &app,
            Method::POST,
            "/algorithm/max-flow",
            Some(json!({ "source": "s", "sink": "t" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["result"]["value"], 5);
        let flows: Vec<(String, u64)> = body["data"]["result"]["edge_flows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| {
                (
                    format!("{}{}", f["source"].as_str().unwrap(), f["target"].as_str().unwrap()),
                    f["flow"].as_u64().unwrap(),
                )
            })
            .collect();
        assert_eq!(
            flows,
            vec![
                ("SA".to_string(), 3),
                ("SB".to_string(), 2),
                ("AT".to_string(), 2),
                ("BT".to_string(), 3),
                ("AB".to_string(), 1),
            ]
        );
        assert_eq!(body["data"]["report"]["level"], "success");

        let (status, body) = send(
            &app,
            Method::POST,
            "/algorithm/shortest-path",
            Some(json!({ "start": "s", "end": "t" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["result"]["cost"], 5);
    }

    #[tokio::test]
    async fn test_mst_endpoint() {
        let app = app(Seed::Demo);
        let (status, body) = send(&app, Method::POST, "/algorithm/mst", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["result"]["total_cost"], 15);
        assert_eq!(body["data"]["report"]["highlights"][1]["style"]["kind"], "tree");
    }

    #[tokio::test]
    async fn test_error_status_codes() {
        let app = app(Seed::Demo);

        let (status, body) = send(&app, Method::POST, "/nodes", Some(json!({ "name": "a" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["kind"], "duplicate");

        let (status, body) = send(&app, Method::POST, "/nodes", Some(json!({ "name": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");

        let (status, body) = send(
            &app,
            Method::POST,
            "/edges",
            Some(json!({ "source": "a", "target": "z", "weight": 1 })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["success"], false);

        let (status, body) = send(
            &app,
            Method::POST,
            "/algorithm/shortest-path",
            Some(json!({ "start": "c", "end": "a" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "no_path");

        let (status, _) = send(
            &app,
            Method::POST,
            "/algorithm/max-flow",
            Some(json!({ "source": "a", "sink": "A" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_bodies_are_validation_errors() {
        let app = app(Seed::Demo);

        for weight in [json!(1.5), json!("x"), json!(null)] {
            let (status, body) = send(
                &app,
                Method::POST,
                "/edges",
                Some(json!({ "source": "a", "target": "c", "weight": weight })),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["success"], false);
            assert_eq!(body["kind"], "validation");
        }

        let (status, body) = send(&app, Method::POST, "/nodes", Some(json!({ "name": 5 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");

        let (status, body) = send(
            &app,
            Method::POST,
            "/algorithm/max-flow",
            Some(json!({ "source": "a" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");

        let (status, body) = send(&app, Method::POST, "/algorithm/shortest-path", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");

        let (status, body) = send(&app, Method::GET, "/log?limit=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["kind"], "validation");

        let (_, body) = send(&app, Method::GET, "/graph", None).await;
        assert_eq!(body["data"]["edges"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_clear_and_log() {
        let app = app(Seed::Demo);

        let (status, body) = send(&app, Method::DELETE, "/graph", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["nodes"], json!([]));

        let (_, body) = send(&app, Method::GET, "/log?limit=1", None).await;
        let entries = body["data"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["operation"], "clear");
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let app = app(Seed::Demo);
        send(&app, Method::POST, "/algorithm/mst", None).await;

        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.contains("graphlab_algorithm_runs_total{algorithm=\"mst\"} 1"));
    }
}
