/*!
WebSocket server implementation.
*/

use axpath::platform::Provider;
use axpath::Inspector;
use axum::{
  extract::{
    ws::{Message, WebSocket, WebSocketUpgrade},
    State,
  },
  response::Response,
  routing::get,
  Router,
};
use log::{error, info};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};

/// Default WebSocket server port.
pub const DEFAULT_WS_PORT: u16 = 3031;

/// WebSocket state: one shared inspector session.
pub struct WebSocketState<P: Provider> {
  inspector: Inspector<P>,
  port: u16,
}

impl<P: Provider> Clone for WebSocketState<P> {
  fn clone(&self) -> Self {
    Self {
      inspector: self.inspector.clone(),
      port: self.port,
    }
  }
}

impl<P: Provider> std::fmt::Debug for WebSocketState<P> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("WebSocketState")
      .field("port", &self.port)
      .field("inspector", &self.inspector)
      .finish()
  }
}

impl<P: Provider + Send + 'static> WebSocketState<P> {
  /// Create with default port.
  pub fn new(inspector: Inspector<P>) -> Self {
    Self::with_port(inspector, DEFAULT_WS_PORT)
  }

  /// Create with custom port.
  pub const fn with_port(inspector: Inspector<P>, port: u16) -> Self {
    Self { inspector, port }
  }

  /// Port the server binds on `127.0.0.1`.
  pub const fn port(&self) -> u16 {
    self.port
  }
}

/// Routes: `/ws` upgrades to the RPC socket.
pub fn router<P: Provider + Send + 'static>(ws_state: WebSocketState<P>) -> Router {
  let cors = CorsLayer::new()
    .allow_origin(Any)
    .allow_methods(Any)
    .allow_headers(Any);

  Router::new()
    .route("/ws", get(websocket_handler::<P>))
    .layer(cors)
    .with_state(ws_state)
}

/// Start the WebSocket server on `127.0.0.1`. Runs until the listener fails.
pub async fn start_server<P: Provider + Send + 'static>(ws_state: WebSocketState<P>) -> std::io::Result<()> {
  let addr = format!("127.0.0.1:{}", ws_state.port);
  let listener = tokio::net::TcpListener::bind(&addr).await.inspect_err(|e| {
    error!("[ws] Failed to bind WebSocket server to {addr}: {e}");
  })?;

  info!("[ws] WebSocket server: ws://{addr}/ws");

  axum::serve(listener, router(ws_state))
    .await
    .inspect_err(|e| error!("[ws] WebSocket server failed: {e}"))
}

async fn websocket_handler<P: Provider + Send + 'static>(
  ws: WebSocketUpgrade,
  State(ws_state): State<WebSocketState<P>>,
) -> Response {
  ws.on_upgrade(|socket| handle_websocket(socket, ws_state))
}

async fn handle_websocket<P: Provider + Send + 'static>(mut socket: WebSocket, ws_state: WebSocketState<P>) {
  info!("[client] connected");
  while let Some(msg) = socket.recv().await {
    match msg {
      Ok(Message::Text(text)) => {
        let response = handle_request(&text, &ws_state).await;
        if socket.send(Message::Text(response)).await.is_err() {
          break;
        }
      }
      Ok(Message::Close(_)) => {
        info!("[client] closed connection");
        return;
      }
      Ok(_) => {}
      Err(e) => {
        error!("[ws] WebSocket error: {e}");
        return;
      }
    }
  }
  info!("[client] disconnected");
}

/// Answer one text frame. Provider work runs on the blocking pool.
pub(crate) async fn handle_request<P: Provider + Send + 'static>(request: &str, ws_state: &WebSocketState<P>) -> String {
  let parsed: Result<Value, _> = serde_json::from_str(request);

  let req = match parsed {
    Ok(v) => v,
    Err(e) => return json!({ "error": format!("Invalid JSON: {e}") }).to_string(),
  };

  let id = req.get("id").cloned().unwrap_or(Value::Null);
  let method = req
    .get("method")
    .and_then(Value::as_str)
    .unwrap_or("")
    .to_string();
  let args = req.get("args").cloned().unwrap_or(Value::Null);

  let inspector = ws_state.inspector.clone();
  let dispatch_result =
    tokio::task::spawn_blocking(move || crate::rpc::dispatch_json(&inspector, &method, &args)).await;

  let mut response = dispatch_result.unwrap_or_else(|e| {
    error!("[ws] RPC task failed: {e}");
    json!({ "error": "RPC task panicked" })
  });
  if let Some(obj) = response.as_object_mut() {
    obj.insert("id".to_string(), id);
  }
  response.to_string()
}
