/*! axpath JSON-RPC over WebSocket. */

mod rpc;
mod server;

pub use rpc::{dispatch, dispatch_json, RpcRequest, RpcResponse, RpcResult};
pub use server::{router, start_server, WebSocketState, DEFAULT_WS_PORT};
