/*!
RPC request/response types and dispatch.
*/

#![allow(missing_docs)]

use axpath::platform::Provider;
use axpath::query::Scope;
use axpath::serialize::SerializedDocument;
use axpath::{translate, AttributeMap, BoundingBox, Inspector, Located, Status};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use ts_rs::TS;

/// RPC request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, TS)]
#[serde(tag = "method", content = "args", rename_all = "snake_case")]
#[ts(export)]
pub enum RpcRequest {
  /// Find the first node matching a query.
  Locate { query: String },
  /// Attributes of the first node matching a query.
  Attributes { query: String },
  /// Serialize the subtree at a query's match, or the whole tree without one.
  Serialize {
    #[serde(default)]
    query: Option<String>,
  },
  /// Check and normalize a query without touching the tree.
  Translate { query: String },
}

/// RPC result payload.
#[derive(Debug, Serialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum RpcResult {
  /// A located node.
  Match { id: String, bounds: BoundingBox },
  /// Escaped attribute values of a located node, in vocabulary order.
  Attributes {
    #[ts(type = "Record<string, string>")]
    attributes: AttributeMap,
  },
  /// An XML document. `error` is set when the tree could not be rendered.
  Document {
    xml: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    error: Option<String>,
  },
  /// A query in normal form.
  Query { scope: Scope, query: String },
  /// Why the query was rejected.
  Rejected { reason: String },
  /// Nothing matched.
  Null,
}

/// RPC response. The server adds the request `id`.
#[derive(Debug, Serialize, TS)]
#[ts(export)]
pub struct RpcResponse {
  #[ts(type = "200 | 400 | 404")]
  pub status: Status,
  pub result: RpcResult,
}

impl RpcResponse {
  const fn ok(result: RpcResult) -> Self {
    Self {
      status: Status::Ok,
      result,
    }
  }

  fn missed<N>(located: &Located<N>) -> Self {
    let result = match located.error() {
      Some(e) => RpcResult::Rejected {
        reason: e.to_string(),
      },
      None => RpcResult::Null,
    };
    Self {
      status: located.status(),
      result,
    }
  }

  fn document(doc: &SerializedDocument) -> Self {
    Self::ok(RpcResult::Document {
      xml: doc.to_xml(),
      error: doc.error_message().map(str::to_owned),
    })
  }
}

pub fn dispatch_json<P: Provider>(inspector: &Inspector<P>, method: &str, args: &JsonValue) -> JsonValue {
  // Every method takes named args; a bare call means "no args".
  let args = if args.is_null() { json!({}) } else { args.clone() };
  let request_value = json!({ "method": method, "args": args });

  match serde_json::from_value::<RpcRequest>(request_value) {
    Ok(request) => {
      let response = dispatch(inspector, request);
      log::debug!("[rpc] {method} -> {}", response.status);
      serde_json::to_value(&response).unwrap_or_else(|e| {
        log::error!("[rpc] {method} response not serializable: {e}");
        json!({ "error": format!("Response not serializable: {e}") })
      })
    }
    Err(e) => {
      log::warn!("[rpc] Invalid request for {method}: {e}");
      json!({ "error": format!("Invalid request: {e}") })
    }
  }
}

pub fn dispatch<P: Provider>(inspector: &Inspector<P>, request: RpcRequest) -> RpcResponse {
  match request {
    RpcRequest::Locate { query } => match inspector.locate(&query) {
      Located::Found(m) => RpcResponse::ok(RpcResult::Match {
        id: m.id,
        bounds: m.bounds,
      }),
      other => RpcResponse::missed(&other),
    },

    RpcRequest::Attributes { query } => {
      let response = inspector.attributes(&query);
      let result = match (response.status, response.error) {
        (Status::Ok, _) => RpcResult::Attributes {
          attributes: response.attributes,
        },
        (_, Some(reason)) => RpcResult::Rejected { reason },
        (_, None) => RpcResult::Null,
      };
      RpcResponse {
        status: response.status,
        result,
      }
    }

    RpcRequest::Serialize { query: None } => RpcResponse::document(&inspector.serialize(None)),

    RpcRequest::Serialize { query: Some(query) } => match inspector.serialize_query(&query) {
      Ok(doc) => RpcResponse::document(&doc),
      Err(missed) => RpcResponse::missed(&missed),
    },

    RpcRequest::Translate { query } => match translate(&query) {
      Ok(q) => RpcResponse::ok(RpcResult::Query {
        scope: q.scope,
        query: q.to_string(),
      }),
      Err(e) => RpcResponse {
        status: Status::BadRequest,
        result: RpcResult::Rejected {
          reason: e.to_string(),
        },
      },
    },
  }
}
