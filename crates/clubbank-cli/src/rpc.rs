//! JSON-lines RPC over stdio.
//!
//! Request line: `{"id": <any>, "op": "<operation>", ...fields}`.
//! Response line: `{"id": <echoed>, "ok": true, "result": {...}}` or
//! `{"id": <echoed>, "ok": false, "error": {"error", "code", "internal"}}`.
//!
//! Every line is handled on its own task, so responses can arrive out of
//! order; clients match them by `id`.

use std::sync::Arc;

use anyhow::Context;
use clubbank_engine::Engine;
use clubbank_engine::api::{ErrorOutput, Operation, OperationOutput};
use clubbank_types::ClubbankError;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

/// Responses waiting for the writer before handlers start to wait.
const RESPONSE_QUEUE: usize = 256;

#[derive(Debug, Serialize)]
struct Response {
    id: Value,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<OperationOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorOutput>,
}

/// Serve until stdin closes and every in-flight response is written.
pub async fn serve(engine: Arc<Engine>) -> anyhow::Result<()> {
    tracing::info!("serving JSON-lines requests on stdin");
    serve_io(engine, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    Ok(())
}

/// Answer every line of `reader` on `writer`. Returns the writer once the
/// reader is exhausted and all responses are flushed.
pub async fn serve_io<R, W>(engine: Arc<Engine>, reader: R, writer: W) -> anyhow::Result<W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::channel::<String>(RESPONSE_QUEUE);

    let writer = tokio::spawn(async move {
        let mut out = writer;
        while let Some(line) = rx.recv().await {
            out.write_all(line.as_bytes()).await?;
            out.write_all(b"\n").await?;
            out.flush().await?;
        }
        Ok::<_, std::io::Error>(out)
    });

    let mut lines = reader.lines();
    let mut handled = 0_u64;
    while let Some(line) = lines.next_line().await.context("reading requests")? {
        if line.trim().is_empty() {
            continue;
        }
        handled += 1;
        let engine = Arc::clone(&engine);
        let tx = tx.clone();
        tokio::spawn(async move {
            let response = handle_line(&engine, &line);
            if tx.send(response).await.is_err() {
                tracing::warn!("response writer gone; dropping response");
            }
        });
    }
    drop(tx);

    let out = writer
        .await
        .context("response writer panicked")?
        .context("writing responses")?;
    tracing::info!(handled, "input closed, shutting down");
    Ok(out)
}

/// Decode, dispatch and encode one request line.
pub fn handle_line(engine: &Engine, line: &str) -> String {
    let response = match decode(line) {
        Ok((id, op)) => match engine.dispatch(&op) {
            Ok(result) => Response {
                id,
                ok: true,
                result: Some(result),
                error: None,
            },
            Err(err) => failure(id, &err),
        },
        Err((id, err)) => failure(id, &err),
    };

    serde_json::to_string(&response).unwrap_or_else(|e| {
        tracing::error!(error = %e, "response could not be encoded");
        let fallback = failure(Value::Null, &ClubbankError::from(e));
        serde_json::to_string(&fallback).unwrap_or_default()
    })
}

fn decode(line: &str) -> Result<(Value, Operation), (Value, ClubbankError)> {
    let mut value: Value = serde_json::from_str(line).map_err(|e| (Value::Null, e.into()))?;
    let id = value
        .as_object_mut()
        .and_then(|obj| obj.remove("id"))
        .unwrap_or(Value::Null);
    match serde_json::from_value(value) {
        Ok(op) => Ok((id, op)),
        Err(e) => {
            tracing::debug!(error = %e, "undecodable request");
            Err((id, e.into()))
        }
    }
}

fn failure(id: Value, err: &ClubbankError) -> Response {
    Response {
        id,
        ok: false,
        result: None,
        error: Some(ErrorOutput::from(err)),
    }
}

#[cfg(test)]
mod tests {
    use clubbank_types::EngineConfig;

    use super::*;

    fn engine() -> Engine {
        Engine::new(EngineConfig::default()).unwrap()
    }

    fn call(engine: &Engine, line: &str) -> Value {
        serde_json::from_str(&handle_line(engine, line)).unwrap()
    }

    #[test]
    fn echoes_id_and_result() {
        let e = engine();
        let out = call(&e, r#"{"id": 7, "op": "healthCheck"}"#);
        assert_eq!(out["id"], 7);
        assert_eq!(out["ok"], true);
        assert_eq!(out["result"]["status"], "healthy");
        assert!(out.get("error").is_none());
    }

    #[test]
    fn submit_then_get_logs() {
        let e = engine();
        let out = call(
            &e,
            r#"{"id":"a","op":"submitRequest","club_id":0,"resources":[0,2,0]}"#,
        );
        assert_eq!(out["result"]["safe"], true);
        assert_eq!(out["result"]["new_available"], serde_json::json!([5, 2, 5]));

        let out = call(&e, r#"{"id":"b","op":"getLogs"}"#);
        assert_eq!(out["result"]["total_requests"], 1);
        assert_eq!(out["result"]["logs"][0]["club_name"], "Drama Club");
    }

    #[test]
    fn engine_errors_carry_code() {
        let e = engine();
        let out = call(&e, r#"{"id":1,"op":"loadScenario","scenario":"nope"}"#);
        assert_eq!(out["ok"], false);
        assert_eq!(out["error"]["code"], "CB_ERR_300");
        assert_eq!(out["error"]["internal"], false);
    }

    #[test]
    fn garbage_is_a_serialization_error() {
        let e = engine();
        let out = call(&e, "not json");
        assert_eq!(out["id"], Value::Null);
        assert_eq!(out["error"]["code"], "CB_ERR_901");

        let out = call(&e, r#"{"id":2,"op":"noSuchOp"}"#);
        assert_eq!(out["id"], 2);
        assert_eq!(out["error"]["code"], "CB_ERR_901");
    }

    #[test]
    fn run_request_for_unknown_club_is_rejected_unlogged() {
        let e = engine();
        let out = call(
            &e,
            r#"{"id":4,"op":"runRequest",
                "allocation":[[0,1,0],[2,0,0]],
                "max_need":[[7,5,3],[3,2,2]],
                "available":[5,4,5],
                "request":{"club_id":5,"resources":[0,1,0]}}"#,
        );
        assert_eq!(out["id"], 4);
        assert_eq!(out["ok"], false);
        assert_eq!(out["error"]["code"], "CB_ERR_100");

        let out = call(&e, r#"{"id":5,"op":"getLogs"}"#);
        assert_eq!(out["result"]["total_requests"], 0);
    }

    #[tokio::test]
    async fn serve_io_answers_each_line_and_stops_at_eof() {
        let input: &[u8] = b"{\"id\":1,\"op\":\"healthCheck\"}\n\n   \n{\"id\":2,\"op\":\"getState\"}\n";
        let out = serve_io(Arc::new(engine()), input, Vec::new()).await.unwrap();

        let responses: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses.len(), 2);
        let mut ids: Vec<i64> = responses.iter().map(|r| r["id"].as_i64().unwrap()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
        assert!(responses.iter().all(|r| r["ok"] == true));
    }

    #[tokio::test]
    async fn serve_io_with_empty_input_writes_nothing() {
        let input: &[u8] = b"";
        let out = serve_io(Arc::new(engine()), input, Vec::new()).await.unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn run_request_over_the_wire() {
        let e = engine();
        let out = call(
            &e,
            r#"{"id":3,"op":"runRequest",
                "allocation":[[0,1,0],[2,0,0],[3,0,2]],
                "max_need":[[7,5,3],[3,2,2],[9,0,2]],
                "available":[5,4,5],
                "request":{"club_id":2,"resources":[9,0,2]}}"#,
        );
        assert_eq!(out["result"]["safe"], false);
        assert_eq!(
            out["result"]["log_entry"]["reason"],
            "EXCEEDS_MAXIMUM_NEED"
        );
        assert_eq!(out["result"]["log_entry"]["decision"], "DENIED");
    }
}
