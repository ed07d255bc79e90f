//! Per-connection handler: frame I/O and event dispatch.
//!
//! Each accepted connection gets its own task running this handler,
//! plus a writer task that drains the connection's outbound channel.
//! The flow is:
//!   1. Open the outbound channel (the connection's `EventSink`)
//!   2. Loop: receive frames → decode envelopes → dispatch via the router
//!   3. On close: free the connection's seat through the registry

use std::sync::Arc;

use cardwire_protocol::{Codec, Envelope, ServerEvent};
use cardwire_room::DeckProvider;
use cardwire_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::GatewayState;
use crate::CardwireError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<D: DeckProvider>(
    conn: WebSocketConnection,
    state: Arc<GatewayState<D>>,
) -> Result<(), CardwireError> {
    let connection_id = conn.id();
    tracing::debug!(%connection_id, "handling new connection");

    // The connection is shared with the writer task; `send` and `recv`
    // take `&self`, so an `Arc` is all the sharing we need.
    let conn = Arc::new(conn);

    // Everything the relay sends to this connection goes through one
    // channel, so direct replies and room broadcasts stay ordered
    // relative to each other.
    let (sink, mut outbound) = mpsc::unbounded_channel::<ServerEvent>();

    let writer_conn = Arc::clone(&conn);
    let codec = state.codec;
    let writer = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let frame = match codec.encode(&event) {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        "failed to encode outbound event, dropping"
                    );
                    continue;
                }
            };
            if writer_conn.send(&frame).await.is_err() {
                break;
            }
        }
    });

    loop {
        match conn.recv().await {
            Ok(Some(text)) => {
                let envelope: Envelope = match state.codec.decode(&text) {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        tracing::debug!(
                            %connection_id,
                            error = %e,
                            "undecodable frame, skipping"
                        );
                        continue;
                    }
                };
                state
                    .router
                    .dispatch(
                        Arc::clone(&state),
                        connection_id,
                        &sink,
                        envelope,
                    )
                    .await;
            }
            Ok(None) => {
                tracing::info!(%connection_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%connection_id, error = %e, "recv error");
                break;
            }
        }
    }

    // The disconnect hook: free this connection's seat. The room is
    // dropped too if this was its last player.
    state.registry.lock().await.leave(connection_id);

    // Dropping the local sink lets the writer drain and exit once the
    // seat's clone is gone as well.
    drop(sink);
    let _ = writer.await;
    let _ = conn.close().await;
    Ok(())
}
