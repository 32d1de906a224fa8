//! Server-sent render events

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use crate::state::AppState;

/// Handle GET /events - Stream render events to a renderer.
///
/// A renderer that falls behind gets a `resync` event and should re-read
/// `/state`.
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Renderer subscribed to events");
    let receiver = state.subscribe();

    let events = stream::unfold(receiver, |mut receiver| async move {
        let event = match receiver.recv().await {
            Ok(event) => Event::default()
                .event(event.name())
                .json_data(&event)
                .unwrap_or_else(|e| {
                    warn!("Failed to encode render event: {}", e);
                    Event::default().event("resync").data("{}")
                }),
            Err(RecvError::Lagged(skipped)) => {
                warn!("Renderer lagged behind by {} events", skipped);
                Event::default().event("resync").data("{}")
            }
            Err(RecvError::Closed) => return None,
        };
        Some((Ok::<_, Infallible>(event), receiver))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
