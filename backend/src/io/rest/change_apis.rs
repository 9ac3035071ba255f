//! Server-Sent Events stream of row changes.
//!
//! Each event is one JSON-encoded `ChangeEvent`. Only changes belonging to
//! the calling user are sent, optionally narrowed to a single table with
//! `?table=`.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
};
use futures_core::Stream;
use serde::Deserialize;
use shared::{ChangeEvent, Table};
use tokio::sync::broadcast;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::StreamExt;
use tracing::{info, warn};

use super::user::UserId;
use crate::storage::Connection;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ChangeStreamQuery {
    pub table: Option<String>,
}

pub async fn stream_changes(
    State(state): State<AppState>,
    UserId(user_id): UserId,
    Query(query): Query<ChangeStreamQuery>,
) -> Response {
    info!("GET /api/changes - user: {}, table: {:?}", user_id, query.table);

    let table = match query.table.as_deref().map(str::parse::<Table>).transpose() {
        Ok(table) => table,
        Err(message) => return (StatusCode::BAD_REQUEST, message).into_response(),
    };

    let stream = user_changes(state.connection.subscribe(), user_id, table);
    Sse::new(stream)
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(15)).text("ping"))
        .into_response()
}

/// Filter the raw feed down to one user's events, encoded as SSE frames
fn user_changes(
    receiver: broadcast::Receiver<ChangeEvent>,
    user_id: String,
    table: Option<Table>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(receiver).filter_map(move |result| match result {
        Ok(event) => {
            let wanted = match table {
                Some(table) => event.matches(&user_id, table),
                None => event.user_id == user_id,
            };
            if !wanted {
                return None;
            }
            serde_json::to_string(&event)
                .ok()
                .map(|data| Ok(Event::default().event(event.event_type.as_str()).data(data)))
        }
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            warn!("Change stream for user {} lagged, skipped {} events", user_id, skipped);
            None
        }
    })
}
