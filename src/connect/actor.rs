//! Background track-list loader.
//!
//! The loader owns a clone of the session, fetches the track list once and
//! reports the outcome as a single message.

use crate::connect::Session;
use crate::connect::models::convert;
use crate::domain::DisplayRow;

use tokio::sync::mpsc;

#[derive(Debug)]
pub enum TrackListEvent {
    Loaded { rows: Vec<DisplayRow> },
    Failed { message: String },
}

async fn emit_error<E: std::fmt::Display>(
    tx_evt: &mpsc::Sender<TrackListEvent>,
    ctx: &'static str,
    err: E,
) {
    tracing::warn!(ctx, err = %err, "track loader failed");
    let _ = tx_evt
        .send(TrackListEvent::Failed {
            message: err.to_string(),
        })
        .await;
}

/// Spawns the loader and returns the receiving end of its completion
/// channel. Runs on the current tokio runtime when there is one, otherwise on
/// a dedicated thread.
pub fn spawn_track_loader(mut session: Session) -> mpsc::Receiver<TrackListEvent> {
    let (tx_evt, rx_evt) = mpsc::channel::<TrackListEvent>(1);

    let run = async move {
        match session.list_tracks().await {
            Ok(tracks) => {
                let rows = convert::to_display_rows(&tracks);
                tracing::debug!(rows = rows.len(), "track table ready");
                let _ = tx_evt.send(TrackListEvent::Loaded { rows }).await;
            }
            Err(e) => emit_error(&tx_evt, "ListTracks", e).await,
        }
    };

    if tokio::runtime::Handle::try_current().is_ok() {
        tokio::spawn(run);
    } else {
        std::thread::spawn(move || match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(run),
            Err(e) => tracing::error!(err = %e, "failed to start loader runtime"),
        });
    }

    rx_evt
}
