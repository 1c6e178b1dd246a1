use crate::download::{BatchEvent, BatchReport};

/// One stdout line per batch event. Progress lines are meant to overwrite
/// each other, so they start with a carriage return and carry no newline.
pub fn describe_event(event: &BatchEvent) -> String {
    match event {
        BatchEvent::Started {
            index,
            total,
            album_id,
        } => format!("[{}/{}] {album_id}", index + 1, total),
        BatchEvent::Progress { percent, .. } => format!("\r  {percent:>3}%"),
        BatchEvent::Finished { path, .. } => format!("\n  saved {}", path.display()),
        BatchEvent::Failed {
            album_id, message, ..
        } => format!("\n  failed {album_id}: {message}"),
        BatchEvent::Cancelled { .. } => "\n  cancelled".to_owned(),
    }
}

pub fn summary_line(report: &BatchReport) -> String {
    let mut line = format!(
        "{} downloaded, {} failed",
        report.completed.len(),
        report.failed.len()
    );
    if report.cancelled {
        line.push_str(", cancelled");
    }
    line
}
