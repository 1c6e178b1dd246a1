//! Album downloads: a single streamed file and the sequential batch runner.

mod batch;
mod cancel;
mod file;

pub use batch::{
    BatchEvent, BatchReport, BatchRequest, FailurePolicy, load_album_ids, run_batch,
};
pub use cancel::CancelToken;
pub use file::{CHUNK_SIZE, DownloadOutcome, download, filename_from_content_disposition};
