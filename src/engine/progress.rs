//! Progress counter for values received by the consumer

use kdam::{Animation, Bar, BarExt};
use std::sync::{Arc, Mutex};

pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create a counter for unknown total (shows count without percentage)
pub fn create_counter(desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " values"
    )))
}

/// Create a counter with a known total (bounded producer).
pub fn create_progress_bar(desc: &'static str, total: usize) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = total,
        desc = desc,
        animation = Animation::Classic
    )))
}

/// Update progress bar if available
/// Uses try_lock to avoid blocking the consumer if the mutex is contended
pub fn update_progress_bar(pb: &ProgressBar, n: usize) {
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Advance the bar every `chunk_size` values. `count` is the number received so far (1-based).
pub fn report_progress_batched(pb: Option<&ProgressBar>, count: usize, chunk_size: usize) {
    if let Some(pb) = pb
        && count.is_multiple_of(chunk_size)
    {
        update_progress_bar(pb, chunk_size);
    }
}

/// Final progress update for the remainder after batched updates.
pub fn flush_progress_remainder(pb: Option<&ProgressBar>, total: usize, chunk_size: usize) {
    if let Some(pb) = pb {
        let remaining = total % chunk_size;
        if remaining > 0 {
            update_progress_bar(pb, remaining);
        }
        if let Ok(mut bar) = pb.lock() {
            let _ = bar.refresh();
            eprintln!();
        }
    }
}
