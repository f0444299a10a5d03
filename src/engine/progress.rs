//! Progress counter for the persister (verbose mode only)

use kdam::{Animation, Bar, BarExt};

/// Counter for an unknown total: the walk's path count is only known once it finishes.
pub fn create_counter(desc: &'static str) -> Bar {
    kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " thumbnails"
    )
}

/// Call after each item with the running total; the display moves every `chunk_size` items.
pub fn report_progress_batched(bar: &mut Option<Bar>, done: usize, chunk_size: usize) {
    if let Some(bar) = bar
        && done.is_multiple_of(chunk_size)
    {
        let _ = bar.update(chunk_size);
    }
}

/// Push the remainder after batched updates and leave the line.
pub fn finish_counter(bar: Option<Bar>, done: usize, chunk_size: usize) {
    if let Some(mut bar) = bar {
        let remaining = done % chunk_size;
        if remaining > 0 {
            let _ = bar.update(remaining);
        }
        let _ = bar.refresh();
        eprintln!();
    }
}
