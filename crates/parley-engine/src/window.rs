//! Rolling-window truncation of a conversation transcript.

/// Keep only the last `window` entries, dropping the oldest.
///
/// Pure suffix truncation: it does not look at roles, so an odd cut can
/// leave an assistant turn at the front. Returns how many entries were
/// dropped.
pub fn truncate_to_window<T>(history: &mut Vec<T>, window: usize) -> usize {
    let excess = history.len().saturating_sub(window);
    if excess > 0 {
        history.drain(..excess);
    }
    excess
}
