// src/services/selection.rs
//! Text-selection capture for the "Ask AI" affordance.

use tokio::sync::watch;
use tracing::debug;

/// Shortest trimmed selection, in characters, that activates the affordance.
pub const MIN_SELECTION_CHARS: usize = 5;

/// Viewport-relative bounding box of a selection range.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub bottom: f64,
    pub width: f64,
}

/// Where to anchor the affordance, in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectionPosition {
    pub top: f64,
    pub left: f64,
    pub width: f64,
}

/// `position` is `Some` exactly when `is_selected` is true.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionState {
    pub text: String,
    pub position: Option<SelectionPosition>,
    pub is_selected: bool,
}

impl SelectionState {
    pub fn none() -> Self {
        Self::default()
    }

    /// Recompute from scratch; the result depends only on the arguments.
    pub fn observe(raw_text: &str, range: Option<Rect>, scroll: (f64, f64)) -> Self {
        let text = raw_text.trim();
        if text.chars().count() < MIN_SELECTION_CHARS {
            return Self::none();
        }
        let Some(rect) = range else {
            return Self::none();
        };

        let (scroll_x, scroll_y) = scroll;
        Self {
            text: text.to_string(),
            position: Some(SelectionPosition {
                top: rect.bottom + scroll_y,
                left: rect.left + scroll_x + rect.width / 2.0,
                width: rect.width,
            }),
            is_selected: true,
        }
    }
}

/// The document's selection, abstracted away from any rendering engine.
pub trait SelectionSource {
    /// Current selection text, untrimmed.
    fn selected_text(&self) -> String;

    /// Bounding box of the first range, `None` when there are no ranges.
    fn first_range_rect(&self) -> Option<Rect>;

    /// Horizontal and vertical scroll offset of the document.
    fn scroll_offset(&self) -> (f64, f64);

    /// Drop every range from the selection.
    fn remove_all_ranges(&mut self);
}

pub struct SelectionTracker {
    tx: watch::Sender<SelectionState>,
}

impl Default for SelectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SelectionState::none());
        Self { tx }
    }

    pub fn current(&self) -> SelectionState {
        self.tx.borrow().clone()
    }

    /// Stream of states; a receiver wakes only when the state changes.
    pub fn subscribe(&self) -> watch::Receiver<SelectionState> {
        self.tx.subscribe()
    }

    /// Handle a pointer-up or selection-change event.
    pub fn on_selection_event<S: SelectionSource + ?Sized>(&self, source: &S) -> SelectionState {
        let next = SelectionState::observe(
            &source.selected_text(),
            source.first_range_rect(),
            source.scroll_offset(),
        );
        self.publish(next)
    }

    /// Force `none-selected` and empty the underlying selection.
    pub fn clear_selection<S: SelectionSource + ?Sized>(&self, source: &mut S) {
        source.remove_all_ranges();
        self.publish(SelectionState::none());
    }

    /// Whether the "Ask AI" affordance should be visible.
    pub fn affordance_visible(&self) -> bool {
        self.tx.borrow().is_selected
    }

    /// Copy of the selected text at activation time, if anything is selected.
    pub fn snapshot(&self) -> Option<String> {
        let state = self.tx.borrow();
        state.is_selected.then(|| state.text.clone())
    }

    fn publish(&self, next: SelectionState) -> SelectionState {
        let changed = self.tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next.clone();
                true
            }
        });
        if changed {
            debug!(selected = next.is_selected, len = next.text.len(), "selection changed");
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_selection_is_not_selected() {
        let state = SelectionState::observe("  abcd ", Some(Rect::default()), (0.0, 0.0));
        assert_eq!(state, SelectionState::none());
    }

    #[test]
    fn threshold_counts_characters_not_bytes() {
        let state = SelectionState::observe("ééééé", Some(Rect::default()), (0.0, 0.0));
        assert!(state.is_selected);
    }

    #[test]
    fn position_is_centered_below_range_with_scroll() {
        let rect = Rect {
            left: 100.0,
            bottom: 40.0,
            width: 60.0,
        };
        let state = SelectionState::observe(" balance control ", Some(rect), (5.0, 200.0));
        assert_eq!(state.text, "balance control");
        assert_eq!(
            state.position,
            Some(SelectionPosition {
                top: 240.0,
                left: 135.0,
                width: 60.0
            })
        );
    }

    #[test]
    fn no_range_means_not_selected() {
        let state = SelectionState::observe("long enough", None, (0.0, 0.0));
        assert!(!state.is_selected);
        assert!(state.position.is_none());
    }
}
