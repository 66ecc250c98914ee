//! Session/history coordinator
//!
//! Owns the ordered image history, the current-image pointer, and the
//! per-image box selection, and keeps them consistent with the session
//! cache without writing on every keystroke: each mutation schedules a
//! debounced save, and a new mutation inside the quiet window replaces
//! the pending timer, so a burst of edits produces one write reflecting
//! only the final state. Only the quiet window is cancellable: a save
//! that has started writing always runs to completion, and the next
//! save waits for it before touching storage.

use crate::cache::SessionCacheManager;
use crate::types::{BoundingBox, CachedImage};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Quiet window before a mutated session is written back to the cache.
pub const DEBOUNCE_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Default)]
struct SessionState {
    session_id: Option<String>,
    /// Append-order history of processed images
    history: Vec<CachedImage>,
    /// Index of the image currently shown, when any exist
    current_index: Option<usize>,
}

impl SessionState {
    /// The history entry edits apply to: the explicitly selected image,
    /// otherwise the most recently appended one.
    fn displayed_index(&self) -> Option<usize> {
        self.current_index.or_else(|| self.history.len().checked_sub(1))
    }

    fn displayed_mut(&mut self) -> Option<&mut CachedImage> {
        let index = self.displayed_index()?;
        self.history.get_mut(index)
    }
}

/// Mirrors the persisted session record in memory and triggers cache
/// writes on mutation and the cache read at startup.
///
/// `hydrate` must complete before the first mutation, so startup never
/// races a save. At most one save timer is pending at a time; an
/// explicit reset invalidates it and waits for any in-flight write
/// before wiping state.
pub struct SessionCoordinator {
    state: Arc<Mutex<SessionState>>,
    manager: Arc<SessionCacheManager>,
    debounce: Duration,
    /// Bumped on every scheduled save; a task whose generation is no
    /// longer current skips its write
    save_generation: Arc<AtomicU64>,
    /// Owned handle of the pending debounced save, if any
    pending_save: Mutex<Option<JoinHandle<()>>>,
}

impl SessionCoordinator {
    pub fn new(manager: SessionCacheManager) -> Self {
        Self::with_debounce(manager, DEBOUNCE_INTERVAL)
    }

    pub fn with_debounce(manager: SessionCacheManager, debounce: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::default())),
            manager: Arc::new(manager),
            debounce,
            save_generation: Arc::new(AtomicU64::new(0)),
            pending_save: Mutex::new(None),
        }
    }

    /// Restore state from the cache. Returns true when a session was
    /// restored; the current-image pointer lands on the most recent
    /// entry, whose saved box selection rides along in the history.
    pub async fn hydrate(&self) -> bool {
        let Some(restored) = self.manager.load().await else {
            return false;
        };
        let mut state = self.state.lock();
        state.current_index = restored.images.len().checked_sub(1);
        state.history = restored.images;
        state.session_id = Some(restored.session_id);
        debug!(images = state.history.len(), "hydrated session from cache");
        true
    }

    /// Record a successful upload+inference result. The first upload
    /// binds the coordinator to its backend session id.
    pub fn record_image(&self, session_id: &str, image: CachedImage) {
        {
            let mut state = self.state.lock();
            if state.session_id.is_none() {
                state.session_id = Some(session_id.to_string());
            }
            state.history.push(image);
            state.current_index = Some(state.history.len() - 1);
        }
        self.schedule_save();
    }

    /// Replace the displayed image's box set after an edit.
    pub fn set_boxes(&self, boxes: Vec<BoundingBox>) -> bool {
        let mutated = {
            let mut state = self.state.lock();
            match state.displayed_mut() {
                Some(image) => {
                    image.boxes = boxes;
                    // Old selection may now point past the end
                    if image.selected_box_index.is_some_and(|i| i >= image.boxes.len()) {
                        image.selected_box_index = None;
                    }
                    true
                }
                None => false,
            }
        };
        if mutated {
            self.schedule_save();
        }
        mutated
    }

    /// Mark a box on the displayed image as reviewed.
    pub fn verify_box(&self, box_index: usize, is_correct: bool) -> bool {
        let mutated = {
            let mut state = self.state.lock();
            state
                .displayed_mut()
                .and_then(|image| image.boxes.get_mut(box_index))
                .map(|b| b.verify(is_correct))
                .is_some()
        };
        if mutated {
            self.schedule_save();
        }
        mutated
    }

    /// Hand-draw a box on the displayed image (a recovered miss).
    pub fn add_manual_box(&self, bbox: BoundingBox) -> bool {
        let mutated = {
            let mut state = self.state.lock();
            match state.displayed_mut() {
                Some(image) => {
                    image.boxes.push(bbox);
                    true
                }
                None => false,
            }
        };
        if mutated {
            self.schedule_save();
        }
        mutated
    }

    /// Remove a box from the displayed image, shifting the saved
    /// selection so it keeps pointing at the same box.
    pub fn delete_box(&self, box_index: usize) -> bool {
        let mutated = {
            let mut state = self.state.lock();
            match state.displayed_mut() {
                Some(image) if box_index < image.boxes.len() => {
                    image.boxes.remove(box_index);
                    image.selected_box_index = match image.selected_box_index {
                        Some(i) if i == box_index => None,
                        Some(i) if i > box_index => Some(i - 1),
                        other => other,
                    };
                    true
                }
                _ => false,
            }
        };
        if mutated {
            self.schedule_save();
        }
        mutated
    }

    /// Drop an image from the history entirely.
    pub fn remove_image(&self, index: usize) -> bool {
        let mutated = {
            let mut state = self.state.lock();
            if index >= state.history.len() {
                false
            } else {
                state.history.remove(index);
                state.current_index = match state.current_index {
                    _ if state.history.is_empty() => None,
                    Some(i) if i > index => Some(i - 1),
                    Some(i) if i >= state.history.len() => Some(state.history.len() - 1),
                    other => other,
                };
                true
            }
        };
        if mutated {
            self.schedule_save();
        }
        mutated
    }

    /// Show a history item. Pure pointer movement, nothing to persist:
    /// on reload the pointer lands on the most recent entry regardless.
    pub fn select_image(&self, index: usize) -> bool {
        let mut state = self.state.lock();
        if index < state.history.len() {
            state.current_index = Some(index);
            true
        } else {
            false
        }
    }

    /// Change the box selection of the displayed image. Selection is
    /// save-worthy state, not transient UI state, so this schedules a
    /// write like any other mutation.
    pub fn select_box(&self, box_index: Option<usize>) -> bool {
        let mutated = {
            let mut state = self.state.lock();
            match state.displayed_mut() {
                Some(image) => match box_index {
                    Some(i) if i >= image.boxes.len() => false,
                    selection => {
                        image.selected_box_index = selection;
                        true
                    }
                },
                None => false,
            }
        };
        if mutated {
            self.schedule_save();
        }
        mutated
    }

    /// Persist now, cancelling any pending timer. Used at shutdown and
    /// wherever a deterministic write is needed.
    pub async fn flush(&self) {
        self.cancel_pending().await;
        let (session_id, images) = self.snapshot();
        if let Some(id) = session_id {
            self.manager.save(&id, &images).await;
        }
    }

    /// Drop the session everywhere: cancel the pending timer, wipe the
    /// in-memory history, and delete the record from every tier.
    pub async fn reset(&self) {
        self.cancel_pending().await;
        {
            let mut state = self.state.lock();
            *state = SessionState::default();
        }
        self.manager.clear().await;
    }

    pub fn session_id(&self) -> Option<String> {
        self.state.lock().session_id.clone()
    }

    /// Snapshot of the ordered history.
    pub fn history(&self) -> Vec<CachedImage> {
        self.state.lock().history.clone()
    }

    /// The image currently shown, if any.
    pub fn current_image(&self) -> Option<CachedImage> {
        let state = self.state.lock();
        state
            .displayed_index()
            .and_then(|i| state.history.get(i))
            .cloned()
    }

    pub fn image_count(&self) -> usize {
        self.state.lock().history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().history.is_empty()
    }

    /// Replace the pending save timer with a fresh one. Superseded
    /// timers skip their write once awake; a save that already started
    /// writing is never interrupted, the successor waits for it.
    fn schedule_save(&self) {
        let state = Arc::clone(&self.state);
        let manager = Arc::clone(&self.manager);
        let save_generation = Arc::clone(&self.save_generation);
        let generation = save_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = self.debounce;

        let mut pending = self.pending_save.lock();
        let previous = pending.take();
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The predecessor may be past its quiet window and writing;
            // wait it out so storage never sees overlapping saves.
            if let Some(handle) = previous {
                let _ = handle.await;
            }
            if save_generation.load(Ordering::SeqCst) != generation {
                return;
            }
            let (session_id, images) = {
                let state = state.lock();
                (state.session_id.clone(), state.history.clone())
            };
            if let Some(id) = session_id {
                manager.save(&id, &images).await;
            }
        }));
    }

    /// Invalidate the pending timer and wait until its task has fully
    /// finished, so whatever follows cannot interleave with a write.
    async fn cancel_pending(&self) {
        self.save_generation.fetch_add(1, Ordering::SeqCst);
        let handle = self.pending_save.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    fn snapshot(&self) -> (Option<String>, Vec<CachedImage>) {
        let state = self.state.lock();
        (state.session_id.clone(), state.history.clone())
    }
}
