use image::RgbaImage;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use super::debug::{EditDebugInfo, HistoryDebugInfo};
use super::manager::{AddOutcome, UndoManager};
use crate::config::HistoryConfig;
use crate::consistency;
use crate::document::{Document, DocumentRef};
use crate::edit::{Edit, FadeableEdit, PartialImageEdit};
use crate::event::{EditBus, EditListener, LogMessages, UserMessages};
use crate::geometry::PixelRect;
use crate::layer::LayerId;

/// Handle through which the rest of the application reaches the history.
/// Holding the lock for a whole add, undo or redo keeps each of them atomic.
pub type SharedHistory = Arc<Mutex<HistoryService>>;

/// Entry point for recording edits and moving through them.
///
/// Besides the [`UndoManager`] it tracks how many edits were undone since the
/// last fresh edit, which decides whether "Fade" and "Repeat" are offered,
/// and whether edits are currently ignored (e.g. while replaying a batch).
pub struct HistoryService {
    manager: UndoManager,
    bus: EditBus,
    messages: Box<dyn UserMessages>,
    num_undone_edits: usize,
    ignore_edits: bool,
    config: HistoryConfig,
}

impl HistoryService {
    pub fn new(config: HistoryConfig) -> Self {
        log::info!("History initialized with {} undo levels", config.undo_levels);
        let manager = UndoManager::new(config.undo_levels);
        let config = HistoryConfig {
            undo_levels: manager.limit(),
            ..config
        };
        Self {
            manager,
            bus: EditBus::new(),
            messages: Box::new(LogMessages),
            num_undone_edits: 0,
            ignore_edits: false,
            config,
        }
    }

    /// Replaces the sink for messages shown to the user
    pub fn with_messages(mut self, messages: Box<dyn UserMessages>) -> Self {
        self.messages = messages;
        self
    }

    pub fn into_shared(self) -> SharedHistory {
        Arc::new(Mutex::new(self))
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    pub fn manager(&self) -> &UndoManager {
        &self.manager
    }

    pub fn add_listener(&mut self, listener: Box<dyn EditListener>) {
        self.bus.subscribe(listener);
    }

    /// Tells the listeners about an edit without recording it
    pub fn notify_menus(&mut self, edit: Option<&dyn Edit>) {
        self.bus.post(edit);
    }

    /// Records an edit whose change has already been applied.
    ///
    /// An edit that cannot be undone wipes the whole history instead, since
    /// replaying older edits would no longer rebuild a consistent state.
    pub fn add_edit(&mut self, edit: Box<dyn Edit>) {
        if self.ignore_edits {
            log::trace!("Ignoring '{}'", edit.name());
            return;
        }

        let document = edit.document().clone();
        let name = edit.name().to_string();
        document.write().set_dirty(true);

        let outcome = self.manager.add_edit(edit);

        // reset before posting, so that the fade menu item can become enabled
        self.num_undone_edits = 0;
        match outcome {
            AddOutcome::Recorded { evicted } => {
                if evicted > 0 {
                    log::debug!("'{}' pushed {} old edits out of the history", name, evicted);
                }
                self.bus.post(self.manager.last_edit());
            }
            AddOutcome::HistoryDiscarded(edit) => {
                self.bus.post(Some(edit.as_ref()));
            }
        }

        if let Some(budget) = self.config.snapshot_memory_budget {
            self.manager.trim_snapshot_memory(budget);
        }

        if self.config.consistency_checks {
            let doc = document.read();
            if let Err(err) = consistency::check_all(&doc, &self.manager) {
                panic!("Consistency check failed after adding '{}': {}", name, err);
            }
        }
    }

    /// Records only the area a tool changed, see [`PartialImageEdit::create`].
    /// Returns false if the area was outside the layer and nothing was added.
    pub fn add_tool_area(
        &mut self,
        rect: PixelRect,
        original: &RgbaImage,
        document: &DocumentRef,
        layer: LayerId,
        relative_to_image: bool,
        tool_name: &str,
    ) -> bool {
        match PartialImageEdit::create(tool_name, rect, original, document, layer, relative_to_image) {
            Some(edit) => {
                self.add_edit(Box::new(edit));
                true
            }
            None => false,
        }
    }

    /// Undoes the last done edit. A failure is reported to the user and
    /// never propagated; returns whether anything was undone.
    ///
    /// The undone counter goes up even when the undo fails. After undoing
    /// everything, one more undo and then a redo of the same edits leave
    /// the counter at one while the cursor is back at the newest edit, so
    /// fade and repeat stay blocked until the next added edit.
    pub fn undo(&mut self) -> bool {
        if let Some(edit) = self.manager.edit_to_be_undone() {
            log::debug!("History: undo '{}'", edit.name());
        }

        // counted before the undo, so that its result is not fadeable
        self.num_undone_edits += 1;
        match self.manager.undo() {
            Ok(()) => true,
            Err(err) => {
                log::debug!("Undo failed: {}", err);
                self.messages.show_info(
                    "No undo available",
                    "No undo available, probably because the undo image was discarded in order to save memory",
                );
                false
            }
        }
    }

    /// Redoes the next undone edit. A failure is reported to the user as an
    /// error and never propagated; returns whether anything was redone.
    pub fn redo(&mut self) -> bool {
        if let Some(edit) = self.manager.edit_to_be_redone() {
            log::debug!("History: redo '{}'", edit.name());
        }

        // after a redo we should be fadeable again
        self.num_undone_edits = self.num_undone_edits.saturating_sub(1);
        match self.manager.redo() {
            Ok(()) => true,
            Err(err) => {
                log::error!("Redo failed: {}", err);
                self.messages.show_error(&err);
                false
            }
        }
    }

    pub fn can_undo(&self) -> bool {
        self.manager.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.manager.can_redo()
    }

    pub fn undo_presentation_name(&self) -> String {
        self.manager.undo_presentation_name()
    }

    pub fn redo_presentation_name(&self) -> String {
        self.manager.redo_presentation_name()
    }

    pub fn set_undo_levels(&mut self, undo_levels: usize) {
        self.manager.set_limit(undo_levels);
        self.config.undo_levels = self.manager.limit();
    }

    pub fn undo_levels(&self) -> usize {
        self.manager.limit()
    }

    /// Whether "Repeat <last edit>" can be offered
    pub fn can_repeat_operation(&self) -> bool {
        if self.num_undone_edits > 0 {
            return false;
        }
        self.manager
            .last_edit()
            .is_some_and(|edit| edit.can_repeat())
    }

    /// Name used for the fade and repeat menu items, empty without edits
    pub fn last_edit_name(&self) -> String {
        self.manager
            .last_edit()
            .map(|edit| edit.name().to_string())
            .unwrap_or_default()
    }

    pub fn last_edit(&self) -> Option<&dyn Edit> {
        self.manager.last_edit()
    }

    /// The last edit, if it is a fadeable edit of `layer` and nothing was
    /// undone since it was recorded
    pub fn previous_edit_for_fade(&self, layer: LayerId) -> Option<&dyn FadeableEdit> {
        if self.num_undone_edits > 0 {
            return None;
        }
        let fadeable = self.manager.last_edit()?.as_fadeable()?;
        if !fadeable.is_fadeable() {
            return None;
        }
        // the active layer may have changed since the edit, e.g. by
        // switching to another layer
        if fadeable.fading_layer() != layer {
            return None;
        }
        Some(fadeable)
    }

    pub fn can_fade(&self, layer: LayerId) -> bool {
        self.previous_edit_for_fade(layer).is_some()
    }

    /// Fade check against the active drawable of a document
    pub fn can_fade_active(&self, doc: &Document) -> bool {
        doc.active_drawable()
            .is_some_and(|layer| self.can_fade(layer))
    }

    /// Blends the last edit of `layer` with its pre-edit pixels. Returns
    /// false if fading is not possible.
    pub fn fade_previous_edit(&mut self, layer: LayerId, opacity: f32) -> bool {
        if !self.can_fade(layer) {
            return false;
        }
        let Some(edit) = self
            .manager
            .last_edit_mut()
            .and_then(|edit| edit.as_fadeable_mut())
        else {
            return false;
        };
        match edit.fade(opacity) {
            Ok(()) => true,
            Err(err) => {
                log::debug!("Fade failed: {}", err);
                self.messages.show_info("Fade not available", &err.to_string());
                false
            }
        }
    }

    /// Forgets everything once no document is open any more
    pub fn on_all_images_closed(&mut self) {
        self.num_undone_edits = 0;
        self.manager.discard_all_edits();
        self.bus.post(None);
    }

    pub fn clear(&mut self) {
        self.manager.discard_all_edits();
        self.assert_num_edits_is(0);
    }

    /// Returns to the freshly initialized state, for test isolation
    pub fn reset(&mut self) {
        self.clear();
        self.num_undone_edits = 0;
        self.ignore_edits = false;
    }

    /// While set, added edits are dropped without being recorded
    pub fn set_ignore_edits(&mut self, ignore_edits: bool) {
        self.ignore_edits = ignore_edits;
    }

    pub fn is_ignoring_edits(&self) -> bool {
        self.ignore_edits
    }

    pub fn num_edits(&self) -> usize {
        self.manager.len()
    }

    pub fn num_undone_edits(&self) -> usize {
        self.num_undone_edits
    }

    pub fn edit_names(&self) -> Vec<String> {
        self.manager.edit_names()
    }

    pub fn debug_info(&self) -> HistoryDebugInfo {
        let fade_layer = self
            .manager
            .last_edit()
            .and_then(|edit| edit.as_fadeable())
            .map(|fadeable| fadeable.fading_layer())
            .filter(|layer| self.can_fade(*layer));

        HistoryDebugInfo {
            num_edits: self.manager.len(),
            edits: self
                .manager
                .edits()
                .map(|edit| EditDebugInfo::from_edit(edit))
                .collect(),
            cursor: self.manager.cursor(),
            limit: self.manager.limit(),
            num_undone_edits: self.num_undone_edits,
            ignore_edits: self.ignore_edits,
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            can_repeat: self.can_repeat_operation(),
            fade_layer,
            memory_size: self.manager.memory_size(),
        }
    }

    /// Logs the state of the history and returns it as JSON
    pub fn dump(&self) -> String {
        let dump = self.debug_info().to_json();
        log::info!("History:\n{}", dump);
        dump
    }

    /// Panics unless the history holds exactly `expected` edits.
    /// Meant for tests.
    pub fn assert_num_edits_is(&self, expected: usize) {
        let num_edits = self.manager.len();
        if num_edits != expected {
            panic!("Expected {} edits, but found {}", expected, num_edits);
        }
    }

    /// Meant for tests
    pub fn assert_last_edit_name_is(&self, expected: &str) {
        let last_edit_name = self.last_edit_name();
        if last_edit_name != expected {
            panic!(
                "Expected '{}' as the last edit name, but found '{}'",
                expected, last_edit_name
            );
        }
    }

    /// Meant for tests
    pub fn assert_edit_to_be_undone_name_is(&self, expected: &str) {
        match self.manager.edit_to_be_undone() {
            None => panic!("there is no edit to be undone, expected {}", expected),
            Some(edit) if edit.name() != expected => {
                panic!("Expected '{}', found '{}'", expected, edit.name())
            }
            Some(_) => {}
        }
    }

    /// Meant for tests
    pub fn assert_edit_to_be_redone_name_is(&self, expected: &str) {
        match self.manager.edit_to_be_redone() {
            None => panic!("there is no edit to be redone, expected {}", expected),
            Some(edit) if edit.name() != expected => {
                panic!("Expected '{}', found '{}'", expected, edit.name())
            }
            Some(_) => {}
        }
    }

    /// Undo that first checks which edit is about to be undone
    pub fn undo_named(&mut self, edit_name: &str) -> bool {
        self.assert_edit_to_be_undone_name_is(edit_name);
        self.undo()
    }

    /// Redo that first checks which edit is about to be redone
    pub fn redo_named(&mut self, edit_name: &str) -> bool {
        self.assert_edit_to_be_redone_name_is(edit_name);
        self.redo()
    }
}

impl Default for HistoryService {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl fmt::Debug for HistoryService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HistoryService")
            .field("manager", &self.manager)
            .field("bus", &self.bus)
            .field("num_undone_edits", &self.num_undone_edits)
            .field("ignore_edits", &self.ignore_edits)
            .field("config", &self.config)
            .finish()
    }
}
