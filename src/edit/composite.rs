use std::fmt;

use crate::document::DocumentRef;
use crate::error::EditResult;

use super::{Edit, EditCore};

/// Several edits undone and redone as one step, e.g. an operation that
/// touches more than one layer.
///
/// Children are redone in insertion order and undone in reverse. The first
/// child that fails aborts the traversal and its error is returned as is:
/// children already processed are *not* rolled back, so a failure can leave
/// the document partly undone. The consistency checks are expected to catch
/// that state in debug builds.
pub struct CompositeEdit {
    core: EditCore,
    children: Vec<Box<dyn Edit>>,
}

impl CompositeEdit {
    /// Returns `None` for an empty list of children
    pub fn new(name: &str, document: &DocumentRef, children: Vec<Box<dyn Edit>>) -> Option<Self> {
        if children.is_empty() {
            log::warn!("'{}': a composite edit needs at least one child", name);
            return None;
        }
        Some(Self {
            core: EditCore::new(name, document),
            children,
        })
    }

    pub fn children(&self) -> &[Box<dyn Edit>] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl Edit for CompositeEdit {
    fn core(&self) -> &EditCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut EditCore {
        &mut self.core
    }

    fn undo(&mut self) -> EditResult {
        self.core.check_undo()?;
        let total = self.children.len();
        for (undone, child) in self.children.iter_mut().rev().enumerate() {
            if let Err(err) = child.undo() {
                log::warn!(
                    "'{}': undo stopped at '{}' after {} of {} children: {}",
                    self.core.name(),
                    child.name(),
                    undone,
                    total,
                    err
                );
                return Err(err);
            }
        }
        self.core.mark_undone();
        Ok(())
    }

    fn redo(&mut self) -> EditResult {
        self.core.check_redo()?;
        let total = self.children.len();
        for (redone, child) in self.children.iter_mut().enumerate() {
            if let Err(err) = child.redo() {
                log::warn!(
                    "'{}': redo stopped at '{}' after {} of {} children: {}",
                    self.core.name(),
                    child.name(),
                    redone,
                    total,
                    err
                );
                return Err(err);
            }
        }
        self.core.mark_redone();
        Ok(())
    }

    fn can_repeat(&self) -> bool {
        self.children.iter().all(|child| child.can_repeat())
    }

    fn is_animatable(&self) -> bool {
        self.children.iter().any(|child| child.is_animatable())
    }

    fn sub_edits(&self) -> &[Box<dyn Edit>] {
        &self.children
    }

    fn die(&mut self) {
        for child in &mut self.children {
            child.die();
        }
        self.core.die();
    }

    fn memory_size(&self) -> usize {
        self.children.iter().map(|child| child.memory_size()).sum()
    }

    fn release_snapshots(&mut self) -> usize {
        self.children
            .iter_mut()
            .map(|child| child.release_snapshots())
            .sum()
    }
}

impl fmt::Debug for CompositeEdit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeEdit")
            .field("core", &self.core)
            .field("children", &self.children)
            .finish()
    }
}
