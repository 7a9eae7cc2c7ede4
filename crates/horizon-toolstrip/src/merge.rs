//! Merging one strip's items into another, and undoing it.
//!
//! A merge walks the source's items and splices each into the target
//! according to its [`MergeAction`]. Every move is logged as a
//! [`MergeHistoryItem`]; the log for one source becomes a
//! [`MergeHistoryRecord`] on the target's history stack. Reverting pops
//! records newest-first and replays their items in reverse.

use horizon_toolstrip_core::PerfSpan;
use horizon_toolstrip_core::logging::{span_names, targets};

use crate::error::{Result, ToolStripError};
use crate::item::{ItemId, MergeAction};
use crate::registry::ToolStripRegistry;
use crate::strip::StripId;

/// What replaying a history item does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UndoAction {
    /// Put a removed target item back at `index` of `collection`.
    Insert,
    /// Take a moved source item out of `collection` and return it to
    /// `previous_index` of `previous_collection`.
    Remove,
}

/// One reversible step of a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeHistoryItem {
    pub action: UndoAction,
    pub target: ItemId,
    pub index: usize,
    pub collection: StripId,
    pub previous_index: usize,
    pub previous_collection: Option<StripId>,
}

/// The steps of merging one source strip into a target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeHistoryRecord {
    source: StripId,
    items: Vec<MergeHistoryItem>,
}

impl MergeHistoryRecord {
    /// The strip that was merged.
    pub fn source(&self) -> StripId {
        self.source
    }

    /// Steps in the order they were taken.
    pub fn items(&self) -> &[MergeHistoryItem] {
        &self.items
    }
}

fn texts_match(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

impl ToolStripRegistry {
    /// Whether `source` may be merged into `target`.
    ///
    /// Pinned strips always may. Otherwise both must allow merging and one
    /// kind must derive from the other.
    pub fn can_merge(&self, source: StripId, target: StripId) -> bool {
        let (Some(s), Some(t)) = (self.strip(source), self.strip(target)) else {
            return false;
        };
        s.pinned_during_bulk_revert()
            || (s.allow_merge()
                && t.allow_merge()
                && (s.kind().is_assignable_from(t.kind()) || t.kind().is_assignable_from(s.kind())))
    }

    /// Merge `source` into `target`. Returns whether anything moved.
    #[tracing::instrument(skip(self), target = "horizon_toolstrip::merge", level = "trace")]
    pub fn merge(&mut self, source: StripId, target: StripId) -> Result<bool> {
        self.try_strip(source)?;
        self.try_strip(target)?;
        if source == target {
            return Err(ToolStripError::MergeTargetIdenticalToSource);
        }
        if !self.can_merge(source, target) {
            tracing::debug!(target: targets::MERGE, ?source, ?target, "strips cannot be merged");
            return Ok(false);
        }
        let _perf = PerfSpan::new(span_names::MERGE);

        let mut history = Vec::new();
        self.merge_collection(source, target, &mut history);
        if history.is_empty() {
            return Ok(false);
        }

        tracing::debug!(target: targets::MERGE, ?source, ?target, steps = history.len(), "merged");
        let record = MergeHistoryRecord {
            source,
            items: history,
        };
        self.try_strip_mut(target)?.merge_history.push(record);
        Ok(true)
    }

    /// Merge every item of `from` into `into`.
    ///
    /// Merged items leave `from`, so the cursor only advances past items
    /// that stayed behind.
    fn merge_collection(&mut self, from: StripId, into: StripId, history: &mut Vec<MergeHistoryItem>) {
        let original = self.item_count(from);
        let mut remaining = original;
        let mut cursor = 0;
        for _ in 0..original {
            let Some(&item) = self.items(from).get(cursor) else {
                break;
            };
            self.merge_recursive(item, into, history);
            let now = self.item_count(from);
            if now >= remaining {
                cursor += 1;
            }
            remaining = now;
        }
    }

    fn merge_recursive(&mut self, source: ItemId, destination: StripId, history: &mut Vec<MergeHistoryItem>) {
        let Some(action) = self.item(source).map(|i| i.merge_action()) else {
            return;
        };
        match action {
            MergeAction::MatchOnly => {
                if let Some(found) = self.find_match(source, destination)
                    && let Some(source_children) = self.drop_down_of(source)
                    && let Some(destination_children) = self.drop_down_of(found)
                    && self.item_count(source_children) > 0
                {
                    self.merge_collection(source_children, destination_children, history);
                }
            }
            MergeAction::Replace | MergeAction::Remove => {
                let Some(found) = self.find_match(source, destination) else {
                    return;
                };
                let Some(index) = self.index_of(destination, found) else {
                    return;
                };
                if self.remove_item(found).is_err() {
                    return;
                }
                history.push(MergeHistoryItem {
                    action: UndoAction::Insert,
                    target: found,
                    index,
                    collection: destination,
                    previous_index: 0,
                    previous_collection: None,
                });
                if action == MergeAction::Replace {
                    self.move_into(source, destination, index, history);
                }
            }
            MergeAction::Insert => {
                if let Some(merge_index) = self.item(source).and_then(|i| i.merge_index()) {
                    let index = merge_index.min(self.item_count(destination));
                    self.move_into(source, destination, index, history);
                }
            }
            MergeAction::Append => {
                let index = self.item_count(destination);
                self.move_into(source, destination, index, history);
            }
        }
    }

    /// Move a source item into `destination`, logging where it came from.
    fn move_into(
        &mut self,
        source: ItemId,
        destination: StripId,
        index: usize,
        history: &mut Vec<MergeHistoryItem>,
    ) {
        let previous_collection = self.item(source).and_then(|i| i.owner());
        let previous_index = previous_collection
            .and_then(|owner| self.index_of(owner, source))
            .unwrap_or(0);
        match self.insert_item(destination, index, source) {
            Ok(index) => history.push(MergeHistoryItem {
                action: UndoAction::Remove,
                target: source,
                index,
                collection: destination,
                previous_index,
                previous_collection,
            }),
            Err(err) => {
                tracing::trace!(target: targets::MERGE, %err, "merge step skipped");
            }
        }
    }

    /// The destination item a source item pairs with.
    ///
    /// Text is compared case-insensitively; failing that, the source's merge
    /// index picks a position if it is in range.
    pub fn find_match(&self, source: ItemId, destination: StripId) -> Option<ItemId> {
        let item = self.item(source)?;
        let items = self.items(destination);
        items
            .iter()
            .copied()
            .find(|candidate| {
                self.item(*candidate)
                    .is_some_and(|c| texts_match(c.text(), item.text()))
            })
            .or_else(|| {
                item.merge_index()
                    .filter(|index| *index < items.len())
                    .map(|index| items[index])
            })
    }

    /// Revert merges recorded on `target`.
    ///
    /// With a `source`, records are popped until that source's record is
    /// undone and the records popped on the way are merged again. Without
    /// one, the whole history is undone; when `preserve_pinned` is set, the
    /// merges of pinned strips are applied again afterwards.
    ///
    /// Returns `Ok(false)` when `source` was never merged into `target`.
    #[tracing::instrument(skip(self), target = "horizon_toolstrip::merge", level = "trace")]
    pub fn revert_merge_internal(
        &mut self,
        target: StripId,
        source: Option<StripId>,
        preserve_pinned: bool,
    ) -> Result<bool> {
        self.try_strip(target)?;
        if source == Some(target) {
            return Err(ToolStripError::MergeTargetIdenticalToSource);
        }
        if let Some(source) = source
            && !self
                .try_strip(target)?
                .merge_history
                .iter()
                .any(|r| r.source == source)
        {
            return Ok(false);
        }
        let _perf = PerfSpan::new(span_names::REVERT_MERGE);

        let mut reapply = Vec::new();
        let mut reverted = false;
        let mut found = false;
        while !found {
            let Some(record) = self.try_strip_mut(target)?.merge_history.pop() else {
                break;
            };
            reverted = true;
            if Some(record.source) == source {
                found = true;
            } else if source.is_some() {
                reapply.push(record.source);
            } else if preserve_pinned
                && self
                    .strip(record.source)
                    .is_some_and(|s| s.pinned_during_bulk_revert())
            {
                reapply.push(record.source);
            }

            for step in record.items.iter().rev() {
                self.undo(step);
            }
        }

        tracing::debug!(
            target: targets::MERGE,
            ?target,
            ?source,
            reapplied = reapply.len(),
            "reverted merge"
        );
        while let Some(strip) = reapply.pop() {
            if !self.is_disposed(strip) {
                self.merge(strip, target)?;
            }
        }
        Ok(reverted)
    }

    fn undo(&mut self, step: &MergeHistoryItem) {
        let outcome = match step.action {
            UndoAction::Insert => self.insert_item(step.collection, step.index, step.target).map(|_| ()),
            UndoAction::Remove => {
                let in_collection = self
                    .item(step.target)
                    .is_some_and(|i| i.owner() == Some(step.collection));
                let removed = if in_collection {
                    self.remove_item(step.target).map(|_| ())
                } else {
                    Ok(())
                };
                match (removed, step.previous_collection) {
                    (Ok(()), Some(previous)) => self
                        .insert_item(previous, step.previous_index, step.target)
                        .map(|_| ()),
                    (outcome, _) => outcome,
                }
            }
        };
        if let Err(err) = outcome {
            tracing::trace!(target: targets::MERGE, %err, "undo step skipped");
        }
    }
}
