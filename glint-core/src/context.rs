//! The mutable state threaded through one `highlight` query: cursor,
//! span emitter, and a position in the cache tree.

use std::ops::Range;

use crate::cache::CacheNode;
use crate::input::{Cursor, Input};
use crate::span::{EmitterSavePoint, Span, SpanEmitter, StyleTag};

/// Everything a matcher must restore on backtracking failure. Opaque to
/// matchers; produced by [`ParseContext::save`] and consumed by
/// [`ParseContext::restore`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct SavePoint {
    offset: usize,
    emitter: EmitterSavePoint,
}

/// Couples the cursor, span emitter, viewport and cache-tree position for a
/// single query. Does not outlive the `highlight` call that owns it.
///
/// `'a` is the input's lifetime; `'c` is the borrow of the `Cache` the query
/// mutates.
pub(crate) struct ParseContext<'a, 'c, I: Input<'a>> {
    cursor: Cursor<'a, I>,
    emitter: SpanEmitter,
    window: Range<usize>,
    max_pos: usize,
    style_depth: u32,
    cache_root: &'c mut CacheNode,
    path: Vec<usize>,
}

impl<'a, 'c, I: Input<'a>> ParseContext<'a, 'c, I> {
    /// The cursor and `max_pos` start at byte `0`, not `window.start`: a PEG
    /// grammar can only ever resume at a position it has actually reached,
    /// so entering mid-buffer is only valid once `skip_to_checkpoint` has
    /// fast-forwarded past a prefix the cache already vouches for (see
    /// `crate::highlight`, which calls it immediately after constructing
    /// this context and before running the root rule).
    pub fn new(input: &'a I, cache_root: &'c mut CacheNode, window: Range<usize>) -> Self {
        Self {
            cursor: Cursor::new(input, 0),
            emitter: SpanEmitter::new(window.clone()),
            window,
            max_pos: 0,
            style_depth: 0,
            cache_root,
            path: Vec::new(),
        }
    }

    pub fn peek(&self) -> u8 {
        self.cursor.peek()
    }

    pub fn advance(&mut self) {
        self.cursor.advance();
        self.max_pos = self.max_pos.max(self.cursor.offset());
    }

    pub fn offset(&self) -> usize {
        self.cursor.offset()
    }

    /// Whether the cursor has reached or passed the viewport end; queries
    /// stop advancing the tail of the root repetition once this is true.
    pub fn before_window_end(&self) -> bool {
        self.cursor.offset() < self.window.end
    }

    pub fn save(&self) -> SavePoint {
        SavePoint {
            offset: self.cursor.offset(),
            emitter: self.emitter.save(),
        }
    }

    /// Rewinds cursor and emitter to a prior save point. The offset being
    /// abandoned still counts toward `max_pos`: a matcher may have peeked
    /// past it before failing.
    pub fn restore(&mut self, save_point: SavePoint) {
        self.max_pos = self.max_pos.max(self.cursor.offset());
        self.cursor.seek(save_point.offset);
        self.emitter.restore(save_point.emitter);
    }

    pub fn change_style(&mut self, new: StyleTag) -> StyleTag {
        self.emitter.change_style(self.cursor.offset(), new)
    }

    /// Checkpointing is only legal while no enclosing `Highlight` has an
    /// in-progress run, since `skip_to_checkpoint` rewinds the cursor but
    /// not the emitter's current style and run start.
    pub fn can_checkpoint(&self) -> bool {
        self.style_depth == 0
    }

    pub fn enter_highlight(&mut self) {
        self.style_depth += 1;
    }

    pub fn leave_highlight(&mut self) {
        self.style_depth -= 1;
    }

    fn current_node_mut(&mut self) -> &mut CacheNode {
        let mut node = &mut *self.cache_root;
        for &i in &self.path {
            node = &mut node.children[i];
        }
        node
    }

    /// Descends into (creating, if absent) the child cache scope for a
    /// repetition entered at the current cursor position. Must be paired
    /// with a matching [`ParseContext::leave_scope`].
    pub fn enter_scope(&mut self) {
        let pos = self.cursor.offset();
        let max_pos = self.max_pos;
        let idx = self.current_node_mut().child_index_for(pos, max_pos);
        self.path.push(idx);
    }

    pub fn leave_scope(&mut self) {
        self.path.pop();
    }

    /// Fast-forwards the cursor to the greatest checkpoint at or before the
    /// query's viewport start, within the current scope.
    pub fn skip_to_checkpoint(&mut self) {
        let target = self.window.start;
        let checkpoint = self.current_node_mut().find_checkpoint(target);
        self.cursor.seek(checkpoint.pos);
        self.max_pos = self.max_pos.max(checkpoint.max_pos);
    }

    /// Records the current position as a resume point in the current scope.
    pub fn add_checkpoint(&mut self) {
        let pos = self.cursor.offset();
        let max_pos = self.max_pos;
        self.current_node_mut().add_checkpoint(pos, max_pos);
    }

    /// Flushes any in-progress run and returns the accumulated spans.
    pub fn finish(mut self) -> Vec<Span> {
        self.change_style(StyleTag::DEFAULT);
        self.emitter.into_spans()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use crate::input::StringInput;

    #[test]
    fn save_restore_round_trips_cursor_and_style() {
        let input = StringInput::new("abcdef");
        let mut cache = Cache::new();
        let mut ctx = ParseContext::new(&input, cache.root_mut(), 0..6);
        ctx.advance();
        ctx.advance();
        let saved = ctx.save();
        ctx.change_style(StyleTag::KEYWORD);
        ctx.advance();
        ctx.advance();
        assert_eq!(ctx.offset(), 4);
        ctx.restore(saved);
        assert_eq!(ctx.offset(), 2);
        let spans = ctx.finish();
        assert!(spans.is_empty());
    }

    #[test]
    fn enter_scope_and_add_checkpoint_persist_in_cache() {
        let input = StringInput::new(&"x".repeat(64));
        let mut cache = Cache::new();
        {
            let mut ctx = ParseContext::new(&input, cache.root_mut(), 0..64);
            ctx.enter_scope();
            for _ in 0..20 {
                ctx.advance();
            }
            ctx.add_checkpoint();
            ctx.leave_scope();
            ctx.finish();
        }
        assert_eq!(cache.root().children.len(), 1);
        assert_eq!(cache.root().children[0].last_checkpoint().pos, 20);
    }

    #[test]
    fn can_checkpoint_tracks_highlight_depth() {
        let input = StringInput::new("abc");
        let mut cache = Cache::new();
        let mut ctx = ParseContext::new(&input, cache.root_mut(), 0..3);
        assert!(ctx.can_checkpoint());
        ctx.enter_highlight();
        assert!(!ctx.can_checkpoint());
        ctx.enter_highlight();
        ctx.leave_highlight();
        assert!(!ctx.can_checkpoint());
        ctx.leave_highlight();
        assert!(ctx.can_checkpoint());
    }
}
