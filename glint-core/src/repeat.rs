//! The incremental repetition driver: the only place a matcher reads or
//! writes the cache. Everything else in `matcher.rs` is cache-agnostic.

use crate::context::ParseContext;
use crate::input::Input;
use crate::matcher::{match_matcher, Matcher, RuleTable};

/// Runs `Repeat(body, min, max)` (`max == 0` meaning unbounded).
///
/// 1. Performs `min` mandatory iterations as ordinary backtracking
///    repetition; a failure here fails the whole repeat.
/// 2. If checkpointing is both requested (`can_checkpoint`, narrowed by
///    enclosing sequences) and currently legal (`ctx.can_checkpoint()`, i.e.
///    no enclosing `Highlight` has an in-progress run), opens a cache scope
///    for this repetition at the current position and fast-forwards the
///    cursor to the nearest prior checkpoint at or before the viewport
///    start.
/// 3. Runs the optional tail, recording a checkpoint after each successful
///    iteration, until `body` fails, `max` is reached, or the viewport end
///    is reached.
pub(crate) fn run_repeat<'a, 'c, I: Input<'a>>(
    body: &Matcher,
    min: usize,
    max: usize,
    ctx: &mut ParseContext<'a, 'c, I>,
    rules: &RuleTable,
    can_checkpoint: bool,
) -> bool {
    let entry = ctx.save();
    let mut count = 0usize;
    while count < min {
        if !match_matcher(body, ctx, rules, can_checkpoint) {
            ctx.restore(entry);
            return false;
        }
        count += 1;
    }

    let checkpointing = can_checkpoint && ctx.can_checkpoint();
    if checkpointing {
        ctx.enter_scope();
        ctx.skip_to_checkpoint();
    }

    loop {
        if max != 0 && count >= max {
            break;
        }
        if !ctx.before_window_end() {
            break;
        }
        let iteration = ctx.save();
        if !match_matcher(body, ctx, rules, can_checkpoint) {
            ctx.restore(iteration);
            break;
        }
        count += 1;
        if checkpointing {
            ctx.add_checkpoint();
        }
    }

    if checkpointing {
        ctx.leave_scope();
    }
    true
}
