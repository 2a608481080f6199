//! The grammar: a closed set of matcher variants dispatched by a single
//! `match_matcher` function, rather than a trait-object hierarchy. Matchers
//! are plain, immutable data; the only fallible construction is `repeat`,
//! which statically rejects an unbounded repetition whose body can never
//! fail to consume nothing.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::context::ParseContext;
use crate::input::Input;
use crate::span::StyleTag;

/// A `Language`'s named-rule table, consulted by `Reference`.
pub type RuleTable = HashMap<Box<str>, Matcher>;

#[derive(Debug, thiserror::Error)]
pub enum GrammarError {
    #[error("an unbounded repeat's body always succeeds, which would loop forever")]
    AlwaysSucceedsInRepeat,
}

/// The lazily-built body of a [`Matcher::Recursive`] node. Built once, on
/// first match, from a builder closure given a handle back to this same
/// node (so the returned body can refer to itself).
pub struct RecursiveRule {
    cell: OnceCell<Matcher>,
    builder: Box<dyn Fn(Matcher) -> Matcher + Send + Sync>,
    this: std::sync::Weak<RecursiveRule>,
}

impl RecursiveRule {
    fn resolve(&self) -> &Matcher {
        self.cell.get_or_init(|| {
            let handle = Matcher::Recursive(
                self.this
                    .upgrade()
                    .expect("RecursiveRule outlives its own Arc while resolving"),
            );
            (self.builder)(handle)
        })
    }
}

impl fmt::Debug for RecursiveRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecursiveRule")
            .field("resolved", &self.cell.get().is_some())
            .finish()
    }
}

/// One node of the grammar tree. Every variant shares the same contract:
/// success leaves the cursor and emitter at the reached position, failure
/// restores them to the entry state.
#[derive(Debug, Clone)]
pub enum Matcher {
    AnyByte,
    Byte(u8),
    Range(u8, u8),
    Literal(Box<[u8]>),
    /// Children, plus whether the whole sequence always succeeds.
    Sequence(Box<[Matcher]>, bool, Box<[bool]>),
    /// Children, plus whether at least one always succeeds.
    Choice(Box<[Matcher]>, bool),
    Repeat {
        body: Box<Matcher>,
        min: usize,
        /// 0 means unbounded.
        max: usize,
    },
    And(Box<Matcher>),
    Not(Box<Matcher>),
    Highlight(StyleTag, Box<Matcher>),
    Reference(Arc<str>),
    Recursive(Arc<RecursiveRule>),
}

impl Matcher {
    /// Statically known to never fail. Computed once here (not per call)
    /// since the tree is a closed set of variants rather than a
    /// monomorphized generic tree.
    pub(crate) fn always_succeeds(&self) -> bool {
        match self {
            Matcher::AnyByte | Matcher::Byte(_) | Matcher::Range(_, _) => false,
            Matcher::Literal(bytes) => bytes.is_empty(),
            Matcher::Sequence(_, always, _) => *always,
            Matcher::Choice(_, always) => *always,
            Matcher::Repeat { min, .. } => *min == 0,
            Matcher::And(body) => body.always_succeeds(),
            Matcher::Not(_) => false,
            Matcher::Highlight(_, body) => body.always_succeeds(),
            // Unresolvable without following the reference/fixed point;
            // conservatively assume failure is possible.
            Matcher::Reference(_) | Matcher::Recursive(_) => false,
        }
    }
}

/// Runs `m` against `ctx`, resolving named rules through `rules`.
///
/// `can_checkpoint` is threaded down from the root and narrowed by
/// `Sequence` whenever a later sibling isn't statically guaranteed to
/// succeed: a `Repeat` under a sequence position whose tail could still
/// fail must not record checkpoints, since that partial match could yet be
/// undone by the sequence's own restore.
pub(crate) fn match_matcher<'a, 'c, I: Input<'a>>(
    m: &Matcher,
    ctx: &mut ParseContext<'a, 'c, I>,
    rules: &RuleTable,
    can_checkpoint: bool,
) -> bool {
    match m {
        Matcher::AnyByte => {
            if ctx.peek() == 0 {
                return false;
            }
            ctx.advance();
            true
        }
        Matcher::Byte(b) => {
            if ctx.peek() != *b {
                return false;
            }
            ctx.advance();
            true
        }
        Matcher::Range(lo, hi) => {
            let byte = ctx.peek();
            if byte == 0 || byte < *lo || byte > *hi {
                return false;
            }
            ctx.advance();
            true
        }
        Matcher::Literal(bytes) => {
            if bytes.is_empty() {
                return true;
            }
            let save = ctx.save();
            for &b in bytes.iter() {
                if ctx.peek() != b {
                    ctx.restore(save);
                    return false;
                }
                ctx.advance();
            }
            true
        }
        Matcher::Sequence(children, _, suffix_always_succeeds) => {
            let save = ctx.save();
            for (i, child) in children.iter().enumerate() {
                let child_can_checkpoint = can_checkpoint && suffix_always_succeeds[i];
                if !match_matcher(child, ctx, rules, child_can_checkpoint) {
                    ctx.restore(save);
                    return false;
                }
            }
            true
        }
        Matcher::Choice(children, _) => {
            for child in children.iter() {
                let save = ctx.save();
                if match_matcher(child, ctx, rules, can_checkpoint) {
                    return true;
                }
                ctx.restore(save);
            }
            false
        }
        Matcher::Repeat { body, min, max } => {
            crate::repeat::run_repeat(body, *min, *max, ctx, rules, can_checkpoint)
        }
        Matcher::And(body) => {
            let save = ctx.save();
            let ok = match_matcher(body, ctx, rules, false);
            ctx.restore(save);
            ok
        }
        Matcher::Not(body) => {
            let save = ctx.save();
            let ok = match_matcher(body, ctx, rules, false);
            ctx.restore(save);
            !ok
        }
        Matcher::Highlight(tag, body) => {
            let save = ctx.save();
            let old = ctx.change_style(*tag);
            ctx.enter_highlight();
            let ok = match_matcher(body, ctx, rules, can_checkpoint);
            ctx.leave_highlight();
            if ok {
                ctx.change_style(old);
                true
            } else {
                ctx.restore(save);
                false
            }
        }
        Matcher::Reference(name) => match rules.get(&**name) {
            Some(resolved) => match_matcher(resolved, ctx, rules, can_checkpoint),
            None => false,
        },
        Matcher::Recursive(rule) => match_matcher(rule.resolve(), ctx, rules, can_checkpoint),
    }
}

pub fn any_byte() -> Matcher {
    Matcher::AnyByte
}

pub fn byte(b: u8) -> Matcher {
    Matcher::Byte(b)
}

pub fn range(lo: u8, hi: u8) -> Matcher {
    Matcher::Range(lo, hi)
}

pub fn literal(s: impl AsRef<[u8]>) -> Matcher {
    Matcher::Literal(s.as_ref().into())
}

fn suffix_always_succeeds(children: &[Matcher]) -> Box<[bool]> {
    let mut out = vec![true; children.len()];
    let mut acc = true;
    for i in (0..children.len()).rev() {
        out[i] = acc;
        acc = acc && children[i].always_succeeds();
    }
    out
}

pub fn sequence(children: impl IntoIterator<Item = Matcher>) -> Matcher {
    let children: Vec<Matcher> = children.into_iter().collect();
    let always = children.iter().all(Matcher::always_succeeds);
    let suffix = suffix_always_succeeds(&children);
    Matcher::Sequence(children.into_boxed_slice(), always, suffix)
}

pub fn choice(children: impl IntoIterator<Item = Matcher>) -> Matcher {
    let children: Vec<Matcher> = children.into_iter().collect();
    let always = children.iter().any(Matcher::always_succeeds);
    Matcher::Choice(children.into_boxed_slice(), always)
}

/// Builds `Repeat(body, min, max)`, `max == 0` meaning unbounded. Rejects
/// an unbounded repeat whose body is statically known to always succeed,
/// since such a grammar would loop forever without consuming input.
pub fn repeat(body: Matcher, min: usize, max: usize) -> Result<Matcher, GrammarError> {
    if max == 0 && body.always_succeeds() {
        return Err(GrammarError::AlwaysSucceedsInRepeat);
    }
    Ok(Matcher::Repeat {
        body: Box::new(body),
        min,
        max,
    })
}

/// `Repeat(body, 0, 1)`. Bounded, so unlike [`repeat`] this never fails to
/// construct even if `body` always succeeds.
pub fn optional(body: Matcher) -> Matcher {
    Matcher::Repeat {
        body: Box::new(body),
        min: 0,
        max: 1,
    }
}

/// `Repeat(body, 0, 0)` (unbounded). Convenience for the common
/// zero-or-more case; panics only if `body` is a static always-succeeds
/// matcher, which would be a grammar-authoring bug.
pub fn zero_or_more(body: Matcher) -> Matcher {
    repeat(body, 0, 0).expect("zero_or_more body must be able to fail")
}

/// `Sequence(body, Repeat(body, 0, 0))`.
pub fn one_or_more(body: Matcher) -> Matcher {
    sequence([body.clone(), zero_or_more(body)])
}

pub fn and(body: Matcher) -> Matcher {
    Matcher::And(Box::new(body))
}

pub fn not(body: Matcher) -> Matcher {
    Matcher::Not(Box::new(body))
}

pub fn highlight(tag: StyleTag, body: Matcher) -> Matcher {
    Matcher::Highlight(tag, Box::new(body))
}

pub fn reference(name: impl Into<Arc<str>>) -> Matcher {
    Matcher::Reference(name.into())
}

/// Wraps a builder that receives a handle standing for "this rule itself",
/// letting the returned body refer back to it to express balanced,
/// self-nesting constructs (e.g. nested block comments). The body is built
/// lazily, on first match, and cached.
pub fn recursive(builder: impl Fn(Matcher) -> Matcher + Send + Sync + 'static) -> Matcher {
    Matcher::Recursive(Arc::new_cyclic(|this| RecursiveRule {
        cell: OnceCell::new(),
        builder: Box::new(builder),
        this: this.clone(),
    }))
}

/// `Sequence(Not(m), AnyByte)`: consumes one byte iff `m` does not match
/// here.
pub fn but(m: Matcher) -> Matcher {
    sequence([not(m), any_byte()])
}

/// `Not(AnyByte)`: succeeds only at end-of-stream.
pub fn end() -> Matcher {
    not(any_byte())
}

/// `Sequence(Repeat(but(Sequence(m, end()))), m, end())`: consumes bytes up
/// to and including the last occurrence of `m` at end-of-stream. Used to
/// implement file-name matching (`ends_with(".rs")`) against the engine
/// itself rather than a separate string-matching routine.
pub fn ends_with(m: Matcher) -> Matcher {
    let tail = sequence([m.clone(), end()]);
    let skip = zero_or_more(but(tail));
    sequence([skip, m, end()])
}

/// The body a `Language`'s root rule is built from: try each named rule in
/// order, falling back to consuming one unrecognized byte as `default`
/// style. `crate::highlight` repeats this itself at the top level against
/// the cache's root scope, so unlike a nested repetition this is not
/// wrapped in a `Matcher::Repeat` node.
pub fn root_rule(rules: impl IntoIterator<Item = Matcher>) -> Matcher {
    choice(rules.into_iter().chain([any_byte()]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Cache;
    use crate::input::StringInput;

    fn run(m: &Matcher, text: &str) -> (bool, usize) {
        let input = StringInput::new(text);
        let mut cache = Cache::new();
        let rules = RuleTable::new();
        let mut ctx = ParseContext::new(&input, cache.root_mut(), 0..text.len());
        let ok = match_matcher(m, &mut ctx, &rules, true);
        (ok, ctx.offset())
    }

    #[test]
    fn literal_matches_exactly_and_backtracks_on_mismatch() {
        assert_eq!(run(&literal("int"), "int x"), (true, 3));
        assert_eq!(run(&literal("int"), "float"), (false, 0));
    }

    #[test]
    fn choice_tries_children_in_order() {
        let m = choice([literal("foo"), literal("foobar")]);
        assert_eq!(run(&m, "foobar"), (true, 3));
    }

    #[test]
    fn sequence_restores_fully_on_partial_match_failure() {
        let m = sequence([literal("foo"), literal("bar")]);
        assert_eq!(run(&m, "foobaz"), (false, 0));
    }

    #[test]
    fn zero_or_more_consumes_greedily_then_stops() {
        let m = zero_or_more(range(b'a', b'z'));
        assert_eq!(run(&m, "abcABC"), (true, 3));
    }

    #[test]
    fn one_or_more_requires_at_least_one() {
        let m = one_or_more(range(b'0', b'9'));
        assert_eq!(run(&m, "abc"), (false, 0));
        assert_eq!(run(&m, "123abc"), (true, 3));
    }

    #[test]
    fn repeat_rejects_always_succeeding_unbounded_body() {
        let err = repeat(optional(byte(b'x')), 0, 0).unwrap_err();
        assert!(matches!(err, GrammarError::AlwaysSucceedsInRepeat));
    }

    #[test]
    fn optional_never_fails_to_construct_even_if_always_succeeds() {
        let _ = optional(optional(byte(b'x')));
    }

    #[test]
    fn not_is_pure_lookahead() {
        let m = sequence([not(literal("//")), any_byte()]);
        assert_eq!(run(&m, "//x"), (false, 0));
        assert_eq!(run(&m, "/x"), (true, 1));
    }

    #[test]
    fn ends_with_matches_suffix_and_rejects_others() {
        let m = ends_with(literal(".rs"));
        assert_eq!(run(&m, "main.rs").0, true);
        assert_eq!(run(&m, "main.rb").0, false);
    }

    #[test]
    fn recursive_balances_nested_constructs() {
        // balanced parens: '(' inner* ')'
        let m = recursive(|this| {
            sequence([
                byte(b'('),
                zero_or_more(choice([this.clone(), range(b'a', b'z')])),
                byte(b')'),
            ])
        });
        assert_eq!(run(&m, "(a(b)c)").0, true);
        assert_eq!(run(&m, "(a(b)c").0, false);
    }

    #[test]
    fn highlight_emits_no_span_on_failure() {
        use crate::span::{Span, StyleTag};
        let input = StringInput::new("xy");
        let mut cache = Cache::new();
        let rules = RuleTable::new();
        let mut ctx = ParseContext::new(&input, cache.root_mut(), 0..2);
        let m = highlight(StyleTag::KEYWORD, literal("zz"));
        assert!(!match_matcher(&m, &mut ctx, &rules, true));
        let spans = ctx.finish();
        assert_eq!(spans, Vec::<Span>::new());
    }

    quickcheck::quickcheck! {
        // Backtracking purity: a matcher that fails must leave the cursor
        // and the emitted-span list exactly as it found them. `text` is
        // matched in full by `literal`, then forced to fail on a trailing
        // `byte` past end-of-stream, so the whole sequence always fails
        // regardless of what `text` contains.
        fn failing_match_restores_cursor_and_spans(text: String) -> bool {
            if text.as_bytes().contains(&0) {
                return true;
            }
            let input = StringInput::new(&text);
            let mut cache = Cache::new();
            let rules = RuleTable::new();
            let mut ctx = ParseContext::new(&input, cache.root_mut(), 0..text.len());
            let m = sequence([literal(text.as_bytes()), byte(1)]);
            let failed = !match_matcher(&m, &mut ctx, &rules, true);
            failed && ctx.offset() == 0 && ctx.finish().is_empty()
        }
    }
}
