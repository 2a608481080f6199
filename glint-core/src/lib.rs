//! Incremental, viewport-driven PEG syntax highlighting engine.
//!
//! Given a [`Language`] (a grammar plus the config that selects it), an
//! [`Input`], a [`Cache`] the caller keeps around per buffer, and a byte
//! window `[ws, we)`, [`highlight`] returns the minimal list of styled
//! [`Span`]s covering that window. The cache lets a later query that
//! starts past an earlier one's work skip straight to it; [`Cache::invalidate`]
//! must be called after an edit so stale state isn't reused.
//!
//! The crate has no grammar-compilation step: a [`Matcher`] tree is built
//! directly with the combinator functions in this module (`sequence`,
//! `choice`, `zero_or_more`, `highlight`, ...) the way a parser-combinator
//! library is used, not deserialized from a table.

mod cache;
mod config;
mod context;
mod input;
mod language;
mod loader;
mod matcher;
mod repeat;
mod span;
mod theme;

use std::ops::Range;

pub use cache::{Cache, Checkpoint};
pub use config::{Configuration, FileType, LanguageConfig};
pub use input::{ChunkRef, Input, RopeInput, StringInput};
pub use language::Language;
pub use loader::{matches_extension_via_grammar, Loader, LoaderError};
pub use matcher::{
    and, any_byte, byte, but, choice, end, ends_with, highlight as styled, literal, not,
    one_or_more, optional, range, recursive, reference, repeat as repeat_matcher, root_rule,
    sequence, zero_or_more, GrammarError, Matcher, RuleTable,
};
pub use span::{Span, StyleTag};
pub use theme::{get_theme, Rgb, Theme};

use context::ParseContext;
use matcher::match_matcher;

/// Runs one query: selects the language's root rule against `input` inside
/// `window`, reusing and extending `cache` as it goes, and returns the
/// minimal styled span list covering the window.
///
/// Mirrors `Loader::language_for_filename` + co. for language selection:
/// callers typically look up the `Language` once per buffer and reuse it
/// across many `highlight` calls as the viewport scrolls or the buffer is
/// edited.
pub fn highlight<'a, I: Input<'a>>(
    language: &Language,
    input: &'a I,
    cache: &mut Cache,
    window: Range<usize>,
) -> Vec<Span> {
    let mut ctx = ParseContext::new(input, cache.root_mut(), window);
    // The root repetition's scope *is* the cache's root node; there is no
    // enclosing scope to descend into, so this fast-forward happens here
    // rather than inside the generic repetition driver (see `repeat.rs`,
    // which only ever handles scopes nested under some already-entered
    // parent).
    ctx.skip_to_checkpoint();
    loop {
        if !ctx.before_window_end() {
            break;
        }
        let save = ctx.save();
        if !match_matcher(language.root(), &mut ctx, language.rules(), true) {
            ctx.restore(save);
            break;
        }
        ctx.add_checkpoint();
    }
    ctx.finish()
}

/// Convenience wrapper around [`Loader::language_for_filename`], named to
/// match the library-surface name in the spec.
pub fn get_language<'l>(loader: &'l Loader, file_name: &str) -> Option<&'l Language> {
    loader.language_for_filename(std::path::Path::new(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c_like() -> Language {
        let config = LanguageConfig {
            language_id: "c-like".into(),
            scope: "source.c".into(),
            file_types: vec![FileType::Extension("c".into())],
            shebangs: Vec::new(),
            highlights: vec!["comment".into(), "keyword".into(), "literal".into()],
        };

        let digit = || range(b'0', b'9');
        let number = one_or_more(digit());
        let ident_start = choice([range(b'a', b'z'), range(b'A', b'Z'), byte(b'_')]);
        let ident_continue = choice([range(b'a', b'z'), range(b'A', b'Z'), range(b'0', b'9'), byte(b'_')]);
        let ident = sequence([ident_start, zero_or_more(ident_continue)]);

        let keyword = self::matcher_highlight(
            StyleTag::KEYWORD,
            choice(["int", "return", "if", "else"].map(|kw| {
                sequence([literal(kw), not(choice([range(b'a', b'z'), range(b'A', b'Z')]))])
            })),
        );

        let line_comment = self::matcher_highlight(
            StyleTag::COMMENT,
            sequence([
                literal("//"),
                zero_or_more(but(byte(b'\n'))),
            ]),
        );
        let block_comment = self::matcher_highlight(
            StyleTag::COMMENT,
            sequence([
                literal("/*"),
                zero_or_more(but(literal("*/"))),
                optional(literal("*/")),
            ]),
        );
        let number_highlighted = self::matcher_highlight(StyleTag::LITERAL, number);

        let root = root_rule([
            block_comment,
            line_comment,
            keyword,
            number_highlighted,
            ident,
        ]);

        Language::new(config, root, Default::default())
    }

    fn matcher_highlight(tag: StyleTag, m: Matcher) -> Matcher {
        crate::matcher::highlight(tag, m)
    }

    #[test]
    fn end_to_end_int_declaration() {
        let lang = c_like();
        let input = StringInput::new("int x = 42;");
        let mut cache = Cache::new();
        let spans = highlight(&lang, &input, &mut cache, 0..11);
        assert_eq!(
            spans,
            vec![
                Span { start: 0, end: 3, style: StyleTag::KEYWORD },
                Span { start: 8, end: 10, style: StyleTag::LITERAL },
            ]
        );
    }

    #[test]
    fn end_to_end_line_comment_then_literal() {
        let lang = c_like();
        let input = StringInput::new("// hi\n1");
        let mut cache = Cache::new();
        let spans = highlight(&lang, &input, &mut cache, 0..7);
        assert_eq!(
            spans,
            vec![
                Span { start: 0, end: 5, style: StyleTag::COMMENT },
                Span { start: 6, end: 7, style: StyleTag::LITERAL },
            ]
        );
    }

    #[test]
    fn end_to_end_closed_block_comment() {
        let lang = c_like();
        let input = StringInput::new("/* a */b");
        let mut cache = Cache::new();
        let spans = highlight(&lang, &input, &mut cache, 0..8);
        assert_eq!(
            spans,
            vec![Span { start: 0, end: 7, style: StyleTag::COMMENT }]
        );
    }

    #[test]
    fn end_to_end_unterminated_block_comment_consumes_to_eof() {
        let lang = c_like();
        let input = StringInput::new("/*unterminated");
        let mut cache = Cache::new();
        let spans = highlight(&lang, &input, &mut cache, 0..14);
        assert_eq!(
            spans,
            vec![Span { start: 0, end: 14, style: StyleTag::COMMENT }]
        );
    }

    #[test]
    fn end_to_end_viewport_clips_spans() {
        let lang = c_like();
        let input = StringInput::new("if(x)return 0;");
        let mut cache = Cache::new();
        let spans = highlight(&lang, &input, &mut cache, 6..14);
        assert_eq!(
            spans,
            vec![
                Span { start: 6, end: 11, style: StyleTag::KEYWORD },
                Span { start: 12, end: 13, style: StyleTag::LITERAL },
            ]
        );
    }

    #[test]
    fn re_querying_a_narrower_window_with_the_same_cache_matches_uncached_output() {
        let lang = c_like();
        let input = StringInput::new("if(x)return 0;");
        let mut cache = Cache::new();
        let _ = highlight(&lang, &input, &mut cache, 0..14);
        let cached = highlight(&lang, &input, &mut cache, 6..14);

        let mut fresh_cache = Cache::new();
        let uncached = highlight(&lang, &input, &mut fresh_cache, 6..14);
        assert_eq!(cached, uncached);
    }

    #[test]
    fn window_monotonicity_holds_across_a_narrower_reuse() {
        let lang = c_like();
        let text = "int abc = 123; // trailing\nint def = 456;";
        let input = StringInput::new(text);
        let mut cache = Cache::new();
        let full = highlight(&lang, &input, &mut cache, 0..text.len());

        let ws = 10;
        let we = 30;
        let restricted: Vec<Span> = full
            .iter()
            .filter_map(|s| {
                let start = s.start.max(ws);
                let end = s.end.min(we);
                (start < end).then_some(Span { start, end, style: s.style })
            })
            .collect();

        let mut narrow_cache = Cache::new();
        let narrow = highlight(&lang, &input, &mut narrow_cache, ws..we);
        assert_eq!(restricted, narrow);
    }

    #[test]
    fn invalidate_forces_correct_result_after_an_edit() {
        let lang = c_like();
        let before = "int x = 1; // a comment\nint y = 2;";
        let input_before = StringInput::new(before);
        let mut cache = Cache::new();
        let _ = highlight(&lang, &input_before, &mut cache, 0..before.len());

        // Edit: delete the leading `/` of the line comment, turning it into code.
        let edit_at = before.find("//").unwrap();
        let after = format!("{}{}", &before[..edit_at], &before[edit_at + 1..]);
        cache.invalidate(edit_at);

        let input_after = StringInput::new(&after);
        let patched = highlight(&lang, &input_after, &mut cache, 0..after.len());

        let mut fresh_cache = Cache::new();
        let uncached = highlight(&lang, &input_after, &mut fresh_cache, 0..after.len());
        assert_eq!(patched, uncached);
    }
}
