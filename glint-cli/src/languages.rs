//! Concrete grammars. The core library deliberately ships none of these —
//! `glint-core`'s matcher combinators are language-agnostic — so this
//! illustrative CLI is where actual `Matcher` trees get built, the way a
//! host editor's runtime `languages.toml` + tree-sitter grammars live
//! outside the highlighting engine itself.

use glint_core::{
    and, any_byte, byte, choice, literal, not, one_or_more, optional, range, recursive, root_rule,
    sequence, styled, zero_or_more, Configuration, FileType, Language, LanguageConfig, Loader,
    LoaderError, Matcher, RuleTable, StyleTag,
};

const LANGUAGES_TOML: &str = include_str!("../languages.toml");

/// Parses the embedded `languages.toml` and pairs each declared
/// `LanguageConfig` with the hand-built grammar for its `language_id`.
pub fn build_loader() -> Result<Loader, LoaderError> {
    let config = Configuration::from_toml_str(LANGUAGES_TOML)
        .expect("bundled languages.toml must parse");

    let languages = config
        .language
        .into_iter()
        .map(|lang_config| match lang_config.language_id.as_str() {
            "c-like" => build_language(lang_config, c_like_grammar),
            "lisp-like" => build_language(lang_config, lisp_like_grammar),
            other => panic!("no grammar registered for language '{other}'"),
        })
        .collect();

    Loader::new(languages)
}

fn build_language(config: LanguageConfig, grammar: fn() -> (Matcher, RuleTable)) -> Language {
    let (root, rules) = grammar();
    Language::new(config, root, rules)
}

fn word_boundary() -> Matcher {
    not(choice([range(b'a', b'z'), range(b'A', b'Z'), range(b'0', b'9'), byte(b'_')]))
}

fn keyword(word: &'static str) -> Matcher {
    sequence([literal(word), word_boundary()])
}

/// A small C-like language: line and block comments, `int`/`char`-family
/// keywords, decimal numbers, double-quoted strings with `\`-escapes, and
/// bare identifiers left unstyled.
fn c_like_grammar() -> (Matcher, RuleTable) {
    const KEYWORDS: &[&str] = &[
        "int", "char", "long", "short", "unsigned", "signed", "void", "const", "static",
        "struct", "enum", "typedef", "return", "if", "else", "for", "while", "do", "switch",
        "case", "break", "continue", "sizeof",
    ];

    let ident_start = choice([range(b'a', b'z'), range(b'A', b'Z'), byte(b'_')]);
    let ident_continue = choice([
        range(b'a', b'z'),
        range(b'A', b'Z'),
        range(b'0', b'9'),
        byte(b'_'),
    ]);
    let identifier = sequence([ident_start, zero_or_more(ident_continue)]);

    let keywords = styled(
        StyleTag::KEYWORD,
        choice(KEYWORDS.iter().copied().map(keyword)),
    );

    let escape = styled(
        StyleTag::ESCAPE,
        sequence([byte(b'\\'), any_byte()]),
    );
    let string_body = zero_or_more(choice([escape.clone(), sequence([not(byte(b'"')), any_byte()])]));
    let string_literal = styled(
        StyleTag::STRING,
        sequence([byte(b'"'), string_body, optional(byte(b'"'))]),
    );
    let char_body = zero_or_more(choice([escape, sequence([not(byte(b'\'')), any_byte()])]));
    let char_literal = styled(
        StyleTag::STRING,
        sequence([byte(b'\''), char_body, optional(byte(b'\''))]),
    );

    let number = styled(
        StyleTag::LITERAL,
        sequence([
            one_or_more(range(b'0', b'9')),
            optional(sequence([byte(b'.'), zero_or_more(range(b'0', b'9'))])),
        ]),
    );

    let line_comment = styled(
        StyleTag::COMMENT,
        sequence([
            literal("//"),
            zero_or_more(sequence([not(byte(b'\n')), any_byte()])),
        ]),
    );
    let block_comment = styled(
        StyleTag::COMMENT,
        sequence([
            literal("/*"),
            zero_or_more(sequence([not(literal("*/")), any_byte()])),
            optional(literal("*/")),
        ]),
    );

    let function_call = styled(
        StyleTag::FUNCTION,
        sequence([identifier.clone(), and(byte(b'('))]),
    );

    let root = root_rule([
        block_comment,
        line_comment,
        string_literal,
        char_literal,
        keywords,
        number,
        function_call,
        identifier,
    ]);

    (root, RuleTable::new())
}

/// A small Lisp-like language: `;` line comments, `#| ... |#` block
/// comments that nest (via [`recursive`], unlike the C-like grammar's
/// non-nesting ones), keywords, string literals, and numeric atoms.
fn lisp_like_grammar() -> (Matcher, RuleTable) {
    const KEYWORDS: &[&str] = &[
        "define", "lambda", "let", "let*", "letrec", "if", "cond", "else", "quote", "begin",
        "set!", "and", "or", "case",
    ];

    let atom_char = || {
        choice([
            range(b'a', b'z'),
            range(b'A', b'Z'),
            range(b'0', b'9'),
            byte(b'-'),
            byte(b'!'),
            byte(b'?'),
            byte(b'*'),
            byte(b'+'),
            byte(b'/'),
        ])
    };
    let atom = one_or_more(atom_char());

    let keywords = styled(
        StyleTag::KEYWORD,
        choice(
            KEYWORDS
                .iter()
                .copied()
                .map(|kw| sequence([literal(kw), not(atom_char())])),
        ),
    );

    let escape = styled(StyleTag::ESCAPE, sequence([byte(b'\\'), any_byte()]));
    let string_body = zero_or_more(choice([escape, sequence([not(byte(b'"')), any_byte()])]));
    let string_literal = styled(
        StyleTag::STRING,
        sequence([byte(b'"'), string_body, optional(byte(b'"'))]),
    );

    let number = styled(
        StyleTag::LITERAL,
        sequence([
            optional(byte(b'-')),
            one_or_more(range(b'0', b'9')),
            optional(sequence([byte(b'.'), zero_or_more(range(b'0', b'9'))])),
        ]),
    );

    let line_comment = styled(
        StyleTag::COMMENT,
        sequence([
            byte(b';'),
            zero_or_more(sequence([not(byte(b'\n')), any_byte()])),
        ]),
    );

    // `#| ... |#` nests: an inner `#|` opens another comment that must be
    // closed before the outer one can. This is exactly what `recursive`
    // exists for, unlike the C-like grammar's `/* */` which never nests.
    let block_comment = styled(
        StyleTag::COMMENT,
        recursive(|this| {
            sequence([
                literal("#|"),
                zero_or_more(choice([
                    this,
                    sequence([not(choice([literal("#|"), literal("|#")])), any_byte()]),
                ])),
                optional(literal("|#")),
            ])
        }),
    );

    let root = root_rule([block_comment, line_comment, string_literal, keywords, number, atom]);
    (root, RuleTable::new())
}

/// Lists each loaded language's id and recognized extensions, for the
/// CLI's usage text, without hand-duplicating what the `Loader` already
/// knows.
pub fn describe_file_types(loader: &Loader) -> String {
    loader
        .languages()
        .map(|lang| {
            let exts: Vec<&str> = lang
                .config()
                .file_types
                .iter()
                .filter_map(|ft| match ft {
                    FileType::Extension(ext) => Some(ext.as_str()),
                    FileType::Glob(_) => None,
                })
                .collect();
            format!("{} ({})", lang.id(), exts.join(", "))
        })
        .collect::<Vec<_>>()
        .join("; ")
}
