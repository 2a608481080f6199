//! A minimal, opaque styling table consumed only by a front-end: the
//! engine itself never inspects a `Theme`, it only ever produces
//! [`crate::StyleTag`] values. Kept here, rather than pulled out of the
//! core entirely, only so an illustrative CLI has somewhere to resolve a
//! tag to a color without the core depending on a terminal crate.

use std::collections::HashMap;

use crate::span::StyleTag;

/// An RGB color, independent of any particular terminal-styling crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// A name -> `StyleTag` -> color table. Unknown tags simply render with no
/// styling; this mirrors how a host editor's theme falls back silently on
/// an unrecognized highlight scope rather than erroring.
#[derive(Debug, Clone)]
pub struct Theme {
    name: String,
    colors: HashMap<StyleTag, Rgb>,
}

impl Theme {
    fn new(name: &str, entries: &[(StyleTag, Rgb)]) -> Self {
        Self {
            name: name.to_string(),
            colors: entries.iter().copied().collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self, tag: StyleTag) -> Option<Rgb> {
        self.colors.get(&tag).copied()
    }
}

/// Looks up a built-in theme by name, falling back to `"default"` for an
/// unrecognized name (logged at debug level, never an error: theme
/// resolution has no failure mode the engine's caller needs to handle).
pub fn get_theme(name: &str) -> Theme {
    match name {
        "dark" => dark_theme(),
        "default" => default_theme(),
        other => {
            log::debug!("unknown theme '{other}', falling back to 'default'");
            default_theme()
        }
    }
}

fn default_theme() -> Theme {
    Theme::new(
        "default",
        &[
            (StyleTag::COMMENT, Rgb(105, 124, 129)),
            (StyleTag::KEYWORD, Rgb(236, 205, 186)),
            (StyleTag::OPERATOR, Rgb(219, 191, 239)),
            (StyleTag::TYPE, Rgb(255, 255, 255)),
            (StyleTag::LITERAL, Rgb(159, 242, 143)),
            (StyleTag::STRING, Rgb(204, 204, 204)),
            (StyleTag::ESCAPE, Rgb(239, 186, 93)),
            (StyleTag::FUNCTION, Rgb(164, 160, 232)),
        ],
    )
}

fn dark_theme() -> Theme {
    Theme::new(
        "dark",
        &[
            (StyleTag::COMMENT, Rgb(90, 90, 90)),
            (StyleTag::KEYWORD, Rgb(198, 120, 221)),
            (StyleTag::OPERATOR, Rgb(171, 178, 191)),
            (StyleTag::TYPE, Rgb(229, 192, 123)),
            (StyleTag::LITERAL, Rgb(209, 154, 102)),
            (StyleTag::STRING, Rgb(152, 195, 121)),
            (StyleTag::ESCAPE, Rgb(86, 182, 194)),
            (StyleTag::FUNCTION, Rgb(97, 175, 239)),
        ],
    )
}
