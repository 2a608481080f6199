//! `serde` + `toml` deserializable description of the installed languages,
//! mirroring the shape of a host editor's own language-configuration file.
//! A [`crate::config::LanguageConfig`] carries no grammar: the `Matcher`
//! tree and rule table for a language are always supplied in Rust by
//! whoever builds the corresponding [`crate::Language`] value (see
//! [`crate::Language::new`]).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Configuration {
    pub language: Vec<LanguageConfig>,
}

impl Configuration {
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}

/// Declarative half of a language: how to recognize it and which style
/// names it declares. Paired with a Rust-built root [`crate::Matcher`] and
/// rule table by [`crate::Language::new`] before being handed to
/// [`crate::Loader::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct LanguageConfig {
    #[serde(rename = "name")]
    pub language_id: String,
    /// A scope name such as `source.c`, purely descriptive.
    pub scope: String,
    pub file_types: Vec<FileType>,
    #[serde(default)]
    pub shebangs: Vec<String>,
    /// Capture names this language's grammar declares, in the order its
    /// [`crate::StyleTag`] values are assigned; consumed only by a theme,
    /// never by the engine itself.
    #[serde(default)]
    pub highlights: Vec<String>,
}

/// One way of recognizing a file as belonging to a language: either a bare
/// extension (`"c"`, matched against `Path::extension`) or a `globset`
/// glob matched against the whole path (for names like `Makefile` or
/// directory-qualified rules).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FileType {
    Extension(String),
    Glob(globset::Glob),
}

impl Serialize for FileType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        match self {
            FileType::Extension(extension) => serializer.serialize_str(extension),
            FileType::Glob(glob) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("glob", glob.glob())?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for FileType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        struct FileTypeVisitor;

        impl<'de> serde::de::Visitor<'de> for FileTypeVisitor {
            type Value = FileType;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("string or table")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(FileType::Extension(value.to_string()))
            }

            fn visit_map<M>(self, mut map: M) -> Result<Self::Value, M::Error>
            where
                M: serde::de::MapAccess<'de>,
            {
                match map.next_entry::<String, String>()? {
                    Some((key, glob)) if key == "glob" => globset::Glob::new(&glob)
                        .map(FileType::Glob)
                        .map_err(|err| {
                            serde::de::Error::custom(format!("invalid `glob` pattern: {err}"))
                        }),
                    Some((key, _)) => Err(serde::de::Error::custom(format!(
                        "unknown key in `file-types` entry: {key}"
                    ))),
                    None => Err(serde::de::Error::custom(
                        "expected a `glob` key in the `file-types` entry",
                    )),
                }
            }
        }

        deserializer.deserialize_any(FileTypeVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_extension_and_glob_file_types() {
        let toml = r#"
            [[language]]
            name = "c-like"
            scope = "source.c"
            file-types = ["c", "h", { glob = "*/Makefile" }]
            shebangs = ["sh"]
            highlights = ["comment", "keyword"]
        "#;
        let config = Configuration::from_toml_str(toml).unwrap();
        assert_eq!(config.language.len(), 1);
        let lang = &config.language[0];
        assert_eq!(lang.language_id, "c-like");
        assert_eq!(lang.file_types.len(), 3);
        assert_eq!(lang.file_types[0], FileType::Extension("c".into()));
        assert!(matches!(lang.file_types[2], FileType::Glob(_)));
    }

    #[test]
    fn rejects_unknown_fields() {
        let toml = r#"
            [[language]]
            name = "c-like"
            scope = "source.c"
            file-types = ["c"]
            typo-field = true
        "#;
        assert!(Configuration::from_toml_str(toml).is_err());
    }
}
