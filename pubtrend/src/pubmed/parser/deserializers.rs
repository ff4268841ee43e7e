//! Custom serde deserializers for PubMed XML text elements

use serde::de::{self, IgnoredAny, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::result;

/// Text of an XML element, ignoring its attributes
///
/// Handles plain string content, `$text`/`$value` entries produced for
/// elements that carry attributes (`<PMID Version="1">`), and empty elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct TextContent(pub String);

impl TextContent {
    /// Trimmed text, `None` when blank
    pub fn non_empty(&self) -> Option<String> {
        let trimmed = self.0.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

/// `Option<TextContent>` flattened to a trimmed, non-blank string
pub(super) fn text_of(content: &Option<TextContent>) -> Option<String> {
    content.as_ref().and_then(TextContent::non_empty)
}

impl<'de> Deserialize<'de> for TextContent {
    fn deserialize<D>(deserializer: D) -> result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct TextVisitor;

        impl<'de> Visitor<'de> for TextVisitor {
            type Value = TextContent;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("element text content")
            }

            fn visit_str<E>(self, value: &str) -> result::Result<TextContent, E>
            where
                E: de::Error,
            {
                Ok(TextContent(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> result::Result<TextContent, E>
            where
                E: de::Error,
            {
                Ok(TextContent(value))
            }

            fn visit_unit<E>(self) -> result::Result<TextContent, E>
            where
                E: de::Error,
            {
                Ok(TextContent::default())
            }

            fn visit_none<E>(self) -> result::Result<TextContent, E>
            where
                E: de::Error,
            {
                Ok(TextContent::default())
            }

            fn visit_map<M>(self, mut map: M) -> result::Result<TextContent, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut text_parts = Vec::new();
                while let Some(key) = map.next_key::<String>()? {
                    if key == "$text" || key == "$value" {
                        let value: String = map.next_value()?;
                        text_parts.push(value);
                    } else {
                        // Attributes (@Version, @Label, @UI, ...) and nested markup
                        let _: IgnoredAny = map.next_value()?;
                    }
                }
                Ok(TextContent(text_parts.join("")))
            }
        }

        deserializer.deserialize_any(TextVisitor)
    }
}
