use std::fmt::Debug;

use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;

/// Structural marker of an element: an optional tag name plus a substring
/// that must occur in the element's `class` attribute.
#[derive(Clone, Deserialize)]
#[serde(try_from = "MarkerSpec")]
pub struct Marker {
    spec: MarkerSpec,
    selector: Selector,
}

#[derive(Clone, PartialEq, Eq, Debug, Deserialize)]
pub struct MarkerSpec {
    #[serde(default)]
    pub tag: Option<String>,
    pub class: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MarkerError {
    #[error("Marker class substring must not be empty")]
    EmptyClass,
    #[error("Marker class substring {0:?} contains a quote or backslash")]
    UnsupportedCharacter(String),
    #[error("Marker tag {0:?} is not a plain element name")]
    InvalidTag(String),
    #[error("Selector {css:?} could not be parsed: {message}")]
    Selector { css: String, message: String },
}

impl Marker {
    pub fn new(tag: Option<&str>, class: &str) -> Result<Self, MarkerError> {
        MarkerSpec {
            tag: tag.map(str::to_owned),
            class: class.to_owned(),
        }
        .try_into()
    }

    /// Every descendant of `html` carrying this marker, in document order.
    pub fn in_document<'a>(&'a self, html: &'a Html) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        html.select(&self.selector)
    }

    /// Every descendant of `element` carrying this marker, in document order.
    pub fn in_element<'a>(
        &'a self,
        element: ElementRef<'a>,
    ) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        element.select(&self.selector)
    }

    pub fn first_in<'a>(&self, element: ElementRef<'a>) -> Option<ElementRef<'a>> {
        element.select(&self.selector).next()
    }
}

impl TryFrom<MarkerSpec> for Marker {
    type Error = MarkerError;

    fn try_from(spec: MarkerSpec) -> Result<Self, MarkerError> {
        if spec.class.is_empty() {
            return Err(MarkerError::EmptyClass);
        }
        if spec.class.contains(['"', '\\']) {
            return Err(MarkerError::UnsupportedCharacter(spec.class));
        }
        if let Some(tag) = &spec.tag {
            if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
                return Err(MarkerError::InvalidTag(tag.clone()));
            }
        }
        let css = format!(
            r#"{}[class*="{}"]"#,
            spec.tag.as_deref().unwrap_or_default(),
            spec.class
        );
        let selector = Selector::parse(&css).map_err(|e| MarkerError::Selector {
            message: e.to_string(),
            css: css.clone(),
        })?;
        Ok(Self { spec, selector })
    }
}

impl Debug for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Marker")
            .field("tag", &self.spec.tag)
            .field("class", &self.spec.class)
            .finish()
    }
}

impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        self.spec == other.spec
    }
}
