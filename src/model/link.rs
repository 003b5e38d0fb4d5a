//! Link relations.

use serde::{Deserialize, Serialize};

/// Well-known relation names.
pub mod rel {
    /// The resource's own address.
    pub const SELF: &str = "self";
    /// The preferred address of the resource, when it differs from `self`.
    pub const CANONICAL: &str = "canonical";
    /// The form used to edit a resource.
    pub const EDIT_FORM: &str = "edit-form";
    /// The form used to create a member of a collection.
    pub const CREATE_FORM: &str = "create-form";
}

/// A typed link from a resource to another URI.
///
/// Relations are not unique: a resource may hold several links sharing a `rel`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

impl Link {
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
            title: None,
            media_type: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    /// Relation names compare case-insensitively.
    pub fn matches(&self, rel: &str) -> bool {
        self.rel.eq_ignore_ascii_case(rel)
    }
}

/// Returns the first link matching `rel`.
pub fn find<'a>(links: &'a [Link], rel: &str) -> Option<&'a Link> {
    links.iter().find(|link| link.matches(rel))
}

/// Returns the href of the first link matching `rel`.
pub fn uri(links: &[Link], rel: &str) -> Option<String> {
    find(links, rel).map(|link| link.href.clone())
}

/// Returns the href of the first relation in `rels` that is present, in order of preference.
pub fn first_uri(links: &[Link], rels: &[String]) -> Option<String> {
    rels.iter().find_map(|rel| uri(links, rel))
}
