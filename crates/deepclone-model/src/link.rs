//! Typed links and field values
//!
//! A field value is either a plain scalar (any JSON), a single [`Link`], or an
//! ordered array of links. Links carry the platform wire shape:
//!
//! ```json
//! { "sys": { "type": "Link", "linkType": "Entry", "id": "abc" } }
//! ```
//!
//! Only links whose [`LinkType`] is [`LinkType::Entry`] point at other
//! records; asset and other link kinds are carried through untouched.

use crate::ids::RecordId;
use serde::{Deserialize, Serialize};

/// Kind of resource a link targets
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LinkType {
    /// Another content record
    Entry,
    /// A media asset
    Asset,
    /// Any other link kind, preserved verbatim
    Other(String),
}

impl From<String> for LinkType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Entry" => Self::Entry,
            "Asset" => Self::Asset,
            _ => Self::Other(value),
        }
    }
}

impl From<LinkType> for String {
    fn from(value: LinkType) -> Self {
        match value {
            LinkType::Entry => "Entry".to_string(),
            LinkType::Asset => "Asset".to_string(),
            LinkType::Other(other) => other,
        }
    }
}

/// A typed reference to another resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "LinkRepr", into = "LinkRepr")]
pub struct Link {
    /// Kind of the target
    pub link_type: LinkType,
    /// Target identifier
    pub id: RecordId,
}

impl Link {
    /// Link to another record
    #[inline]
    #[must_use]
    pub fn entry(id: impl Into<RecordId>) -> Self {
        Self {
            link_type: LinkType::Entry,
            id: id.into(),
        }
    }

    /// Link to a media asset
    #[inline]
    #[must_use]
    pub fn asset(id: impl Into<RecordId>) -> Self {
        Self {
            link_type: LinkType::Asset,
            id: id.into(),
        }
    }

    /// Whether this link targets a record
    #[inline]
    #[must_use]
    pub fn is_entry(&self) -> bool {
        matches!(self.link_type, LinkType::Entry)
    }

    /// Target id when this link targets a record
    #[inline]
    #[must_use]
    pub fn entry_id(&self) -> Option<&RecordId> {
        self.is_entry().then_some(&self.id)
    }

    /// Point an entry link at `target`. Returns true when the id changed.
    pub fn retarget(&mut self, target: RecordId) -> bool {
        if !self.is_entry() || self.id == target {
            return false;
        }
        self.id = target;
        true
    }
}

#[derive(Serialize, Deserialize)]
struct LinkRepr {
    sys: LinkSys,
}

#[derive(Serialize, Deserialize)]
struct LinkSys {
    #[serde(rename = "type")]
    kind: SysKind,
    #[serde(rename = "linkType")]
    link_type: LinkType,
    id: RecordId,
}

#[derive(Serialize, Deserialize)]
enum SysKind {
    Link,
}

impl From<LinkRepr> for Link {
    fn from(repr: LinkRepr) -> Self {
        Self {
            link_type: repr.sys.link_type,
            id: repr.sys.id,
        }
    }
}

impl From<Link> for LinkRepr {
    fn from(link: Link) -> Self {
        Self {
            sys: LinkSys {
                kind: SysKind::Link,
                link_type: link.link_type,
                id: link.id,
            },
        }
    }
}

/// Value stored for one field in one locale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Single link
    Link(Link),
    /// Ordered array of links (may mix link kinds)
    LinkArray(Vec<Link>),
    /// Anything else: text, numbers, booleans, objects, rich text
    Scalar(serde_json::Value),
}

impl FieldValue {
    /// Text scalar
    #[inline]
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Scalar(serde_json::Value::String(value.into()))
    }

    /// Single entry link
    #[inline]
    #[must_use]
    pub fn entry_link(id: impl Into<RecordId>) -> Self {
        Self::Link(Link::entry(id))
    }

    /// Array of entry links
    #[must_use]
    pub fn entry_links<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RecordId>,
    {
        Self::LinkArray(ids.into_iter().map(Link::entry).collect())
    }

    /// Whether this is a single link of any kind
    #[inline]
    #[must_use]
    pub fn is_link(&self) -> bool {
        matches!(self, Self::Link(_))
    }

    /// Whether this is an array of links
    #[inline]
    #[must_use]
    pub fn is_link_array(&self) -> bool {
        matches!(self, Self::LinkArray(_))
    }

    /// The target when this is a single entry link
    #[inline]
    #[must_use]
    pub fn as_entry_link(&self) -> Option<&RecordId> {
        match self {
            Self::Link(link) => link.entry_id(),
            _ => None,
        }
    }

    /// Text content when this is a string scalar
    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Scalar(serde_json::Value::String(text)) => Some(text),
            _ => None,
        }
    }

    /// Every entry link target in this value, in order (duplicates kept)
    pub fn entry_targets(&self) -> impl Iterator<Item = &RecordId> {
        let links: &[Link] = match self {
            Self::Link(link) => std::slice::from_ref(link),
            Self::LinkArray(links) => links,
            Self::Scalar(_) => &[],
        };
        links.iter().filter_map(Link::entry_id)
    }

    /// Retarget entry links through `redirect`. Returns true if any link changed.
    pub fn rewrite_entry_links<F>(&mut self, redirect: &mut F) -> bool
    where
        F: FnMut(&RecordId) -> Option<RecordId>,
    {
        match self {
            Self::Link(link) => rewrite_link(link, redirect),
            Self::LinkArray(links) => links
                .iter_mut()
                .fold(false, |changed, link| rewrite_link(link, redirect) || changed),
            Self::Scalar(_) => false,
        }
    }
}

fn rewrite_link<F>(link: &mut Link, redirect: &mut F) -> bool
where
    F: FnMut(&RecordId) -> Option<RecordId>,
{
    if !link.is_entry() {
        return false;
    }
    match redirect(&link.id) {
        Some(target) => link.retarget(target),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_entry_link() {
        let value: FieldValue = serde_json::from_value(json!({
            "sys": { "type": "Link", "linkType": "Entry", "id": "b" }
        }))
        .unwrap();

        assert!(value.is_link());
        assert_eq!(value.as_entry_link(), Some(&RecordId::from("b")));
    }

    #[test]
    fn asset_link_is_not_an_entry_reference() {
        let value: FieldValue = serde_json::from_value(json!({
            "sys": { "type": "Link", "linkType": "Asset", "id": "img" }
        }))
        .unwrap();

        assert!(value.is_link());
        assert_eq!(value.as_entry_link(), None);
        assert_eq!(value.entry_targets().count(), 0);
    }

    #[test]
    fn non_link_sys_object_is_scalar() {
        let value: FieldValue = serde_json::from_value(json!({
            "sys": { "type": "Entry", "id": "x" }
        }))
        .unwrap();

        assert!(matches!(value, FieldValue::Scalar(_)));
    }

    #[test]
    fn parses_link_array_and_keeps_duplicates() {
        let value: FieldValue = serde_json::from_value(json!([
            { "sys": { "type": "Link", "linkType": "Entry", "id": "c" } },
            { "sys": { "type": "Link", "linkType": "Entry", "id": "c" } }
        ]))
        .unwrap();

        assert!(value.is_link_array());
        let targets: Vec<_> = value.entry_targets().map(RecordId::as_str).collect();
        assert_eq!(targets, vec!["c", "c"]);
    }

    #[test]
    fn string_array_is_scalar() {
        let value: FieldValue = serde_json::from_value(json!(["red", "green"])).unwrap();
        assert!(matches!(value, FieldValue::Scalar(_)));
    }

    #[test]
    fn serializes_platform_shape() {
        let json = serde_json::to_value(FieldValue::entry_link("b")).unwrap();
        assert_eq!(
            json,
            json!({ "sys": { "type": "Link", "linkType": "Entry", "id": "b" } })
        );

        let other = serde_json::to_value(FieldValue::Link(Link {
            link_type: LinkType::Other("Resource".into()),
            id: "r".into(),
        }))
        .unwrap();
        assert_eq!(other["sys"]["linkType"], "Resource");
    }

    #[test]
    fn rewrite_touches_only_entry_links() {
        let mut value = FieldValue::LinkArray(vec![
            Link::entry("b"),
            Link::asset("b"),
            Link::entry("c"),
        ]);

        let changed = value.rewrite_entry_links(&mut |id: &RecordId| {
            (id.as_str() == "b").then(|| RecordId::from("b2"))
        });

        assert!(changed);
        assert_eq!(
            value,
            FieldValue::LinkArray(vec![Link::entry("b2"), Link::asset("b"), Link::entry("c")])
        );
    }

    #[test]
    fn rewrite_to_same_id_is_not_a_change() {
        let mut value = FieldValue::entry_link("b");
        let changed = value.rewrite_entry_links(&mut |id: &RecordId| Some(id.clone()));
        assert!(!changed);
    }
}
