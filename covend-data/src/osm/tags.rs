//! Tag predicates for routable OSM ways.
//!
//! Provides helpers to:
//! - detect whether a way carries a routable `highway` tag; and
//! - read the travel direction from its `oneway` tag.

/// Permitted travel direction along a way's node sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Oneway {
    /// Travel is allowed both ways.
    #[default]
    Both,
    /// Travel follows the node order only.
    Forward,
    /// Travel runs against the node order only.
    Reverse,
}

impl Oneway {
    /// Interpret the value of a `oneway` tag.
    #[must_use]
    pub fn from_tag(value: Option<&str>) -> Self {
        match value {
            Some("yes" | "1" | "true") => Self::Forward,
            Some("-1") => Self::Reverse,
            _ => Self::Both,
        }
    }
}

/// Highway classes that never carry traffic.
const NON_ROUTABLE: [&str; 5] = ["proposed", "construction", "abandoned", "platform", "raceway"];

/// Returns true when the `highway` class can be routed over.
#[must_use]
pub fn is_routable_highway(class: &str) -> bool {
    !NON_ROUTABLE.contains(&class)
}

/// Scan a tag list for the `highway` and `oneway` values.
///
/// Returns `None` when the element is not a routable highway.
pub(crate) fn routable_direction<'a, T>(tags: T) -> Option<Oneway>
where
    T: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut highway = None;
    let mut oneway = None;
    for (key, value) in tags {
        match key {
            "highway" => highway = Some(value),
            "oneway" => oneway = Some(value),
            _ => {}
        }
    }
    highway
        .filter(|class| is_routable_highway(class))
        .map(|_| Oneway::from_tag(oneway))
}
