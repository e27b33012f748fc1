//! Partition selfie identifiers by camera angle.

use crate::types::SelfieType;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Selfie identifiers split into face-angle, body-angle and untagged groups.
///
/// Each group keeps input order; an identifier lands in exactly one group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelfieGroups {
    pub face: Vec<String>,
    pub body: Vec<String>,
    pub unclassified: Vec<String>,
}

impl SelfieGroups {
    pub fn len(&self) -> usize {
        self.face.len() + self.body.len() + self.unclassified.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the angle tags produced at least one split group.
    pub fn has_split_groups(&self) -> bool {
        !self.face.is_empty() || !self.body.is_empty()
    }
}

/// Partition `ids` using the caller's identifier → tag map.
///
/// `front_view`/`side_view` go to the face group, `partial_body`/`full_body`
/// to the body group, and missing or unknown tags to the unclassified group.
/// Repeated identifiers are kept once, at their first position.
pub fn classify<S: AsRef<str>>(ids: &[S], types: &HashMap<String, String>) -> SelfieGroups {
    let mut groups = SelfieGroups::default();
    let mut seen = HashSet::with_capacity(ids.len());

    for id in ids.iter().map(AsRef::as_ref) {
        if !seen.insert(id) {
            continue;
        }
        let tag = types.get(id).and_then(|tag| SelfieType::parse(tag));
        tracing::trace!(id, tag = tag.map_or("unclassified", SelfieType::as_str), "selfie tag");
        let group = match tag {
            Some(t) if t.is_face() => &mut groups.face,
            Some(t) if t.is_body() => &mut groups.body,
            _ => &mut groups.unclassified,
        };
        group.push(id.to_string());
    }

    tracing::debug!(
        face = groups.face.len(),
        body = groups.body.len(),
        unclassified = groups.unclassified.len(),
        "selfies classified"
    );
    groups
}
