//! People, relation labels and partnership records

use std::fmt;

use serde::Deserialize;

/// Stable identifier of a person
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonId(pub String);

impl PersonId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PersonId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Declared relation of a person to the "self" anchor
///
/// Only used as a fallback generation hint and for labels; structure always
/// wins over what the relation claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    Myself,
    Spouse,
    FormerSpouse,
    Sibling,
    Parent,
    Grandparent,
    Child,
    ChildSpouse,
    Grandchild,
    GrandchildSpouse,
    Other(String),
}

impl Relation {
    /// Parse a free-form relation label. Unknown labels become `Other`.
    pub fn parse(label: &str) -> Self {
        let normalized = label
            .trim()
            .to_ascii_lowercase()
            .replace(['_', ' '], "-");
        match normalized.as_str() {
            "self" | "me" | "myself" => Relation::Myself,
            "spouse" | "current-spouse" | "husband" | "wife" => Relation::Spouse,
            "former-spouse" | "ex-spouse" | "ex-husband" | "ex-wife" => Relation::FormerSpouse,
            "sibling" | "brother" | "sister" => Relation::Sibling,
            "parent" | "father" | "mother" => Relation::Parent,
            "grandparent" | "grandfather" | "grandmother" => Relation::Grandparent,
            "child" | "son" | "daughter" => Relation::Child,
            "child-spouse" | "son-in-law" | "daughter-in-law" => Relation::ChildSpouse,
            "grandchild" | "grandson" | "granddaughter" => Relation::Grandchild,
            "grandchild-spouse" => Relation::GrandchildSpouse,
            _ => Relation::Other(label.trim().to_string()),
        }
    }

    /// Static generation offset relative to the anchor
    pub fn generation_hint(&self) -> i32 {
        match self {
            Relation::Grandparent => -2,
            Relation::Parent => -1,
            Relation::Myself
            | Relation::Spouse
            | Relation::FormerSpouse
            | Relation::Sibling
            | Relation::Other(_) => 0,
            Relation::Child | Relation::ChildSpouse => 1,
            Relation::Grandchild | Relation::GrandchildSpouse => 2,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &str {
        match self {
            Relation::Myself => "self",
            Relation::Spouse => "spouse",
            Relation::FormerSpouse => "former spouse",
            Relation::Sibling => "sibling",
            Relation::Parent => "parent",
            Relation::Grandparent => "grandparent",
            Relation::Child => "child",
            Relation::ChildSpouse => "child's spouse",
            Relation::Grandchild => "grandchild",
            Relation::GrandchildSpouse => "grandchild's spouse",
            Relation::Other(label) => label,
        }
    }
}

/// A person as supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: PersonId,
    pub display_name: String,
    /// Age or birth-order proxy; only used to order siblings
    pub birth_order_hint: f64,
    pub is_alive: bool,
    pub death_label: Option<String>,
    pub father_id: Option<PersonId>,
    pub mother_id: Option<PersonId>,
    pub declared_relation: Option<Relation>,
}

impl Person {
    /// Create a living person whose display name is the id
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            display_name: id.clone(),
            id: PersonId(id),
            birth_order_hint: 0.0,
            is_alive: true,
            death_label: None,
            father_id: None,
            mother_id: None,
            declared_relation: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    pub fn with_age(mut self, age: f64) -> Self {
        self.birth_order_hint = age;
        self
    }

    pub fn with_father(mut self, father: impl Into<String>) -> Self {
        self.father_id = Some(PersonId(father.into()));
        self
    }

    pub fn with_mother(mut self, mother: impl Into<String>) -> Self {
        self.mother_id = Some(PersonId(mother.into()));
        self
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.declared_relation = Some(relation);
        self
    }

    pub fn deceased(mut self, label: Option<String>) -> Self {
        self.is_alive = false;
        self.death_label = label;
        self
    }

    /// Whether this person is a "self" anchor
    pub fn is_anchor(&self) -> bool {
        matches!(self.declared_relation, Some(Relation::Myself))
    }
}

/// Kind of an explicit partnership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartnershipKind {
    CurrentSpouse,
    FormerSpouse,
    #[default]
    Partner,
}

/// An explicit, user-declared partnership between two people
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartnershipRecord {
    pub a: PersonId,
    pub b: PersonId,
    pub kind: PartnershipKind,
}

impl PartnershipRecord {
    pub fn new(a: impl Into<String>, b: impl Into<String>, kind: PartnershipKind) -> Self {
        Self {
            a: PersonId(a.into()),
            b: PersonId(b.into()),
            kind,
        }
    }

    /// The unordered pair in canonical (sorted) order
    pub fn pair(&self) -> (&PersonId, &PersonId) {
        if self.a <= self.b {
            (&self.a, &self.b)
        } else {
            (&self.b, &self.a)
        }
    }
}

/// Which parents of a person are known after normalization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parentage {
    Unknown,
    Father(PersonId),
    Mother(PersonId),
    Both { father: PersonId, mother: PersonId },
}

impl Parentage {
    /// Iterate over the known parents
    pub fn parents(&self) -> impl Iterator<Item = &PersonId> {
        let (first, second) = match self {
            Parentage::Unknown => (None, None),
            Parentage::Father(p) | Parentage::Mother(p) => (Some(p), None),
            Parentage::Both { father, mother } => (Some(father), Some(mother)),
        };
        first.into_iter().chain(second)
    }

    /// The single known parent, if exactly one is known
    pub fn single(&self) -> Option<&PersonId> {
        match self {
            Parentage::Father(p) | Parentage::Mother(p) => Some(p),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_parse_aliases() {
        assert_eq!(Relation::parse("Self"), Relation::Myself);
        assert_eq!(Relation::parse("current spouse"), Relation::Spouse);
        assert_eq!(Relation::parse("former_spouse"), Relation::FormerSpouse);
        assert_eq!(Relation::parse("Grandmother"), Relation::Grandparent);
        assert_eq!(Relation::parse("daughter-in-law"), Relation::ChildSpouse);
        assert_eq!(
            Relation::parse(" cousin "),
            Relation::Other("cousin".to_string())
        );
    }

    #[test]
    fn test_generation_hints() {
        assert_eq!(Relation::Grandparent.generation_hint(), -2);
        assert_eq!(Relation::Parent.generation_hint(), -1);
        assert_eq!(Relation::Sibling.generation_hint(), 0);
        assert_eq!(Relation::Other("x".into()).generation_hint(), 0);
        assert_eq!(Relation::ChildSpouse.generation_hint(), 1);
        assert_eq!(Relation::GrandchildSpouse.generation_hint(), 2);
    }

    #[test]
    fn test_partnership_pair_is_sorted() {
        let record = PartnershipRecord::new("zoe", "adam", PartnershipKind::Partner);
        let (a, b) = record.pair();
        assert_eq!(a.as_str(), "adam");
        assert_eq!(b.as_str(), "zoe");
    }

    #[test]
    fn test_parentage_parents() {
        let both = Parentage::Both {
            father: "f".into(),
            mother: "m".into(),
        };
        let ids: Vec<&str> = both.parents().map(|p| p.as_str()).collect();
        assert_eq!(ids, vec!["f", "m"]);
        assert!(both.single().is_none());
        assert_eq!(Parentage::Mother("m".into()).single().map(|p| p.as_str()), Some("m"));
        assert_eq!(Parentage::Unknown.parents().count(), 0);
    }
}
