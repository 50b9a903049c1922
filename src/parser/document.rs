//! Family document structure
//!
//! A document is a TOML file with `[[person]]` and `[[partnership]]` arrays
//! and an optional `[layout]` table overriding layout defaults.

use serde::Deserialize;

use crate::layout::LayoutConfig;
use crate::model::{PartnershipKind, PartnershipRecord, Person, Relation};

/// A parsed family document
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    #[serde(default, rename = "person")]
    pub people: Vec<PersonEntry>,
    #[serde(default, rename = "partnership")]
    pub partnerships: Vec<PartnershipEntry>,
    #[serde(default)]
    pub layout: Option<LayoutOverrides>,
}

/// One `[[person]]` entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersonEntry {
    pub id: String,
    pub name: Option<String>,
    pub relation: Option<String>,
    #[serde(alias = "birth_order")]
    pub age: Option<f64>,
    #[serde(default = "default_alive")]
    pub alive: bool,
    pub death_label: Option<String>,
    pub father: Option<String>,
    pub mother: Option<String>,
}

fn default_alive() -> bool {
    true
}

/// One `[[partnership]]` entry
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartnershipEntry {
    pub a: String,
    pub b: String,
    #[serde(default)]
    pub kind: PartnershipKind,
}

/// Optional `[layout]` table; unset keys keep the caller's values
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutOverrides {
    pub column_width: Option<f64>,
    pub row_height: Option<f64>,
    pub node_width: Option<f64>,
    pub node_height: Option<f64>,
    pub spouse_offset: Option<f64>,
    pub union_bar_offset: Option<f64>,
    pub rounds_per_person: Option<usize>,
    pub adopt_single_parent_children: Option<bool>,
}

impl LayoutOverrides {
    pub fn apply(&self, mut config: LayoutConfig) -> LayoutConfig {
        let column_width = self.column_width.unwrap_or(config.column_width);
        let row_height = self.row_height.unwrap_or(config.row_height);
        config = config.with_cell_size(column_width, row_height);

        let width = self.node_width.unwrap_or(config.node_size.0);
        let height = self.node_height.unwrap_or(config.node_size.1);
        config = config.with_node_size(width, height);

        if let Some(offset) = self.spouse_offset {
            config = config.with_spouse_offset(offset);
        }
        if let Some(offset) = self.union_bar_offset {
            config = config.with_union_bar_offset(offset);
        }
        if let Some(rounds) = self.rounds_per_person {
            config = config.with_rounds_per_person(rounds);
        }
        if let Some(adopt) = self.adopt_single_parent_children {
            config = config.with_adopt_single_parent_children(adopt);
        }
        config
    }
}

impl PersonEntry {
    pub fn to_person(&self) -> Person {
        let mut person = Person::new(self.id.clone());
        if let Some(name) = &self.name {
            person = person.with_name(name.clone());
        }
        if let Some(relation) = &self.relation {
            person = person.with_relation(Relation::parse(relation));
        }
        if let Some(age) = self.age {
            person = person.with_age(age);
        }
        if let Some(father) = &self.father {
            person = person.with_father(father.clone());
        }
        if let Some(mother) = &self.mother {
            person = person.with_mother(mother.clone());
        }
        if !self.alive {
            person = person.deceased(self.death_label.clone());
        }
        person
    }
}

impl Document {
    /// Convert the entries into model records, in document order
    pub fn records(&self) -> (Vec<Person>, Vec<PartnershipRecord>) {
        let people = self.people.iter().map(PersonEntry::to_person).collect();
        let partnerships = self
            .partnerships
            .iter()
            .map(|p| PartnershipRecord::new(p.a.clone(), p.b.clone(), p.kind))
            .collect();
        (people, partnerships)
    }

    /// `base` with this document's `[layout]` overrides applied
    pub fn layout_config(&self, base: LayoutConfig) -> LayoutConfig {
        match &self.layout {
            Some(overrides) => overrides.apply(base),
            None => base,
        }
    }
}
