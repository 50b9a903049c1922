//! Validated, indexed family snapshot

use std::collections::{HashMap, HashSet};

use tracing::debug;

use super::error::ValidationError;
use super::person::{Parentage, PartnershipKind, PartnershipRecord, Person, PersonId, Relation};

/// An immutable, validated view of the input people and partnerships
///
/// Construction rejects duplicate or empty ids. Every other anomaly
/// (dangling parents, self-partnerships, duplicate partnerships) is dropped.
#[derive(Debug, Clone, Default)]
pub struct Family {
    people: Vec<Person>,
    index: HashMap<PersonId, usize>,
    parentage: Vec<Parentage>,
    partnerships: Vec<PartnershipRecord>,
}

impl Family {
    /// Validate and index a snapshot of people and partnerships
    pub fn new(
        people: &[Person],
        partnerships: &[PartnershipRecord],
    ) -> Result<Self, ValidationError> {
        let mut normalized: Vec<Person> = Vec::with_capacity(people.len());
        let mut index = HashMap::with_capacity(people.len());

        for (position, person) in people.iter().enumerate() {
            let id = normalize_id(&person.id).ok_or(ValidationError::EmptyId { position })?;
            if index.contains_key(&id) {
                return Err(ValidationError::duplicate(id.0));
            }
            index.insert(id.clone(), position);
            let mut person = person.clone();
            person.id = id;
            normalized.push(person);
        }

        let parentage = normalized
            .iter_mut()
            .map(|person| resolve_parentage(person, &index))
            .collect();

        let mut family = Self {
            people: normalized,
            index,
            parentage,
            partnerships: Vec::new(),
        };
        family.partnerships = family.normalize_partnerships(partnerships);

        debug!(
            people = family.people.len(),
            partnerships = family.partnerships.len(),
            "family indexed"
        );
        Ok(family)
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    /// People in input order
    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn get(&self, id: &PersonId) -> Option<&Person> {
        self.index.get(id).map(|&i| &self.people[i])
    }

    /// Input position of a person
    pub fn position(&self, id: &PersonId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &PersonId) -> bool {
        self.index.contains_key(id)
    }

    /// Normalized parentage of the person at an input position
    pub fn parentage_at(&self, position: usize) -> &Parentage {
        &self.parentage[position]
    }

    pub fn parentage(&self, id: &PersonId) -> Option<&Parentage> {
        self.position(id).map(|i| &self.parentage[i])
    }

    /// Normalized partnerships: canonical pair order, no duplicates
    pub fn partnerships(&self) -> &[PartnershipRecord] {
        &self.partnerships
    }

    /// People carrying the "self" relation, in input order
    pub fn anchors(&self) -> impl Iterator<Item = &Person> {
        self.people.iter().filter(|p| p.is_anchor())
    }

    fn normalize_partnerships(&self, records: &[PartnershipRecord]) -> Vec<PartnershipRecord> {
        let mut seen: HashSet<(PersonId, PersonId)> = HashSet::new();
        let mut out = Vec::new();

        for record in records {
            let (Some(a), Some(b)) = (normalize_id(&record.a), normalize_id(&record.b)) else {
                debug!(a = %record.a, b = %record.b, "dropping partnership with empty id");
                continue;
            };
            if a == b {
                debug!(person = %a, "dropping self-partnership");
                continue;
            }
            if !self.contains(&a) || !self.contains(&b) {
                debug!(a = %a, b = %b, "dropping partnership with unknown person");
                continue;
            }
            let record = PartnershipRecord {
                a,
                b,
                kind: record.kind,
            };
            let (a, b) = record.pair();
            let key = (a.clone(), b.clone());
            if !seen.insert(key.clone()) {
                debug!(a = %key.0, b = %key.1, "merging duplicate partnership");
                continue;
            }
            out.push(PartnershipRecord {
                a: key.0,
                b: key.1,
                kind: record.kind,
            });
        }

        // A declared current spouse of the anchor is a couple even without a record
        if let Some(anchor) = self.anchors().next() {
            for person in &self.people {
                if person.id == anchor.id || person.declared_relation != Some(Relation::Spouse) {
                    continue;
                }
                let record = PartnershipRecord::new(
                    anchor.id.0.clone(),
                    person.id.0.clone(),
                    PartnershipKind::CurrentSpouse,
                );
                let (a, b) = record.pair();
                let key = (a.clone(), b.clone());
                if seen.insert(key.clone()) {
                    debug!(anchor = %anchor.id, spouse = %person.id, "implied spouse partnership");
                    out.push(PartnershipRecord {
                        a: key.0,
                        b: key.1,
                        kind: PartnershipKind::CurrentSpouse,
                    });
                }
            }
        }

        out
    }
}

fn normalize_id(id: &PersonId) -> Option<PersonId> {
    let trimmed = id.0.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PersonId(trimmed.to_string()))
    }
}

/// Drop dangling or self-referential parent ids and classify what is left
fn resolve_parentage(person: &mut Person, index: &HashMap<PersonId, usize>) -> Parentage {
    let resolve = |parent: &Option<PersonId>, role: &str| -> Option<PersonId> {
        let id = parent.as_ref().and_then(normalize_id)?;
        if id == person.id {
            debug!(person = %person.id, role, "dropping self-referential parent");
            return None;
        }
        if !index.contains_key(&id) {
            debug!(person = %person.id, parent = %id, role, "dropping dangling parent");
            return None;
        }
        Some(id)
    };

    let father = resolve(&person.father_id, "father");
    let mut mother = resolve(&person.mother_id, "mother");
    if father.is_some() && father == mother {
        debug!(person = %person.id, "same parent recorded twice, keeping father");
        mother = None;
    }

    person.father_id = father.clone();
    person.mother_id = mother.clone();

    match (father, mother) {
        (Some(father), Some(mother)) => Parentage::Both { father, mother },
        (Some(father), None) => Parentage::Father(father),
        (None, Some(mother)) => Parentage::Mother(mother),
        (None, None) => Parentage::Unknown,
    }
}
