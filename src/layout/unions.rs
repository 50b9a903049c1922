//! Union resolution
//!
//! Merges explicit partnerships with the parent pairs implied by children into
//! one canonical set of unions, and hangs every child under exactly one union.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tracing::debug;

use crate::model::{Family, Parentage, PartnershipKind, PersonId};

use super::config::LayoutConfig;
use super::generation::GenerationMap;
use super::types::{Union, UnionId, UnionMembers};

#[derive(Debug, Default)]
struct Draft {
    kind: Option<PartnershipKind>,
    children: Vec<PersonId>,
}

/// Resolve the canonical union list
pub fn resolve(family: &Family, generations: &GenerationMap, config: &LayoutConfig) -> Vec<Union> {
    let mut drafts: BTreeMap<UnionMembers, Draft> = BTreeMap::new();

    for record in family.partnerships() {
        let key = UnionMembers::couple(record.a.clone(), record.b.clone());
        drafts.entry(key).or_default().kind = Some(record.kind);
    }

    for person in family.people() {
        let key = match family.parentage(&person.id) {
            Some(Parentage::Both { father, mother }) => {
                UnionMembers::couple(father.clone(), mother.clone())
            }
            Some(Parentage::Father(parent)) | Some(Parentage::Mother(parent)) => {
                UnionMembers::Single(parent.clone())
            }
            Some(Parentage::Unknown) | None => continue,
        };
        drafts.entry(key).or_default().children.push(person.id.clone());
    }

    if config.adopt_single_parent_children {
        adopt_single_parent_children(&mut drafts);
    }

    let mut unions: Vec<Union> = drafts
        .into_iter()
        .map(|(members, mut draft)| {
            sort_children(family, &mut draft.children);
            let generation = members
                .ids()
                .into_iter()
                .filter_map(|id| generations.depth(id))
                .min()
                .unwrap_or(0);
            Union {
                id: UnionId::from_index(0),
                members,
                kind: draft.kind,
                children: draft.children,
                generation,
            }
        })
        .collect();

    unions.sort_by(|a, b| {
        a.generation
            .cmp(&b.generation)
            .then_with(|| a.members.ids().cmp(&b.members.ids()))
    });
    for (index, union) in unions.iter_mut().enumerate() {
        union.id = UnionId::from_index(index);
    }

    debug!(unions = unions.len(), "unions resolved");
    unions
}

/// Move children of a lone parent under that parent's couple, when exactly one
/// couple containing the parent already has children
fn adopt_single_parent_children(drafts: &mut BTreeMap<UnionMembers, Draft>) {
    let singles: Vec<UnionMembers> = drafts
        .keys()
        .filter(|k| !k.is_couple())
        .cloned()
        .collect();

    for single in singles {
        let UnionMembers::Single(parent) = &single else {
            continue;
        };
        let mut couples = drafts
            .iter()
            .filter(|(k, d)| k.is_couple() && k.contains(parent) && !d.children.is_empty())
            .map(|(k, _)| k.clone());
        let (Some(target), None) = (couples.next(), couples.next()) else {
            continue;
        };
        if let Some(draft) = drafts.remove(&single) {
            debug!(parent = %parent, children = draft.children.len(), "adopting single-parent children");
            if let Some(couple) = drafts.get_mut(&target) {
                couple.children.extend(draft.children);
            }
        }
    }
}

/// Descending birth-order hint, ties broken by id
fn sort_children(family: &Family, children: &mut [PersonId]) {
    let hint = |id: &PersonId| family.get(id).map_or(0.0, |p| p.birth_order_hint);
    children.sort_by(|a, b| match hint(b).total_cmp(&hint(a)) {
        Ordering::Equal => a.cmp(b),
        other => other,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::generation;
    use crate::model::{PartnershipRecord, Person, Relation};
    use pretty_assertions::assert_eq;

    fn resolve_people(
        people: Vec<Person>,
        partnerships: Vec<PartnershipRecord>,
        config: &LayoutConfig,
    ) -> Vec<Union> {
        let family = Family::new(&people, &partnerships).unwrap();
        let generations = generation::solve(&family, config);
        resolve(&family, &generations, config)
    }

    fn ids(list: &[PersonId]) -> Vec<&str> {
        list.iter().map(|p| p.as_str()).collect()
    }

    #[test]
    fn test_children_sorted_by_age_then_id() {
        let unions = resolve_people(
            vec![
                Person::new("a").with_relation(Relation::Myself),
                Person::new("b"),
                Person::new("d").with_father("a").with_mother("b").with_age(32.0),
                Person::new("c").with_father("a").with_mother("b").with_age(35.0),
                Person::new("f").with_father("a").with_mother("b").with_age(32.0),
            ],
            vec![],
            &LayoutConfig::default(),
        );
        assert_eq!(unions.len(), 1);
        assert_eq!(unions[0].members, UnionMembers::couple("a".into(), "b".into()));
        assert_eq!(unions[0].kind, None);
        assert_eq!(ids(&unions[0].children), vec!["c", "d", "f"]);
        assert_eq!(unions[0].generation, 0);
    }

    #[test]
    fn test_explicit_and_implied_unions_merge() {
        let unions = resolve_people(
            vec![
                Person::new("a"),
                Person::new("b"),
                Person::new("c").with_father("a").with_mother("b"),
            ],
            vec![PartnershipRecord::new("b", "a", PartnershipKind::FormerSpouse)],
            &LayoutConfig::default(),
        );
        assert_eq!(unions.len(), 1);
        assert_eq!(unions[0].kind, Some(PartnershipKind::FormerSpouse));
        assert_eq!(ids(&unions[0].children), vec!["c"]);
    }

    #[test]
    fn test_single_parent_union() {
        let unions = resolve_people(
            vec![Person::new("f"), Person::new("e").with_father("f")],
            vec![],
            &LayoutConfig::default(),
        );
        assert_eq!(unions.len(), 1);
        assert_eq!(unions[0].members, UnionMembers::Single("f".into()));
        assert_eq!(ids(&unions[0].children), vec!["e"]);
    }

    #[test]
    fn test_childless_couple_kept() {
        let unions = resolve_people(
            vec![Person::new("a"), Person::new("b")],
            vec![PartnershipRecord::new("a", "b", PartnershipKind::Partner)],
            &LayoutConfig::default(),
        );
        assert_eq!(unions.len(), 1);
        assert!(unions[0].children.is_empty());
    }

    #[test]
    fn test_canonical_order_and_ids() {
        let unions = resolve_people(
            vec![
                Person::new("gp").with_relation(Relation::Grandparent),
                Person::new("p").with_father("gp"),
                Person::new("q"),
                Person::new("k").with_father("p").with_mother("q"),
            ],
            vec![],
            &LayoutConfig::default(),
        );
        let summary: Vec<(String, i32)> = unions
            .iter()
            .map(|u| (u.id.to_string(), u.generation))
            .collect();
        assert_eq!(
            summary,
            vec![("U0".to_string(), -1), ("U1".to_string(), 0)]
        );
        assert_eq!(unions[0].members, UnionMembers::Single("gp".into()));
    }

    #[test]
    fn test_adopt_single_parent_children() {
        let people = vec![
            Person::new("f"),
            Person::new("m"),
            Person::new("full").with_father("f").with_mother("m"),
            Person::new("half").with_father("f"),
        ];
        let default = resolve_people(people.clone(), vec![], &LayoutConfig::default());
        assert_eq!(default.len(), 2);

        let adopted = resolve_people(
            people,
            vec![],
            &LayoutConfig::default().with_adopt_single_parent_children(true),
        );
        assert_eq!(adopted.len(), 1);
        assert_eq!(ids(&adopted[0].children), vec!["full", "half"]);
    }
}
