//! Property-based invariant tests for the layout engine.
//!
//! Two input families are generated:
//!
//! 1. Arbitrary records: dangling parents, parent cycles, self-partnerships
//!    and several anchors are all allowed. The engine must terminate, place
//!    everyone, never overlap two boxes and produce the same layout twice.
//! 2. Well-formed trees grown from one anchored couple, where every child may
//!    marry someone from outside the family. These must lay out without a
//!    single lint warning.
//!
//! A third family puts one parent cycle next to many unrelated people, which
//! must stay compact and fast.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use family_tree_layout::layout::{self, LintCategory, Point};
use family_tree_layout::{
    layout_family, Family, FamilyLayout, LayoutConfig, PartnershipKind, PartnershipRecord,
    Person, PersonId, Relation,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

const EPSILON: f64 = 1e-9;

fn relation_for(index: u8) -> Option<Relation> {
    match index {
        0 => Some(Relation::Myself),
        1 => Some(Relation::Spouse),
        2 => Some(Relation::FormerSpouse),
        3 => Some(Relation::Sibling),
        4 => Some(Relation::Parent),
        5 => Some(Relation::Grandparent),
        6 => Some(Relation::Child),
        7 => Some(Relation::Grandchild),
        _ => None,
    }
}

fn kind_for(index: u8) -> PartnershipKind {
    match index % 3 {
        0 => PartnershipKind::CurrentSpouse,
        1 => PartnershipKind::FormerSpouse,
        _ => PartnershipKind::Partner,
    }
}

type PersonSeed = (Option<u8>, Option<u8>, u8, u8);

/// Ids range past the number of people so some parents and partners dangle
fn records_strategy() -> impl Strategy<Value = (Vec<Person>, Vec<PartnershipRecord>)> {
    let person = (
        proptest::option::of(0u8..14),
        proptest::option::of(0u8..14),
        0u8..16,
        0u8..90,
    );
    let partnership = (0u8..14, 0u8..14, 0u8..3);
    (
        prop::collection::vec(person, 0..12),
        prop::collection::vec(partnership, 0..6),
    )
        .prop_map(|(seeds, pairs): (Vec<PersonSeed>, Vec<(u8, u8, u8)>)| {
            let people = seeds
                .iter()
                .enumerate()
                .map(|(i, &(father, mother, relation, age))| {
                    let mut person = Person::new(format!("p{}", i)).with_age(f64::from(age));
                    if let Some(father) = father {
                        person = person.with_father(format!("p{}", father));
                    }
                    if let Some(mother) = mother {
                        person = person.with_mother(format!("p{}", mother));
                    }
                    if let Some(relation) = relation_for(relation) {
                        person = person.with_relation(relation);
                    }
                    person
                })
                .collect();
            let partnerships = pairs
                .iter()
                .map(|&(a, b, kind)| {
                    PartnershipRecord::new(format!("p{}", a), format!("p{}", b), kind_for(kind))
                })
                .collect();
            (people, partnerships)
        })
}

/// Grow a tree breadth-first from the couple `p0 + p1`.
///
/// Each couple consumes one script step for its number of children, then one
/// step per child for (married, age).
fn build_tree(script: &[(usize, bool, u8)]) -> (Vec<Person>, Vec<PartnershipRecord>) {
    let mut people = vec![
        Person::new("p0").with_relation(Relation::Myself),
        Person::new("p1"),
    ];
    let mut partnerships = vec![PartnershipRecord::new(
        "p0",
        "p1",
        PartnershipKind::CurrentSpouse,
    )];
    let mut couples = VecDeque::from([("p0".to_string(), "p1".to_string())]);
    let mut steps = script.iter();

    while let Some((father, mother)) = couples.pop_front() {
        let Some(&(children, _, _)) = steps.next() else {
            break;
        };
        for _ in 0..children {
            let Some(&(_, married, age)) = steps.next() else {
                break;
            };
            let child = format!("p{}", people.len());
            people.push(
                Person::new(child.clone())
                    .with_father(father.clone())
                    .with_mother(mother.clone())
                    .with_age(f64::from(age)),
            );
            if married {
                let spouse = format!("p{}", people.len());
                people.push(Person::new(spouse.clone()));
                partnerships.push(PartnershipRecord::new(
                    child.clone(),
                    spouse.clone(),
                    PartnershipKind::CurrentSpouse,
                ));
                couples.push_back((child, spouse));
            }
        }
    }
    (people, partnerships)
}

fn tree_strategy() -> impl Strategy<Value = (Vec<Person>, Vec<PartnershipRecord>)> {
    prop::collection::vec((0usize..4, any::<bool>(), 0u8..90), 0..24)
        .prop_map(|script| build_tree(&script))
}

/// A parent cycle of `len` people followed by `strangers` unrelated people
fn cycle_with_strangers(len: usize, strangers: &[u8]) -> Vec<Person> {
    let mut people: Vec<Person> = (0..len)
        .map(|i| Person::new(format!("c{}", i)).with_father(format!("c{}", (i + 1) % len)))
        .collect();
    people.extend(strangers.iter().enumerate().map(|(i, &relation)| {
        let person = Person::new(format!("s{}", i));
        match relation_for(relation) {
            Some(Relation::Myself) | None => person,
            Some(relation) => person.with_relation(relation),
        }
    }));
    people
}

fn lint(
    people: &[Person],
    partnerships: &[PartnershipRecord],
    config: &LayoutConfig,
) -> (FamilyLayout, Vec<String>) {
    let family = Family::new(people, partnerships).unwrap();
    let layout = layout::compute(&family, config);
    let warnings = layout::lint::check(&family, &layout, config)
        .into_iter()
        .map(|w| format!("{}: {}", w.category, w.message))
        .collect();
    (layout, warnings)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Arbitrary records terminate and are deterministic
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn layout_is_deterministic((people, partnerships) in records_strategy()) {
        let config = LayoutConfig::default();
        let first = layout_family(&people, &partnerships, &config).unwrap();
        let second = layout_family(&people, &partnerships, &config).unwrap();
        prop_assert_eq!(first, second);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Everyone is placed, anchors sit at depth 0
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn everyone_is_placed((people, partnerships) in records_strategy()) {
        let layout = layout_family(&people, &partnerships, &LayoutConfig::default()).unwrap();
        prop_assert_eq!(layout.nodes.len(), people.len());
        prop_assert_eq!(layout.boxes.len(), people.len());
        for person in &people {
            prop_assert!(layout.generations.contains_key(&person.id));
            if person.is_anchor() {
                prop_assert_eq!(layout.generations[&person.id], 0);
            }
        }
        if let Some(min) = layout.nodes.values().map(|n| n.column).reduce(f64::min) {
            prop_assert_eq!(min, 0.0);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. No two nodes of a row are closer than the minimum separation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn rows_never_overlap(
        (people, partnerships) in records_strategy(),
        offset in 0.05f64..0.5,
    ) {
        let config = LayoutConfig::default().with_spouse_offset(offset);
        let layout = layout_family(&people, &partnerships, &config).unwrap();
        let nodes: Vec<_> = layout.nodes.iter().collect();
        for (i, (id_a, a)) in nodes.iter().enumerate() {
            for (id_b, b) in &nodes[i + 1..] {
                if a.row == b.row {
                    prop_assert!(
                        (a.column - b.column).abs() >= config.min_separation() - EPSILON,
                        "{} and {} are {} apart",
                        id_a, id_b, (a.column - b.column).abs()
                    );
                }
            }
        }
    }
}

proptest! {
    #[test]
    fn boxes_stay_inside_bounds((people, partnerships) in records_strategy()) {
        let (layout, warnings) = lint(&people, &partnerships, &LayoutConfig::default());
        let overlap = LintCategory::Overlap.to_string();
        prop_assert!(
            !warnings.iter().any(|w| w.starts_with(&overlap)),
            "{:?}", warnings
        );
        for bounds in layout.boxes.values() {
            let corner = Point::new(bounds.right(), bounds.bottom());
            prop_assert!(layout.bounds.contains(corner));
        }
    }
}

proptest! {
    #[test]
    fn boxes_never_overlap_at_any_spouse_offset(
        (people, partnerships) in records_strategy(),
        offset in 0.05f64..0.5,
    ) {
        let config = LayoutConfig::default().with_spouse_offset(offset);
        let (_, warnings) = lint(&people, &partnerships, &config);
        let overlap = LintCategory::Overlap.to_string();
        prop_assert!(
            !warnings.iter().any(|w| w.starts_with(&overlap)),
            "offset {}: {:?}", offset, warnings
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Well-formed trees are lint-clean
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn well_formed_trees_are_clean((people, partnerships) in tree_strategy()) {
        let (layout, warnings) = lint(&people, &partnerships, &LayoutConfig::default());
        prop_assert!(warnings.is_empty(), "{:?}\n{}", warnings, layout.describe());
        prop_assert!(layout.converged);
    }
}

proptest! {
    #[test]
    fn children_sit_below_parents_in_age_order((people, partnerships) in tree_strategy()) {
        let layout = layout_family(&people, &partnerships, &LayoutConfig::default()).unwrap();
        for person in &people {
            for parent in [&person.father_id, &person.mother_id].into_iter().flatten() {
                prop_assert_eq!(
                    layout.generations[&person.id],
                    layout.generations[parent] + 1
                );
            }
        }
        for union in &layout.unions {
            let columns: Vec<f64> = union
                .children
                .iter()
                .map(|c: &PersonId| layout.nodes[c].column)
                .collect();
            prop_assert!(
                columns.windows(2).all(|w| w[0] < w[1]),
                "siblings of {} out of order: {:?}", union.id, columns
            );
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. A cycle among many unrelated people stays compact
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn cycle_with_strangers_stays_compact(
        len in 2usize..6,
        strangers in prop::collection::vec(0u8..16, 0..80),
    ) {
        let people = cycle_with_strangers(len, &strangers);
        let started = Instant::now();
        let layout = layout_family(&people, &[], &LayoutConfig::default()).unwrap();
        let elapsed = started.elapsed();

        prop_assert_eq!(layout.nodes.len(), people.len());
        let rows: Vec<i32> = layout.nodes.values().map(|n| n.row).collect();
        let span = rows.iter().max().unwrap() - rows.iter().min().unwrap();
        // Relation hints reach two generations either way; the cycle adds its own length
        let bound = 2 * len as i32 + 4;
        prop_assert!(span <= bound, "rows span {} for a {}-cycle", span, len);
        prop_assert!(span as usize <= people.len());
        prop_assert!(elapsed < Duration::from_secs(2), "took {:?}", elapsed);
    }
}
