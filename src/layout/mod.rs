//! Layout engine for computing person positions and connectors
//!
//! This module takes a validated [`Family`] and runs it through the
//! generation solver, the union resolver, the column assignor, and the
//! connector router, producing a [`FamilyLayout`].

pub mod columns;
pub mod config;
pub mod generation;
pub mod lint;
pub mod routing;
pub mod types;
pub mod unions;

pub use config::{LayoutConfig, MAX_ROUNDS_PER_PERSON};
pub use generation::GenerationMap;
pub use lint::{LintCategory, LintWarning};
pub use types::*;

use std::collections::BTreeMap;

use tracing::debug;

use crate::model::{Family, PartnershipRecord, Person, ValidationError};

/// Compute the full layout of an already validated family
pub fn compute(family: &Family, config: &LayoutConfig) -> FamilyLayout {
    if family.is_empty() {
        return FamilyLayout {
            converged: true,
            ..FamilyLayout::default()
        };
    }

    let generations = generation::solve(family, config);
    debug!(
        people = family.len(),
        converged = generations.converged(),
        "generations solved"
    );

    let unions = unions::resolve(family, &generations, config);
    let nodes = columns::assign_columns(family, &generations, &unions, config);
    let connectors = routing::route_connectors(&nodes, &unions, config);

    let mut layout = FamilyLayout {
        nodes,
        boxes: BTreeMap::new(),
        connectors,
        unions,
        generations: generations.depths().clone(),
        converged: generations.converged(),
        bounds: BoundingBox::zero(),
    };
    layout.compute_geometry(config);
    debug!(
        width = layout.bounds.width,
        height = layout.bounds.height,
        "layout computed"
    );
    layout
}

/// Validate the records and compute their layout
pub fn layout_family(
    people: &[Person],
    partnerships: &[PartnershipRecord],
    config: &LayoutConfig,
) -> Result<FamilyLayout, ValidationError> {
    let family = Family::new(people, partnerships)?;
    Ok(compute(&family, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Relation;

    #[test]
    fn test_empty_input() {
        let layout = layout_family(&[], &[], &LayoutConfig::default()).unwrap();
        assert!(layout.nodes.is_empty());
        assert!(layout.connectors.is_empty());
        assert!(layout.unions.is_empty());
        assert_eq!(layout.bounds, BoundingBox::zero());
    }

    #[test]
    fn test_single_person_at_origin() {
        let layout = layout_family(&[Person::new("solo")], &[], &LayoutConfig::default()).unwrap();
        assert_eq!(layout.node("solo"), Some(&Node::new(0.0, 0)));
        assert!(layout.connectors.is_empty());
        assert_eq!(layout.bounds, BoundingBox::new(-64.0, 0.0, 128.0, 48.0));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = layout_family(
            &[Person::new("a"), Person::new("a")],
            &[],
            &LayoutConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::duplicate("a"));
    }

    #[test]
    fn test_pipeline_is_deterministic() {
        let people = vec![
            Person::new("me")
                .with_relation(Relation::Myself)
                .with_father("dad")
                .with_mother("mum")
                .with_age(40.0),
            Person::new("dad").with_relation(Relation::Parent),
            Person::new("mum").with_relation(Relation::Parent),
            Person::new("sis").with_father("dad").with_mother("mum").with_age(38.0),
            Person::new("kid").with_father("me").with_age(8.0),
        ];
        let config = LayoutConfig::default();
        let first = layout_family(&people, &[], &config).unwrap();
        let second = layout_family(&people, &[], &config).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.describe(), second.describe());
    }
}
