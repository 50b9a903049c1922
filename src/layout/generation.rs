//! Generation solver
//!
//! Assigns every person an integer depth by repeated constraint propagation:
//! a child sits one level below each known parent, and partners share a level.
//! The relationship graph may be incomplete or cyclic, so the loop is bounded
//! by a round cap rather than by cycle detection.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::model::{Family, PersonId};

use super::config::LayoutConfig;

/// Depth of every person after propagation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationMap {
    depths: BTreeMap<PersonId, i32>,
    converged: bool,
    anchored: bool,
}

impl GenerationMap {
    pub fn depth(&self, id: &PersonId) -> Option<i32> {
        self.depths.get(id).copied()
    }

    /// Depth relative to the shallowest generation, so the top row is 0
    pub fn row(&self, id: &PersonId) -> Option<i32> {
        self.depth(id).map(|d| d - self.min_depth())
    }

    pub fn min_depth(&self) -> i32 {
        self.depths.values().copied().min().unwrap_or(0)
    }

    pub fn depths(&self) -> &BTreeMap<PersonId, i32> {
        &self.depths
    }

    /// Whether every propagation pass reached a fixed point
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Whether depth 0 belongs to a "self" anchor rather than the median
    pub fn anchored(&self) -> bool {
        self.anchored
    }
}

/// Constraint edges by input position
struct Constraints {
    /// (parent, child)
    lineage: Vec<(usize, usize)>,
    /// partners, in normalized partnership order
    partners: Vec<(usize, usize)>,
    /// Connected component of every person, by representative position
    component: Vec<usize>,
    /// Number of people in each component, indexed by representative
    size: Vec<usize>,
}

impl Constraints {
    fn collect(family: &Family) -> Self {
        let mut lineage = Vec::new();
        for child in 0..family.len() {
            for parent in family.parentage_at(child).parents() {
                if let Some(parent) = family.position(parent) {
                    lineage.push((parent, child));
                }
            }
        }

        let partners = family
            .partnerships()
            .iter()
            .filter_map(|p| Some((family.position(&p.a)?, family.position(&p.b)?)))
            .collect::<Vec<_>>();

        let mut component: Vec<usize> = (0..family.len()).collect();
        for &(a, b) in lineage.iter().chain(&partners) {
            let (ra, rb) = (find(&mut component, a), find(&mut component, b));
            if ra != rb {
                component[ra.max(rb)] = ra.min(rb);
            }
        }
        let mut size = vec![0; family.len()];
        for i in 0..family.len() {
            let root = find(&mut component, i);
            component[i] = root;
            size[root] += 1;
        }

        Self {
            lineage,
            partners,
            component,
            size,
        }
    }

    /// Depth window around `center` that no consistent assignment of the
    /// component can leave
    fn window(&self, person: usize, center: i32) -> (i32, i32) {
        let reach = i32::try_from(self.size[self.component[person]].saturating_sub(1))
            .unwrap_or(i32::MAX);
        (center.saturating_sub(reach), center.saturating_add(reach))
    }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Solve depths for every person in the family
pub fn solve(family: &Family, config: &LayoutConfig) -> GenerationMap {
    let count = family.len();
    let constraints = Constraints::collect(family);
    let max_rounds = config.max_rounds(count);

    let mut depths: Vec<Option<i32>> = vec![None; count];
    let mut pinned = vec![false; count];
    let mut windows: Vec<Option<(i32, i32)>> = vec![None; count];
    for (i, person) in family.people().iter().enumerate() {
        if person.is_anchor() {
            depths[i] = Some(0);
            pinned[i] = true;
            windows[constraints.component[i]] = Some(constraints.window(i, 0));
        }
    }
    let anchored = pinned.iter().any(|&p| p);

    let mut converged = propagate(&mut depths, &pinned, &windows, &constraints, max_rounds);

    // Components without an anchor are seeded one at a time from the relation table.
    // Everyone resolved so far is frozen so a cyclic component cannot keep drifting.
    while let Some(seed) = next_seed(family, &depths) {
        let hint = family.people()[seed]
            .declared_relation
            .as_ref()
            .map_or(0, |r| r.generation_hint());
        debug!(person = %family.people()[seed].id, depth = hint, "seeding from relation hint");
        for (pin, depth) in pinned.iter_mut().zip(&depths) {
            *pin |= depth.is_some();
        }
        depths[seed] = Some(hint);
        let window = &mut windows[constraints.component[seed]];
        if window.is_none() {
            *window = Some(constraints.window(seed, hint));
        }
        converged &= propagate(&mut depths, &pinned, &windows, &constraints, max_rounds);
    }

    let mut resolved: Vec<i32> = depths.into_iter().map(|d| d.unwrap_or(0)).collect();
    if !anchored && !resolved.is_empty() {
        let mut sorted = resolved.clone();
        sorted.sort_unstable();
        let median = sorted[(sorted.len() - 1) / 2];
        for depth in &mut resolved {
            *depth -= median;
        }
    }

    if !converged {
        warn!(
            people = count,
            max_rounds, "generation propagation hit the round cap; relationships may be cyclic"
        );
    }

    let depths = family
        .people()
        .iter()
        .zip(resolved)
        .map(|(person, depth)| (person.id.clone(), depth))
        .collect();

    GenerationMap {
        depths,
        converged,
        anchored,
    }
}

/// Run Jacobi rounds until nothing changes or the cap is reached.
/// Returns whether a fixed point was reached.
///
/// Every write is clamped to the window of the person's component, so a
/// parent cycle oscillates inside that window instead of climbing.
fn propagate(
    depths: &mut [Option<i32>],
    pinned: &[bool],
    windows: &[Option<(i32, i32)>],
    constraints: &Constraints,
    max_rounds: usize,
) -> bool {
    for round in 0..max_rounds {
        let prev = depths.to_vec();
        let mut set = |i: usize, value: i32| {
            if !pinned[i] {
                let value = match windows[constraints.component[i]] {
                    Some((lo, hi)) => value.clamp(lo, hi),
                    None => value,
                };
                depths[i] = Some(value);
            }
        };

        for &(parent, child) in &constraints.lineage {
            if let Some(d) = prev[parent] {
                set(child, d.saturating_add(1));
            }
        }
        for &(parent, child) in &constraints.lineage {
            if let Some(d) = prev[child] {
                set(parent, d.saturating_sub(1));
            }
        }
        for &(a, b) in &constraints.partners {
            match (prev[a], prev[b]) {
                (Some(d), _) => set(b, d),
                (None, Some(d)) => set(a, d),
                (None, None) => {}
            }
        }

        if depths[..] == prev[..] {
            debug!(rounds = round + 1, "generation propagation converged");
            return true;
        }
    }
    false
}

/// First unresolved person with a declared relation, else the first unresolved one
fn next_seed(family: &Family, depths: &[Option<i32>]) -> Option<usize> {
    let mut unresolved = depths
        .iter()
        .enumerate()
        .filter(|(_, d)| d.is_none())
        .map(|(i, _)| i)
        .peekable();
    let first = *unresolved.peek()?;
    Some(
        unresolved
            .find(|&i| family.people()[i].declared_relation.is_some())
            .unwrap_or(first),
    )
}
