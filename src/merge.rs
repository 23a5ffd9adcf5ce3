//! Merging of duplicate symmetry candidates.
//!
//! Two candidates are duplicates when their normals agree within an angle,
//! their planes are within an offset of each other, and (unless disabled)
//! their reference points are close. Duplicates are closed transitively with
//! a disjoint-set forest. Each cluster keeps its lowest id.

use crate::detector::params::MergeParams;
use crate::symmetry::ReflectionalSymmetry;
use nalgebra::Point3;

/// Union-find over `0..n` with path compression and union by rank.
#[derive(Clone, Debug)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = x;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Join the sets of `a` and `b`. Returns false if they already shared one.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            }
        }
        true
    }
}

/// Duplicate test between two candidates and their reference points.
pub fn symmetries_similar(
    a: &ReflectionalSymmetry,
    b: &ReflectionalSymmetry,
    ref_a: &Point3<f32>,
    ref_b: &Point3<f32>,
    params: &MergeParams,
) -> bool {
    if a.normal_angle(b) >= params.max_normal_angle_rad {
        return false;
    }
    if a.distance_to(b) >= params.max_distance {
        return false;
    }
    params.max_reference_point_distance < 0.0
        || (ref_a - ref_b).norm() < params.max_reference_point_distance
}

/// Survivors and clusters of one merge pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Lowest id of each cluster, ascending.
    pub kept: Vec<usize>,
    /// Member ids of each cluster in ascending order, parallel to `kept`.
    pub clusters: Vec<Vec<usize>>,
}

/// Merge the candidates listed in `ids`.
///
/// `reference_points` is indexed by candidate id like `symmetries`; a
/// missing entry falls back to the candidate's origin. Ids out of range and
/// repeated ids are ignored.
pub fn merge_duplicate_symmetries_subset(
    symmetries: &[ReflectionalSymmetry],
    reference_points: &[Point3<f32>],
    ids: &[usize],
    params: &MergeParams,
) -> MergeOutcome {
    let mut ids: Vec<usize> = ids
        .iter()
        .copied()
        .filter(|&id| id < symmetries.len())
        .collect();
    ids.sort_unstable();
    ids.dedup();
    let reference = |id: usize| reference_points.get(id).unwrap_or(symmetries[id].origin());

    let mut sets = DisjointSet::new(ids.len());
    for a in 0..ids.len() {
        for b in (a + 1)..ids.len() {
            let (ia, ib) = (ids[a], ids[b]);
            if symmetries_similar(
                &symmetries[ia],
                &symmetries[ib],
                reference(ia),
                reference(ib),
                params,
            ) {
                sets.union(a, b);
            }
        }
    }

    let mut outcome = MergeOutcome::default();
    let mut cluster_of_root: Vec<Option<usize>> = vec![None; ids.len()];
    for (pos, &id) in ids.iter().enumerate() {
        let root = sets.find(pos);
        match cluster_of_root[root] {
            Some(c) => outcome.clusters[c].push(id),
            None => {
                cluster_of_root[root] = Some(outcome.kept.len());
                outcome.kept.push(id);
                outcome.clusters.push(vec![id]);
            }
        }
    }
    outcome
}

/// Merge over every candidate.
pub fn merge_duplicate_symmetries(
    symmetries: &[ReflectionalSymmetry],
    reference_points: &[Point3<f32>],
    params: &MergeParams,
) -> MergeOutcome {
    let all: Vec<usize> = (0..symmetries.len()).collect();
    merge_duplicate_symmetries_subset(symmetries, reference_points, &all, params)
}
