//! Uniform hash grid for exact bounded nearest-neighbour queries.
//!
//! Reflected points are arbitrary locations (not cloud members), so the index
//! answers queries for free-standing points. Search is exhaustive over the
//! cells overlapping the query ball, hence exact within `radius`.

use hashbrown::HashMap;
use nalgebra::Point3;

/// Nearest-neighbour hit.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Neighbor {
    pub idx: usize,
    pub dist2: f32,
}

/// Cell-bucketed index over a borrowed slice of positions.
pub struct PointGrid<'a> {
    pts: &'a [Point3<f32>],
    inv_cell: f32,
    buckets: HashMap<[i32; 3], Vec<usize>>,
}

impl<'a> PointGrid<'a> {
    /// Bucket `pts` into cubic cells of edge `cell`.
    pub fn build(pts: &'a [Point3<f32>], cell: f32) -> Self {
        let inv_cell = 1.0 / cell.max(1e-6);
        let mut buckets: HashMap<[i32; 3], Vec<usize>> = HashMap::new();
        for (i, p) in pts.iter().enumerate() {
            buckets.entry(key_of(p, inv_cell)).or_default().push(i);
        }
        Self {
            pts,
            inv_cell,
            buckets,
        }
    }

    pub fn len(&self) -> usize {
        self.pts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pts.is_empty()
    }

    /// Closest indexed point within `radius` of `q`.
    ///
    /// Equal distances resolve to the lower index, so results do not depend
    /// on hash iteration order.
    pub fn nearest_within(&self, q: &Point3<f32>, radius: f32) -> Option<Neighbor> {
        if radius.is_nan() || radius < 0.0 || !q.iter().all(|v| v.is_finite()) {
            return None;
        }
        let r2 = radius * radius;
        let layers = (radius * self.inv_cell).ceil().min(1024.0) as i64;
        let mut best: Option<Neighbor> = None;

        // Wide balls over sparse grids: scanning every bucket is cheaper.
        let span = (2 * layers + 1) as usize;
        if span.saturating_mul(span).saturating_mul(span) > self.buckets.len() {
            for bin in self.buckets.values() {
                self.scan_bin(bin, q, r2, &mut best);
            }
            return best;
        }

        let layers = layers as i32;
        let base = key_of(q, self.inv_cell);
        for dx in -layers..=layers {
            for dy in -layers..=layers {
                for dz in -layers..=layers {
                    let key = [base[0] + dx, base[1] + dy, base[2] + dz];
                    if let Some(bin) = self.buckets.get(&key) {
                        self.scan_bin(bin, q, r2, &mut best);
                    }
                }
            }
        }
        best
    }

    fn scan_bin(&self, bin: &[usize], q: &Point3<f32>, r2: f32, best: &mut Option<Neighbor>) {
        for &j in bin {
            let d2 = (self.pts[j] - q).norm_squared();
            if d2 > r2 {
                continue;
            }
            let better = match *best {
                None => true,
                Some(b) => d2 < b.dist2 || (d2 == b.dist2 && j < b.idx),
            };
            if better {
                *best = Some(Neighbor { idx: j, dist2: d2 });
            }
        }
    }
}

fn key_of(p: &Point3<f32>, inv_cell: f32) -> [i32; 3] {
    [
        (p.x * inv_cell).floor() as i32,
        (p.y * inv_cell).floor() as i32,
        (p.z * inv_cell).floor() as i32,
    ]
}
