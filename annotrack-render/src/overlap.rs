/*!
# Label Overlap Resolution

Labels entered into an [`ActiveLabelSet`] start out as visible candidates.
Resolving the set hides, for every pair of intersecting boxes, the entry of
lower rank. Rank is importance, then name (lexically earlier wins), then
insertion order (earlier wins), so the outcome depends only on the set
contents.

Candidate pairs come from a sort-and-sweep over box x-extents; the narrow
phase is a strict box intersection test.
*/

use std::cmp::Ordering;

use annotrack_core::TileId;

use crate::surface::{Aabb2, Visibility};

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveLabel {
    pub tile: TileId,
    pub name: String,
    pub importance: f64,
    pub bounds: Aabb2,
}

/// Labels competing for space in the current frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActiveLabelSet {
    entries: Vec<ActiveLabel>,
}

impl ActiveLabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, label: ActiveLabel) {
        self.entries.push(label);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveLabel> {
        self.entries.iter()
    }

    /// `true` when entry `a` is outranked by entry `b`.
    fn loses_to(&self, a: usize, b: usize) -> bool {
        let (ea, eb) = (&self.entries[a], &self.entries[b]);
        let by_rank = eb
            .importance
            .total_cmp(&ea.importance)
            .then_with(|| ea.name.cmp(&eb.name))
            .then_with(|| a.cmp(&b));
        by_rank == Ordering::Greater
    }

    /// Index pairs whose boxes intersect, each pair once as `(lo, hi)`.
    pub fn intersecting_pairs(&self) -> Vec<(usize, usize)> {
        let mut order: Vec<usize> = (0..self.entries.len()).collect();
        order.sort_by(|&a, &b| {
            self.entries[a].bounds.min[0]
                .total_cmp(&self.entries[b].bounds.min[0])
                .then(a.cmp(&b))
        });

        let mut pairs = Vec::new();
        let mut sweep: Vec<usize> = Vec::new();
        for &i in &order {
            let current = &self.entries[i].bounds;
            sweep.retain(|&j| self.entries[j].bounds.max[0] > current.min[0]);
            for &j in &sweep {
                if current.intersects(&self.entries[j].bounds) {
                    pairs.push((i.min(j), i.max(j)));
                }
            }
            sweep.push(i);
        }
        pairs.sort_unstable();
        pairs
    }

    pub fn resolve(self) -> Resolution {
        let mut visibility = vec![Visibility::Visible; self.entries.len()];
        for (a, b) in self.intersecting_pairs() {
            let loser = if self.loses_to(a, b) { a } else { b };
            visibility[loser] = Visibility::Hidden;
        }

        let labels = self
            .entries
            .into_iter()
            .zip(visibility)
            .map(|(entry, visibility)| ResolvedLabel {
                tile: entry.tile,
                name: entry.name,
                visibility,
            })
            .collect();
        Resolution { labels }
    }
}

impl FromIterator<ActiveLabel> for ActiveLabelSet {
    fn from_iter<I: IntoIterator<Item = ActiveLabel>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLabel {
    pub tile: TileId,
    pub name: String,
    pub visibility: Visibility,
}

/// Final visibility of every entry of a resolved set, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    labels: Vec<ResolvedLabel>,
}

impl Resolution {
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedLabel> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn visibility(&self, tile: TileId, name: &str) -> Option<Visibility> {
        self.labels
            .iter()
            .find(|l| l.tile == tile && l.name == name)
            .map(|l| l.visibility)
    }

    pub fn hidden_count(&self) -> usize {
        self.labels
            .iter()
            .filter(|l| l.visibility == Visibility::Hidden)
            .count()
    }
}

/// Resolve one frame's labels.
pub fn hide_overlaps(set: ActiveLabelSet) -> Resolution {
    set.resolve()
}
