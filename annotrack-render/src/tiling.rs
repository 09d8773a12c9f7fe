/*!
# 1D Tile Management

Tiles form a binary hierarchy over the genome: tile `z.p` covers the `p`-th
of `2^z` equal slices of the tileset extent, and its parent is
`(z - 1).(p / 2)`. The track asks a [`TileSource`] which tiles are fetched;
[`TileStore`] is the in-memory source used by the CLI and tests.
*/

use std::collections::{BTreeMap, BTreeSet};

use annotrack_core::{Feature, Scale, TileId, Tileset, TilesetInfo, ZoomLevel};

use crate::labels::TileLabels;

/// A fetched tile together with the labels created for it.
#[derive(Debug)]
pub struct Tile {
    pub id: TileId,
    pub features: Vec<Feature>,
    /// `None` until the track initializes the tile.
    pub labels: Option<TileLabels>,
}

impl Tile {
    pub fn new(id: TileId, features: Vec<Feature>) -> Self {
        Self {
            id,
            features,
            labels: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.labels.is_some()
    }
}

/// Tile fetching and caching collaborator.
pub trait TileSource {
    fn info(&self) -> &TilesetInfo;

    /// Ids of every fetched tile, ascending.
    fn fetched_ids(&self) -> Vec<TileId>;

    fn tile(&self, id: TileId) -> Option<&Tile>;

    fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile>;

    /// Every tile needed for the current viewport has been fetched.
    fn all_visible_tiles_loaded(&self) -> bool;

    /// Whether any ancestor of `id` is among the fetched tiles.
    fn parent_in_fetched(&self, id: TileId) -> bool {
        id.ancestors().any(|ancestor| self.tile(ancestor).is_some())
    }

    /// Recomputes the needed tiles for a viewport and returns the tiles
    /// evicted from the fetched set.
    fn refresh(&mut self, x_scale: &Scale) -> Vec<Tile>;

    /// Ids of tiles fetched since the last call.
    fn take_arrived(&mut self) -> Vec<TileId>;

    /// Tiles dropped outside `refresh` since the last call, such as coarse
    /// tiles superseded once every visible tile has arrived.
    fn take_evicted(&mut self) -> Vec<Tile>;
}

/// Zoom level at which one tile spans roughly `tile_px` pixels.
pub fn zoom_for_viewport(info: &TilesetInfo, x_scale: &Scale) -> ZoomLevel {
    let [d0, d1] = x_scale.domain();
    let span = (d1 - d0).abs();
    let width = x_scale.range_width().abs();
    if span <= 0.0 || width <= 0.0 || !span.is_finite() {
        return 0;
    }
    let px_per_bp = width / span;
    let tiles_across = info.total_length() * px_per_bp / info.tile_px;
    if tiles_across <= 1.0 {
        return 0;
    }
    let zoom = tiles_across.log2().ceil();
    zoom.min(info.max_zoom as f64) as ZoomLevel
}

/// Tiles at `zoom` intersecting the genome-global span `[start, end)`.
pub fn visible_tiles(info: &TilesetInfo, zoom: ZoomLevel, start: f64, end: f64) -> Vec<TileId> {
    let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
    let min = info.min_pos as f64;
    let max = info.max_pos as f64;
    if hi <= min || lo >= max || info.total_length() <= 0.0 {
        return Vec::new();
    }

    let width = info.tile_width(zoom);
    let count = info.tiles_at(zoom);
    let first = ((lo.max(min) - min) / width).floor() as u64;
    let last = (((hi.min(max) - min) / width).ceil() as u64).saturating_sub(1);
    (first.min(count - 1)..=last.min(count - 1))
        .map(|position| TileId::new(zoom, position))
        .collect()
}

/// In-memory tile source over a decoded tileset.
///
/// `refresh` records the tiles needed for the viewport and queues the ones
/// not yet fetched; `deliver_pending` completes the queued fetches.
///
/// Fetched ancestors of needed tiles stand in while the finer tiles load.
/// Once every needed tile is fetched they are evicted.
pub struct TileStore {
    tileset: Tileset,
    fetched: BTreeMap<TileId, Tile>,
    needed: BTreeSet<TileId>,
    pending: BTreeSet<TileId>,
    arrived: Vec<TileId>,
    evicted: Vec<Tile>,
    zoom: ZoomLevel,
}

impl TileStore {
    pub fn new(tileset: Tileset) -> Self {
        Self {
            tileset,
            fetched: BTreeMap::new(),
            needed: BTreeSet::new(),
            pending: BTreeSet::new(),
            arrived: Vec::new(),
            evicted: Vec::new(),
            zoom: 0,
        }
    }

    pub fn tileset(&self) -> &Tileset {
        &self.tileset
    }

    pub fn current_zoom(&self) -> ZoomLevel {
        self.zoom
    }

    pub fn needed_ids(&self) -> Vec<TileId> {
        self.needed.iter().copied().collect()
    }

    pub fn pending_ids(&self) -> Vec<TileId> {
        self.pending.iter().copied().collect()
    }

    /// Fetches a specific tile regardless of the viewport. Returns `false`
    /// if it was already fetched.
    pub fn fetch(&mut self, id: TileId) -> bool {
        if self.fetched.contains_key(&id) {
            return false;
        }
        self.pending.remove(&id);
        let features = self.tileset.tiles.get(&id).cloned().unwrap_or_default();
        log::debug!("tile {} arrived with {} features", id, features.len());
        self.fetched.insert(id, Tile::new(id, features));
        self.arrived.push(id);
        true
    }

    /// Completes every queued fetch; returns how many tiles arrived.
    /// Ancestors superseded by the delivery wait in `take_evicted`.
    pub fn deliver_pending(&mut self) -> usize {
        let pending: Vec<TileId> = std::mem::take(&mut self.pending).into_iter().collect();
        let delivered = pending.into_iter().filter(|&id| self.fetch(id)).count();
        let superseded = self.evict_superseded();
        self.evicted.extend(superseded);
        delivered
    }

    fn is_ancestor_of_needed(&self, id: TileId) -> bool {
        self.needed.iter().any(|needed| id.is_ancestor_of(needed))
    }

    /// Removes every fetched tile outside the needed set, provided the
    /// needed set is non-empty and fully fetched.
    fn evict_superseded(&mut self) -> Vec<Tile> {
        if self.needed.is_empty() || !self.all_visible_tiles_loaded() {
            return Vec::new();
        }
        let superseded: Vec<TileId> = self
            .fetched
            .keys()
            .filter(|id| !self.needed.contains(id))
            .copied()
            .collect();
        if !superseded.is_empty() {
            log::debug!("{} tiles superseded at zoom {}", superseded.len(), self.zoom);
        }
        superseded.iter().filter_map(|id| self.fetched.remove(id)).collect()
    }
}

impl TileSource for TileStore {
    fn info(&self) -> &TilesetInfo {
        &self.tileset.info
    }

    fn fetched_ids(&self) -> Vec<TileId> {
        self.fetched.keys().copied().collect()
    }

    fn tile(&self, id: TileId) -> Option<&Tile> {
        self.fetched.get(&id)
    }

    fn tile_mut(&mut self, id: TileId) -> Option<&mut Tile> {
        self.fetched.get_mut(&id)
    }

    fn all_visible_tiles_loaded(&self) -> bool {
        self.needed.iter().all(|id| self.fetched.contains_key(id))
    }

    fn refresh(&mut self, x_scale: &Scale) -> Vec<Tile> {
        let info = self.tileset.info;
        self.zoom = zoom_for_viewport(&info, x_scale);
        let [start, end] = x_scale.domain();
        self.needed = visible_tiles(&info, self.zoom, start, end).into_iter().collect();

        let missing: Vec<TileId> = self
            .needed
            .iter()
            .filter(|id| !self.fetched.contains_key(id))
            .copied()
            .collect();
        self.pending.retain(|id| self.needed.contains(id));
        self.pending.extend(missing);

        let stale: Vec<TileId> = self
            .fetched
            .keys()
            .filter(|id| !self.needed.contains(id) && !self.is_ancestor_of_needed(**id))
            .copied()
            .collect();
        let mut evicted: Vec<Tile> = stale.iter().filter_map(|id| self.fetched.remove(id)).collect();
        evicted.extend(self.evict_superseded());

        log::debug!(
            "refresh: zoom {} needs {} tiles, {} pending, {} evicted",
            self.zoom,
            self.needed.len(),
            self.pending.len(),
            evicted.len()
        );
        evicted
    }

    fn take_arrived(&mut self) -> Vec<TileId> {
        std::mem::take(&mut self.arrived)
    }

    fn take_evicted(&mut self) -> Vec<Tile> {
        std::mem::take(&mut self.evicted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> TilesetInfo {
        TilesetInfo::new(0, 1024, 4)
    }

    #[test]
    fn zoom_follows_pixel_density() {
        let info = TilesetInfo {
            tile_px: 256.0,
            ..info()
        };
        // whole genome across 256px: one tile
        let scale = Scale::linear([0.0, 1024.0], [0.0, 256.0]);
        assert_eq!(zoom_for_viewport(&info, &scale), 0);
        // whole genome across 1024px: four tiles
        let scale = Scale::linear([0.0, 1024.0], [0.0, 1024.0]);
        assert_eq!(zoom_for_viewport(&info, &scale), 2);
        // clamped at max zoom
        let scale = Scale::linear([0.0, 1.0], [0.0, 1024.0]);
        assert_eq!(zoom_for_viewport(&info, &scale), 4);
    }

    #[test]
    fn visible_tiles_cover_the_span() {
        let ids = visible_tiles(&info(), 2, 300.0, 700.0);
        assert_eq!(ids, vec![TileId::new(2, 1), TileId::new(2, 2)]);
        assert!(visible_tiles(&info(), 2, 2000.0, 3000.0).is_empty());
        assert_eq!(visible_tiles(&info(), 0, -50.0, 5000.0), vec![TileId::new(0, 0)]);
    }

    #[test]
    fn refresh_queues_then_delivers() {
        let mut store = TileStore::new(Tileset::new(info()));
        let scale = Scale::linear([0.0, 1024.0], [0.0, 1024.0]);
        assert!(store.refresh(&scale).is_empty());
        assert_eq!(store.pending_ids().len(), 4);
        assert!(!store.all_visible_tiles_loaded());

        assert_eq!(store.deliver_pending(), 4);
        assert!(store.all_visible_tiles_loaded());
        assert_eq!(store.take_arrived().len(), 4);
        assert!(store.take_arrived().is_empty());
    }

    #[test]
    fn refresh_keeps_ancestors_and_evicts_the_rest() {
        let mut store = TileStore::new(Tileset::new(info()));
        store.fetch(TileId::new(0, 0));
        store.fetch(TileId::new(2, 3));

        // viewport on the first quarter at zoom 2
        let scale = Scale::linear([0.0, 256.0], [0.0, 256.0]);
        let evicted = store.refresh(&scale);
        assert_eq!(store.needed_ids(), vec![TileId::new(2, 0)]);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].id, TileId::new(2, 3));
        assert!(store.tile(TileId::new(0, 0)).is_some());
    }

    #[test]
    fn ancestors_are_evicted_once_finer_tiles_arrive() {
        let mut store = TileStore::new(Tileset::new(info()));
        store.fetch(TileId::new(0, 0));
        store.take_arrived();

        let scale = Scale::linear([0.0, 256.0], [0.0, 256.0]);
        assert!(store.refresh(&scale).is_empty());
        assert!(store.take_evicted().is_empty());

        assert_eq!(store.deliver_pending(), 1);
        assert_eq!(store.fetched_ids(), vec![TileId::new(2, 0)]);
        let evicted = store.take_evicted();
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].id, TileId::new(0, 0));
        assert!(store.take_evicted().is_empty());
    }

    #[test]
    fn refresh_evicts_ancestors_when_nothing_is_missing() {
        let mut store = TileStore::new(Tileset::new(info()));
        store.fetch(TileId::new(0, 0));
        store.fetch(TileId::new(2, 0));

        let scale = Scale::linear([0.0, 256.0], [0.0, 256.0]);
        let evicted = store.refresh(&scale);
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].id, TileId::new(0, 0));
        assert!(store.pending_ids().is_empty());
    }

    #[test]
    fn parent_in_fetched_walks_the_chain() {
        let mut store = TileStore::new(Tileset::new(info()));
        store.fetch(TileId::new(0, 0));
        store.fetch(TileId::new(3, 5));
        assert!(store.parent_in_fetched(TileId::new(3, 5)));
        assert!(!store.parent_in_fetched(TileId::new(0, 0)));
    }
}
