//! The gene annotation track: tile lifecycle and per-frame redraw.

use serde::Serialize;

use annotrack_core::{CoordinateMapper, Scale, TileId, ValueScale};

use crate::glyph::{draw_feature, FeatureLayout};
use crate::labels::TileLabels;
use crate::lod::GlyphKind;
use crate::overlap::{ActiveLabel, ActiveLabelSet};
use crate::style::{StyleError, TrackStyle};
use crate::surface::{RenderSurface, Visibility};
use crate::tiling::{Tile, TileSource};

/// Summary of the last redraw.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FrameStats {
    pub tiles_drawn: usize,
    pub tiles_deduplicated: usize,
    pub blocks: usize,
    pub exon_structures: usize,
    pub skipped_features: usize,
    pub active_labels: usize,
    pub hidden_labels: usize,
    pub max_importance: f64,
    pub all_visible_tiles_loaded: bool,
}

pub struct GeneAnnotationsTrack<S: TileSource, R: RenderSurface> {
    source: S,
    surface: R,
    style: TrackStyle,
    position: [f64; 2],
    dimensions: [f64; 2],
    x_scale: Scale,
    y_scale: Scale,
    stats: FrameStats,
}

impl<S: TileSource, R: RenderSurface> GeneAnnotationsTrack<S, R> {
    /// The initial x scale spans the whole tileset over the track width.
    pub fn new(source: S, surface: R, style: TrackStyle, dimensions: [f64; 2]) -> Result<Self, StyleError> {
        style.validate()?;
        let info = source.info();
        let x_scale = Scale::linear([info.min_pos as f64, info.max_pos as f64], [0.0, dimensions[0]]);
        let y_scale = Scale::linear([0.0, dimensions[1]], [0.0, dimensions[1]]);
        Ok(Self {
            source,
            surface,
            style,
            position: [0.0, 0.0],
            dimensions,
            x_scale,
            y_scale,
            stats: FrameStats::default(),
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    pub fn style(&self) -> &TrackStyle {
        &self.style
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn x_scale(&self) -> &Scale {
        &self.x_scale
    }

    pub fn y_scale(&self) -> &Scale {
        &self.y_scale
    }

    pub fn dimensions(&self) -> [f64; 2] {
        self.dimensions
    }

    pub fn into_parts(self) -> (S, R) {
        (self.source, self.surface)
    }

    /// Current visibility of a tile's label, if the tile is initialized.
    pub fn label_visibility(&self, id: TileId, name: &str) -> Option<Visibility> {
        self.source
            .tile(id)?
            .labels
            .as_ref()?
            .get(name)
            .map(|label| label.visibility)
    }

    /// Creates the labels of a fetched tile and redraws. Returns `false` if
    /// the tile is unknown or already initialized.
    pub fn init_tile(&mut self, id: TileId) -> bool {
        let created = self.create_labels(id);
        if created {
            self.draw();
        }
        created
    }

    fn create_labels(&mut self, id: TileId) -> bool {
        let Some(tile) = self.source.tile_mut(id) else {
            log::warn!("init_tile: tile {} is not fetched", id);
            return false;
        };
        if tile.is_initialized() {
            log::debug!("init_tile: tile {} already initialized", id);
            return false;
        }
        tile.labels = Some(TileLabels::create(&mut self.surface, &tile.features, &self.style));
        true
    }

    /// Detaches every label owned by `tile` from the surface.
    pub fn destroy_tile(&mut self, tile: Tile) {
        if let Some(labels) = tile.labels {
            log::debug!("destroying {} labels of tile {}", labels.len(), tile.id);
            labels.dispose(&mut self.surface);
        }
    }

    /// Destroys tiles the source dropped and initializes every tile that
    /// arrived since the last call, then redraws once. Returns the number of
    /// tiles initialized.
    pub fn sync_tiles(&mut self) -> usize {
        let evicted = self.source.take_evicted();
        let destroyed = evicted.len();
        for tile in evicted {
            self.destroy_tile(tile);
        }
        let arrived = self.source.take_arrived();
        let initialized = arrived.into_iter().filter(|&id| self.create_labels(id)).count();
        if initialized > 0 || destroyed > 0 {
            self.draw();
        }
        initialized
    }

    pub fn set_position(&mut self, position: [f64; 2]) {
        self.position = position;
        self.draw();
    }

    pub fn set_dimensions(&mut self, dimensions: [f64; 2]) {
        self.dimensions = dimensions;
        self.draw();
    }

    /// Installs new scales, refreshes the tile source for the viewport and
    /// redraws. Evicted tiles are destroyed.
    pub fn zoomed(&mut self, x_scale: Scale, y_scale: Scale) {
        self.x_scale = x_scale;
        self.y_scale = y_scale;
        for tile in self.source.refresh(&self.x_scale) {
            self.destroy_tile(tile);
        }
        self.draw();
    }

    pub fn draw(&mut self) {
        self.surface.clear();
        self.surface.set_origin(self.position);

        let ids = self.source.fetched_ids();
        let value_scale = ValueScale::from_features(
            ids.iter()
                .filter_map(|&id| self.source.tile(id))
                .flat_map(|tile| tile.features.iter()),
            self.style.glyph_size_range,
        );
        let mapper = CoordinateMapper::new(&self.x_scale);
        let height = self.dimensions[1];

        let mut stats = FrameStats {
            max_importance: value_scale.max_importance(),
            all_visible_tiles_loaded: self.source.all_visible_tiles_loaded(),
            ..FrameStats::default()
        };
        let mut active = ActiveLabelSet::new();

        for id in ids {
            let deduplicated = self.source.parent_in_fetched(id);
            let Some(Tile { features, labels, .. }) = self.source.tile_mut(id) else {
                continue;
            };

            if deduplicated {
                stats.tiles_deduplicated += 1;
                if let Some(labels) = labels.as_mut() {
                    labels.hide_all(&mut self.surface);
                }
                continue;
            }
            stats.tiles_drawn += 1;

            for feature in features.iter() {
                let layout = FeatureLayout::compute(feature, &mapper, &self.style, height);
                let label = labels.as_mut().and_then(|l| l.get_mut(&feature.name));

                match draw_feature(&mut self.surface, feature, &layout, &mapper, &value_scale, &self.style) {
                    Ok(GlyphKind::Block) => stats.blocks += 1,
                    Ok(GlyphKind::Exons) => stats.exon_structures += 1,
                    Err(e) => {
                        log::warn!("tile {}: skipping {}: {}", id, feature.name, e);
                        stats.skipped_features += 1;
                        if let Some(label) = label {
                            label.set_visibility(&mut self.surface, Visibility::Hidden);
                        }
                        continue;
                    }
                }

                // tiles without labels still draw their glyphs
                let Some(label) = label else { continue };
                label.place(&mut self.surface, layout.screen_middle, layout.text_y);
                label.set_visibility(&mut self.surface, Visibility::Visible);
                if let Some(bounds) = label.bounds {
                    active.push(ActiveLabel {
                        tile: id,
                        name: feature.name.clone(),
                        importance: feature.importance,
                        bounds,
                    });
                }
            }
        }

        stats.active_labels = active.len();
        let resolution = active.resolve();
        stats.hidden_labels = resolution.hidden_count();
        for resolved in resolution.iter().filter(|r| r.visibility == Visibility::Hidden) {
            if let Some(label) = self
                .source
                .tile_mut(resolved.tile)
                .and_then(|tile| tile.labels.as_mut())
                .and_then(|labels| labels.get_mut(&resolved.name))
            {
                label.set_visibility(&mut self.surface, Visibility::Hidden);
            }
        }

        log::debug!(
            "frame: {} tiles drawn, {} deduplicated, {} blocks, {} exon structures, {} skipped, {}/{} labels hidden, max importance {}",
            stats.tiles_drawn,
            stats.tiles_deduplicated,
            stats.blocks,
            stats.exon_structures,
            stats.skipped_features,
            stats.hidden_labels,
            stats.active_labels,
            stats.max_importance
        );
        self.stats = stats;
    }
}
