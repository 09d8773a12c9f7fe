//! Per-tile label objects.

use std::collections::HashMap;

use annotrack_core::Feature;

use crate::style::TrackStyle;
use crate::surface::{Aabb2, RenderSurface, TextId, TextSpec, Visibility};

/// One feature name rendered as surface text.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text_id: TextId,
    pub name: String,
    pub position: [f64; 2],
    pub visibility: Visibility,
    /// Extent reported by the surface after the last reposition.
    pub bounds: Option<Aabb2>,
}

impl Label {
    /// Moves the text and refreshes the cached bounds.
    pub fn place<S: RenderSurface + ?Sized>(&mut self, surface: &mut S, x: f64, y: f64) {
        self.position = [x, y];
        surface.set_text_position(self.text_id, x, y);
        self.bounds = surface.text_bounds(self.text_id);
    }

    pub fn set_visibility<S: RenderSurface + ?Sized>(&mut self, surface: &mut S, visibility: Visibility) {
        self.visibility = visibility;
        surface.set_text_visibility(self.text_id, visibility);
    }
}

/// Labels owned by a single tile, keyed by feature name.
#[derive(Debug, Default)]
pub struct TileLabels {
    labels: HashMap<String, Label>,
}

impl TileLabels {
    /// Attaches one label per feature to the surface. Labels start hidden
    /// until the next frame places them.
    pub fn create<S: RenderSurface + ?Sized>(surface: &mut S, features: &[Feature], style: &TrackStyle) -> Self {
        let mut labels = HashMap::with_capacity(features.len());
        for feature in features {
            if labels.contains_key(&feature.name) {
                log::debug!("label for {} already created", feature.name);
                continue;
            }
            let text_id = surface.create_text(TextSpec {
                text: feature.name.clone(),
                font_size: style.font_size,
                font_family: style.font_family.clone(),
                fill: style.strand_color(feature.strand),
                anchor: [0.5, 1.0],
                mirrored: style.flip_text,
            });
            surface.set_text_visibility(text_id, Visibility::Hidden);
            labels.insert(
                feature.name.clone(),
                Label {
                    text_id,
                    name: feature.name.clone(),
                    position: [0.0, 0.0],
                    visibility: Visibility::Hidden,
                    bounds: None,
                },
            );
        }
        Self { labels }
    }

    /// Detaches every label from the surface.
    pub fn dispose<S: RenderSurface + ?Sized>(self, surface: &mut S) {
        for label in self.labels.into_values() {
            surface.remove_text(label.text_id);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Label> {
        self.labels.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Label> {
        self.labels.get_mut(name)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.values()
    }

    pub fn hide_all<S: RenderSurface + ?Sized>(&mut self, surface: &mut S) {
        for label in self.labels.values_mut() {
            label.set_visibility(surface, Visibility::Hidden);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_export::{ExportConfig, SvgSurface};
    use annotrack_core::Strand;

    fn feature(name: &str, strand: Strand) -> Feature {
        Feature {
            chrom: "chr1".into(),
            chrom_local_start: 100,
            chrom_local_end: 200,
            name: name.into(),
            importance: 1.0,
            strand,
            exon_starts: vec![100],
            exon_ends: vec![200],
            chrom_offset: 0,
            transcript_id: None,
            gene_id: None,
            gene_type: None,
            description: None,
        }
    }

    #[test]
    fn flip_text_mirrors_created_labels() {
        let mut svg = SvgSurface::new(ExportConfig::default());
        let features = [feature("GATA1", Strand::Forward)];

        let plain = TileLabels::create(&mut svg, &features, &TrackStyle::default());
        let id = plain.get("GATA1").unwrap().text_id;
        assert!(!svg.text(id).unwrap().spec.mirrored);

        let style = TrackStyle {
            flip_text: true,
            ..TrackStyle::default()
        };
        let flipped = TileLabels::create(&mut svg, &features, &style);
        let id = flipped.get("GATA1").unwrap().text_id;
        assert!(svg.text(id).unwrap().spec.mirrored);
    }

    #[test]
    fn labels_start_hidden_in_strand_color() {
        let mut svg = SvgSurface::new(ExportConfig::default());
        let style = TrackStyle::default();
        let features = [feature("A", Strand::Forward), feature("B", Strand::Reverse), feature("A", Strand::Forward)];

        let labels = TileLabels::create(&mut svg, &features, &style);
        assert_eq!(labels.len(), 2);
        assert_eq!(svg.visible_texts().count(), 0);
        let b = svg.text(labels.get("B").unwrap().text_id).unwrap();
        assert_eq!(b.spec.fill, style.reverse_color);
        assert_eq!(b.spec.anchor, [0.5, 1.0]);

        labels.dispose(&mut svg);
        assert_eq!(svg.text_count(), 0);
    }
}
