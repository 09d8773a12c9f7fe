//! Drawing primitives the track needs from a scene graph.

use crate::style::Color;

/// Axis-aligned box in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb2 {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl Aabb2 {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        Aabb2 { min, max }
    }

    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Aabb2::new([x, y], [x + width, y + height])
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }

    /// Strict overlap: boxes sharing only an edge do not intersect.
    pub fn intersects(&self, other: &Aabb2) -> bool {
        self.min[0] < other.max[0]
            && other.min[0] < self.max[0]
            && self.min[1] < other.max[1]
            && other.min[1] < self.max[1]
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Aabb2 {
        Aabb2::new(
            [self.min[0] + dx, self.min[1] + dy],
            [self.max[0] + dx, self.max[1] + dy],
        )
    }
}

/// A filled rectangle in track-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStyle {
    pub stroke_width: f64,
    pub color: Color,
}

/// Handle to a text object owned by a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextId(pub u64);

/// Creation parameters for a label's text object. The anchor is the
/// fractional point of the text box placed at the text position;
/// `[0.5, 1.0]` is bottom-center.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    pub text: String,
    pub font_size: f64,
    pub font_family: String,
    pub fill: Color,
    pub anchor: [f64; 2],
    pub mirrored: bool,
}

/// Labels are either fully shown or fully hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Visible,
    Hidden,
}

impl Visibility {
    pub fn alpha(self) -> f64 {
        match self {
            Visibility::Visible => 1.0,
            Visibility::Hidden => 0.0,
        }
    }

    pub fn is_visible(self) -> bool {
        matches!(self, Visibility::Visible)
    }
}

/// Rendering-surface collaborator.
///
/// Shapes drawn between two `clear` calls make up one frame. Text objects
/// persist across frames until removed.
pub trait RenderSurface {
    fn clear(&mut self);

    /// Track origin on the surface; applies to shapes and text alike.
    fn set_origin(&mut self, origin: [f64; 2]);

    fn set_style(&mut self, style: ShapeStyle);

    fn fill_rect(&mut self, rect: Rect);

    fn create_text(&mut self, spec: TextSpec) -> TextId;

    fn set_text_position(&mut self, id: TextId, x: f64, y: f64);

    /// Rendered extent of a text object in surface coordinates (origin
    /// included). `None` for unknown ids.
    fn text_bounds(&self, id: TextId) -> Option<Aabb2>;

    fn set_text_visibility(&mut self, id: TextId, visibility: Visibility);

    fn remove_text(&mut self, id: TextId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_boxes_do_not_intersect() {
        let a = Aabb2::from_rect(0.0, 0.0, 10.0, 10.0);
        let b = Aabb2::from_rect(10.0, 0.0, 10.0, 10.0);
        let c = Aabb2::from_rect(9.0, 9.0, 10.0, 10.0);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&c));
        assert!(c.intersects(&a));
    }

    #[test]
    fn visibility_alpha() {
        assert_eq!(Visibility::Visible.alpha(), 1.0);
        assert_eq!(Visibility::Hidden.alpha(), 0.0);
    }
}
