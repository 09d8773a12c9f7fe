/*!
# Vector Export

[`SvgSurface`] is a [`RenderSurface`] that records the shapes of the current
frame and every live text object, and serializes them as a standalone SVG
document. Text extents are estimated from the font size, so label layout is
reproducible without a font rasterizer.
*/

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::style::Color;
use crate::surface::{Aabb2, Rect, RenderSurface, ShapeStyle, TextId, TextSpec, Visibility};

/// Width of one character in ems.
const CHAR_WIDTH_EM: f64 = 0.6;

/// Export configuration
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub width: u32,
    pub height: u32,
    pub title: Option<String>,
    pub background_color: Color,
    pub font_family: String,
    pub font_size: u32,
    pub show_footer: bool,
    /// Extra text appended to the footer (e.g. the rendered region).
    pub footer_note: Option<String>,
    pub provenance_comment: Option<String>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 80,
            title: None,
            background_color: Color(0xffffff),
            font_family: "Arial, sans-serif".to_string(),
            font_size: 12,
            show_footer: true,
            footer_note: None,
            provenance_comment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawnRect {
    pub rect: Rect,
    pub style: ShapeStyle,
    pub origin: [f64; 2],
}

#[derive(Debug, Clone, PartialEq)]
pub struct SvgText {
    pub spec: TextSpec,
    pub position: [f64; 2],
    pub visibility: Visibility,
}

impl SvgText {
    fn size(&self) -> [f64; 2] {
        let chars = self.spec.text.chars().count() as f64;
        [self.spec.font_size * CHAR_WIDTH_EM * chars, self.spec.font_size]
    }
}

pub struct SvgSurface {
    config: ExportConfig,
    origin: [f64; 2],
    style: ShapeStyle,
    rects: Vec<DrawnRect>,
    texts: BTreeMap<TextId, SvgText>,
    next_id: u64,
}

impl SvgSurface {
    pub fn new(config: ExportConfig) -> Self {
        Self {
            config,
            origin: [0.0, 0.0],
            style: ShapeStyle {
                stroke_width: 1.0,
                color: Color::BLACK,
            },
            rects: Vec::new(),
            texts: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Rectangles drawn since the last `clear`.
    pub fn rects(&self) -> &[DrawnRect] {
        &self.rects
    }

    pub fn text(&self, id: TextId) -> Option<&SvgText> {
        self.texts.get(&id)
    }

    pub fn text_count(&self) -> usize {
        self.texts.len()
    }

    pub fn visible_texts(&self) -> impl Iterator<Item = &SvgText> {
        self.texts.values().filter(|t| t.visibility.is_visible())
    }

    pub fn to_svg_string(&self) -> String {
        let (width, height) = (self.config.width, self.config.height);
        let mut out = String::new();
        let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        let _ = writeln!(
            out,
            r#"<svg width="{}" height="{}" viewBox="0 0 {} {}" xmlns="http://www.w3.org/2000/svg">"#,
            width, height, width, height
        );
        if let Some(comment) = &self.config.provenance_comment {
            for line in comment.lines() {
                let _ = writeln!(out, "  <!-- {} -->", line.replace("--", "- -"));
            }
        }
        let _ = writeln!(
            out,
            r#"  <rect width="{}" height="{}" fill="{}"/>"#,
            width, height, self.config.background_color
        );
        if let Some(title) = &self.config.title {
            let _ = writeln!(
                out,
                r#"  <text x="{}" y="{}" font-family="{}" font-size="{}px" text-anchor="middle" font-weight="bold">{}</text>"#,
                width as f64 / 2.0,
                self.config.font_size + 4,
                escape_xml(&self.config.font_family),
                self.config.font_size + 2,
                escape_xml(title)
            );
        }

        for drawn in &self.rects {
            let r = &drawn.rect;
            let _ = writeln!(
                out,
                r#"  <rect x="{}" y="{}" width="{}" height="{}" fill="{}" stroke="{}" stroke-width="{}"/>"#,
                num(r.x + drawn.origin[0]),
                num(r.y + drawn.origin[1]),
                num(r.width),
                num(r.height),
                drawn.style.color,
                drawn.style.color,
                num(drawn.style.stroke_width)
            );
        }

        for text in self.visible_texts() {
            let _ = writeln!(out, "  {}", self.text_element(text));
        }

        if self.config.show_footer {
            let mut footer = format!(
                "annotrack v{} | Generated: {}",
                env!("CARGO_PKG_VERSION"),
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
            );
            if let Some(note) = &self.config.footer_note {
                footer = format!("{} | {}", note, footer);
            }
            let _ = writeln!(
                out,
                r#"  <text x="4" y="{}" font-family="{}" font-size="{}px" fill="gray">{}</text>"#,
                height.saturating_sub(4),
                escape_xml(&self.config.font_family),
                self.config.font_size.saturating_sub(4).max(6),
                escape_xml(&footer)
            );
        }

        out.push_str("</svg>\n");
        out
    }

    fn text_element(&self, text: &SvgText) -> String {
        let anchor = match text.spec.anchor[0] {
            a if a <= 0.0 => "start",
            a if a >= 1.0 => "end",
            _ => "middle",
        };
        let baseline = match text.spec.anchor[1] {
            a if a <= 0.0 => "text-before-edge",
            a if a >= 1.0 => "text-after-edge",
            _ => "middle",
        };
        let x = text.position[0] + self.origin[0];
        let y = text.position[1] + self.origin[1];
        let transform = if text.spec.mirrored {
            format!("translate({} {}) scale(-1,1)", num(x), num(y))
        } else {
            format!("translate({} {})", num(x), num(y))
        };
        format!(
            r#"<text transform="{}" font-family="{}" font-size="{}px" fill="{}" text-anchor="{}" dominant-baseline="{}">{}</text>"#,
            transform,
            escape_xml(&text.spec.font_family),
            num(text.spec.font_size),
            text.spec.fill,
            anchor,
            baseline,
            escape_xml(&text.spec.text)
        )
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        file.write_all(self.to_svg_string().as_bytes())
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

impl RenderSurface for SvgSurface {
    fn clear(&mut self) {
        self.rects.clear();
    }

    fn set_origin(&mut self, origin: [f64; 2]) {
        self.origin = origin;
    }

    fn set_style(&mut self, style: ShapeStyle) {
        self.style = style;
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.rects.push(DrawnRect {
            rect,
            style: self.style,
            origin: self.origin,
        });
    }

    fn create_text(&mut self, spec: TextSpec) -> TextId {
        let id = TextId(self.next_id);
        self.next_id += 1;
        self.texts.insert(
            id,
            SvgText {
                spec,
                position: [0.0, 0.0],
                visibility: Visibility::Visible,
            },
        );
        id
    }

    fn set_text_position(&mut self, id: TextId, x: f64, y: f64) {
        if let Some(text) = self.texts.get_mut(&id) {
            text.position = [x, y];
        }
    }

    fn text_bounds(&self, id: TextId) -> Option<Aabb2> {
        let text = self.texts.get(&id)?;
        let [w, h] = text.size();
        let x = text.position[0] - text.spec.anchor[0] * w;
        let y = text.position[1] - text.spec.anchor[1] * h;
        Some(Aabb2::from_rect(x, y, w, h).translate(self.origin[0], self.origin[1]))
    }

    fn set_text_visibility(&mut self, id: TextId, visibility: Visibility) {
        if let Some(text) = self.texts.get_mut(&id) {
            text.visibility = visibility;
        }
    }

    fn remove_text(&mut self, id: TextId) {
        self.texts.remove(&id);
    }
}

fn num(v: f64) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
