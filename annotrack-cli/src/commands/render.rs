//! Render command implementation - draw a tileset region as an SVG gene track

use anyhow::{Context, Result};
use std::path::PathBuf;

use annotrack_core::{ChromSizes, Scale, ScaleKind, Tileset};
use annotrack_render::{x_scale_for, ExportConfig, GeneAnnotationsTrack, SvgSurface, TileStore};

use super::{load_chrom_sizes, require_file};
use crate::config::Config;
use crate::error::CliError;

pub struct RenderArgs {
    pub tileset: PathBuf,
    pub out: PathBuf,
    pub region: Option<String>,
    pub chrom_sizes: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub title: Option<String>,
    pub no_footer: bool,
    pub stats: bool,
}

pub fn execute(config: &Config, args: RenderArgs) -> Result<()> {
    log::info!("Starting track rendering");
    log::info!("Input tileset: {}", args.tileset.display());
    log::info!("Output file: {}", args.out.display());

    require_file(&args.tileset)?;
    let tileset = Tileset::from_path(&args.tileset).map_err(CliError::from)?;
    if tileset.report.skipped > 0 || tileset.report.duplicate_names > 0 {
        log::warn!(
            "{} malformed rows and {} duplicate names were skipped while loading",
            tileset.report.skipped,
            tileset.report.duplicate_names
        );
    }

    let sizes = args.chrom_sizes.as_deref().map(load_chrom_sizes).transpose()?;
    let region = args.region.clone().or_else(|| config.general.default_region.clone());
    let (mut start, end) = match &region {
        Some(r) => parse_region(r, sizes.as_ref())?,
        None => (tileset.info.min_pos as f64, tileset.info.max_pos as f64),
    };
    let style = config.track.clone();
    if style.x_scale == ScaleKind::Log {
        start = start.max(1.0);
    }

    let width = args.width.unwrap_or(config.render.width);
    let height = args.height.unwrap_or(config.render.height);
    log::info!(
        "Region: {}-{} ({}), {}x{} px",
        start,
        end,
        format_bp(end - start),
        width,
        height
    );

    let export = ExportConfig {
        width,
        height,
        title: args.title.clone().or_else(|| config.render.title.clone()),
        background_color: config.render.background,
        font_family: style.font_family.clone(),
        show_footer: config.render.footer && !args.no_footer,
        footer_note: Some(format!("Region: {:.0}-{:.0}", start, end)),
        provenance_comment: Some(format!(
            "annotrack v{} tileset={} region={:.0}-{:.0}",
            env!("CARGO_PKG_VERSION"),
            args.tileset.display(),
            start,
            end
        )),
        ..ExportConfig::default()
    };

    let x_scale = x_scale_for(&style, start, end, width as f64).map_err(|e| CliError::rendering(e.to_string()))?;
    let y_scale = Scale::linear([0.0, height as f64], [0.0, height as f64]);

    let dimensions = [width as f64, height as f64];
    let mut track = GeneAnnotationsTrack::new(TileStore::new(tileset), SvgSurface::new(export), style, dimensions)
        .map_err(CliError::from)?;
    track.zoomed(x_scale, y_scale);
    let delivered = track.source_mut().deliver_pending();
    let initialized = track.sync_tiles();
    log::debug!("{} tiles delivered, {} initialized", delivered, initialized);

    let stats = track.stats();
    log::info!(
        "Drew {} tiles ({} deduplicated): {} blocks, {} exon structures, {} of {} labels hidden",
        stats.tiles_drawn,
        stats.tiles_deduplicated,
        stats.blocks,
        stats.exon_structures,
        stats.hidden_labels,
        stats.active_labels
    );
    if stats.skipped_features > 0 {
        log::warn!("{} features skipped", stats.skipped_features);
    }

    track
        .surface()
        .write_to_file(&args.out)
        .with_context(|| format!("Failed to write SVG: {}", args.out.display()))?;

    if args.stats || config.general.print_stats {
        println!("{}", serde_json::to_string_pretty(stats)?);
    }

    log::info!("Rendering completed successfully");
    Ok(())
}

/// Parse a length such as `1500`, `1,500`, `1.5k`, `2M` or `0.1G`.
pub fn parse_bp(s: &str) -> Option<f64> {
    let s = s.trim().replace(',', "");
    let (number, scale) = match s.chars().last()? {
        'k' | 'K' => (&s[..s.len() - 1], 1e3),
        'm' | 'M' => (&s[..s.len() - 1], 1e6),
        'g' | 'G' => (&s[..s.len() - 1], 1e9),
        _ => (s.as_str(), 1.0),
    };
    let value: f64 = number.trim().parse().ok()?;
    (value.is_finite() && value >= 0.0).then(|| (value * scale).round())
}

/// Genome-global `[start, end]` of a region: `start-end`, `chr:start-end`
/// or a bare chromosome name. Chromosome forms need `sizes`.
pub fn parse_region(region: &str, sizes: Option<&ChromSizes>) -> Result<(f64, f64), CliError> {
    let invalid = |msg: &str| CliError::invalid_region(region, msg);

    let (chrom, span) = match region.rsplit_once(':') {
        Some((chrom, span)) => (Some(chrom.trim()), Some(span)),
        None if region.contains('-') => (None, Some(region)),
        None => (Some(region.trim()), None),
    };

    let offset = match chrom {
        Some(name) => {
            let sizes = sizes.ok_or_else(|| invalid("chromosome regions need --chrom-sizes"))?;
            let info = sizes.get(name).ok_or_else(|| invalid("unknown chromosome"))?;
            if span.is_none() {
                return Ok((info.offset as f64, (info.offset + info.length) as f64));
            }
            info.offset as f64
        }
        None => 0.0,
    };

    let span = span.ok_or_else(|| invalid("missing span"))?;
    let (s, e) = span.split_once('-').ok_or_else(|| invalid("expected start-end"))?;
    let start = parse_bp(s).ok_or_else(|| invalid("bad start"))?;
    let end = parse_bp(e).ok_or_else(|| invalid("bad end"))?;
    if end <= start {
        return Err(invalid("end must be greater than start"));
    }
    Ok((offset + start, offset + end))
}

// Format a basepair length in human-friendly units
fn format_bp(bp: f64) -> String {
    if bp >= 1e9 {
        format!("{:.2} Gb", bp / 1e9)
    } else if bp >= 1e6 {
        format!("{:.2} Mb", bp / 1e6)
    } else if bp >= 1e3 {
        format!("{:.2} kb", bp / 1e3)
    } else {
        format!("{:.0} bp", bp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes() -> ChromSizes {
        let mut sizes = ChromSizes::new();
        sizes.add_chrom("chr1", 1_000_000);
        sizes.add_chrom("chr2", 500_000);
        sizes
    }

    #[test]
    fn test_parse_bp_suffixes() {
        assert_eq!(parse_bp("1500"), Some(1500.0));
        assert_eq!(parse_bp("1,500"), Some(1500.0));
        assert_eq!(parse_bp("1.5k"), Some(1500.0));
        assert_eq!(parse_bp("2M"), Some(2_000_000.0));
        assert_eq!(parse_bp("x"), None);
        assert_eq!(parse_bp("-3"), None);
    }

    #[test]
    fn test_parse_genome_region() {
        assert_eq!(parse_region("1M-3M", None).unwrap(), (1e6, 3e6));
        assert!(parse_region("3M-1M", None).is_err());
    }

    #[test]
    fn test_parse_chrom_region() {
        let sizes = sizes();
        assert_eq!(parse_region("chr2:100-200", Some(&sizes)).unwrap(), (1_000_100.0, 1_000_200.0));
        assert_eq!(parse_region("chr2", Some(&sizes)).unwrap(), (1_000_000.0, 1_500_000.0));
        assert!(matches!(
            parse_region("chr2:100-200", None),
            Err(CliError::InvalidRegion { .. })
        ));
        assert!(parse_region("chrX:1-2", Some(&sizes)).is_err());
    }

    #[test]
    fn test_format_bp() {
        assert_eq!(format_bp(500.0), "500 bp");
        assert_eq!(format_bp(2_500_000.0), "2.50 Mb");
    }
}
