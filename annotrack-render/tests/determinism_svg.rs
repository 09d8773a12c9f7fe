use annotrack_core::{Feature, Strand, TileId, Tileset, TilesetInfo};
use annotrack_render::{ExportConfig, GeneAnnotationsTrack, SvgSurface, TileStore, TrackStyle};

fn demo_features() -> Vec<Feature> {
    let row = |name: &str, start: i64, end: i64, importance: f64, strand: Strand| Feature {
        chrom: "chr2".into(),
        chrom_local_start: start,
        chrom_local_end: end,
        name: name.into(),
        importance,
        strand,
        exon_starts: vec![start, end - 20],
        exon_ends: vec![start + 20, end],
        chrom_offset: 1000,
        transcript_id: None,
        gene_id: None,
        gene_type: None,
        description: None,
    };
    vec![
        row("GATA1", 100, 300, 40.0, Strand::Forward),
        row("TAL1", 280, 320, 12.0, Strand::Forward),
        row("KLF1", 500, 900, 25.0, Strand::Reverse),
        row("LMO2", 880, 884, 2.0, Strand::Reverse),
    ]
}

fn render(path: &std::path::Path) {
    let mut tileset = Tileset::new(TilesetInfo::new(1000, 2000, 2));
    tileset.tiles.insert(TileId::new(0, 0), demo_features());
    let mut store = TileStore::new(tileset);
    store.fetch(TileId::new(0, 0));

    let cfg = ExportConfig {
        width: 800,
        height: 60,
        title: Some("Determinism Test".into()),
        show_footer: false, // disable dynamic timestamp
        provenance_comment: Some("annotrack determinism test".into()),
        ..ExportConfig::default()
    };
    let mut track = GeneAnnotationsTrack::new(store, SvgSurface::new(cfg), TrackStyle::default(), [800.0, 60.0]).unwrap();
    track.sync_tiles();
    track.surface().write_to_file(path).unwrap();
}

#[test]
fn svg_export_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let f1 = dir.path().join("a.svg");
    let f2 = dir.path().join("b.svg");

    render(&f1);
    render(&f2);

    let b1 = std::fs::read(&f1).unwrap();
    let b2 = std::fs::read(&f2).unwrap();
    assert_eq!(b1, b2, "SVG bytes differ between identical renders");

    let text = String::from_utf8(b1).unwrap();
    assert!(text.starts_with("<?xml"));
    assert!(text.contains("<!-- annotrack determinism test -->"));
    assert!(text.contains(">GATA1<"));
}
