//! Positional tile-row decoding.
//!
//! Gene annotation tiles arrive as arrays of positional rows:
//!
//! ```text
//! chrom txStart txEnd name importance strand transcriptId geneId type
//! description cdsStart cdsEnd exonStarts exonEnds ... chromOffset
//! ```
//!
//! The chromosome offset is always the last element. This module is the only
//! place that knows field positions; everything downstream works on
//! [`Feature`].

use serde_json::Value;
use std::collections::HashSet;

use crate::error::FeatureError;
use crate::types::{Feature, GenomicPos, Strand, TileId};

pub const MIN_FIELDS: usize = 15;

const CHROM: usize = 0;
const TX_START: usize = 1;
const TX_END: usize = 2;
const NAME: usize = 3;
const IMPORTANCE: usize = 4;
const STRAND: usize = 5;
const TRANSCRIPT_ID: usize = 6;
const GENE_ID: usize = 7;
const GENE_TYPE: usize = 8;
const DESCRIPTION: usize = 9;
const EXON_STARTS: usize = 12;
const EXON_ENDS: usize = 13;

/// Per-tile decode outcome: how many rows survived and why others did not.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct DecodeReport {
    pub decoded: usize,
    pub skipped: usize,
    pub duplicate_names: usize,
}

impl DecodeReport {
    pub fn merge(&mut self, other: &DecodeReport) {
        self.decoded += other.decoded;
        self.skipped += other.skipped;
        self.duplicate_names += other.duplicate_names;
    }
}

/// Decode a single positional row.
pub fn decode_row(row: &Value) -> Result<Feature, FeatureError> {
    let fields = row.as_array().ok_or(FeatureError::NotAnArray)?;
    if fields.len() < MIN_FIELDS {
        return Err(FeatureError::InsufficientFields {
            expected: MIN_FIELDS,
            got: fields.len(),
        });
    }

    let chrom = string_field(&fields[CHROM], "chrom")?;
    let chrom_local_start = integer_field(&fields[TX_START], "txStart")?;
    let chrom_local_end = integer_field(&fields[TX_END], "txEnd")?;
    if chrom_local_start > chrom_local_end {
        return Err(FeatureError::InvertedSpan {
            start: chrom_local_start,
            end: chrom_local_end,
        });
    }

    let name = string_field(&fields[NAME], "name")?;
    if name.trim().is_empty() {
        return Err(FeatureError::EmptyName);
    }

    let importance = number_field(&fields[IMPORTANCE], "importance")?;
    if !importance.is_finite() || importance < 0.0 {
        return Err(FeatureError::InvalidImportance(importance));
    }

    let strand_raw = string_field(&fields[STRAND], "strand")?;
    let strand = Strand::parse(&strand_raw).ok_or(FeatureError::InvalidStrand(strand_raw))?;

    let exon_starts = position_list(&fields[EXON_STARTS], "exonStarts")?;
    let exon_ends = position_list(&fields[EXON_ENDS], "exonEnds")?;
    if exon_starts.len() != exon_ends.len() {
        return Err(FeatureError::ExonCountMismatch {
            starts: exon_starts.len(),
            ends: exon_ends.len(),
        });
    }
    for (index, (&start, &end)) in exon_starts.iter().zip(exon_ends.iter()).enumerate() {
        if start > end {
            return Err(FeatureError::InvertedExon { index, start, end });
        }
    }

    let chrom_offset = integer_field(&fields[fields.len() - 1], "chromOffset")?;

    Ok(Feature {
        chrom,
        chrom_local_start,
        chrom_local_end,
        name,
        importance,
        strand,
        exon_starts,
        exon_ends,
        chrom_offset,
        transcript_id: optional_string(&fields[TRANSCRIPT_ID]),
        gene_id: optional_string(&fields[GENE_ID]),
        gene_type: optional_string(&fields[GENE_TYPE]),
        description: optional_string(&fields[DESCRIPTION]),
    })
}

/// Decode every row of one tile. Malformed rows and repeated names are
/// dropped with a warning; the remaining rows keep their order.
pub fn decode_rows(tile: TileId, rows: &[Value]) -> (Vec<Feature>, DecodeReport) {
    let mut report = DecodeReport::default();
    let mut features = Vec::with_capacity(rows.len());
    let mut seen: HashSet<String> = HashSet::new();

    for (index, row) in rows.iter().enumerate() {
        match decode_row(row) {
            Ok(feature) => {
                if !seen.insert(feature.name.clone()) {
                    log::warn!(
                        "tile {}: row {} repeats feature name '{}', skipping",
                        tile,
                        index,
                        feature.name
                    );
                    report.duplicate_names += 1;
                    continue;
                }
                features.push(feature);
                report.decoded += 1;
            }
            Err(e) => {
                log::warn!("tile {}: skipping malformed row {}: {}", tile, index, e);
                report.skipped += 1;
            }
        }
    }

    (features, report)
}

/// Encode a feature back into the positional row layout.
pub fn encode_row(feature: &Feature) -> Value {
    let join = |xs: &[GenomicPos]| {
        xs.iter()
            .map(|x| x.to_string())
            .collect::<Vec<_>>()
            .join(",")
    };
    let opt = |s: &Option<String>| s.clone().map(Value::String).unwrap_or(Value::Null);
    Value::Array(vec![
        Value::String(feature.chrom.clone()),
        Value::from(feature.chrom_local_start),
        Value::from(feature.chrom_local_end),
        Value::String(feature.name.clone()),
        Value::from(feature.importance),
        Value::String(feature.strand.to_string()),
        opt(&feature.transcript_id),
        opt(&feature.gene_id),
        opt(&feature.gene_type),
        opt(&feature.description),
        Value::from(feature.chrom_local_start),
        Value::from(feature.chrom_local_end),
        Value::String(join(&feature.exon_starts)),
        Value::String(join(&feature.exon_ends)),
        Value::from(feature.chrom_offset),
    ])
}

fn string_field(v: &Value, field: &'static str) -> Result<String, FeatureError> {
    match v {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(FeatureError::NotAString { field }),
    }
}

fn optional_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn number_field(v: &Value, field: &'static str) -> Result<f64, FeatureError> {
    let non_numeric = || FeatureError::NonNumeric {
        field,
        value: v.to_string(),
    };
    match v {
        Value::Number(n) => n.as_f64().ok_or_else(non_numeric),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| non_numeric()),
        _ => Err(non_numeric()),
    }
}

fn integer_field(v: &Value, field: &'static str) -> Result<GenomicPos, FeatureError> {
    if let Some(i) = v.as_i64() {
        return Ok(i);
    }
    if let Value::String(s) = v {
        if let Ok(i) = s.trim().parse::<GenomicPos>() {
            return Ok(i);
        }
    }
    let x = number_field(v, field)?;
    if !x.is_finite() || x.abs() > i64::MAX as f64 {
        return Err(FeatureError::NonNumeric {
            field,
            value: v.to_string(),
        });
    }
    Ok(x.round() as GenomicPos)
}

/// Exon coordinate lists come either as comma-separated strings (with an
/// optional trailing comma) or as JSON arrays.
fn position_list(v: &Value, field: &'static str) -> Result<Vec<GenomicPos>, FeatureError> {
    match v {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| {
                p.parse::<GenomicPos>().map_err(|_| FeatureError::NonNumeric {
                    field,
                    value: p.to_string(),
                })
            })
            .collect(),
        Value::Array(items) => items.iter().map(|item| integer_field(item, field)).collect(),
        other => Err(FeatureError::NonNumeric {
            field,
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(name: &str, start: i64, end: i64) -> Value {
        json!([
            "chr1", start, end, name, 12.5, "+", "NM_1", "123", "protein-coding",
            "a gene", start, end, format!("{},", start), format!("{},", end), 1000
        ])
    }

    #[test]
    fn decodes_full_row() {
        let f = decode_row(&row("BRCA1", 100, 900)).unwrap();
        assert_eq!(f.name, "BRCA1");
        assert_eq!(f.chrom_local_start, 100);
        assert_eq!(f.genome_start(), 1100);
        assert_eq!(f.genome_end(), 1900);
        assert_eq!(f.strand, Strand::Forward);
        assert_eq!(f.exon_starts, vec![100]);
        assert_eq!(f.exon_ends, vec![900]);
        assert_eq!(f.transcript_id.as_deref(), Some("NM_1"));
    }

    #[test]
    fn accepts_numeric_strings_and_arrays() {
        let r = json!([
            "chr2", "10", "50", "G", "3", "-", "", "", "", "", 0, 0, [10, 30], ["20", "50"], "7"
        ]);
        let f = decode_row(&r).unwrap();
        assert_eq!(f.chrom_local_end, 50);
        assert_eq!(f.importance, 3.0);
        assert_eq!(f.exon_ends, vec![20, 50]);
        assert_eq!(f.chrom_offset, 7);
        assert_eq!(f.transcript_id, None);
    }

    #[test]
    fn rejects_exon_mismatch() {
        let r = json!([
            "chr1", 0, 100, "X", 1, "+", "", "", "", "", 0, 0, "0,50,", "10,", 0
        ]);
        assert_eq!(
            decode_row(&r),
            Err(FeatureError::ExonCountMismatch { starts: 2, ends: 1 })
        );
    }

    #[test]
    fn rejects_non_numeric_and_bad_strand() {
        let mut r = row("X", 0, 10);
        r[1] = json!("abc");
        assert!(matches!(decode_row(&r), Err(FeatureError::NonNumeric { field: "txStart", .. })));

        let mut r = row("X", 0, 10);
        r[5] = json!(".");
        assert!(matches!(decode_row(&r), Err(FeatureError::InvalidStrand(_))));

        let mut r = row("X", 0, 10);
        r[4] = json!(-1);
        assert!(matches!(decode_row(&r), Err(FeatureError::InvalidImportance(_))));

        assert!(matches!(
            decode_row(&json!(["chr1", 0, 10])),
            Err(FeatureError::InsufficientFields { got: 3, .. })
        ));
    }

    #[test]
    fn malformed_rows_do_not_abort_tile() {
        let mut bad = row("B", 0, 10);
        bad[13] = json!("1,2,3");
        let rows = vec![row("A", 0, 10), bad, row("C", 20, 30), row("A", 40, 50)];
        let (features, report) = decode_rows(TileId::new(0, 0), &rows);
        let names: Vec<_> = features.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(report.decoded, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.duplicate_names, 1);
    }

    #[test]
    fn encode_then_decode_preserves_feature() {
        let f = decode_row(&row("TP53", 5, 95)).unwrap();
        assert_eq!(decode_row(&encode_row(&f)).unwrap(), f);
    }
}
