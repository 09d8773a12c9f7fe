//! BED12 gene annotations.
//!
//! The score column is used as feature importance; blocks become exons.

use anyhow::{anyhow, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

use crate::genome::ChromSizes;
use crate::types::{Feature, GenomicPos, Strand};

#[derive(Debug, Error, PartialEq)]
pub enum BedError {
    #[error("Invalid BED line: insufficient fields (expected at least 6, got {0})")]
    InsufficientFields(usize),
    #[error("Invalid position value: {0}")]
    InvalidPosition(String),
    #[error("Invalid score: {0}")]
    InvalidScore(String),
    #[error("Invalid strand: {0}")]
    InvalidStrand(String),
    #[error("Unknown chromosome: {0}")]
    UnknownChrom(String),
    #[error("Block list mismatch: {count} blocks, {sizes} sizes, {starts} starts")]
    BlockMismatch { count: usize, sizes: usize, starts: usize },
}

pub struct BedParser;

impl BedParser {
    pub fn parse_line(line: &str, sizes: &ChromSizes) -> Result<Feature, BedError> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 6 {
            return Err(BedError::InsufficientFields(fields.len()));
        }

        let chrom = fields[0].to_string();
        let chrom_offset = sizes
            .offset_of(&chrom)
            .ok_or_else(|| BedError::UnknownChrom(chrom.clone()))?;
        let start = parse_pos(fields[1])?;
        let end = parse_pos(fields[2])?;
        if start > end {
            return Err(BedError::InvalidPosition(format!("{}-{}", start, end)));
        }
        let name = fields[3].to_string();
        let importance = match fields[4] {
            "." => 0.0,
            s => s
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(|| BedError::InvalidScore(s.to_string()))?,
        };
        let strand =
            Strand::parse(fields[5]).ok_or_else(|| BedError::InvalidStrand(fields[5].to_string()))?;

        let (exon_starts, exon_ends) = if fields.len() >= 12 {
            parse_blocks(start, fields[9], fields[10], fields[11])?
        } else {
            (vec![start], vec![end])
        };

        Ok(Feature {
            chrom,
            chrom_local_start: start,
            chrom_local_end: end,
            name,
            importance,
            strand,
            exon_starts,
            exon_ends,
            chrom_offset,
            transcript_id: None,
            gene_id: None,
            gene_type: None,
            description: None,
        })
    }

    /// Parse a BED file. Malformed lines are skipped with a warning.
    pub fn parse_file<P: AsRef<Path>>(path: P, sizes: &ChromSizes) -> Result<Vec<Feature>> {
        let file = File::open(&path)
            .map_err(|e| anyhow!("cannot open {}: {}", path.as_ref().display(), e))?;
        Self::parse_reader(BufReader::new(file), sizes)
    }

    pub fn parse_reader<R: BufRead>(reader: R, sizes: &ChromSizes) -> Result<Vec<Feature>> {
        let mut features = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty()
                || line.starts_with('#')
                || line.starts_with("track")
                || line.starts_with("browser")
            {
                continue;
            }
            match Self::parse_line(&line, sizes) {
                Ok(feature) => features.push(feature),
                Err(e) => log::warn!("skipping BED line {}: {}", line_num + 1, e),
            }
        }
        Ok(features)
    }
}

fn parse_pos(s: &str) -> Result<GenomicPos, BedError> {
    s.trim()
        .parse::<GenomicPos>()
        .map_err(|_| BedError::InvalidPosition(s.to_string()))
}

fn parse_list(s: &str) -> Result<Vec<GenomicPos>, BedError> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(parse_pos)
        .collect()
}

fn parse_blocks(
    start: GenomicPos,
    count: &str,
    sizes: &str,
    starts: &str,
) -> Result<(Vec<GenomicPos>, Vec<GenomicPos>), BedError> {
    let count = count
        .trim()
        .parse::<usize>()
        .map_err(|_| BedError::InvalidPosition(count.to_string()))?;
    let sizes = parse_list(sizes)?;
    let starts = parse_list(starts)?;
    if sizes.len() != count || starts.len() != count {
        return Err(BedError::BlockMismatch {
            count,
            sizes: sizes.len(),
            starts: starts.len(),
        });
    }
    let exon_starts: Vec<_> = starts.iter().map(|s| start + s).collect();
    let exon_ends = exon_starts
        .iter()
        .zip(sizes.iter())
        .map(|(s, len)| s + len)
        .collect();
    Ok((exon_starts, exon_ends))
}
