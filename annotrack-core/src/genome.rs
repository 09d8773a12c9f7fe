use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::BufRead;

use crate::types::GenomicPos;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChromInfo {
    pub name: String,
    pub length: GenomicPos,
    /// Genome-global coordinate of the chromosome's first base.
    pub offset: GenomicPos,
}

/// Ordered chromosome sizes; chromosomes are laid end to end to form the
/// genome-global axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChromSizes {
    pub chroms: Vec<ChromInfo>,
    pub total_length: GenomicPos,
    index: HashMap<String, usize>,
}

impl ChromSizes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_chrom(&mut self, name: impl Into<String>, length: GenomicPos) -> GenomicPos {
        let name = name.into();
        let offset = self.total_length;
        self.index.insert(name.clone(), self.chroms.len());
        self.chroms.push(ChromInfo {
            name,
            length,
            offset,
        });
        self.total_length = self.total_length.saturating_add(length);
        offset
    }

    pub fn get(&self, name: &str) -> Option<&ChromInfo> {
        self.index.get(name).and_then(|&i| self.chroms.get(i))
    }

    pub fn offset_of(&self, name: &str) -> Option<GenomicPos> {
        self.get(name).map(|c| c.offset)
    }

    /// Map a genome-global position back to `(chrom, local position)`.
    pub fn global_to_local(&self, global: GenomicPos) -> Option<(&str, GenomicPos)> {
        if global < 0 || global >= self.total_length {
            return None;
        }
        self.chroms
            .iter()
            .find(|c| global >= c.offset && global < c.offset + c.length)
            .map(|c| (c.name.as_str(), global - c.offset))
    }

    /// Read a two-column `name<TAB>length` chrom sizes listing.
    pub fn from_reader<R: BufRead>(reader: R) -> anyhow::Result<Self> {
        let mut sizes = ChromSizes::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let (Some(name), Some(len)) = (parts.next(), parts.next()) else {
                return Err(anyhow::anyhow!(
                    "chrom sizes line {} must have two columns: {}",
                    line_num + 1,
                    line
                ));
            };
            let len: GenomicPos = len
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid chromosome length on line {}: {}", line_num + 1, len))?;
            sizes.add_chrom(name, len);
        }
        Ok(sizes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_accumulate() {
        let mut sizes = ChromSizes::new();
        assert_eq!(sizes.add_chrom("chr1", 1000), 0);
        assert_eq!(sizes.add_chrom("chr2", 500), 1000);
        assert_eq!(sizes.total_length, 1500);
        assert_eq!(sizes.offset_of("chr2"), Some(1000));
        assert_eq!(sizes.global_to_local(1200), Some(("chr2", 200)));
        assert_eq!(sizes.global_to_local(1500), None);
    }

    #[test]
    fn reads_listing() {
        let text = "# sizes\nchr1\t100\nchr2 50\n";
        let sizes = ChromSizes::from_reader(text.as_bytes()).unwrap();
        assert_eq!(sizes.chroms.len(), 2);
        assert_eq!(sizes.offset_of("chr2"), Some(100));
        assert!(ChromSizes::from_reader("chr1\n".as_bytes()).is_err());
    }
}
