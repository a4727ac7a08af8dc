//! shuffle_regions — offline tool to synthesise background regions
//!
//! Takes the positive enhancer regions (BED, optionally gzipped) and a
//! chrom.sizes file, and writes the same number of regions, each with the
//! width of its source, at random genome positions. No output region
//! overlaps any input region. Output regions may overlap each other.
//!
//!   shuffle_regions <positive.bed[.gz]> <out.bed> <chrom.sizes> [seed]
//!
//! The output BED is then turned into the negative FASTA with any
//! `getfasta`-style extractor against the same assembly.
//!
//! PLACEMENT
//! ────────────────────────────────────────────────────────────────────
//!  1. pick a chromosome with probability proportional to its length
//!     (only chromosomes long enough for the region are eligible)
//!  2. pick a uniform start in [0, length − width]
//!  3. reject and retry if [start, start + width) hits an input region
//! ────────────────────────────────────────────────────────────────────

use flate2::read::MultiGzDecoder;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

// ── Constants ────────────────────────────────────────────────────────

/// Placement attempts per region before giving up on the whole run.
const MAX_ATTEMPTS: usize = 10_000;
const DEFAULT_SEED: u64 = 0;

// ── Region types ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
struct Region {
    chrom: String,
    start: u64, // 0-based, inclusive
    end: u64,   // exclusive
}

impl Region {
    fn width(&self) -> u64 {
        self.end - self.start
    }
}

/// Input regions grouped by chromosome, sorted by start.
struct Exclusions {
    by_chrom: HashMap<String, Vec<(u64, u64)>>,
}

impl Exclusions {
    fn new(regions: &[Region]) -> Self {
        let mut by_chrom: HashMap<String, Vec<(u64, u64)>> = HashMap::new();
        for r in regions {
            by_chrom.entry(r.chrom.clone()).or_default().push((r.start, r.end));
        }
        for spans in by_chrom.values_mut() {
            spans.sort_unstable();
        }
        Self { by_chrom }
    }

    /// True if [start, end) shares at least one base with an input region.
    fn hits(&self, chrom: &str, start: u64, end: u64) -> bool {
        let Some(spans) = self.by_chrom.get(chrom) else {
            return false;
        };
        // spans starting before `end` are the only candidates
        let candidates = spans.partition_point(|&(s, _)| s < end);
        spans[..candidates].iter().any(|&(_, e)| e > start)
    }
}

// ── Readers ──────────────────────────────────────────────────────────

fn open(path: &Path) -> io::Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    let gz = path.extension().map_or(false, |e| e.eq_ignore_ascii_case("gz"));
    let inner: Box<dyn Read> = if gz {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(Box::new(BufReader::new(inner)))
}

fn invalid(path: &Path, line_no: usize, reason: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("{}:{}: {}", path.display(), line_no, reason),
    )
}

/// Skips blank lines, comments and UCSC `track` / `browser` headers.
fn is_header(line: &str) -> bool {
    let line = line.trim();
    line.is_empty() || line.starts_with('#') || line.starts_with("track") || line.starts_with("browser")
}

fn parse_regions(reader: impl BufRead, path: &Path) -> io::Result<Vec<Region>> {
    let mut regions = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if is_header(&line) {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(chrom), Some(start), Some(end)) = (fields.next(), fields.next(), fields.next()) else {
            return Err(invalid(path, i + 1, "expected chrom, start, end"));
        };
        let start: u64 = start.parse().map_err(|_| invalid(path, i + 1, "bad start"))?;
        let end: u64 = end.parse().map_err(|_| invalid(path, i + 1, "bad end"))?;
        if end <= start {
            return Err(invalid(path, i + 1, "end must be greater than start"));
        }
        regions.push(Region {
            chrom: chrom.to_string(),
            start,
            end,
        });
    }
    Ok(regions)
}

fn parse_chrom_sizes(reader: impl BufRead, path: &Path) -> io::Result<Vec<(String, u64)>> {
    let mut sizes = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if is_header(&line) {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(chrom), Some(len)) = (fields.next(), fields.next()) else {
            return Err(invalid(path, i + 1, "expected chrom and length"));
        };
        let len: u64 = len.parse().map_err(|_| invalid(path, i + 1, "bad length"))?;
        sizes.push((chrom.to_string(), len));
    }
    Ok(sizes)
}

// ── Shuffler ─────────────────────────────────────────────────────────

fn shuffle<R: Rng>(regions: &[Region], sizes: &[(String, u64)], rng: &mut R) -> Result<Vec<Region>, String> {
    let exclusions = Exclusions::new(regions);
    let mut shuffled = Vec::with_capacity(regions.len());

    for region in regions {
        let width = region.width();
        let eligible: Vec<&(String, u64)> = sizes.iter().filter(|(_, len)| *len >= width).collect();
        let weights = WeightedIndex::new(eligible.iter().map(|(_, len)| *len))
            .map_err(|_| format!("no chromosome can hold a {width} bp region"))?;

        let mut placed = None;
        for _ in 0..MAX_ATTEMPTS {
            let (chrom, len) = eligible[weights.sample(rng)];
            let start = rng.gen_range(0..=len - width);
            if !exclusions.hits(chrom, start, start + width) {
                placed = Some(Region {
                    chrom: chrom.clone(),
                    start,
                    end: start + width,
                });
                break;
            }
        }

        match placed {
            Some(r) => shuffled.push(r),
            None => {
                return Err(format!(
                    "could not place {}:{}-{} after {MAX_ATTEMPTS} attempts",
                    region.chrom, region.start, region.end
                ))
            }
        }
    }

    Ok(shuffled)
}

fn write_bed(regions: &[Region], path: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for r in regions {
        writeln!(out, "{}\t{}\t{}", r.chrom, r.start, r.end)?;
    }
    out.flush()
}

// ── Main ─────────────────────────────────────────────────────────────

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: shuffle_regions <positive.bed[.gz]> <out.bed> <chrom.sizes> [seed]");
        std::process::exit(1);
    }

    let bed_path = Path::new(&args[1]);
    let out_path = Path::new(&args[2]);
    let sizes_path = Path::new(&args[3]);
    let seed = match args.get(4).map(|s| s.parse::<u64>()) {
        None => DEFAULT_SEED,
        Some(Ok(seed)) => seed,
        Some(Err(e)) => {
            eprintln!("ERROR: bad seed '{}': {}", args[4], e);
            std::process::exit(1);
        }
    };

    let regions = match open(bed_path).and_then(|r| parse_regions(r, bed_path)) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("ERROR reading {}: {}", bed_path.display(), e);
            std::process::exit(1);
        }
    };
    let sizes = match open(sizes_path).and_then(|r| parse_chrom_sizes(r, sizes_path)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("ERROR reading {}: {}", sizes_path.display(), e);
            std::process::exit(1);
        }
    };
    eprintln!("{} regions, {} chromosomes, seed {}", regions.len(), sizes.len(), seed);

    let mut rng = StdRng::seed_from_u64(seed);
    let shuffled = match shuffle(&regions, &sizes, &mut rng) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = write_bed(&shuffled, out_path) {
        eprintln!("ERROR writing {}: {}", out_path.display(), e);
        std::process::exit(1);
    }
    eprintln!("Written {} regions to {}", shuffled.len(), out_path.display());
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn region(chrom: &str, start: u64, end: u64) -> Region {
        Region {
            chrom: chrom.into(),
            start,
            end,
        }
    }

    #[test]
    fn test_parse_bed_skips_headers() {
        let bed = "track name=vista\n# comment\nchr1\t10\t20\tname\n\nchr2 5 9\n";
        let got = parse_regions(Cursor::new(bed), Path::new("x.bed")).unwrap();
        assert_eq!(got, vec![region("chr1", 10, 20), region("chr2", 5, 9)]);
    }

    #[test]
    fn test_parse_bed_rejects_bad_lines() {
        assert!(parse_regions(Cursor::new("chr1\t10\n"), Path::new("x.bed")).is_err());
        assert!(parse_regions(Cursor::new("chr1\t20\t10\n"), Path::new("x.bed")).is_err());
        assert!(parse_regions(Cursor::new("chr1\ta\t10\n"), Path::new("x.bed")).is_err());
    }

    #[test]
    fn test_exclusion_overlap_rules() {
        let ex = Exclusions::new(&[region("chr1", 100, 200), region("chr1", 300, 400)]);
        assert!(ex.hits("chr1", 150, 160));
        assert!(ex.hits("chr1", 50, 101));
        assert!(ex.hits("chr1", 199, 301));
        // half-open: touching ends do not overlap
        assert!(!ex.hits("chr1", 200, 300));
        assert!(!ex.hits("chr1", 0, 100));
        assert!(!ex.hits("chr2", 100, 200));
    }

    #[test]
    fn test_shuffle_keeps_count_width_and_avoids_input() {
        let regions = vec![region("chr1", 0, 500), region("chr1", 600, 700), region("chr2", 10, 60)];
        let sizes = vec![("chr1".to_string(), 1_000), ("chr2".to_string(), 2_000)];
        let mut rng = StdRng::seed_from_u64(7);
        let shuffled = shuffle(&regions, &sizes, &mut rng).unwrap();

        assert_eq!(shuffled.len(), regions.len());
        let ex = Exclusions::new(&regions);
        for (src, dst) in regions.iter().zip(&shuffled) {
            assert_eq!(src.width(), dst.width());
            assert!(!ex.hits(&dst.chrom, dst.start, dst.end), "{dst:?} overlaps input");
            let len = sizes.iter().find(|(c, _)| *c == dst.chrom).unwrap().1;
            assert!(dst.end <= len);
        }
    }

    #[test]
    fn test_shuffle_is_seeded() {
        let regions = vec![region("chr1", 0, 10), region("chr1", 50, 80)];
        let sizes = vec![("chr1".to_string(), 10_000)];
        let a = shuffle(&regions, &sizes, &mut StdRng::seed_from_u64(3)).unwrap();
        let b = shuffle(&regions, &sizes, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_region_wider_than_any_chromosome() {
        let regions = vec![region("chr1", 0, 5_000)];
        let sizes = vec![("chr1".to_string(), 1_000)];
        assert!(shuffle(&regions, &sizes, &mut StdRng::seed_from_u64(0)).is_err());
    }

    #[test]
    fn test_gzipped_input_and_output_file() {
        let dir = tempdir().unwrap();
        let bed = dir.path().join("pos.bed.gz");
        let mut enc = GzEncoder::new(File::create(&bed).unwrap(), Compression::default());
        enc.write_all(b"chr1\t100\t150\n").unwrap();
        enc.finish().unwrap();

        let regions = parse_regions(open(&bed).unwrap(), &bed).unwrap();
        assert_eq!(regions, vec![region("chr1", 100, 150)]);

        let sizes = parse_chrom_sizes(Cursor::new("chr1\t5000\n"), Path::new("g")).unwrap();
        let shuffled = shuffle(&regions, &sizes, &mut StdRng::seed_from_u64(1)).unwrap();
        let out = dir.path().join("neg.bed");
        write_bed(&shuffled, &out).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("chr1\t"));
    }
}
