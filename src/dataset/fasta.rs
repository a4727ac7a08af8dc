/// dataset/fasta.rs — FASTA record source
///
/// Yields `(description, sequence)` pairs in file order. Files ending in
/// `.gz` are decompressed on the fly. The description is the whole header
/// line after `>`, so the `|`-delimited annotation survives even when it
/// contains spaces (`element 1`, `neural tube[12/12]`).
///
/// Sequences are lower-cased here and nowhere else.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use bio::io::fasta;
use flate2::read::MultiGzDecoder;
use tracing::info;

use crate::error::{ClfError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub description: String,
    pub sequence: String,
}

/// Read every record in `path`.
///
/// Open failures are `Io`; anything that goes wrong once parsing has
/// started (bad header, truncated gzip, non-UTF-8 sequence) is `Format`.
/// No partial record list is ever returned.
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    let file = File::open(path).map_err(ClfError::Io)?;
    let source: Box<dyn Read> = if is_gzipped(path) {
        Box::new(MultiGzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let mut records = Vec::new();
    for entry in fasta::Reader::new(source).records() {
        let entry = entry.map_err(|e| format_error(path, e.to_string()))?;

        let description = match entry.desc() {
            Some(desc) => format!("{} {}", entry.id(), desc),
            None => entry.id().to_string(),
        };
        let sequence = std::str::from_utf8(entry.seq())
            .map_err(|e| format_error(path, format!("record '{}': {e}", entry.id())))?
            .to_ascii_lowercase();

        records.push(Record { description, sequence });
    }

    info!(path = %path.display(), records = records.len(), "read records");
    Ok(records)
}

fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
}

fn format_error(path: &Path, reason: String) -> ClfError {
    ClfError::Format {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::tempdir;

    const TWO_RECORDS: &str = "\
>hs1|chr16:84987588-84989638|element 1|positive|neural tube[12/12]|limb[3/12]
ACGTACGTAC
GTTAAT
>mm2|chr1:100-200|element 2|negative
acgtNNacgt
";

    #[test]
    fn test_reads_descriptions_and_sequences() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pos.fa");
        std::fs::write(&path, TWO_RECORDS).unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].description,
            "hs1|chr16:84987588-84989638|element 1|positive|neural tube[12/12]|limb[3/12]"
        );
        assert_eq!(records[0].sequence, "acgtacgtacgttaat");
        assert_eq!(records[1].description, "mm2|chr1:100-200|element 2|negative");
        assert_eq!(records[1].sequence, "acgtnnacgt");
    }

    #[test]
    fn test_header_without_spaces() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("one.fa");
        std::fs::write(&path, ">x|x|x|positive|limb[5/10]\nacgt\n").unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records[0].description, "x|x|x|positive|limb[5/10]");
    }

    #[test]
    fn test_gzipped_input() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pos.fa.gz");
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(TWO_RECORDS.as_bytes()).unwrap();
        std::fs::write(&path, enc.finish().unwrap()).unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].sequence, "acgtnnacgt");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = read_records(&dir.path().join("absent.fa")).unwrap_err();
        assert!(matches!(err, ClfError::Io(_)));
    }

    #[test]
    fn test_missing_header_is_format_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.fa");
        std::fs::write(&path, "acgtacgt\n>late\nacgt\n").unwrap();
        let err = read_records(&path).unwrap_err();
        assert!(matches!(err, ClfError::Format { .. }));
    }

    #[test]
    fn test_empty_file_has_no_records() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.fa");
        std::fs::write(&path, "").unwrap();
        assert!(read_records(&path).unwrap().is_empty());
    }
}
