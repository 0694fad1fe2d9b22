//src/fastq.rs

use crate::error::Result;
use crate::scanner::RowScanner;
use crate::types::{ArchiveMember, Verdict};

pub const FASTQ_PREFIX: &str = "NOT IN FASTQ FORMAT";

pub const HEADER_MESSAGE: &str = "NOT IN FASTQ FORMAT: FILE MUST START WITH '@'";

// Existing clients match on this exact text, which names line 4 although
// the separator is line 3 of the record.
pub const SEPARATOR_MESSAGE: &str = "NOT IN FASTQ FORMAT: Line 4 MUST START WITH '+'";

pub const ALPHABET_MESSAGE: &str = "NOT IN FASTQ FORMAT: LINE 2 MUST ONLY CONTAIN A,C,G,T, OR N";

const HEADER_LINE: usize = 1;
const SEQUENCE_LINE: usize = 2;
const SEPARATOR_LINE: usize = 3;

/// Nucleotide codes accepted on the sequence line (case-sensitive).
pub fn is_sequence_base(b: u8) -> bool {
    matches!(b, b'A' | b'C' | b'G' | b'T' | b'N')
}

/// Smoke-test the first FASTQ record of a member.
///
/// Only the header, sequence and separator lines of the first record are
/// read; later records and the quality line are not inspected.
pub fn validate_fastq(member: &ArchiveMember) -> Result<Verdict> {
    let scanner = RowScanner::new(&member.path);

    if scanner.first_char(HEADER_LINE)? != Some('@') {
        log::info!("{}: {}", member.name(), HEADER_MESSAGE);
        return Ok(Verdict::invalid(member, HEADER_MESSAGE));
    }

    if scanner.first_char(SEPARATOR_LINE)? != Some('+') {
        log::info!("{}: {}", member.name(), SEPARATOR_MESSAGE);
        return Ok(Verdict::invalid(member, SEPARATOR_MESSAGE));
    }

    // A missing sequence line has no foreign bases.
    let bases_ok = scanner
        .line_all(SEQUENCE_LINE, is_sequence_base)?
        .unwrap_or(true);
    if !bases_ok {
        log::info!("{}: {}", member.name(), ALPHABET_MESSAGE);
        return Ok(Verdict::invalid(member, ALPHABET_MESSAGE));
    }

    log::info!("{}: fastq is in proper format", member.name());
    Ok(Verdict::valid(member))
}
