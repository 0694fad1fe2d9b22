// src/lib.rs
pub mod types;
pub mod error;
pub mod config;
pub mod scanner;
pub mod tsv;
pub mod fastq;
pub mod classify;

use rayon::prelude::*;
use std::path::Path;

use crate::classify::classify_member;
use crate::config::ValidatorOptions;
use crate::error::ScanError;
use crate::fastq::{validate_fastq, FASTQ_PREFIX};
use crate::tsv::{validate_tsv, TSV_PREFIX};
use crate::types::{ArchiveMember, MemberKind, ValidationReport, Verdict};

/// Validate every extracted member with the default (strict) options and
/// return one `"{name} is {message}"` line per member, in input order.
pub fn validate_files<P: AsRef<Path> + Sync>(member_paths: &[P]) -> Vec<String> {
    validate_files_with(member_paths, &ValidatorOptions::default())
}

/// Same as [`validate_files`] with explicit options.
pub fn validate_files_with<P: AsRef<Path> + Sync>(
    member_paths: &[P],
    options: &ValidatorOptions,
) -> Vec<String> {
    validate_members(member_paths, options).summary_lines()
}

/// Structured verdicts for a set of members.
///
/// A member that cannot be read, or whose content breaks the scanner, gets
/// a negative verdict; it never stops the remaining members from being
/// checked. With `options.parallel` the members are spread over the rayon
/// pool, collected through an indexed iterator so order still matches
/// `member_paths`.
pub fn validate_members<P: AsRef<Path> + Sync>(
    member_paths: &[P],
    options: &ValidatorOptions,
) -> ValidationReport {
    let verdicts: Vec<Verdict> = if options.parallel {
        member_paths
            .par_iter()
            .map(|p| validate_member(&classify_member(p), options))
            .collect()
    } else {
        member_paths
            .iter()
            .map(|p| validate_member(&classify_member(p), options))
            .collect()
    };

    let report = ValidationReport { verdicts };
    log::info!(
        "validated {} member(s), {} invalid",
        report.verdicts.len(),
        report.invalid_count()
    );
    report
}

/// Run the rule set matching the member's kind.
pub fn validate_member(member: &ArchiveMember, options: &ValidatorOptions) -> Verdict {
    let result = match member.kind {
        MemberKind::Tsv => validate_tsv(member, options),
        MemberKind::Fastq => validate_fastq(member),
    };

    result.unwrap_or_else(|err| scan_failure(member, &err))
}

fn scan_failure(member: &ArchiveMember, err: &ScanError) -> Verdict {
    let prefix = match (err, member.kind) {
        (ScanError::Io { .. }, _) => "UNREADABLE FILE",
        (ScanError::NotNumeric { .. }, MemberKind::Tsv) => TSV_PREFIX,
        (ScanError::NotNumeric { .. }, MemberKind::Fastq) => FASTQ_PREFIX,
    };
    let msg = format!("{prefix}: {err}");
    log::warn!("{}: {}", member.name(), msg);
    Verdict::invalid(member, msg)
}
