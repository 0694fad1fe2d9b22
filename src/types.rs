//src/types.rs

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Message carried by every passing verdict.
pub const VALID: &str = "Valid";

/// The two formats an uploaded member can be checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Tsv,
    Fastq,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::Tsv => f.write_str("tsv"),
            MemberKind::Fastq => f.write_str("fastq"),
        }
    }
}

/// One file extracted from an uploaded archive.
/// The storage behind `path` belongs to the caller.
#[derive(Debug, Clone)]
pub struct ArchiveMember {
    pub path: PathBuf,
    pub kind: MemberKind,
}

impl ArchiveMember {
    /// Final path component, falling back to the whole path text.
    pub fn name(&self) -> String {
        member_name(&self.path)
    }
}

pub(crate) fn member_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Validation result for a single member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub member_name: String,
    pub kind: MemberKind,
    pub valid: bool,
    pub message: String,
}

impl Verdict {
    pub fn valid(member: &ArchiveMember) -> Self {
        Self {
            member_name: member.name(),
            kind: member.kind,
            valid: true,
            message: VALID.to_string(),
        }
    }

    pub fn invalid(member: &ArchiveMember, message: impl Into<String>) -> Self {
        Self {
            member_name: member.name(),
            kind: member.kind,
            valid: false,
            message: message.into(),
        }
    }

    /// `"{member_name} is {message}"`, the line surfaced to uploaders.
    pub fn summary(&self) -> String {
        format!("{} is {}", self.member_name, self.message)
    }
}

/// Verdicts for one archive, in member order.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub verdicts: Vec<Verdict>,
}

impl ValidationReport {
    pub fn summary_lines(&self) -> Vec<String> {
        self.verdicts.iter().map(Verdict::summary).collect()
    }

    pub fn all_valid(&self) -> bool {
        self.verdicts.iter().all(|v| v.valid)
    }

    pub fn invalid_count(&self) -> usize {
        self.verdicts.iter().filter(|v| !v.valid).count()
    }

    /// JSON array of summary lines.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.summary_lines())
    }

    /// JSON array of structured verdicts:
    /// `{"member_name", "kind", "valid", "message"}` per member.
    pub fn to_json_verdicts(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.verdicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(path: &str, kind: MemberKind) -> ArchiveMember {
        ArchiveMember {
            path: PathBuf::from(path),
            kind,
        }
    }

    #[test]
    fn test_summary_uses_basename() {
        let v = Verdict::valid(&member("/tmp/upload/run1/profile.tsv", MemberKind::Tsv));
        assert_eq!(v.summary(), "profile.tsv is Valid");
    }

    #[test]
    fn test_report_counts_and_json() {
        let report = ValidationReport {
            verdicts: vec![
                Verdict::valid(&member("a.tsv", MemberKind::Tsv)),
                Verdict::invalid(&member("b.fastq", MemberKind::Fastq), "bad \"quote\""),
            ],
        };
        assert!(!report.all_valid());
        assert_eq!(report.invalid_count(), 1);
        assert_eq!(
            report.to_json().unwrap(),
            r#"["a.tsv is Valid","b.fastq is bad \"quote\""]"#
        );
    }

    #[test]
    fn test_structured_verdict_json() {
        let report = ValidationReport {
            verdicts: vec![
                Verdict::valid(&member("run/a.tsv", MemberKind::Tsv)),
                Verdict::invalid(&member("b.fq", MemberKind::Fastq), "bad"),
            ],
        };
        let json: serde_json::Value =
            serde_json::from_str(&report.to_json_verdicts().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"member_name": "a.tsv", "kind": "tsv", "valid": true, "message": "Valid"},
                {"member_name": "b.fq", "kind": "fastq", "valid": false, "message": "bad"}
            ])
        );
    }

    #[test]
    fn test_name_without_file_component() {
        assert_eq!(member_name(Path::new("/")), "/");
    }
}
