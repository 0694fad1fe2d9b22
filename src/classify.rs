//src/classify.rs

use std::path::Path;

use crate::types::{ArchiveMember, MemberKind};

/// Route a member by its extension: exactly `.tsv` is an abundance
/// profile, anything else is treated as FASTQ.
pub fn classify_path<P: AsRef<Path>>(path: P) -> MemberKind {
    let is_tsv = path
        .as_ref()
        .extension()
        .map(|ext| ext == "tsv")
        .unwrap_or(false);

    if is_tsv {
        MemberKind::Tsv
    } else {
        MemberKind::Fastq
    }
}

pub fn classify_member<P: AsRef<Path>>(path: P) -> ArchiveMember {
    let path = path.as_ref();
    let kind = classify_path(path);
    log::debug!("{} classified as {}", path.display(), kind);
    ArchiveMember {
        path: path.to_path_buf(),
        kind,
    }
}
