//src/tsv.rs

use crate::config::ValidatorOptions;
use crate::error::Result;
use crate::scanner::RowScanner;
use crate::types::{ArchiveMember, Verdict};

/// Fields every abundance row must carry: taxon id, abundance, name.
pub const ABUNDANCE_FIELDS: usize = 3;

/// 1-indexed column holding the abundance value.
pub const ABUNDANCE_COLUMN: usize = 2;

pub const TSV_PREFIX: &str = "NOT IN TSV FORMAT";

pub const SUM_MESSAGE: &str = "NOT IN TSV FORMAT: 2ND COLUMN MUST SUM TO 1";

pub fn field_count_message(malformed: &[usize]) -> String {
    format!(
        "{TSV_PREFIX}: FILE MUST HAVE EXACTLY THREE COLUMNS. ROW {malformed:?} IS MISSING FIELDS"
    )
}

/// Check an abundance profile.
///
/// Rows with the wrong field count are reported before the sum is looked
/// at, so a file with both problems only gets the field-count diagnostic.
/// An empty file sums to 0 and is rejected.
pub fn validate_tsv(member: &ArchiveMember, options: &ValidatorOptions) -> Result<Verdict> {
    let scanner = RowScanner::new(&member.path);

    let malformed = scanner.malformed_line_numbers(ABUNDANCE_FIELDS)?;
    if !malformed.is_empty() {
        let msg = field_count_message(&malformed);
        log::warn!("{}: {}", member.name(), msg);
        return Ok(Verdict::invalid(member, msg));
    }

    let total = scanner.column_sum(ABUNDANCE_COLUMN)?;
    log::info!("{}: abundance profile sums to {}", member.name(), total);
    if !options.sum_matches(total) {
        log::warn!("{}: {}", member.name(), SUM_MESSAGE);
        return Ok(Verdict::invalid(member, SUM_MESSAGE));
    }

    log::info!("{}: tsv is in proper format", member.name());
    Ok(Verdict::valid(member))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MemberKind, VALID};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn profile(contents: &str) -> (NamedTempFile, ArchiveMember) {
        let mut f = NamedTempFile::with_suffix(".tsv").unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f.flush().unwrap();
        let member = ArchiveMember {
            path: f.path().to_path_buf(),
            kind: MemberKind::Tsv,
        };
        (f, member)
    }

    fn check(contents: &str) -> Verdict {
        let (_f, member) = profile(contents);
        validate_tsv(&member, &ValidatorOptions::default()).unwrap()
    }

    #[test]
    fn test_halves_are_valid() {
        let v = check("562\t0.5\tEscherichia coli\n1280\t0.5\tStaphylococcus aureus\n");
        assert!(v.valid);
        assert_eq!(v.message, VALID);
    }

    #[test]
    fn test_short_sum_is_rejected() {
        let v = check("562\t0.4\tEscherichia coli\n1280\t0.5\tStaphylococcus aureus\n");
        assert!(!v.valid);
        assert_eq!(v.message, SUM_MESSAGE);
    }

    #[test]
    fn test_missing_field_is_reported_by_row() {
        let v = check("562\t0.5\tEscherichia coli\n1280\t0.5\n");
        assert_eq!(
            v.message,
            "NOT IN TSV FORMAT: FILE MUST HAVE EXACTLY THREE COLUMNS. ROW [2] IS MISSING FIELDS"
        );
    }

    #[test]
    fn test_field_count_wins_over_sum() {
        let v = check("1\t0.1\ta\n2\t0.1\tb\textra\n3\t0.1\n");
        assert_eq!(v.message, field_count_message(&[2, 3]));
    }

    #[test]
    fn test_empty_profile_is_rejected_on_sum() {
        let v = check("");
        assert_eq!(v.message, SUM_MESSAGE);
    }

    #[test]
    fn test_non_numeric_abundance_is_an_error() {
        let (_f, member) = profile("1\t0.5\ta\n2\tn/a\tb\n");
        assert!(validate_tsv(&member, &ValidatorOptions::default()).is_err());
    }

    #[test]
    fn test_tolerance_accepts_rounding() {
        // 0.6 + 0.3 + 0.1 accumulates to 0.9999999999999999
        let (_f, member) = profile("1\t0.6\ta\n2\t0.3\tb\n3\t0.1\tc\n");
        let strict = validate_tsv(&member, &ValidatorOptions::default()).unwrap();
        assert!(!strict.valid);

        let loose = ValidatorOptions {
            sum_tolerance: 1e-6,
            ..ValidatorOptions::default()
        };
        assert!(validate_tsv(&member, &loose).unwrap().valid);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        const ABUNDANCES: [f64; 8] = [0.0, 0.1, 0.125, 0.2, 0.25, 0.3, 0.5, 1.0];

        fn row() -> impl Strategy<Value = (usize, f64)> {
            (1usize..=5, prop::sample::select(ABUNDANCES.to_vec()))
        }

        fn render(rows: &[(usize, f64)]) -> String {
            let mut text = String::new();
            for (i, &(fields, abundance)) in rows.iter().enumerate() {
                let mut cols = vec![format!("{}", i + 1), abundance.to_string(), format!("taxon {i}")];
                cols.resize(fields.max(3), "extra".to_string());
                cols.truncate(fields);
                text.push_str(&cols.join("\t"));
                text.push('\n');
            }
            text
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(128))]

            /// Valid exactly when every row has three fields and the
            /// accumulated abundance is exactly 1.
            #[test]
            fn prop_sum_invariant(rows in prop::collection::vec(row(), 0..8)) {
                let verdict = check(&render(&rows));

                let malformed: Vec<usize> = rows
                    .iter()
                    .enumerate()
                    .filter(|(_, (fields, _))| *fields != ABUNDANCE_FIELDS)
                    .map(|(i, _)| i + 1)
                    .collect();
                let total = rows.iter().fold(0.0f64, |acc, &(_, a)| acc + a);

                let expected = if !malformed.is_empty() {
                    field_count_message(&malformed)
                } else if total == 1.0 {
                    VALID.to_string()
                } else {
                    SUM_MESSAGE.to_string()
                };
                prop_assert_eq!(verdict.valid, malformed.is_empty() && total == 1.0);
                prop_assert_eq!(verdict.message, expected);
            }
        }
    }
}
