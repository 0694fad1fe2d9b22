use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use biogate_rs::config::{parse_tolerance, ValidatorOptions};
use biogate_rs::validate_members;

const USAGE: &str =
    "usage: biogate-rs [--json | --json-verdicts] [--parallel] [--tolerance X] <PATH>...";

#[derive(Debug, Clone, Copy, PartialEq)]
enum Output {
    Lines,
    /// JSON array of summary lines.
    Json,
    /// JSON array of structured verdicts.
    Verdicts,
}

struct CliArgs {
    output: Output,
    options: ValidatorOptions,
    inputs: Vec<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let mut cli = CliArgs {
        output: Output::Lines,
        options: ValidatorOptions::from_env(),
        inputs: Vec::new(),
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--json" => cli.output = Output::Json,
            "--json-verdicts" => cli.output = Output::Verdicts,
            "--parallel" => cli.options.parallel = true,
            "--tolerance" => {
                let raw = args.next().ok_or("--tolerance needs a value")?;
                cli.options.sum_tolerance = parse_tolerance(&raw)
                    .ok_or_else(|| format!("invalid tolerance {raw:?}"))?;
            }
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}")),
            _ => cli.inputs.push(PathBuf::from(&arg)),
        }
    }

    if cli.inputs.is_empty() {
        return Err(USAGE.to_string());
    }
    Ok(cli)
}

/// Expand directories (an unpacked upload) into their regular files, sorted by name.
fn gather_members(inputs: &[PathBuf]) -> std::io::Result<Vec<PathBuf>> {
    let mut members = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut files: Vec<PathBuf> = fs::read_dir(input)?
                .filter_map(|entry| {
                    let path = entry.ok()?.path();
                    path.is_file().then_some(path)
                })
                .collect();
            files.sort();
            members.extend(files);
        } else {
            members.push(input.clone());
        }
    }
    Ok(members)
}

fn spinner(color: &str, msg: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let template = format!("{{spinner:.{color}}} {{msg}}");
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template(&template)
    {
        spinner.set_style(style);
    }
    spinner.set_message(msg.to_string());
    spinner
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = match parse_args(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::from(2);
        }
    };

    // 1. Collect members
    let members = match gather_members(&cli.inputs) {
        Ok(members) => members,
        Err(e) => {
            let inputs: Vec<String> = cli.inputs.iter().map(|p| p.display().to_string()).collect();
            eprintln!("cannot list {}: {e}", inputs.join(", "));
            return ExitCode::from(2);
        }
    };

    // 2. Validate
    let progress = spinner("green", &format!("Validating {} member(s)...", members.len()));
    let report = validate_members(&members, &cli.options);
    progress.finish_with_message(format!(
        "Validation finished: {} of {} invalid.",
        report.invalid_count(),
        report.verdicts.len()
    ));

    // 3. Report
    let encoded = match cli.output {
        Output::Lines => {
            for line in report.summary_lines() {
                println!("{line}");
            }
            Ok(None)
        }
        Output::Json => report.to_json().map(Some),
        Output::Verdicts => report.to_json_verdicts().map(Some),
    };
    match encoded {
        Ok(Some(json)) => println!("{json}"),
        Ok(None) => {}
        Err(e) => {
            eprintln!("cannot encode verdicts: {e}");
            return ExitCode::from(2);
        }
    }

    if report.all_valid() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<CliArgs, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_flags_and_paths() {
        let cli = args(&["--json", "--tolerance", "0.001", "a.tsv", "reads"]).unwrap();
        assert_eq!(cli.output, Output::Json);
        assert_eq!(cli.options.sum_tolerance, 0.001);
        assert_eq!(cli.inputs, vec![PathBuf::from("a.tsv"), PathBuf::from("reads")]);
    }

    #[test]
    fn test_structured_output_flag() {
        let cli = args(&["--json-verdicts", "--parallel", "reads"]).unwrap();
        assert_eq!(cli.output, Output::Verdicts);
        assert!(cli.options.parallel);
        assert_eq!(args(&["x.tsv"]).unwrap().output, Output::Lines);
    }

    #[test]
    fn test_usage_errors() {
        assert!(args(&[]).is_err());
        assert!(args(&["--tolerance"]).is_err());
        assert!(args(&["--tolerance", "-3", "a.tsv"]).is_err());
        assert!(args(&["--frobnicate", "a.tsv"]).is_err());
    }

    #[test]
    fn test_directory_members_are_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.fastq"), "").unwrap();
        fs::write(dir.path().join("a.tsv"), "").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let members = gather_members(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = members
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.tsv", "b.fastq"]);
    }
}
