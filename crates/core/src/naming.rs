//! Output filename derivation.
//!
//! User-supplied names come straight from a browser form field, so they
//! are sanitized to a filesystem-safe subset before the export format's
//! extension is appended. The derivation is deterministic: the same
//! input always yields the same filename.

use std::sync::OnceLock;

use regex::Regex;

use crate::format::ExportFormat;

fn invalid_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9 _.\-]").expect("static regex"))
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

fn hyphen_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-+").expect("static regex"))
}

fn trailing_extension() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.[A-Za-z0-9]{1,8}$").expect("static regex"))
}

/// Derive a safe output filename from an optional user-supplied base
/// name and the requested export format.
///
/// Characters outside `[A-Za-z0-9 _.-]` are stripped, whitespace runs
/// become single hyphens, hyphen runs collapse, and any trailing
/// extension the user typed is removed before the format's extension is
/// appended. If nothing usable remains, the job id becomes the base
/// name, so two jobs can never collide on an empty input.
pub fn output_filename(base: Option<&str>, format: ExportFormat, job_id: &str) -> String {
    let raw = base.unwrap_or_default();
    let stripped = invalid_chars().replace_all(raw, "");
    let hyphenated = whitespace_runs().replace_all(stripped.trim(), "-");
    let collapsed = hyphen_runs().replace_all(&hyphenated, "-");
    let stem = trailing_extension().replace(&collapsed, "");
    let stem = stem.trim_matches('-');

    let base_name = if stem.is_empty() { job_id } else { stem };
    format!("{base_name}.{}", format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn punctuation_is_stripped_and_spaces_become_hyphens() {
        let name = output_filename(Some("My Clip!!"), ExportFormat::Webm, "job-1");
        assert_eq!(name, "My-Clip.webm");
    }

    #[test]
    fn empty_name_falls_back_to_job_id() {
        let name = output_filename(Some(""), ExportFormat::Mp4, "abc123");
        assert_eq!(name, "abc123.mp4");
    }

    #[test]
    fn missing_name_falls_back_to_job_id() {
        let name = output_filename(None, ExportFormat::Mov, "abc123");
        assert_eq!(name, "abc123.mov");
    }

    #[test]
    fn user_typed_extension_is_replaced() {
        let name = output_filename(Some("final_cut.mov"), ExportFormat::Mp4, "job-1");
        assert_eq!(name, "final_cut.mp4");
    }

    #[test]
    fn hyphen_runs_collapse() {
        let name = output_filename(Some("a --- b"), ExportFormat::Mp4, "job-1");
        assert_eq!(name, "a-b.mp4");
    }

    #[test]
    fn fully_invalid_name_falls_back_to_job_id() {
        let name = output_filename(Some("???///"), ExportFormat::Webm, "job-9");
        assert_eq!(name, "job-9.webm");
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = output_filename(Some("Take 2"), ExportFormat::Mp4, "job-1");
        let b = output_filename(Some("Take 2"), ExportFormat::Mp4, "job-1");
        assert_eq!(a, b);
    }
}
