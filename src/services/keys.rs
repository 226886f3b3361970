//! Object key construction for uploads.

use chrono::{DateTime, SecondsFormat, Utc};

const FALLBACK_FILENAME: &str = "file";

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
///
/// Replacement is per UTF-16 code unit, so a character outside the BMP
/// (most emoji) becomes `__`; keys written by earlier deployments use the
/// same shape. Blank names become `file`.
pub fn sanitize_filename(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }
    let mut out = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            out.push(c);
        } else {
            out.extend(std::iter::repeat_n('_', c.len_utf16()));
        }
    }
    out
}

/// Build the default key for an upload: `{prefix/}{timestamp}-{filename}`.
///
/// The timestamp is ISO-8601 UTC with millisecond precision and every `:`
/// and `.` turned into `-`, so generated keys sort by upload time.
pub fn build_key(prefix: &str, filename: &str, now: DateTime<Utc>) -> String {
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    let raw_key = format!("{}-{}", stamp, sanitize_filename(filename));
    if prefix.is_empty() {
        raw_key
    } else {
        format!("{}/{}", prefix, raw_key)
    }
}

/// Last path segment of a key, ignoring trailing slashes. Used as the
/// download filename.
pub fn basename(key: &str) -> &str {
    let trimmed = key.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap()
            + chrono::Duration::milliseconds(123)
    }

    #[test]
    fn sanitize_keeps_allowed_characters() {
        assert_eq!(sanitize_filename("report-v1.2_final.pdf"), "report-v1.2_final.pdf");
    }

    #[test]
    fn sanitize_replaces_everything_else() {
        assert_eq!(sanitize_filename("my report (1).pdf"), "my_report__1_.pdf");
        assert_eq!(sanitize_filename("../etc/passwd"), ".._etc_passwd");
        assert_eq!(sanitize_filename("café.txt"), "caf_.txt");
    }

    #[test]
    fn sanitize_counts_utf16_units_outside_the_bmp() {
        assert_eq!(sanitize_filename("\u{1F600}.png"), "__.png");
        assert_eq!(sanitize_filename("a\u{1D11E}b"), "a__b");
        assert_eq!(sanitize_filename("日本.txt"), "__.txt");
    }

    #[test]
    fn sanitize_never_returns_empty() {
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename("   \t"), "file");
    }

    #[test]
    fn sanitized_names_stay_in_the_safe_alphabet() {
        for name in ["a b", "ü/ß", "\u{1F600}.png", "\"quoted\"", "x\r\ny", "  padded  "] {
            let out = sanitize_filename(name);
            assert!(!out.is_empty());
            assert!(
                out.chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')),
                "unexpected character in {:?}",
                out
            );
        }
    }

    #[test]
    fn build_key_without_prefix() {
        assert_eq!(
            build_key("", "photo 1.jpg", fixed_now()),
            "2024-05-01T12-30-45-123Z-photo_1.jpg"
        );
    }

    #[test]
    fn build_key_with_prefix() {
        assert_eq!(
            build_key("uploads/docs", "a.txt", fixed_now()),
            "uploads/docs/2024-05-01T12-30-45-123Z-a.txt"
        );
    }

    #[test]
    fn generated_timestamp_has_no_colons_or_dots() {
        let key = build_key("", "notes.md", Utc::now());
        let (stamp, name) = key.split_at(key.len() - "-notes.md".len());
        assert!(!stamp.contains(':') && !stamp.contains('.'));
        assert_eq!(name, "-notes.md");
    }

    #[test]
    fn basename_takes_last_segment() {
        assert_eq!(basename("a/b/c.txt"), "c.txt");
        assert_eq!(basename("c.txt"), "c.txt");
        assert_eq!(basename("dir/sub/"), "sub");
        assert_eq!(basename("/"), "");
    }
}
