use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    /// Characters allowed in a stored filename
    /// - Kept: ASCII letters, digits, `_`, `.`, `-`
    /// - Dropped: everything else (quotes, `:`, `*`, non-ASCII, ...)
    static ref FILENAME_STRIP_REGEX: Regex = Regex::new(r"[^A-Za-z0-9_.-]").unwrap();
}

/// Turn a client supplied filename into a safe single path component.
///
/// Accents are folded (NFKD, then non-ASCII dropped), path separators become
/// whitespace, whitespace runs collapse into `_`, disallowed characters are
/// removed and leading/trailing `.`/`_` trimmed, so `../../etc/passwd`
/// becomes `etc_passwd`. The result may be empty.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename.nfkd().filter(char::is_ascii).collect();
    let separated = ascii.replace(['/', '\\'], " ");
    let joined = separated.split_whitespace().collect::<Vec<_>>().join("_");

    FILENAME_STRIP_REGEX
        .replace_all(&joined, "")
        .trim_matches(|c| c == '.' || c == '_')
        .to_string()
}

/// True when `name` can be joined onto a storage directory without escaping it
pub fn is_single_component(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Lowercased extension without the dot
pub fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

/// True when the name ends in `.pdf`, ignoring case
pub fn is_pdf_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".pdf")
}

/// Filename with its last extension removed (`photo.png` -> `photo`)
pub fn stem_of(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_filename_keeps_plain_names() {
        assert_eq!(secure_filename("photo.png"), "photo.png");
        assert_eq!(secure_filename("report-2024_v2.PDF"), "report-2024_v2.PDF");
    }

    #[test]
    fn test_secure_filename_strips_traversal() {
        assert_eq!(secure_filename("../../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(secure_filename("/tmp/upload.txt"), "tmp_upload.txt");
    }

    #[test]
    fn test_secure_filename_collapses_whitespace() {
        assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(secure_filename("  spaced\tout  .txt"), "spaced_out_.txt");
    }

    #[test]
    fn test_secure_filename_drops_disallowed_characters() {
        assert_eq!(secure_filename("a\"b:c*d?.png"), "abcd.png");
        assert_eq!(secure_filename("日本語"), "");
    }

    #[test]
    fn test_secure_filename_folds_accents() {
        assert_eq!(secure_filename("résumé.pdf"), "resume.pdf");
        assert_eq!(secure_filename("Ångström ﬁle.txt"), "Angstrom_file.txt");
    }

    #[test]
    fn test_secure_filename_can_be_empty() {
        assert_eq!(secure_filename("../.."), "");
        assert_eq!(secure_filename("___"), "");
        assert_eq!(secure_filename(""), "");
    }

    #[test]
    fn test_is_single_component() {
        assert!(is_single_component("photo.png"));
        assert!(is_single_component("..hidden"));
        assert!(!is_single_component(""));
        assert!(!is_single_component(".."));
        assert!(!is_single_component("a/b.png"));
        assert!(!is_single_component("a\\b.png"));
    }

    #[test]
    fn test_extension_and_stem() {
        assert_eq!(extension_of("photo.JPG"), Some("jpg".to_string()));
        assert_eq!(extension_of("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(extension_of("README"), None);
        assert_eq!(stem_of("photo.png"), "photo");
        assert_eq!(stem_of("archive.tar.gz"), "archive.tar");
    }

    #[test]
    fn test_is_pdf_name() {
        assert!(is_pdf_name("scan.pdf"));
        assert!(is_pdf_name("SCAN.PDF"));
        assert!(!is_pdf_name("scan.pdf.png"));
        assert!(!is_pdf_name("pdf"));
    }
}
