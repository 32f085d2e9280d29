//! Filename sanitization for uploaded files.

/// Filesystem name limit, in characters.
pub const MAX_FILENAME_LENGTH: usize = 255;

const FALLBACK_FILENAME: &str = "untitled";

/// Make a client-supplied filename safe to log, store and display.
///
/// Path separators, reserved characters and control characters become `_`,
/// runs of `_` collapse to one, and leading/trailing dots, dashes, underscores
/// and whitespace are stripped. Over-long names are cut while keeping the
/// extension.
pub fn sanitize_filename(name: &str) -> String {
    let mut replaced = String::with_capacity(name.len());
    let mut last_was_underscore = false;
    for c in name.chars() {
        let c = if c.is_control()
            || matches!(c, '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*')
        {
            '_'
        } else {
            c
        };
        if c == '_' {
            if last_was_underscore {
                continue;
            }
            last_was_underscore = true;
        } else {
            last_was_underscore = false;
        }
        replaced.push(c);
    }

    let trimmed = trim_punctuation(&replaced);
    if trimmed.is_empty() {
        return FALLBACK_FILENAME.to_string();
    }

    truncate_preserving_extension(trimmed, MAX_FILENAME_LENGTH)
}

fn trim_punctuation(s: &str) -> &str {
    s.trim_matches(|c: char| c == '.' || c == '_' || c == '-' || c.is_whitespace())
}

fn truncate_preserving_extension(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        return name.to_string();
    }

    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.chars().count() < max_chars / 2 => {
            let keep = max_chars - ext.chars().count() - 1;
            let stem: String = stem.chars().take(keep).collect();
            format!("{}.{}", stem, ext)
        }
        _ => name.chars().take(max_chars).collect(),
    }
}

/// Lowercased final extension, if any.
pub fn file_extension(name: &str) -> Option<String> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_lowercase())
        .filter(|ext| !ext.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_traversal_neutralized() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(
            sanitize_filename("..\\..\\windows\\system32\\config"),
            "windows_system32_config"
        );
    }

    #[test]
    fn test_reserved_and_control_characters_replaced() {
        assert_eq!(sanitize_filename("sun<>:\"|?*set.png"), "sun_set.png");
        assert_eq!(sanitize_filename("file\0name\x01.jpg"), "file_name_.jpg");
    }

    #[test]
    fn test_leading_and_trailing_punctuation_stripped() {
        assert_eq!(sanitize_filename(".hidden.png"), "hidden.png");
        assert_eq!(sanitize_filename("__--name.jpg.. "), "name.jpg");
    }

    #[test]
    fn test_empty_falls_back_to_untitled() {
        assert_eq!(sanitize_filename(""), "untitled");
        assert_eq!(sanitize_filename("..."), "untitled");
        assert_eq!(sanitize_filename("/"), "untitled");
    }

    #[test]
    fn test_normal_names_preserved() {
        assert_eq!(sanitize_filename("photo.jpg"), "photo.jpg");
        assert_eq!(
            sanitize_filename("my painting (1).png"),
            "my painting (1).png"
        );
    }

    #[test]
    fn test_long_names_keep_extension() {
        let long_name = "a".repeat(300) + ".jpeg";
        let result = sanitize_filename(&long_name);
        assert_eq!(result.chars().count(), MAX_FILENAME_LENGTH);
        assert!(result.ends_with(".jpeg"));
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("Photo.JPG"), Some("jpg".to_string()));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension("trailing."), None);
    }
}
