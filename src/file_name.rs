use lazy_static::lazy_static;
use regex::Regex;

const MAX_FILE_NAME_LEN: usize = 255;

const RESERVED_NAMES: [&str; 22] = [
    "con", "prn", "aux", "nul",
    "com1", "com2", "com3", "com4", "com5", "com6", "com7", "com8", "com9",
    "lpt1", "lpt2", "lpt3", "lpt4", "lpt5", "lpt6", "lpt7", "lpt8", "lpt9",
];

/// Strips whatever cannot be part of a file name on common file systems.
/// Returns an empty string when nothing usable is left.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name.chars()
        .filter(|&c| !c.is_control())
        .filter(|c| !matches!(c, '/' | '?' | '<' | '>' | '\\' | ':' | '*' | '|' | '"'))
        .collect();

    let cleaned = cleaned.trim_end_matches(|c| c == '.' || c == ' ');
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return String::new();
    }

    let stem = cleaned.split('.').next().unwrap_or(cleaned).to_ascii_lowercase();
    if RESERVED_NAMES.contains(&stem.as_str()) {
        return String::new();
    }

    truncate_bytes(cleaned, MAX_FILE_NAME_LEN).to_string()
}

fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Turns a post title into a lower-case, hyphenated file name: "Hello World" becomes `hello-world`.
pub fn slug_from_title(title: &str) -> String {
    lazy_static! {
        static ref NOT_ALNUM: Regex = Regex::new(r"[^a-zA-Z0-9]").unwrap();
        static ref HYPHENS: Regex = Regex::new(r"-{2,}").unwrap();
    }

    let ascii = unidecode::unidecode(title);
    let name = sanitize_file_name(&ascii);
    let name = name.replace(['.', '\''], "");
    let name = NOT_ALNUM.replace_all(&name, "-");
    let name = HYPHENS.replace_all(&name, "-");

    name.trim_matches('-').to_lowercase()
}
