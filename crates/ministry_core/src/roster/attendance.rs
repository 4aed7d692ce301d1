//! Parsing of the pasted attendance list.
//!
//! Each line looks like `Name - status`. Anything that does not fit is
//! dropped silently; the composer is best-effort.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use super::catalog::COORDINATORS;

const SEPARATORS: [char; 3] = ['-', '–', '—'];
const CHECK_MARKS: [char; 5] = ['✅', '✔', '✓', '☑', '🆗'];
const CONFIRMED_WORDS: [&str; 3] = ["ok", "presenca", "presente"];

/// Accent-stripped, lowercased, trimmed form used for every comparison.
pub fn normalize(input: &str) -> String {
    input
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .trim()
        .to_lowercase()
}

/// One usable line of the attendance list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceEntry {
    pub name: String,
    pub status: String,
}

/// Splits a line at its first dash. Lines without a dash or without a name
/// yield `None`.
pub fn parse_line(line: &str) -> Option<AttendanceEntry> {
    let (name, status) = line.split_once(SEPARATORS)?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some(AttendanceEntry {
        name: name.to_string(),
        status: status.trim().to_string(),
    })
}

pub fn is_confirmed(status: &str) -> bool {
    if status.contains(CHECK_MARKS) {
        return true;
    }
    let status = normalize(status);
    status.starts_with("confirm") || CONFIRMED_WORDS.contains(&status.as_str())
}

pub fn is_coordinator(name: &str) -> bool {
    let name = normalize(name);
    COORDINATORS.iter().any(|c| normalize(c) == name)
}

/// Names, in input order, that confirmed and are not coordinators.
pub fn confirmed_names(text: &str) -> Vec<String> {
    text.lines()
        .filter_map(parse_line)
        .filter(|entry| is_confirmed(&entry.status) && !is_coordinator(&entry.name))
        .map(|entry| entry.name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_accents_and_case() {
        assert_eq!(normalize("  PRESENÇA "), "presenca");
        assert_eq!(normalize("João"), "joao");
        assert_eq!(normalize("Cláudio"), "claudio");
    }

    #[test]
    fn confirmed_statuses() {
        for status in ["✅", "confirmado", "Confirmada", "OK", "presença", "Presente", "sim ✔"] {
            assert!(is_confirmed(status), "{status} should confirm");
        }
    }

    #[test]
    fn unconfirmed_statuses() {
        for status in ["justificado", "ausente", "", "não vou", "okay", "❌"] {
            assert!(!is_confirmed(status), "{status} should not confirm");
        }
    }

    #[test]
    fn lines_split_on_first_dash_of_any_kind() {
        assert_eq!(
            parse_line("Ana Paula – confirmada - chega 8h"),
            Some(AttendanceEntry {
                name: "Ana Paula".to_string(),
                status: "confirmada - chega 8h".to_string(),
            })
        );
        assert_eq!(parse_line("Marcos — ✅").unwrap().name, "Marcos");
        assert_eq!(parse_line("sem separador"), None);
        assert_eq!(parse_line(" - ✅"), None);
    }

    #[test]
    fn coordinators_are_excluded_case_and_accent_insensitively() {
        let text = "ivan - ✅\nCLAUDIO - confirmado\nLucas - ok";
        assert_eq!(confirmed_names(text), vec!["Lucas".to_string()]);
    }

    #[test]
    fn confirmed_names_keep_input_order_and_skip_noise() {
        let text = "Escala domingo\n\nJoão - Confirmado\nMaria - Confirmada\nPedro - Justificado\n";
        assert_eq!(confirmed_names(text), vec!["João".to_string(), "Maria".to_string()]);
    }
}
