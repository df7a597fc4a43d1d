//! Normalization of flattener output before chunking.

use once_cell::sync::Lazy;
use regex::Regex;

use super::FILE_BOUNDARY_MARKER;

/// A line made only of a run of 10+ `-`, `=` or `*` characters.
static SEPARATOR_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[-=*]{10,}\s*$").expect("valid regex"));

/// Rewrite separator lines into the canonical file boundary marker and make
/// sure every `File: <name>` header is wrapped by a marker line on each side.
///
/// Headers already framed by separators are not framed twice, so running the
/// pass again is a no-op.
pub fn normalize_flattened(text: &str) -> String {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut out = String::with_capacity(text.len() + 64);
    let mut last_was_marker = false;

    for (idx, line) in lines.iter().enumerate() {
        let (body, eol) = split_eol(line);

        if is_separator(body) {
            out.push_str(FILE_BOUNDARY_MARKER);
            out.push_str(eol);
            last_was_marker = true;
        } else if is_file_header(body) {
            let header_eol = if eol.is_empty() { "\n" } else { eol };
            if !last_was_marker {
                out.push_str(FILE_BOUNDARY_MARKER);
                out.push_str(header_eol);
            }
            out.push_str(body);
            out.push_str(header_eol);

            let next_is_separator =
                lines.get(idx + 1).is_some_and(|next| is_separator(split_eol(next).0));
            if next_is_separator {
                last_was_marker = false;
            } else {
                out.push_str(FILE_BOUNDARY_MARKER);
                out.push_str(eol);
                last_was_marker = true;
            }
        } else {
            out.push_str(line);
            last_was_marker = false;
        }
    }

    out
}

fn split_eol(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

fn is_separator(body: &str) -> bool {
    SEPARATOR_LINE.is_match(body)
}

fn is_file_header(body: &str) -> bool {
    body.strip_prefix("File: ").is_some_and(|name| !name.trim().is_empty())
}
