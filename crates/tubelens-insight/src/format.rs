//! Reformats model replies into indented markdown.

const SECTION_MARKERS: [&str; 4] = ["1️⃣", "2️⃣", "3️⃣", "4️⃣"];
const SUBSECTION_MARKER: &str = "▶️";

/// Turns the marker conventions the prompts ask for into markdown.
///
/// Line rules, checked in order on the trimmed line:
///
/// | line | output |
/// |------|--------|
/// | empty | blank line |
/// | contains a numbered section marker | `### ` header |
/// | starts with `▶️` | `#### ` header |
/// | starts with `####` | kept, set apart by a blank line |
/// | starts with `•` | `*` list item |
/// | starts with `-` | nested `-` list item |
/// | anything else | kept as-is |
#[must_use]
pub fn tidy_response(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            out.push('\n');
        } else if SECTION_MARKERS.iter().any(|m| line.contains(m)) {
            out.push_str(&format!("\n\n### {line}\n"));
        } else if line.starts_with(SUBSECTION_MARKER) {
            out.push_str(&format!("\n#### {line}\n"));
        } else if line.starts_with("####") {
            out.push_str(&format!("\n{line}\n"));
        } else if let Some(item) = line.strip_prefix('•') {
            out.push_str(&format!("\n    * {}\n", item.trim()));
        } else if let Some(detail) = line.strip_prefix('-') {
            out.push_str(&format!("\n        - {}\n", detail.trim()));
        } else {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
