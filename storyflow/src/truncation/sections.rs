//! Splitting structured prompts into header-delimited sections.
//!
//! A header is a line whose first non-blank characters are the marker
//! (default `"## "`). Each section runs from its header line to the newline
//! before the next header. Text ahead of the first header forms a leading
//! section with an empty header. Joining the pieces with `"\n"` gives back the
//! original text byte for byte.

/// One (header, body) unit of a structured prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Header line including its trailing newline when present; empty for the leading section.
    pub header: String,
    pub body: String,
}

impl Section {
    fn from_segment(segment: &str, has_header: bool) -> Self {
        if !has_header {
            return Self {
                header: String::new(),
                body: segment.to_string(),
            };
        }
        let split = segment.find('\n').map(|i| i + 1).unwrap_or(segment.len());
        Self {
            header: segment[..split].to_string(),
            body: segment[split..].to_string(),
        }
    }

    pub fn text(&self) -> String {
        format!("{}{}", self.header, self.body)
    }
}

fn is_header_line(line: &str, marker: &str) -> bool {
    line.trim_start_matches([' ', '\t']).starts_with(marker)
}

/// Byte offsets of every header line start.
fn header_starts(text: &str, marker: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut offset = 0;
    for line in text.split('\n') {
        if is_header_line(line, marker) {
            starts.push(offset);
        }
        offset += line.len() + 1;
    }
    starts
}

/// Splits `text` into sections. Returns an empty vec when no header is found.
pub fn parse_sections(text: &str, marker: &str) -> Vec<Section> {
    let starts = header_starts(text, marker);
    let Some(&first) = starts.first() else {
        return Vec::new();
    };

    let mut sections = Vec::with_capacity(starts.len() + 1);
    if first > 0 {
        // `first - 1` is the newline ending the leading text.
        sections.push(Section::from_segment(&text[..first - 1], false));
    }
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).map(|next| next - 1).unwrap_or(text.len());
        sections.push(Section::from_segment(&text[start..end], true));
    }
    sections
}

/// Rebuilds text from sections, the inverse of `parse_sections`.
pub fn join_sections(sections: &[Section]) -> String {
    sections
        .iter()
        .map(Section::text)
        .collect::<Vec<_>>()
        .join("\n")
}
