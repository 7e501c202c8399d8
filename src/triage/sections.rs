use regex::Regex;
use std::sync::LazyLock;

/// Issue body split into `#` headings and the text under each, in heading order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionMap {
    entries: Vec<(String, String)>,
}

impl SectionMap {
    pub fn get(&self, heading: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(h, _)| h == heading)
            .map(|(_, content)| content.as_str())
    }

    pub fn headings(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(h, _)| h.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A repeated heading keeps its first position but takes the later content.
    fn insert(&mut self, heading: String, content: String) {
        match self.entries.iter_mut().find(|(h, _)| *h == heading) {
            Some(entry) => entry.1 = content,
            None => self.entries.push((heading, content)),
        }
    }
}

fn is_heading(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

fn heading_text(line: &str) -> String {
    line.replace('#', "").trim().to_string()
}

/// Split a markdown issue body into sections keyed by heading text.
///
/// Any line whose first non-blank character is `#` opens a new section.
/// Text before the first heading belongs to no section and is dropped.
/// Section content is trimmed.
pub fn parse_sections(body: &str) -> SectionMap {
    let (mut map, open) = body.lines().fold(
        (SectionMap::default(), None::<(String, Vec<&str>)>),
        |(mut map, open), line| {
            if is_heading(line) {
                if let Some((heading, lines)) = open {
                    map.insert(heading, lines.join("\n").trim().to_string());
                }
                (map, Some((heading_text(line), Vec::new())))
            } else {
                let open = open.map(|(heading, mut lines)| {
                    lines.push(line);
                    (heading, lines)
                });
                (map, open)
            }
        },
    );
    if let Some((heading, lines)) = open {
        map.insert(heading, lines.join("\n").trim().to_string());
    }
    map
}

static NUMBERED_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+\.\s*$").expect("numbered marker regex"));
static BARE_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s*$").expect("bare bullet regex"));
static UNFILLED_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s*[^:]+:\s*$").expect("unfilled field regex"));

/// Template scaffolding: `1.`, `-`, or `- Label:` with nothing after it.
fn is_scaffold(line: &str) -> bool {
    NUMBERED_MARKER.is_match(line) || BARE_BULLET.is_match(line) || UNFILLED_FIELD.is_match(line)
}

/// Strip template scaffolding from section content.
///
/// Scaffold lines are blanked before blank runs are collapsed, so a section
/// holding only unfilled placeholders reduces to the empty string.
pub fn strip_scaffolding(content: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for line in content.trim().lines() {
        let line = if is_scaffold(line) { "" } else { line };
        let blank = line.trim().is_empty();
        if blank && kept.last().is_some_and(|prev| prev.trim().is_empty()) {
            continue;
        }
        kept.push(if blank { "" } else { line });
    }
    kept.join("\n").trim().to_string()
}

pub fn is_section_empty(content: &str) -> bool {
    strip_scaffolding(content).is_empty()
}
