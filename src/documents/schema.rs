// src/documents/schema.rs
//
// Structured document schemas returned by the language model. These are
// ephemeral: parsed once per export request, handed to a renderer, and
// discarded. The report schema is lenient (missing fields fall back to
// placeholder strings); the slide deck schema is strict and a missing key
// fails the request.

use serde::{Deserialize, Deserializer};

#[derive(Debug, Default, Deserialize)]
pub struct ReportDocument {
    #[serde(default)]
    pub metadata: ReportMetadata,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub citations: Vec<Citation>,
    #[serde(default)]
    pub appendices: Vec<Appendix>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub date: Option<String>,
    pub document_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Section {
    pub heading: Option<String>,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub paragraphs: Vec<String>,
    #[serde(default)]
    pub subsections: Vec<Subsection>,
}

fn default_level() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct Subsection {
    pub heading: Option<String>,
    #[serde(default)]
    pub paragraphs: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Citation {
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: Option<String>,
    pub title: Option<String>,
    pub venue: Option<String>,
    #[serde(rename = "type")]
    pub citation_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Appendix {
    pub title: Option<String>,
    #[serde(default)]
    pub content: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SlideDeck {
    pub title: String,
    pub slides: Vec<Slide>,
}

#[derive(Debug, Deserialize)]
pub struct Slide {
    pub title: String,
    pub bullets: Vec<String>,
}

/// Models emit publication years as either strings or bare numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    }))
}

/// A fragment of formatted citation text. Italics are the only styling the
/// citation templates use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
    pub text: String,
    pub italic: bool,
}

impl StyledSpan {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            italic: false,
        }
    }

    fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            italic: true,
        }
    }
}

/// Formats a citation per its type (APA style). Unknown types fall through
/// to the default template.
pub fn format_citation(citation: &Citation) -> Vec<StyledSpan> {
    let authors = if citation.authors.is_empty() {
        "Unknown Author".to_string()
    } else {
        citation.authors.join(", ")
    };
    let year = citation.year.as_deref().unwrap_or("n.d.");
    let title = citation.title.as_deref().unwrap_or("Untitled");
    let venue = citation.venue.as_deref().unwrap_or("");

    match citation.citation_type.as_deref().unwrap_or("journal") {
        "journal" => vec![
            StyledSpan::plain(format!("{} ({}). {}. ", authors, year, title)),
            StyledSpan::italic(venue),
            StyledSpan::plain("."),
        ],
        "book" => vec![
            StyledSpan::plain(format!("{} ({}). ", authors, year)),
            StyledSpan::italic(title),
            StyledSpan::plain(format!(". {}.", venue)),
        ],
        "conference" => vec![
            StyledSpan::plain(format!("{} ({}). {}. In ", authors, year, title)),
            StyledSpan::italic(venue),
            StyledSpan::plain("."),
        ],
        "web" => vec![StyledSpan::plain(format!(
            "{} ({}). {}. Retrieved from {}",
            authors, year, title, venue
        ))],
        _ => vec![StyledSpan::plain(format!(
            "{} ({}). {}. {}.",
            authors, year, title, venue
        ))],
    }
}

#[cfg(test)]
pub fn citation_text(spans: &[StyledSpan]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(kind: Option<&str>) -> Citation {
        Citation {
            authors: vec!["Smith, J.".to_string(), "Doe, A.".to_string()],
            year: Some("2021".to_string()),
            title: Some("On Cats".to_string()),
            venue: Some("Journal of Felines".to_string()),
            citation_type: kind.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_journal_citation_italicizes_venue() {
        let spans = format_citation(&citation(Some("journal")));
        assert_eq!(
            citation_text(&spans),
            "Smith, J., Doe, A. (2021). On Cats. Journal of Felines."
        );
        assert!(spans.iter().any(|s| s.italic && s.text == "Journal of Felines"));
    }

    #[test]
    fn test_book_citation_italicizes_title() {
        let spans = format_citation(&citation(Some("book")));
        assert!(spans.iter().any(|s| s.italic && s.text == "On Cats"));
        assert!(citation_text(&spans).ends_with("Journal of Felines."));
    }

    #[test]
    fn test_conference_citation_uses_in_prefix() {
        let spans = format_citation(&citation(Some("conference")));
        assert!(citation_text(&spans).contains("In Journal of Felines"));
    }

    #[test]
    fn test_web_citation_has_retrieved_from() {
        let spans = format_citation(&citation(Some("web")));
        assert_eq!(
            citation_text(&spans),
            "Smith, J., Doe, A. (2021). On Cats. Retrieved from Journal of Felines"
        );
        assert!(spans.iter().all(|s| !s.italic));
    }

    #[test]
    fn test_unknown_type_uses_default_template() {
        let spans = format_citation(&citation(Some("preprint")));
        assert_eq!(
            citation_text(&spans),
            "Smith, J., Doe, A. (2021). On Cats. Journal of Felines."
        );
        assert!(spans.iter().all(|s| !s.italic));
    }

    #[test]
    fn test_missing_fields_use_placeholders() {
        let empty = Citation {
            authors: vec![],
            year: None,
            title: None,
            venue: None,
            citation_type: None,
        };
        let text = citation_text(&format_citation(&empty));
        assert!(text.starts_with("Unknown Author (n.d.). Untitled."));
    }

    #[test]
    fn test_report_tolerates_missing_fields() {
        let report: ReportDocument = serde_json::from_str(
            r#"{"sections": [{"paragraphs": ["hello"]}],
                "citations": [{"year": 2020}]}"#,
        )
        .unwrap();
        assert_eq!(report.sections.len(), 1);
        assert_eq!(report.sections[0].level, 1);
        assert!(report.sections[0].heading.is_none());
        assert_eq!(report.citations[0].year.as_deref(), Some("2020"));
        assert!(report.appendices.is_empty());
    }

    #[test]
    fn test_slide_deck_requires_title_and_bullets() {
        let ok: Result<SlideDeck, _> =
            serde_json::from_str(r#"{"title": "T", "slides": [{"title": "S", "bullets": ["b"]}]}"#);
        assert!(ok.is_ok());

        let missing_bullets: Result<SlideDeck, _> =
            serde_json::from_str(r#"{"title": "T", "slides": [{"title": "S"}]}"#);
        assert!(missing_bullets.is_err());

        let missing_title: Result<SlideDeck, _> = serde_json::from_str(r#"{"slides": []}"#);
        assert!(missing_title.is_err());
    }
}
