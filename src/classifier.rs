// src/classifier.rs
//
// Keyword routing for incoming prompts. Pure substring containment,
// case-insensitive; no stemming, negation, or scoring. Rules are checked
// in order and the PDF rule wins when a prompt matches both families.

/// How a prompt should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Chat,
    PdfExport,
    PptExport,
}

const PDF_KEYWORDS: &[&str] = &[
    "pdf",
    "generate pdf",
    "make pdf",
    "export as pdf",
    "create pdf",
    "thesis",
];

const PPT_KEYWORDS: &[&str] = &[
    "ppt",
    "powerpoint",
    "presentation",
    "slides",
    "generate ppt",
    "create ppt",
    "make slides",
    "slide deck",
];

pub fn classify_prompt(prompt: &str) -> PromptKind {
    let lower = prompt.to_lowercase();

    if PDF_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        PromptKind::PdfExport
    } else if PPT_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
        PromptKind::PptExport
    } else {
        PromptKind::Chat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_chat_prompt() {
        assert_eq!(classify_prompt("hello"), PromptKind::Chat);
        assert_eq!(
            classify_prompt("What is the capital of France?"),
            PromptKind::Chat
        );
    }

    #[test]
    fn test_ppt_prompt() {
        assert_eq!(
            classify_prompt("Make me a ppt about cats"),
            PromptKind::PptExport
        );
        assert_eq!(
            classify_prompt("I need a SLIDE DECK on quantum computing"),
            PromptKind::PptExport
        );
    }

    #[test]
    fn test_pdf_prompt() {
        assert_eq!(
            classify_prompt("export as pdf please"),
            PromptKind::PdfExport
        );
        assert_eq!(
            classify_prompt("Help me with my thesis draft"),
            PromptKind::PdfExport
        );
    }

    #[test]
    fn test_pdf_wins_when_both_families_match() {
        // Documented tie-break, not a bug.
        assert_eq!(
            classify_prompt("turn these slides into a pdf"),
            PromptKind::PdfExport
        );
        assert_eq!(
            classify_prompt("Generate PDF and a PowerPoint"),
            PromptKind::PdfExport
        );
    }

    #[test]
    fn test_case_insensitive_matching() {
        assert_eq!(classify_prompt("CREATE PPT now"), PromptKind::PptExport);
        assert_eq!(classify_prompt("Make PDF"), PromptKind::PdfExport);
    }
}
