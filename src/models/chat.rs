// src/models/chat.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ChatSession {
    pub id: i32,
    pub user_id: i32,
    pub title: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: i32,
    pub session_id: i32,
    pub role: String,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Session titles come from the first prompt: the first 50 characters,
/// trimmed, with an ellipsis iff the prompt was longer than that.
pub fn derive_session_title(prompt: &str) -> String {
    let truncated: String = prompt.chars().take(50).collect();
    let mut title = truncated.trim_end().to_string();
    if prompt.chars().count() > 50 {
        title.push_str("...");
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_prompt_keeps_full_text() {
        assert_eq!(derive_session_title("hello"), "hello");
    }

    #[test]
    fn test_exactly_fifty_chars_gets_no_ellipsis() {
        let prompt = "a".repeat(50);
        assert_eq!(derive_session_title(&prompt), prompt);
    }

    #[test]
    fn test_long_prompt_is_truncated_with_ellipsis() {
        let prompt = "x".repeat(80);
        let title = derive_session_title(&prompt);
        assert_eq!(title, format!("{}...", "x".repeat(50)));
    }

    #[test]
    fn test_truncation_is_character_based() {
        // Multibyte input must not be split mid-character.
        let prompt = "é".repeat(60);
        let title = derive_session_title(&prompt);
        assert_eq!(title, format!("{}...", "é".repeat(50)));
    }

    #[test]
    fn test_trailing_whitespace_trimmed_before_ellipsis() {
        let mut prompt = "word ".repeat(10);
        prompt.push_str("and quite a bit of extra text after the cut");
        let title = derive_session_title(&prompt);
        assert!(title.ends_with("..."));
        assert!(!title.contains(" ..."));
    }
}
