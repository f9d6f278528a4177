// src/prompts.rs
//
// System prompts live as plain text files in a fixed directory, one file
// per conversation mode.

use std::path::PathBuf;

pub const DEFAULT_PROMPT_FILE: &str = "default_message.txt";
pub const PDF_PROMPT_FILE: &str = "pdf.txt";
pub const PPT_PROMPT_FILE: &str = "ppt.txt";

#[derive(Debug, Clone)]
pub struct SystemPrompts {
    dir: PathBuf,
}

impl SystemPrompts {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn load(&self, filename: &str) -> Result<String, std::io::Error> {
        let path = self.dir.join(filename);
        tracing::debug!("loading system prompt from {}", path.display());
        std::fs::read_to_string(&path)
    }
}
