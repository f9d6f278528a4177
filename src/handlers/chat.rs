// src/handlers/chat.rs
//
// Orchestration for the chat surface: resolve or create the session,
// classify the prompt, call the completion gateway, and either store a
// formatted chat reply or synthesize a downloadable document.

use crate::classifier::{classify_prompt, PromptKind};
use crate::documents::{artifact_filename, pdf::build_pdf, ppt::build_pptx};
use crate::documents::schema::{ReportDocument, SlideDeck};
use crate::errors::AppError;
use crate::middleware::auth::{auth_middleware, claims_user_id};
use crate::models::auth::Claims;
use crate::models::chat::{derive_session_title, ChatMessage, ChatSession};
use crate::openai_client::{parse_structured_reply, ChatMessagePayload, OpenAiClient};
use crate::prompts;
use crate::AppState;
use axum::{
    extract::{Extension, Path},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

pub fn chat_routes() -> Router {
    Router::new()
        .route("/chat/send-message", post(send_message))
        .route("/chat/delete-session", post(delete_session))
        .route("/chat/get-sessions", get(get_sessions))
        .route("/api/chat/history/:session_id", get(get_chat_history))
        .layer(axum::middleware::from_fn(auth_middleware))
}

#[derive(Debug, Deserialize)]
struct SendMessageRequest {
    #[serde(default)]
    prompt: String,
    session_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct DeleteSessionRequest {
    session_id: i32,
}

async fn send_message(
    Extension(state): Extension<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<Value>, AppError> {
    let user_id = claims_user_id(&claims);
    let prompt = payload.prompt;

    if prompt.is_empty() {
        return Err(AppError::EmptyPrompt);
    }

    let session = resolve_or_create_session(&state, payload.session_id, user_id).await?;
    let gateway = state
        .openai_client
        .as_ref()
        .ok_or_else(|| AppError::Gateway("OpenAI client not configured".to_string()))?;

    match classify_prompt(&prompt) {
        PromptKind::Chat => handle_chat(&state, gateway, &session, user_id, &prompt).await,
        kind => handle_export(&state, gateway, &session, user_id, &prompt, kind).await,
    }
}

/// Export path: structured completion, document rendering, download URL.
/// Nothing is persisted until the artifact is on disk, so a failed call or
/// a malformed reply leaves no trace in the session.
async fn handle_export(
    state: &AppState,
    gateway: &OpenAiClient,
    session: &ChatSession,
    user_id: i32,
    prompt: &str,
    kind: PromptKind,
) -> Result<Json<Value>, AppError> {
    let prompt_file = match kind {
        PromptKind::PdfExport => prompts::PDF_PROMPT_FILE,
        PromptKind::PptExport => prompts::PPT_PROMPT_FILE,
        PromptKind::Chat => unreachable!("chat prompts are not exports"),
    };
    let system_prompt = state.system_prompts.load(prompt_file)?;

    let history = load_history(state, session.id).await?;
    let messages = compose_chat_history(&system_prompt, &history, prompt);

    let reply = gateway
        .chat_completion(messages)
        .await
        .map_err(AppError::Gateway)?;
    let structured = parse_structured_reply(&reply).map_err(AppError::StructuredReply)?;

    let (bytes, filename, subdir, label) = match kind {
        PromptKind::PdfExport => {
            let report: ReportDocument = serde_json::from_value(structured)
                .map_err(|e| AppError::StructuredReply(e.to_string()))?;
            let bytes = build_pdf(&report).map_err(AppError::Render)?;
            (bytes, artifact_filename("pdf", user_id, "pdf"), "pdf", "PDF Report")
        }
        PromptKind::PptExport => {
            let deck: SlideDeck = serde_json::from_value(structured)
                .map_err(|e| AppError::StructuredReply(e.to_string()))?;
            let bytes = build_pptx(&deck).map_err(AppError::Render)?;
            (bytes, artifact_filename("ppt", user_id, "pptx"), "ppt", "PowerPoint")
        }
        PromptKind::Chat => unreachable!(),
    };

    let download_url = state.media.store(subdir, &filename, &bytes)?;
    tracing::info!(
        "generated {} for user {} in session {}: {}",
        label,
        user_id,
        session.id,
        download_url
    );

    insert_message(state, session.id, "user", prompt).await?;
    insert_message(
        state,
        session.id,
        "assistant",
        &format!("Your {} is ready: {}", label, download_url),
    )
    .await?;
    set_title_if_unset(state, session, prompt).await?;

    Ok(Json(json!({
        "reply": format!("Download your {}:", label),
        "download_url": download_url,
    })))
}

/// Plain conversation path: free-text completion, markdown-rendered reply.
async fn handle_chat(
    state: &AppState,
    gateway: &OpenAiClient,
    session: &ChatSession,
    user_id: i32,
    prompt: &str,
) -> Result<Json<Value>, AppError> {
    let system_prompt = state.system_prompts.load(prompts::DEFAULT_PROMPT_FILE)?;

    let history = load_history(state, session.id).await?;
    let messages = compose_chat_history(&system_prompt, &history, prompt);

    let reply = gateway
        .chat_completion(messages)
        .await
        .map_err(AppError::Gateway)?;
    let formatted_reply = render_markdown(&reply);
    tracing::debug!(
        "chat reply for user {} in session {}: {} chars",
        user_id,
        session.id,
        formatted_reply.len()
    );

    insert_message(state, session.id, "user", prompt).await?;
    insert_message(state, session.id, "assistant", &formatted_reply).await?;
    set_title_if_unset(state, session, prompt).await?;

    Ok(Json(json!({
        "reply": formatted_reply,
        "session_id": session.id.to_string(),
    })))
}

async fn delete_session(
    Extension(state): Extension<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<DeleteSessionRequest>,
) -> Result<Json<Value>, AppError> {
    let user_id = claims_user_id(&claims);

    // Ownership check before deletion; messages go with the session.
    sqlx::query_scalar::<_, i32>("SELECT id FROM chat_sessions WHERE id = $1 AND user_id = $2")
        .bind(payload.session_id)
        .bind(user_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or(AppError::SessionNotFound)?;

    sqlx::query("DELETE FROM chat_sessions WHERE id = $1")
        .bind(payload.session_id)
        .execute(&state.db_pool)
        .await?;

    tracing::info!("deleted session {} for user {}", payload.session_id, user_id);
    Ok(Json(json!({ "success": true })))
}

async fn get_sessions(
    Extension(state): Extension<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Value>, AppError> {
    let user_id = claims_user_id(&claims);

    let sessions = sqlx::query_as::<_, ChatSession>(
        "SELECT id, user_id, title, created_at FROM chat_sessions
         WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(json!({ "html": build_session_list_html(&sessions) })))
}

async fn get_chat_history(
    Path(session_id): Path<i32>,
    Extension(state): Extension<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Value>, AppError> {
    let user_id = claims_user_id(&claims);

    // Lookup is scoped by owner: another user's session reads as missing.
    sqlx::query_scalar::<_, i32>("SELECT id FROM chat_sessions WHERE id = $1 AND user_id = $2")
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or(AppError::SessionNotFound)?;

    let messages = load_history(&state, session_id).await?;
    let history: Vec<Value> = messages
        .iter()
        .map(|m| {
            json!({
                "role": m.role,
                "content": m.content,
                "created_at": m.created_at.to_rfc3339(),
            })
        })
        .collect();

    Ok(Json(json!({
        "success": true,
        "session_id": session_id.to_string(),
        "history": history,
    })))
}

async fn resolve_or_create_session(
    state: &AppState,
    session_id: Option<i32>,
    user_id: i32,
) -> Result<ChatSession, AppError> {
    match session_id {
        Some(id) => sqlx::query_as::<_, ChatSession>(
            "SELECT id, user_id, title, created_at FROM chat_sessions
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or(AppError::SessionNotFound),
        None => {
            // Created lazily: only a non-empty prompt reaches this point.
            let session = sqlx::query_as::<_, ChatSession>(
                "INSERT INTO chat_sessions (user_id) VALUES ($1)
                 RETURNING id, user_id, title, created_at",
            )
            .bind(user_id)
            .fetch_one(&state.db_pool)
            .await?;
            tracing::info!("created session {} for user {}", session.id, user_id);
            Ok(session)
        }
    }
}

async fn load_history(state: &AppState, session_id: i32) -> Result<Vec<ChatMessage>, AppError> {
    let messages = sqlx::query_as::<_, ChatMessage>(
        "SELECT id, session_id, role, content, created_at FROM chat_messages
         WHERE session_id = $1 ORDER BY created_at ASC",
    )
    .bind(session_id)
    .fetch_all(&state.db_pool)
    .await?;
    Ok(messages)
}

async fn insert_message(
    state: &AppState,
    session_id: i32,
    role: &str,
    content: &str,
) -> Result<(), AppError> {
    sqlx::query("INSERT INTO chat_messages (session_id, role, content) VALUES ($1, $2, $3)")
        .bind(session_id)
        .bind(role)
        .bind(content)
        .execute(&state.db_pool)
        .await?;
    Ok(())
}

/// Title is set at most once, on the first prompt that produces a reply.
/// `title IS NULL` in the predicate makes concurrent sends last-write-safe.
async fn set_title_if_unset(
    state: &AppState,
    session: &ChatSession,
    prompt: &str,
) -> Result<(), AppError> {
    if session.title.is_some() {
        return Ok(());
    }
    sqlx::query("UPDATE chat_sessions SET title = $1 WHERE id = $2 AND title IS NULL")
        .bind(derive_session_title(prompt))
        .bind(session.id)
        .execute(&state.db_pool)
        .await?;
    Ok(())
}

/// System prompt first, then the stored history in timestamp order, then
/// the new user prompt.
fn compose_chat_history(
    system_prompt: &str,
    history: &[ChatMessage],
    prompt: &str,
) -> Vec<ChatMessagePayload> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessagePayload::new("system", system_prompt));
    for message in history {
        messages.push(ChatMessagePayload::new(&message.role, &message.content));
    }
    messages.push(ChatMessagePayload::new("user", prompt));
    messages
}

fn render_markdown(text: &str) -> String {
    let parser = pulldown_cmark::Parser::new(text);
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, parser);
    html
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn build_session_list_html(sessions: &[ChatSession]) -> String {
    let mut html = String::from("<ul class=\"session-list\">");
    for session in sessions {
        let title = session.title.as_deref().unwrap_or("New chat");
        html.push_str(&format!(
            "<li class=\"session-item\" data-session-id=\"{id}\">\
             <a href=\"/chat/{id}\">{title}</a>\
             <button class=\"delete-session\" data-session-id=\"{id}\">&times;</button>\
             </li>",
            id = session.id,
            title = html_escape(title),
        ));
    }
    html.push_str("</ul>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn message(role: &str, content: &str) -> ChatMessage {
        ChatMessage {
            id: 0,
            session_id: 1,
            role: role.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    fn session(id: i32, title: Option<&str>) -> ChatSession {
        ChatSession {
            id,
            user_id: 1,
            title: title.map(|t| t.to_string()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_compose_chat_history_ordering() {
        let history = vec![message("user", "hi"), message("assistant", "hello")];
        let messages = compose_chat_history("be helpful", &history, "bye");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[0].content, "be helpful");
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[3].role, "user");
        assert_eq!(messages[3].content, "bye");
    }

    #[test]
    fn test_render_markdown_produces_html() {
        let html = render_markdown("**bold** and *italic*");
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<em>italic</em>"));
    }

    #[test]
    fn test_render_markdown_escapes_raw_angle_brackets() {
        let html = render_markdown("2 < 3 is true");
        assert!(html.contains("&lt;"));
    }

    #[test]
    fn test_session_list_html_escapes_titles() {
        let sessions = vec![session(7, Some("<script>alert(1)</script>"))];
        let html = build_session_list_html(&sessions);
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("data-session-id=\"7\""));
    }

    #[test]
    fn test_session_list_html_untitled_fallback() {
        let sessions = vec![session(1, None)];
        let html = build_session_list_html(&sessions);
        assert!(html.contains("New chat"));
    }
}
