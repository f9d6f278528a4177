use axum::{
    extract::Path,
    response::Html,
    routing::get,
    Router,
};

pub fn ui_routes() -> Router {
    Router::new()
        .route("/", get(landing_page))
        .route("/login", get(login_page))
        .route("/signup", get(signup_page))
        .route("/chat", get(chat_page))
        .route("/chat/new", get(chat_page))
        .route("/chat/:session_id", get(chat_page_with_session))
}

pub async fn landing_page() -> Html<String> {
    let html = r###"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Research Assistant</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
               margin: 0; color: #e8e8e8; background: linear-gradient(135deg, #1a1a2e 0%, #16213e 100%);
               min-height: 100vh; display: flex; flex-direction: column; align-items: center; }
        .hero { text-align: center; margin-top: 18vh; max-width: 640px; padding: 0 20px; }
        .hero h1 { font-size: 2.6rem; margin-bottom: 0.5rem; }
        .hero p { color: #b8c0cc; line-height: 1.6; }
        .actions { margin-top: 2rem; display: flex; gap: 1rem; justify-content: center; }
        .btn { padding: 0.75rem 1.75rem; border-radius: 25px; font-weight: 600;
               text-decoration: none; color: white; }
        .btn-primary { background: linear-gradient(135deg, #3b82f6, #1d4ed8); }
        .btn-outline { border: 1px solid rgba(59, 130, 246, 0.6); }
    </style>
</head>
<body>
    <div class="hero">
        <h1>Research Assistant</h1>
        <p>Chat with an AI research assistant, then export any conversation as a
           structured PDF report or a PowerPoint deck. Just ask: "make me a ppt
           about..." or "export this as a pdf".</p>
        <div class="actions">
            <a class="btn btn-primary" href="/chat">Open chat</a>
            <a class="btn btn-outline" href="/login">Log in</a>
        </div>
    </div>
</body>
</html>
    "###;
    Html(html.to_string())
}

pub async fn login_page() -> Html<String> {
    Html(auth_page_html("Log in", "/api/auth/login", "No account? <a href=\"/signup\">Sign up</a>", false))
}

pub async fn signup_page() -> Html<String> {
    Html(auth_page_html("Sign up", "/api/auth/register", "Have an account? <a href=\"/login\">Log in</a>", true))
}

fn auth_page_html(title: &str, endpoint: &str, footer: &str, with_username: bool) -> String {
    let username_field = if with_username {
        r#"<input id="username" type="text" placeholder="Username" required>"#
    } else {
        ""
    };
    format!(
        r###"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{title} - Research Assistant</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
               margin: 0; background: #16213e; color: #e8e8e8; display: flex;
               align-items: center; justify-content: center; min-height: 100vh; }}
        .card {{ background: rgba(26, 26, 46, 0.9); padding: 2rem; border-radius: 12px; width: 320px; }}
        input {{ width: 100%; box-sizing: border-box; margin: 0.4rem 0; padding: 0.7rem;
                border-radius: 8px; border: 1px solid #33415c; background: #0f1419; color: #e8e8e8; }}
        button {{ width: 100%; margin-top: 1rem; padding: 0.75rem; border: none; border-radius: 8px;
                 background: linear-gradient(135deg, #3b82f6, #1d4ed8); color: white; font-weight: 600;
                 cursor: pointer; }}
        .footer {{ margin-top: 1rem; font-size: 0.9rem; color: #b8c0cc; text-align: center; }}
        .footer a {{ color: #60a5fa; }}
        .error {{ color: #f87171; font-size: 0.9rem; min-height: 1.2rem; }}
    </style>
</head>
<body>
    <div class="card">
        <h2>{title}</h2>
        <div class="error" id="error"></div>
        <form id="auth-form">
            {username_field}
            <input id="email" type="email" placeholder="Email" required>
            <input id="password" type="password" placeholder="Password" required>
            <button type="submit">{title}</button>
        </form>
        <div class="footer">{footer}</div>
    </div>
    <script>
        document.getElementById('auth-form').addEventListener('submit', async (e) => {{
            e.preventDefault();
            const body = {{
                email: document.getElementById('email').value,
                password: document.getElementById('password').value,
            }};
            const username = document.getElementById('username');
            if (username) body.username = username.value;
            const res = await fetch('{endpoint}', {{
                method: 'POST',
                headers: {{ 'Content-Type': 'application/json' }},
                body: JSON.stringify(body),
            }});
            const data = await res.json();
            if (res.ok && data.token) {{
                localStorage.setItem('token', data.token);
                window.location.href = '/chat';
            }} else {{
                document.getElementById('error').textContent = data.message || 'Request failed';
            }}
        }});
    </script>
</body>
</html>
    "###
    )
}

pub async fn chat_page() -> Html<String> {
    chat_page_html(None)
}

pub async fn chat_page_with_session(Path(session_id): Path<i32>) -> Html<String> {
    chat_page_html(Some(session_id))
}

fn chat_page_html(session_id: Option<i32>) -> Html<String> {
    let initial_session = session_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "null".to_string());
    let html = format!(
        r###"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Chat - Research Assistant</title>
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
               margin: 0; background: #0f1419; color: #e8e8e8; display: flex; height: 100vh; }}
        .sidebar {{ width: 260px; background: #16213e; padding: 1rem; overflow-y: auto; }}
        .sidebar h3 {{ margin-top: 0; }}
        .session-list {{ list-style: none; padding: 0; }}
        .session-item {{ display: flex; justify-content: space-between; align-items: center;
                        padding: 0.4rem 0.6rem; border-radius: 6px; }}
        .session-item:hover {{ background: rgba(59, 130, 246, 0.15); }}
        .session-item a {{ color: #e8e8e8; text-decoration: none; overflow: hidden;
                          text-overflow: ellipsis; white-space: nowrap; }}
        .delete-session {{ background: none; border: none; color: #64748b; cursor: pointer; }}
        .main {{ flex: 1; display: flex; flex-direction: column; }}
        .messages {{ flex: 1; overflow-y: auto; padding: 1.5rem; }}
        .message {{ max-width: 70%; margin-bottom: 1rem; padding: 0.8rem 1rem; border-radius: 12px; }}
        .message.user {{ background: #1d4ed8; margin-left: auto; }}
        .message.assistant {{ background: #1e293b; }}
        .composer {{ display: flex; gap: 0.5rem; padding: 1rem; background: #16213e; }}
        .composer textarea {{ flex: 1; resize: none; border-radius: 8px; border: 1px solid #33415c;
                             background: #0f1419; color: #e8e8e8; padding: 0.7rem; }}
        .composer button {{ padding: 0 1.5rem; border: none; border-radius: 8px; cursor: pointer;
                           background: linear-gradient(135deg, #3b82f6, #1d4ed8); color: white; }}
        .download {{ color: #60a5fa; }}
    </style>
</head>
<body>
    <div class="sidebar">
        <h3><a href="/chat/new" style="color:#e8e8e8;text-decoration:none;">+ New chat</a></h3>
        <div id="sessions"></div>
    </div>
    <div class="main">
        <div class="messages" id="messages"></div>
        <div class="composer">
            <textarea id="prompt" rows="2" placeholder="Ask anything, or request a PDF/PPT export..."></textarea>
            <button id="send">Send</button>
        </div>
    </div>
    <script>
        let sessionId = {initial_session};
        const token = localStorage.getItem('token');
        if (!token) window.location.href = '/login';
        const authHeaders = {{ 'Authorization': 'Bearer ' + token, 'Content-Type': 'application/json' }};

        function appendMessage(role, html) {{
            const div = document.createElement('div');
            div.className = 'message ' + role;
            div.innerHTML = html;
            document.getElementById('messages').appendChild(div);
            div.scrollIntoView();
        }}

        async function loadSessions() {{
            const res = await fetch('/chat/get-sessions', {{ headers: authHeaders }});
            if (!res.ok) return;
            const data = await res.json();
            document.getElementById('sessions').innerHTML = data.html;
            document.querySelectorAll('.delete-session').forEach(btn => {{
                btn.addEventListener('click', async () => {{
                    await fetch('/chat/delete-session', {{
                        method: 'POST', headers: authHeaders,
                        body: JSON.stringify({{ session_id: parseInt(btn.dataset.sessionId) }}),
                    }});
                    if (sessionId === parseInt(btn.dataset.sessionId)) window.location.href = '/chat/new';
                    loadSessions();
                }});
            }});
        }}

        async function loadHistory() {{
            if (!sessionId) return;
            const res = await fetch('/api/chat/history/' + sessionId, {{ headers: authHeaders }});
            if (!res.ok) return;
            const data = await res.json();
            for (const msg of data.history) {{
                appendMessage(msg.role, msg.content);
            }}
        }}

        document.getElementById('send').addEventListener('click', async () => {{
            const promptEl = document.getElementById('prompt');
            const prompt = promptEl.value.trim();
            if (!prompt) return;
            promptEl.value = '';
            appendMessage('user', prompt.replace(/</g, '&lt;'));

            const res = await fetch('/chat/send-message', {{
                method: 'POST', headers: authHeaders,
                body: JSON.stringify({{ prompt: prompt, session_id: sessionId }}),
            }});
            const data = await res.json();
            if (!res.ok) {{
                appendMessage('assistant', '<span class="download">Error: ' + (data.error || res.status) + '</span>');
                return;
            }}
            if (data.download_url) {{
                appendMessage('assistant', data.reply + ' <a class="download" href="' + data.download_url + '">Download</a>');
            }} else {{
                appendMessage('assistant', data.reply);
                if (data.session_id) sessionId = parseInt(data.session_id);
            }}
            loadSessions();
        }});

        loadSessions();
        loadHistory();
    </script>
</body>
</html>
    "###
    );
    Html(html)
}
