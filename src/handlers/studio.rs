//! Default studio handler: HTTP Basic challenge, then a minimal page wired to the query API.

use super::StudioHandler;
use crate::error::AppError;
use crate::service::StudioOptions;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    response::{Html, IntoResponse, Response},
};
use base64::Engine;
use subtle::ConstantTimeEq;

pub const STUDIO_REALM: &str = "Starbase Studio";

#[derive(Clone, Copy, Debug, Default)]
pub struct BasicAuthStudio;

#[async_trait]
impl StudioHandler for BasicAuthStudio {
    async fn handle(&self, request: Request<Body>, options: StudioOptions) -> Result<Response, AppError> {
        if !basic_credentials_match(request.headers(), &options.username, &options.password) {
            return Ok((
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, format!("Basic realm=\"{}\"", STUDIO_REALM))],
                "Unauthorized",
            )
                .into_response());
        }
        Ok(Html(render_page(&options.api_token)).into_response())
    }
}

fn basic_credentials_match(headers: &HeaderMap, username: &str, password: &str) -> bool {
    let Some(encoded) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
    else {
        return false;
    };
    let Ok(decoded) = base64::engine::general_purpose::STANDARD.decode(encoded.trim()) else {
        return false;
    };
    let expected = format!("{}:{}", username, password);
    decoded.ct_eq(expected.as_bytes()).into()
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn render_page(api_token: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>{realm}</title>
<meta name="starbase-api-token" content="{token}">
</head>
<body>
<h1>{realm}</h1>
<form id="query">
<textarea name="sql" rows="6" cols="80">SELECT 1</textarea><br>
<button type="submit">Run</button>
</form>
<pre id="result"></pre>
<script>
const token = document.querySelector('meta[name="starbase-api-token"]').content;
document.getElementById('query').addEventListener('submit', async (event) => {{
  event.preventDefault();
  const sql = event.target.sql.value;
  const res = await fetch('/query', {{
    method: 'POST',
    headers: {{ 'Authorization': 'Bearer ' + token, 'Content-Type': 'application/json' }},
    body: JSON.stringify({{ sql }})
  }});
  document.getElementById('result').textContent = JSON.stringify(await res.json(), null, 2);
}});
</script>
</body>
</html>
"#,
        realm = STUDIO_REALM,
        token = escape_html(api_token),
    )
}
