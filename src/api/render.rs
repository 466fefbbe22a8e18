//! HTML transcript rendering
//!
//! The page is assembled in code rather than through a template engine: one
//! form plus a chat box per turn, most recent first. Answers are treated as
//! markdown and sanitized before inclusion; questions are escaped verbatim.

use pulldown_cmark::html;
use pulldown_cmark::Parser;

use crate::api::session::ConversationTurn;

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Guideline Chatbot</title>
  <style>
    body { font-family: 'Segoe UI', sans-serif; max-width: 800px; margin: 40px auto; padding: 20px; background-color: #fafafa; }
    h2 { text-align: center; }
    form { display: flex; justify-content: center; gap: 10px; margin-bottom: 30px; }
    input[name="query"] { width: 70%; padding: 10px; font-size: 16px; border: 1px solid #ccc; border-radius: 6px; }
    input[type="submit"] { padding: 10px 20px; font-size: 16px; background-color: #0074d9; color: white; border: none; border-radius: 6px; cursor: pointer; }
    .chat-box { background: #fff; border-left: 4px solid #0074d9; padding: 16px; margin-bottom: 20px; border-radius: 8px; box-shadow: 0 2px 4px rgba(0,0,0,0.05); }
    .user { font-weight: bold; margin-bottom: 4px; color: #0074d9; }
    .bot { white-space: pre-wrap; }
  </style>
</head>
<body>
  <h2>Guideline Chatbot</h2>
  <form method="POST" action="/">
    <input name="query" placeholder="Ask a question..." required autofocus>
    <input type="submit" value="Ask">
  </form>
  <div id="chat-history">
"#;

const PAGE_FOOT: &str = r#"  </div>
</body>
</html>
"#;

/// Render the full transcript page, most recent turn first
#[must_use]
pub fn render_page(turns: &[ConversationTurn]) -> String {
    let mut page = String::from(PAGE_HEAD);

    for turn in turns.iter().rev() {
        page.push_str("    <div class=\"chat-box\">\n");
        page.push_str("      <div class=\"user\">You:</div>\n");
        page.push_str(&format!("      <div>{}</div>\n", escape_html(&turn.query)));
        page.push_str("      <br>\n");
        page.push_str("      <div class=\"user\">Bot:</div>\n");
        page.push_str(&format!(
            "      <div class=\"bot\">{}</div>\n",
            render_markdown(&turn.response)
        ));
        page.push_str("    </div>\n");
    }

    page.push_str(PAGE_FOOT);
    page
}

/// Render a model answer as sanitized HTML
fn render_markdown(text: &str) -> String {
    let parser = Parser::new(text);
    let mut rendered = String::new();
    html::push_html(&mut rendered, parser);

    ammonia::clean(&rendered)
}

/// Escape text for literal inclusion in HTML
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(query: &str, response: &str) -> ConversationTurn {
        ConversationTurn {
            query: query.to_string(),
            response: response.to_string(),
        }
    }

    #[test]
    fn test_render_page_most_recent_first() {
        let turns = vec![turn("first question", "one"), turn("second question", "two")];

        let page = render_page(&turns);
        let first = page.find("second question").unwrap();
        let second = page.find("first question").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_render_page_empty_history() {
        let page = render_page(&[]);
        assert!(page.contains("<form"));
        assert!(page.contains("chat-history"));
        assert!(!page.contains("chat-box"));
    }

    #[test]
    fn test_queries_are_escaped() {
        let page = render_page(&[turn("<script>alert(1)</script>", "ok")]);
        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_responses_render_markdown_sanitized() {
        let page = render_page(&[turn(
            "q",
            "**Lock** the valves\n\n<script>alert(1)</script>",
        )]);
        assert!(page.contains("<strong>Lock</strong>"));
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">&'"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;"
        );
    }
}
