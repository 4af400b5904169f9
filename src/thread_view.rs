use crate::comment::Comment;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn thread_summary(count: usize) -> String {
    let noun = if count == 1 { "comment" } else { "comments" };
    format!("All messages are protected with FHE encryption. {count} secure {noun}.")
}

pub fn render_comment_html(comment: &Comment) -> String {
    let side = if comment.is_own { "own" } else { "other" };
    let badge = if comment.encrypted {
        r#"<span class="badge encrypted">Encrypted</span>"#
    } else {
        ""
    };
    format!(
        concat!(
            r#"<div class="comment {side}" id="comment-{id}">"#,
            r#"<div class="comment-header"><span class="author">{author}</span>"#,
            r#"<span class="timestamp">{timestamp}</span>{badge}</div>"#,
            r#"<p class="content">{content}</p>"#,
            "</div>"
        ),
        side = side,
        id = escape_html(&comment.id),
        author = escape_html(&comment.author),
        timestamp = escape_html(&comment.timestamp),
        badge = badge,
        content = escape_html(&comment.content),
    )
}

/// Scrollable thread section, oldest comment first.
pub fn render_thread_html(comments: &[Comment]) -> String {
    let items: String = comments.iter().map(render_comment_html).collect();
    format!(
        concat!(
            r#"<section class="thread">"#,
            "<h2>Encrypted Feedback Thread</h2>",
            r#"<p class="summary">{summary}</p>"#,
            r#"<div class="scroll-area">{items}</div>"#,
            "</section>"
        ),
        summary = thread_summary(comments.len()),
        items = items,
    )
}

/// One line per comment, used for logs and terminals.
pub fn render_thread_text(comments: &[Comment]) -> String {
    comments
        .iter()
        .map(|c| {
            let lock = if c.encrypted { " [encrypted]" } else { "" };
            let mine = if c.is_own { " (you)" } else { "" };
            format!("[{}]{}{} {}: {}\n", c.timestamp, lock, mine, c.author, c.content)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::CommentThread;

    #[test]
    fn test_summary_pluralization() {
        assert!(thread_summary(1).ends_with("1 secure comment."));
        assert!(thread_summary(0).ends_with("0 secure comments."));
        assert!(thread_summary(3).ends_with("3 secure comments."));
    }

    #[test]
    fn test_render_is_idempotent() {
        let thread = CommentThread::seeded();
        let first = render_thread_html(thread.comments());
        let second = render_thread_html(thread.comments());
        assert_eq!(first, second);
        assert_eq!(
            render_thread_text(thread.comments()),
            render_thread_text(thread.comments())
        );
        assert_eq!(thread.len(), 3);
    }

    #[test]
    fn test_render_escapes_and_decorates() {
        let mut thread = CommentThread::new();
        thread.append_feedback("<b>Eve</b>", "a & b");
        let html = render_thread_html(thread.comments());
        assert!(html.contains("&lt;b&gt;Eve&lt;/b&gt;"));
        assert!(html.contains("a &amp; b"));
        assert!(html.contains("Encrypted</span>"));
        assert!(html.contains(r#"class="comment other""#));
        assert!(html.contains("1 secure comment."));
    }

    #[test]
    fn test_render_keeps_insertion_order() {
        let thread = CommentThread::seeded();
        let text = render_thread_text(thread.comments());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Sarah Chen"));
        assert!(lines[1].contains("(you) You"));
        assert!(lines[2].contains("Marcus Rodriguez"));
    }
}
