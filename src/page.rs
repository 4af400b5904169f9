use crate::{
    comment::Comment,
    feedback_form::{FormSnapshot, FormState},
    thread_view::{escape_html, render_thread_html},
    wallet::WalletSession,
};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f7f7fb; color: #1d1d2b; }
header { background: linear-gradient(135deg, #4338ca, #7c3aed); color: white; padding: 2rem 1.5rem; text-align: center; }
.wallet { position: absolute; top: 1rem; right: 1.5rem; font-size: .85rem; }
main { max-width: 64rem; margin: 0 auto; padding: 2rem 1.5rem; display: grid; grid-template-columns: 2fr 1fr; gap: 2rem; }
.scroll-area { height: 600px; overflow-y: auto; padding-right: 1rem; }
.comment { margin-bottom: 1.5rem; max-width: 28rem; }
.comment.own { margin-left: auto; text-align: right; }
.comment-header { font-size: .85rem; color: #6b7280; display: flex; gap: .5rem; }
.comment.own .comment-header { flex-direction: row-reverse; }
.badge.encrypted { color: #4338ca; }
.alert { border: 1px solid #fca5a5; background: #fef2f2; padding: .75rem; border-radius: .5rem; margin-bottom: 1rem; }
#toasts { position: fixed; bottom: 1rem; right: 1rem; display: grid; gap: .5rem; }
.toast { background: white; border: 1px solid #c7d2fe; border-radius: .5rem; padding: .75rem 1rem; max-width: 22rem; }
.toast.destructive { border-color: #fca5a5; background: #fef2f2; }
.security { margin-top: 1.5rem; padding: 1rem; border-radius: .5rem; border: 1px solid #c7d2fe; font-size: .8rem; }
"#;

/// Talks to `/ws`: sends `SubmitFeedback` and redraws the thread, form and
/// toasts from the events that come back.
const SCRIPT: &str = r#"
(() => {
  const ws = new WebSocket(`${location.protocol === "https:" ? "wss" : "ws"}://${location.host}/ws`);
  const form = document.getElementById("feedback-form");
  const author = document.getElementById("author");
  const content = document.getElementById("feedback");
  const submit = form.querySelector("button[type=submit]");
  const list = document.querySelector(".thread .scroll-area");
  const summary = document.querySelector(".thread .summary");
  const toasts = document.getElementById("toasts");

  const el = (tag, cls, text) => {
    const node = document.createElement(tag);
    if (cls) node.className = cls;
    if (text !== undefined) node.textContent = text;
    return node;
  };
  const renderComment = (c) => {
    const node = el("div", `comment ${c.is_own ? "own" : "other"}`);
    const header = el("div", "comment-header");
    header.append(el("span", "author", c.author), el("span", "timestamp", c.timestamp));
    if (c.encrypted) header.append(el("span", "badge encrypted", "Encrypted"));
    node.append(header, el("p", "content", c.content));
    return node;
  };
  const updateSummary = () => {
    const n = list.children.length;
    summary.textContent = `All messages are protected with FHE encryption. ${n} secure ${n === 1 ? "comment" : "comments"}.`;
  };

  ws.onmessage = (msg) => {
    const event = JSON.parse(msg.data);
    if (event.Comments) {
      list.replaceChildren(...event.Comments.map(renderComment));
      updateSummary();
    } else if (event.CommentAdded) {
      list.append(renderComment(event.CommentAdded));
      list.scrollTop = list.scrollHeight;
      updateSummary();
    } else if (event.Form) {
      const f = event.Form;
      author.value = f.author;
      content.value = f.content;
      author.disabled = content.disabled = f.state === "Submitting";
      submit.textContent = f.state === "Submitting" ? "Encrypting & Sending..." : "Send Encrypted Feedback";
      submit.disabled = !f.can_submit;
    } else if (event.Notification) {
      const n = event.Notification;
      const toast = el("div", `toast ${n.severity.toLowerCase()}`);
      toast.append(el("strong", null, n.title), el("p", null, n.description));
      toasts.append(toast);
      setTimeout(() => toast.remove(), 5000);
    }
  };

  const refresh = () => {
    submit.disabled = !(author.value.trim() && content.value.trim()) || author.disabled;
  };
  author.addEventListener("input", refresh);
  content.addEventListener("input", refresh);

  form.addEventListener("submit", (e) => {
    e.preventDefault();
    submit.disabled = true;
    ws.send(JSON.stringify({ SubmitFeedback: { author: author.value, content: content.value } }));
  });
})();
"#;

fn render_header(wallet: &WalletSession) -> String {
    let status = match wallet.address_string() {
        Some(address) => format!("Connected: {}", escape_html(&address)),
        None => "Wallet not connected".to_string(),
    };
    format!(
        concat!(
            "<header>",
            r#"<div class="wallet">{status}</div>"#,
            "<h1>Confidential Proposal Feedback</h1>",
            "<p>Feedback encrypted by FHE</p>",
            r#"<p class="subtitle">Share your thoughts securely. All feedback is encrypted using Fully Homomorphic Encryption "#,
            "to ensure complete confidentiality while enabling meaningful analysis.</p>",
            "</header>"
        ),
        status = status
    )
}

fn render_form(wallet: &WalletSession, form: &FormSnapshot) -> String {
    let alert = if wallet.is_connected() {
        ""
    } else {
        r#"<div class="alert">Please connect your wallet to submit feedback</div>"#
    };
    let locked = if wallet.is_connected() && form.state == FormState::Idle {
        ""
    } else {
        " disabled"
    };
    let submit_disabled = if form.can_submit { "" } else { " disabled" };
    format!(
        concat!(
            r#"<section class="form">"#,
            "<h3>Submit Encrypted Feedback</h3>",
            "<p>Your feedback will be encrypted using FHE before submission to ensure complete privacy.</p>",
            "{alert}",
            r#"<form id="feedback-form">"#,
            r#"<label for="author">Your Name</label>"#,
            r#"<input id="author" name="author" placeholder="Enter your name..." value="{author}"{locked}>"#,
            r#"<label for="feedback">Feedback Content</label>"#,
            r#"<textarea id="feedback" name="content" placeholder="Share your thoughts on the proposal..."{locked}>{content}</textarea>"#,
            "<p>Your message will be encrypted before being stored or transmitted.</p>",
            r#"<button type="submit"{submit_disabled}>Send Encrypted Feedback</button>"#,
            "</form>",
            r#"<div class="security"><h4>Security Features</h4><ul>"#,
            "<li>Fully Homomorphic Encryption (FHE)</li>",
            "<li>Zero-knowledge architecture</li>",
            "<li>End-to-end privacy protection</li>",
            "<li>Secure multi-party computation ready</li>",
            "</ul></div>",
            "</section>"
        ),
        alert = alert,
        author = escape_html(&form.author),
        content = escape_html(&form.content),
        locked = locked,
        submit_disabled = submit_disabled,
    )
}

/// Whole page: header, thread and form side by side.
pub fn render_page(comments: &[Comment], wallet: &WalletSession, form: &FormSnapshot) -> String {
    format!(
        concat!(
            "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">",
            "<title>Confidential Proposal Feedback</title><style>{style}</style></head>",
            "<body>{header}<main>{thread}{form}</main>",
            r#"<div id="toasts"></div><script>{script}</script></body></html>"#
        ),
        style = STYLE,
        script = SCRIPT,
        header = render_header(wallet),
        thread = render_thread_html(comments),
        form = render_form(wallet, form),
    )
}
