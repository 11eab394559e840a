//! Server-side HTML for the poll pages.

use std::fmt::Write;

use models::Poll;

/// Escape text for use inside HTML element content and quoted attributes.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

fn page(title: &str, body: &str) -> String {
    format!(
        "<!doctype html>\n<html>\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    )
}

pub fn index(polls: &[Poll]) -> String {
    let mut body = String::from("<h1>Polls</h1>\n<p><a href=\"/polls\">Create a new poll</a></p>\n");
    if polls.is_empty() {
        body.push_str("<p>No polls yet.</p>\n");
        return page("Polls", &body);
    }
    body.push_str("<ul>\n");
    for poll in polls {
        let _ = writeln!(
            body,
            "<li><a href=\"/polls/{id}\">{q}</a> ({votes} votes) <a href=\"/delete/{id}\">delete</a></li>",
            id = poll.id,
            q = escape(&poll.question),
            votes = poll.total_votes(),
        );
    }
    body.push_str("</ul>\n");
    page("Polls", &body)
}

pub fn poll_detail(poll: &Poll, just_voted: bool, your_vote: Option<usize>) -> String {
    let mut body = format!("<h1>{}</h1>\n", escape(&poll.question));
    if just_voted {
        body.push_str("<p class=\"notice\">Thanks for voting!</p>\n");
    }
    let _ = writeln!(body, "<p>{} options, {} votes</p>", poll.options.len(), poll.total_votes());
    body.push_str("<ol>\n");
    for opt in &poll.options {
        let marker = if your_vote == Some(opt.slot) { " (your vote)" } else { "" };
        let action = if your_vote.is_some() {
            String::new()
        } else {
            format!(" <a href=\"/vote/{}/{}\">vote</a>", poll.id, opt.slot)
        };
        let _ = writeln!(
            body,
            "<li value=\"{slot}\">{text}: {votes}{marker}{action}</li>",
            slot = opt.slot,
            text = escape(&opt.text),
            votes = opt.votes,
        );
    }
    body.push_str("</ol>\n<p><a href=\"/\">Back to all polls</a></p>\n");
    page(&poll.question, &body)
}

pub fn new_poll_form(max_options: usize) -> String {
    let mut body = String::from("<h1>New poll</h1>\n<form method=\"post\" action=\"/polls\" id=\"new-poll\">\n");
    body.push_str("<p><label>Question <input name=\"poll\" required></label></p>\n");
    body.push_str("<div id=\"options\">\n");
    for slot in 1..=max_options.min(2) {
        let _ = writeln!(
            body,
            "<p><label>Option {slot} <input name=\"option{slot}\"></label></p>"
        );
    }
    body.push_str("</div>\n");
    let _ = writeln!(
        body,
        "<p><button type=\"button\" onclick=\"addOption()\">Add option</button> <button type=\"submit\">Create</button></p>\n</form>\n\
<script>\nfunction addOption() {{\n  var box = document.getElementById('options');\n  var n = box.children.length + 1;\n  if (n > {max_options}) return;\n  var p = document.createElement('p');\n  p.innerHTML = '<label>Option ' + n + ' <input name=\"option' + n + '\"></label>';\n  box.appendChild(p);\n}}\n</script>"
    );
    page("New poll", &body)
}

pub fn already_voted(poll_id: u64) -> String {
    format!("You have already voted! Go back <a href='/polls/{poll_id}'>here</a>")
}
