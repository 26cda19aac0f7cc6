//! Renders a submission into the HTML message delivered to every chat.

use shared::protocol::FormSubmission;
use std::fmt::Write;

const HEADER: &str = "📩 <b>Вам новая заявка:</b>";

/// Builds the message text. Lines follow a fixed label order and optional
/// fields are skipped when absent.
pub fn render(submission: &FormSubmission) -> String {
    let mut lines: Vec<(&str, String)> = vec![
        ("Имя", escape_html(&submission.first_name)),
        ("Фамилия", escape_html(&submission.last_name)),
        ("Дата рождения", escape_html(&submission.birth_date)),
    ];

    if let Some(phone) = &submission.phone {
        lines.push(("Телефон", escape_html(phone)));
    }
    if let Some(social) = render_social(submission) {
        lines.push(("Соцсеть", social));
    }
    lines.push(("Пол", escape_html(&submission.gender)));
    if let Some(method) = &submission.contact_method {
        lines.push(("Способ связи", escape_html(method)));
    }
    lines.push(("Услуги", escape_html(&submission.services)));

    let mut message = format!("{HEADER}\n");
    for (label, value) in lines {
        // Writing into a String cannot fail.
        let _ = write!(message, "\n<b>{label}:</b> {value}");
    }
    message
}

fn render_social(submission: &FormSubmission) -> Option<String> {
    let link = submission.social.as_deref();
    let display = submission.social_display.as_deref();

    let mut rendered = match (link, display) {
        (Some(link), Some(display)) if link != display => format!(
            "<a href=\"{}\">{}</a>",
            escape_html(link),
            escape_html(display)
        ),
        (Some(value), _) | (None, Some(value)) => escape_html(value),
        (None, None) => return None,
    };

    if let Some(network) = submission.social_type {
        let _ = write!(rendered, " ({network})");
    }
    Some(rendered)
}

/// Escapes the characters Telegram's HTML parse mode treats as markup.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
