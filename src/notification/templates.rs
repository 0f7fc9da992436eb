use std::fmt::Write;

use crate::model::Reminder;

/// Subject and bodies of a notification email
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

const FOOTER: &str = "Sent by your reminder service.";

/// Notice for a single reminder whose time has come
pub fn reminder_notice(reminder: &Reminder) -> Rendered {
    let subject = format!("Reminder: {}", reminder.title);

    let html_body = page(
        "Reminder",
        &format!(
            "<h2>{}</h2>{}",
            escape_html(&reminder.title),
            html_details(reminder)
        ),
    );

    let mut text_body = String::from("Hello!\n\nHere is your reminder.\n\n");
    let _ = writeln!(text_body, "Title: {}", reminder.title);
    text_body.push_str(&text_details(reminder, ""));
    text_body.push('\n');
    text_body.push_str(FOOTER);

    Rendered {
        subject,
        html_body,
        text_body,
    }
}

/// Notice sent `minutes` ahead of a reminder
pub fn advance_notice(reminder: &Reminder, minutes: u32) -> Rendered {
    let countdown = format!("Starts in {} minute{}", minutes, plural(minutes));
    let subject = format!("{}: {}", countdown, reminder.title);

    let html_body = page(
        "Coming up",
        &format!(
            "<p><strong>{}!</strong></p><h2>{}</h2>{}",
            countdown,
            escape_html(&reminder.title),
            html_details(reminder)
        ),
    );

    let mut text_body = format!("Hello!\n\n{}!\n\n", countdown);
    let _ = writeln!(text_body, "Title: {}", reminder.title);
    text_body.push_str(&text_details(reminder, ""));
    text_body.push('\n');
    text_body.push_str(FOOTER);

    Rendered {
        subject,
        html_body,
        text_body,
    }
}

/// Digest of several reminders. A single reminder renders as a plain notice.
pub fn summary(reminders: &[Reminder]) -> Rendered {
    if let [reminder] = reminders {
        return reminder_notice(reminder);
    }

    let subject = format!(
        "Your reminders for today ({} item{})",
        reminders.len(),
        plural(reminders.len() as u32)
    );

    let mut items = String::new();
    for (index, reminder) in reminders.iter().enumerate() {
        let _ = write!(
            items,
            "<li><h3>{}. {}</h3>{}</li>",
            index + 1,
            escape_html(&reminder.title),
            html_details(reminder)
        );
    }
    let html_body = page(
        "Today's reminders",
        &format!(
            "<p>You have {} reminders scheduled.</p><ol>{}</ol>",
            reminders.len(),
            items
        ),
    );

    let mut text_body = String::from("Hello!\n\nHere is your summary for today.\n\n");
    for (index, reminder) in reminders.iter().enumerate() {
        let _ = writeln!(text_body, "{}. {}", index + 1, reminder.title);
        text_body.push_str(&text_details(reminder, "   "));
        text_body.push('\n');
    }
    text_body.push_str(FOOTER);

    Rendered {
        subject,
        html_body,
        text_body,
    }
}

fn page(heading: &str, content: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"></head><body>\
         <h1>{}</h1>{}<p><small>{}</small></p></body></html>",
        heading, content, FOOTER
    )
}

fn long_date(reminder: &Reminder) -> String {
    reminder.date.format("%A, %B %-d, %Y").to_string()
}

fn html_details(reminder: &Reminder) -> String {
    let mut details = format!("<p>Date: {}</p>", long_date(reminder));
    if let Some(time) = reminder.time {
        let _ = write!(details, "<p>Time: {}</p>", time.format("%H:%M"));
    }
    if let Some(description) = &reminder.description {
        let _ = write!(details, "<p>{}</p>", escape_html(description));
    }
    details
}

fn text_details(reminder: &Reminder, indent: &str) -> String {
    let mut details = format!("{}Date: {}\n", indent, long_date(reminder));
    if let Some(time) = reminder.time {
        let _ = writeln!(details, "{}Time: {}", indent, time.format("%H:%M"));
    }
    if let Some(description) = &reminder.description {
        let _ = writeln!(details, "{}Notes: {}", indent, description);
    }
    details
}

fn plural(count: u32) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
