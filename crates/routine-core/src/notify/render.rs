//! Message composition: fixed boilerplate around the plan, rendered as plain
//! text and HTML.

use pulldown_cmark::{html, Options, Parser};

pub const SUBJECT: &str = "Your personalized workout routine";

pub const INTRO: &str = "\
# Your personalized workout routine

Thanks for using Routine! Below is the program we put together from your \
goals, experience, and available equipment. Exercise names link to a quick \
how-to search if you want a refresher on form.";

pub const FEEDBACK: &str = "\
---

**How did we do?** Reply to this email and tell us what worked and what \
didn't. Every reply is read and helps us improve future routines.

*Consult a medical professional before starting a new exercise program, \
especially if you reported injuries or pain.*";

/// Plain and rich renderings of the same message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBody {
    pub plain: String,
    pub html: String,
}

/// Wraps `plan_text` with the intro and feedback blocks.
pub fn compose(plan_text: &str) -> String {
    format!("{INTRO}\n\n{}\n\n{FEEDBACK}\n", plan_text.trim_end())
}

/// Renders markdown to HTML with table, strikethrough and task-list support.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Composes the full message and renders both representations.
pub fn render(plan_text: &str) -> RenderedBody {
    let plain = compose(plan_text);
    let html = markdown_to_html(&plain);
    RenderedBody { plain, html }
}
