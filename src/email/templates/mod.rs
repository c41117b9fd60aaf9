//! Email body templating
//!
//! Bodies are written by admins in the site editor. Placeholders use
//! `{{variable}}` syntax with optional inner whitespace. A placeholder with no
//! value set is left untouched so a typo shows up in the delivered mail
//! instead of silently disappearing.

use crate::domain::Recipient;
use regex::{Captures, Regex};
use std::collections::HashMap;

lazy_static::lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex = Regex::new(r"\{\{\s*(\w+)\s*\}\}").unwrap();
    // One pass over both forms so substituted values are never rescanned
    static ref PERSONALIZE_REGEX: Regex =
        Regex::new(r"\{\{\s*(\w+)\s*\}\}|\{name\}").unwrap();

    static ref STYLE_BLOCK_REGEX: Regex = Regex::new(r"(?is)<style[^>]*>.*?</style>").unwrap();
    static ref SCRIPT_BLOCK_REGEX: Regex = Regex::new(r"(?is)<script[^>]*>.*?</script>").unwrap();
    static ref LINE_BREAK_REGEX: Regex = Regex::new(r"(?i)<br\s*/?>").unwrap();
    static ref BLOCK_END_REGEX: Regex =
        Regex::new(r"(?i)</(p|div|h[1-6]|li|tr|table|ul|ol|blockquote)>").unwrap();
    static ref TAG_REGEX: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref INLINE_WS_REGEX: Regex = Regex::new(r"[ \t\u{a0}]+").unwrap();
    static ref BLANK_LINES_REGEX: Regex = Regex::new(r"\n{3,}").unwrap();
}

/// Template rendering engine with variable substitution
#[derive(Debug, Default)]
pub struct TemplateEngine {
    variables: HashMap<String, String>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a variable value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Render a template string, replacing `{{variable}}` with values
    pub fn render(&self, template: &str) -> String {
        PLACEHOLDER_REGEX
            .replace_all(template, |caps: &Captures| self.substitute(caps))
            .into_owned()
    }

    fn substitute(&self, caps: &Captures) -> String {
        match self.variables.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        }
    }

    /// Engine preloaded with the per-recipient variables
    pub fn for_recipient(recipient: &Recipient) -> Self {
        let mut engine = Self::new();
        engine
            .set("name", recipient.name.as_str())
            .set("email", recipient.email.as_str());
        engine
    }
}

/// Personalize a subject or body for one recipient.
///
/// Besides the `{{name}}` forms the editor emits, older saved templates use a
/// single-brace `{name}`, which is substituted as well.
pub fn personalize(template: &str, recipient: &Recipient) -> String {
    let engine = TemplateEngine::for_recipient(recipient);
    PERSONALIZE_REGEX
        .replace_all(template, |caps: &Captures| {
            if caps.get(1).is_some() {
                engine.substitute(caps)
            } else {
                recipient.name.clone()
            }
        })
        .into_owned()
}

/// Plain-text alternative for an HTML body
pub fn html_to_text(html: &str) -> String {
    let text = STYLE_BLOCK_REGEX.replace_all(html, "");
    let text = SCRIPT_BLOCK_REGEX.replace_all(&text, "");
    let text = LINE_BREAK_REGEX.replace_all(&text, "\n");
    let text = BLOCK_END_REGEX.replace_all(&text, "\n");
    let text = TAG_REGEX.replace_all(&text, "");
    let text = decode_entities(&text);

    let lines: Vec<String> = text
        .lines()
        .map(|line| INLINE_WS_REGEX.replace_all(line, " ").trim().to_string())
        .collect();

    BLANK_LINES_REGEX
        .replace_all(&lines.join("\n"), "\n\n")
        .trim()
        .to_string()
}

fn decode_entities(text: &str) -> String {
    // &amp; last so "&amp;lt;" stays "&lt;"
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
