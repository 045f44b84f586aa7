//! Deterministic offline generation.
//!
//! Used when no remote tier produced text. Everything here is synchronous,
//! does no I/O and returns the same output for the same input.

use once_cell::sync::Lazy;
use regex::Regex;

use super::content::ContentType;
use super::platform::{Platform, PlatformConstraints};

// Stacked markers ("# # Title", "## ## Part") are consumed as one run.
static TITLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#[ \t]+(?:#{1,6}[ \t]+)*(.+?)[ \t]*$").unwrap());
static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{2,6}[ \t]+(?:#{1,6}[ \t]+)*(.+?)[ \t]*$").unwrap());
static BULLET_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^([ \t]*)[-*][ \t]+").unwrap());

const LINKEDIN_CLOSING: &str =
    "What are your thoughts on this topic? Share your experience in the comments below.";
const INSTAGRAM_CLOSING: &str = ".\n.\n.\n#content #create";

/// Template-based outline and platform adaptation.
#[derive(Debug, Clone, Default)]
pub struct FallbackGenerator {
    constraints: PlatformConstraints,
}

impl FallbackGenerator {
    pub fn new(constraints: PlatformConstraints) -> Self {
        Self { constraints }
    }

    /// Outline for a content type, or a generic outline built from the
    /// description. Empty only when both inputs are absent.
    pub fn outline_for(&self, content_type: Option<ContentType>, description: &str) -> String {
        let description = description.trim();
        match content_type {
            Some(ct) => preset_outline(ct, description),
            None if !description.is_empty() => generic_outline(description),
            None => String::new(),
        }
    }

    /// Adapt text to a platform.
    ///
    /// Applying this to its own output with the same platform returns that
    /// output unchanged: the closing element is stripped before the body is
    /// re-normalized, and every body transform is a no-op on its own result.
    pub fn optimize_for(
        &self,
        text: &str,
        platform: Platform,
        content_type: Option<ContentType>,
    ) -> String {
        let closing = closing_for(platform, content_type);
        let body = text.trim().strip_suffix(closing.as_str()).unwrap_or(text.trim()).trim_end();

        let body = match platform {
            Platform::Twitter => first_paragraphs(&flatten_markdown(body), 3),
            Platform::Instagram => decorate_instagram(body),
            Platform::LinkedIn | Platform::Blog => body.to_string(),
        };

        let limit = self.constraints.limit_for(platform.id());
        let closing_len = if closing.is_empty() { 0 } else { closing.chars().count() + 2 };
        let body = truncate(&body, limit.saturating_sub(closing_len));

        if closing.is_empty() {
            body
        } else if body.is_empty() {
            closing
        } else {
            format!("{body}\n\n{closing}")
        }
    }
}

type Section = (&'static str, &'static [&'static str]);

const NEWS_SECTIONS: &[Section] = &[
    ("Key Points", &["What happened", "Who is involved", "When and where it happened"]),
    ("Background Context", &["How we got here", "Related developments"]),
    ("Why This Matters", &["Impact on the audience", "What changes from here"]),
    ("Impact Analysis", &["Short-term effects", "What to watch next"]),
];

const MOTIVATION_SECTIONS: &[Section] = &[
    ("Opening", &["An attention-grabbing thought", "A relatable struggle"]),
    ("Main Message", &["Setbacks are part of the journey", "Small steps compound into big results"]),
    ("Supporting Points", &["A short personal story", "One practical habit to start today"]),
    ("Call to Action", &["Invite readers to share their next step"]),
];

const INFO_SECTIONS: &[Section] = &[
    ("Introduction", &["The topic in one sentence", "Why it is useful to know"]),
    ("Key Information", &["The core fact", "A supporting detail", "A common misconception"]),
    ("Practical Application", &["How to use this today", "Where to learn more"]),
];

const VIBE_CHECK_SECTIONS: &[Section] = &[
    ("Current Mood", &["How the week is going", "What has been on my mind"]),
    ("Conversation Starters", &["What is everyone working on?", "Drop an emoji that matches your mood"]),
];

const SURPRISE_SECTIONS: &[Section] = &[
    ("Attention-Grabbing Opening", &["A surprising fact or question"]),
    ("Unconventional Take", &["Flip a common assumption", "Connect two unrelated ideas"]),
    ("Thought-Provoking Closing", &["Leave the reader with a question"]),
];

fn preset_outline(content_type: ContentType, description: &str) -> String {
    let (title, sections) = match content_type {
        ContentType::News => ("Latest News Update", NEWS_SECTIONS),
        ContentType::Motivation => ("Keep Moving Forward", MOTIVATION_SECTIONS),
        ContentType::Info => ("Something Worth Knowing", INFO_SECTIONS),
        ContentType::VibeCheck => ("Vibe Check", VIBE_CHECK_SECTIONS),
        ContentType::Surprise => ("Something Unexpected", SURPRISE_SECTIONS),
    };

    let mut outline = format!("# {title}\n");
    for (index, (heading, bullets)) in sections.iter().enumerate() {
        outline.push_str(&format!("\n## {heading}\n"));
        if index == 0 && !description.is_empty() {
            outline.push_str(&format!("- Focus: {description}\n"));
        }
        for bullet in *bullets {
            outline.push_str(&format!("- {bullet}\n"));
        }
    }
    outline
}

fn generic_outline(description: &str) -> String {
    format!(
        "# {}\n\n## Introduction\n- {}\n- Why this matters to the audience\n\n\
         ## Main Points\n- The core idea\n- A supporting example\n- A practical takeaway\n\n\
         ## Conclusion\n- Summarize the key message\n- End with a clear call to action\n",
        title_from(description),
        description
    )
}

/// First line of the description, cut at a word boundary.
fn title_from(description: &str) -> String {
    const MAX_TITLE: usize = 60;

    let line = description.lines().next().unwrap_or_default().trim();
    if line.chars().count() <= MAX_TITLE {
        return line.to_string();
    }

    let cut: String = line.chars().take(MAX_TITLE).collect();
    match cut.rfind(' ') {
        Some(pos) if pos > 0 => cut[..pos].to_string(),
        _ => cut,
    }
}

/// Platform-appropriate closing element appended after the body.
fn closing_for(platform: Platform, content_type: Option<ContentType>) -> String {
    match platform {
        Platform::Twitter => match content_type {
            Some(ContentType::News) => "#BreakingNews #Update",
            Some(ContentType::Motivation) => "#Motivation #Growth",
            Some(ContentType::Info) => "#DidYouKnow #Learning",
            Some(ContentType::VibeCheck) => "#VibeCheck #Community",
            Some(ContentType::Surprise) => "#Surprise #Creative",
            None => "",
        }
        .to_string(),
        Platform::Instagram => INSTAGRAM_CLOSING.to_string(),
        Platform::LinkedIn => LINKEDIN_CLOSING.to_string(),
        Platform::Blog => String::new(),
    }
}

/// Turn markdown structure into plain text: titles lose their marker,
/// section headings become "Heading:" and bullets become "•".
fn flatten_markdown(text: &str) -> String {
    let text = TITLE_RE.replace_all(text, "$1");
    let text = HEADING_RE.replace_all(&text, "$1:");
    BULLET_RE.replace_all(&text, "${1}• ").into_owned()
}

fn decorate_instagram(text: &str) -> String {
    let text = TITLE_RE.replace_all(text, "$1 ✨");
    let text = HEADING_RE.replace_all(&text, "$1 👉");
    BULLET_RE.replace_all(&text, "${1}• ").into_owned()
}

/// Keep the first `count` non-blank paragraphs.
fn first_paragraphs(text: &str, count: usize) -> String {
    text.split("\n\n")
        .map(|p| p.trim_matches('\n').trim_end())
        .filter(|p| !p.trim().is_empty())
        .take(count)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Cut to at most `max_chars` characters, ending with an ellipsis when cut.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let kept: String = text.chars().take(max_chars - 1).collect();
    format!("{}…", kept.trim_end())
}
