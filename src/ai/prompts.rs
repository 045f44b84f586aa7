//! User-message builders for the generation endpoint.

use crate::core::{ContentType, Platform, PlatformConstraints};

/// Prompt asking for an outline of the described content.
pub fn outline_prompt(description: &str, content_type: Option<ContentType>) -> String {
    let mut prompt = match content_type {
        Some(ct) => {
            let guidance = match ct {
                ContentType::News => {
                    "Include sections for key points, background context, and why this matters. Add a section for impact analysis."
                }
                ContentType::Motivation => {
                    "Include an attention-grabbing opening, main motivational message with supporting points, and a clear call to action."
                }
                ContentType::Info => {
                    "Structure with an introduction, key information points, and practical application section."
                }
                ContentType::VibeCheck => {
                    "Keep it casual with a current mood section and conversation starters for audience engagement."
                }
                ContentType::Surprise => {
                    "Be creative and unexpected - include an attention-grabbing opening, unconventional main content, and a thought-provoking closing."
                }
            };
            format!(
                "Create a detailed content outline for a {} post with the following description: \"{}\". {}",
                ct.id(),
                description,
                guidance
            )
        }
        None => format!(
            "Create a detailed content outline based on the following description: \"{}\". Include appropriate sections with bullet points for each section.",
            description
        ),
    };

    prompt.push_str(
        " Format the outline with Markdown headings (# for main title, ## for sections) and bullet points (- ) for list items.",
    );
    prompt
}

/// Prompt asking to adapt `content` to a platform and its character limit.
pub fn optimize_prompt(content: &str, platform: Platform, constraints: &PlatformConstraints) -> String {
    let limit = constraints.limit_for(platform.id());
    let guidance = match platform {
        Platform::Twitter => {
            "Optimize for Twitter by making it concise (under 280 characters if possible), adding relevant hashtags, and including a clear call to action."
        }
        Platform::LinkedIn => {
            "Optimize for LinkedIn by using a professional tone, providing value and insights, and including a question to drive engagement."
        }
        Platform::Instagram => {
            "Optimize for Instagram by using visual language, strategic emojis, and grouping hashtags at the end."
        }
        Platform::Blog => {
            "Optimize for a blog by expanding the content with more details, using proper headings and structure, and optimizing for readability and SEO."
        }
    };

    format!(
        "Optimize the following content for {} with a character limit of {}:\n\n{}\n\n{}",
        platform.id(),
        limit,
        content,
        guidance
    )
}

/// Prompt used by the enhanced tier to write the post directly.
pub fn platform_content_prompt(
    topic: &str,
    platform: Platform,
    content_type: Option<ContentType>,
    constraints: &PlatformConstraints,
) -> String {
    let (limit, features) = constraints
        .get(platform)
        .map_or((constraints.default_limit(), "clear and engaging content"), |c| {
            (c.char_limit, c.features)
        });

    let mut prompt = format!(
        "Create a {} post about: {}\nThis is for {} and should be optimized with {}.\nKeep it under {} characters if possible.",
        content_type.map_or("engaging", |ct| ct.id()),
        topic,
        platform.id(),
        features,
        limit
    );

    if let Some(ct) = content_type {
        prompt.push('\n');
        prompt.push_str(match ct {
            ContentType::News => "Format as breaking news with key points and impacts.",
            ContentType::Motivation => "Include an inspirational message and a clear call to action.",
            ContentType::Info => {
                "Provide valuable information in an educational, easy-to-understand format."
            }
            ContentType::VibeCheck => {
                "Keep it casual and conversational, with audience engagement prompts."
            }
            ContentType::Surprise => "Be creative, unexpected, and thought-provoking.",
        });
    }

    prompt
}

/// Fixed task instruction composed after the user's persona by the enhanced tier.
pub fn enhanced_task_instruction(platform: Platform) -> String {
    let id = platform.id();
    format!(
        "You are a professional content writer specializing in creating engaging content for {id}.\n\
         Your task is to produce well-written, platform-optimized content that follows best practices for {id}.\n\
         You should write directly in the voice of the user without any meta commentary or explanations."
    )
}
