//! Prompt builders, one per response format a provider is asked for

use crate::types::{PAGE_COUNT, StoryRequest};

/// Plain-prose prompt for free-form text endpoints
pub fn free_text_prompt(request: &StoryRequest) -> String {
    format!(
        "Write a magical bedtime story for children. Character: {}. Setting: {}. \
         Magic item: {}. Theme: {}. Write exactly {} short pages, each 2-3 sentences. \
         Make it creative and unique.",
        request.character, request.setting, request.element, request.themes, PAGE_COUNT
    )
}

/// Prompt asking for `Page N:` labels so the output can be split reliably
pub fn labeled_page_prompt(request: &StoryRequest) -> String {
    let mut prompt = format!(
        "Write a magical bedtime story for children about {} in {}. \
         The story features a magical {} and teaches about {}. \
         Write exactly {} short pages of 2-3 sentences each. \
         Label every page like this:\n",
        request.character, request.setting, request.element, request.themes, PAGE_COUNT
    );

    for page in 1..=PAGE_COUNT {
        prompt.push_str(&format!("Page {page}: ...\n"));
    }

    prompt.push_str("\nStory:\n");
    prompt
}

/// Prompt asking for a bare JSON object with `title` and `pages`
pub fn json_prompt(request: &StoryRequest) -> String {
    format!(
        "Create a magical, age-appropriate bedtime story for children aged 4-8.\n\n\
         Main character: {}\n\
         Setting: {}\n\
         Magic element: {}\n\
         Themes: {}\n\n\
         The story must have exactly {} pages, each 2-3 short sentences, with a warm, \
         gentle ending. Respond with ONLY a JSON object in this exact format, no other text:\n\
         {{\"title\": \"Story title\", \"pages\": [\"Page 1 text\", \"Page 2 text\", \
         \"Page 3 text\", \"Page 4 text\", \"Page 5 text\", \"Page 6 text\"]}}",
        request.character, request.setting, request.element, request.themes, PAGE_COUNT
    )
}
