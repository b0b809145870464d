//! Heuristics that turn raw provider output into story pages
//!
//! Each provider type answers in a different shape: loose prose, a JSON object
//! or `Page N:` labels. All parsers return `Error::Parse` when the text cannot
//! be turned into a usable story; the generator treats that as a failed attempt.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{PAGE_COUNT, Story, StoryRequest};

/// Fragments at or below this many characters are dropped
const MIN_FRAGMENT_CHARS: usize = 20;
/// Fragments at or above this many characters are dropped
const MAX_FRAGMENT_CHARS: usize = 500;
/// Fewer surviving fragments than this means the prose was not a story
const MIN_FRAGMENTS: usize = 4;

static FREE_TEXT_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\n\s*\n|\. {2,}|Page \d+[:.]?").expect("valid separator regex")
});

static PAGE_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bpage\s*\d+\s*:").expect("valid page label regex"));

/// Split loose prose into page-sized fragments.
///
/// Splits on blank lines, on a period followed by two or more spaces, and on
/// `Page N` markers, then keeps fragments strictly between 20 and 500
/// characters. Returns up to six fragments, or an error when fewer than four
/// survive.
pub fn parse_free_text(text: &str) -> Result<Vec<String>> {
    let fragments: Vec<String> = FREE_TEXT_SEPARATOR
        .split(text)
        .map(str::trim)
        .filter(|part| {
            let len = part.chars().count();
            len > MIN_FRAGMENT_CHARS && len < MAX_FRAGMENT_CHARS
        })
        .take(PAGE_COUNT)
        .map(str::to_string)
        .collect();

    if fragments.len() < MIN_FRAGMENTS {
        return Err(Error::Parse(format!(
            "only {} usable fragments in free text",
            fragments.len()
        )));
    }

    Ok(fragments)
}

#[derive(Debug, Deserialize)]
struct JsonStory {
    title: String,
    pages: Vec<String>,
}

/// Extract a `{"title", "pages"}` object from text that may wrap it in prose.
///
/// Everything between the first `{` and the last `}` is parsed. Short page
/// lists are padded with a filler sentence and long ones truncated, so the
/// result always has exactly six pages.
pub fn parse_json_story(text: &str, request: &StoryRequest) -> Result<Story> {
    let start = text
        .find('{')
        .ok_or_else(|| Error::Parse("no JSON object in response".to_string()))?;
    let end = text
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| Error::Parse("unterminated JSON object in response".to_string()))?;

    let parsed: JsonStory = serde_json::from_str(&text[start..=end])
        .map_err(|e| Error::Parse(format!("invalid story JSON: {e}")))?;

    let mut pages = parsed.pages;
    pages.truncate(PAGE_COUNT);
    while pages.len() < PAGE_COUNT {
        pages.push(filler_page(request));
    }

    Ok(Story::new(parsed.title, pages))
}

/// Split `Page N: ...` labelled output into pages.
///
/// Each page runs from its label to the next label or the end of the text.
/// Without any labels the first six non-blank lines are used instead.
pub fn parse_labeled_pages(text: &str) -> Vec<String> {
    let labels: Vec<_> = PAGE_LABEL.find_iter(text).collect();

    if labels.is_empty() {
        return text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(PAGE_COUNT)
            .map(str::to_string)
            .collect();
    }

    labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let end = labels.get(i + 1).map_or(text.len(), |next| next.start());
            text[label.end()..end].trim()
        })
        .filter(|page| !page.is_empty())
        .take(PAGE_COUNT)
        .map(str::to_string)
        .collect()
}

/// Sentence used to pad JSON stories that came back short
pub fn filler_page(request: &StoryRequest) -> String {
    format!(
        "And so the adventure of {} in {} continued, full of wonder and magic.",
        request.character, request.setting
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> StoryRequest {
        StoryRequest::new("Luna the Fox", "Whispering Forest", "kindness", "Crystal Feather")
    }

    fn sentence(n: usize) -> String {
        format!("This is page number {n} of a lovely little story about a fox.")
    }

    // ============ Free text ============

    #[test]
    fn test_free_text_splits_on_blank_lines() {
        let text = (1..=6).map(sentence).collect::<Vec<_>>().join("\n\n");
        let pages = parse_free_text(&text).unwrap();
        assert_eq!(pages.len(), 6);
        assert_eq!(pages[0], sentence(1));
        assert_eq!(pages[5], sentence(6));
    }

    #[test]
    fn test_free_text_splits_on_page_markers() {
        let text = (1..=6)
            .map(|n| format!("Page {n}: {}", sentence(n)))
            .collect::<Vec<_>>()
            .join(" ");
        let pages = parse_free_text(&text).unwrap();
        assert_eq!(pages.len(), 6);
        assert_eq!(pages[2], sentence(3));
    }

    #[test]
    fn test_free_text_splits_on_double_space_after_period() {
        let text = "Luna woke up early and stretched in the sun.  \
                    She found a feather glowing by the old oak tree.  \
                    The feather whispered secrets of the forest to her.  \
                    Together they helped a lost owl find its way home.  \
                    Every creature in the forest cheered for the brave fox.";
        let pages = parse_free_text(text).unwrap();
        assert_eq!(pages.len(), 5);
        assert_eq!(pages[0], "Luna woke up early and stretched in the sun");
    }

    #[test]
    fn test_free_text_drops_short_and_long_fragments() {
        let long = "x".repeat(MAX_FRAGMENT_CHARS);
        let exactly_min = "y".repeat(MIN_FRAGMENT_CHARS);
        let text = format!(
            "Short one\n\n{long}\n\n{exactly_min}\n\n{}\n\n{}\n\n{}\n\n{}",
            sentence(1),
            sentence(2),
            sentence(3),
            sentence(4)
        );
        let pages = parse_free_text(&text).unwrap();
        assert_eq!(pages, vec![sentence(1), sentence(2), sentence(3), sentence(4)]);
    }

    #[test]
    fn test_free_text_takes_at_most_six() {
        let text = (1..=9).map(sentence).collect::<Vec<_>>().join("\n\n");
        assert_eq!(parse_free_text(&text).unwrap().len(), PAGE_COUNT);
    }

    #[test]
    fn test_free_text_requires_four_fragments() {
        let text = (1..=3).map(sentence).collect::<Vec<_>>().join("\n\n");
        assert!(matches!(parse_free_text(&text), Err(Error::Parse(_))));
    }

    // ============ JSON ============

    #[test]
    fn test_json_story_ignores_surrounding_prose() {
        let pages: Vec<String> = (1..=6).map(sentence).collect();
        let text = format!(
            "Here is your story!\n```json\n{}\n```\nEnjoy.",
            serde_json::json!({ "title": "Luna's Feather", "pages": pages })
        );
        let story = parse_json_story(&text, &request()).unwrap();
        assert_eq!(story.title, "Luna's Feather");
        assert_eq!(story.pages, pages);
    }

    #[test]
    fn test_json_story_pads_short_page_lists() {
        let text = r#"{"title": "Short", "pages": ["One page only."]}"#;
        let story = parse_json_story(text, &request()).unwrap();
        assert_eq!(story.pages.len(), PAGE_COUNT);
        assert_eq!(story.pages[0], "One page only.");
        assert_eq!(story.pages[1], filler_page(&request()));
        assert!(story.pages[5].contains("Luna the Fox"));
        assert!(story.pages[5].contains("Whispering Forest"));
    }

    #[test]
    fn test_json_story_truncates_long_page_lists() {
        let pages: Vec<String> = (1..=8).map(sentence).collect();
        let text = serde_json::json!({ "title": "Long", "pages": pages }).to_string();
        let story = parse_json_story(&text, &request()).unwrap();
        assert_eq!(story.pages.len(), PAGE_COUNT);
        assert_eq!(story.pages[5], sentence(6));
    }

    #[test]
    fn test_json_story_requires_title_and_pages() {
        assert!(parse_json_story(r#"{"pages": ["a"]}"#, &request()).is_err());
        assert!(parse_json_story(r#"{"title": "t"}"#, &request()).is_err());
        assert!(parse_json_story(r#"{"title": "t", "pages": "a"}"#, &request()).is_err());
    }

    #[test]
    fn test_json_story_without_braces_fails() {
        assert!(parse_json_story("no json here", &request()).is_err());
        assert!(parse_json_story("} backwards {", &request()).is_err());
    }

    // ============ Labeled pages ============

    #[test]
    fn test_labeled_pages_split_on_labels() {
        let text = "Page 1: Luna found a feather.\nPage 2: It glowed.\npage 3 : She smiled.";
        let pages = parse_labeled_pages(text);
        assert_eq!(pages, vec!["Luna found a feather.", "It glowed.", "She smiled."]);
    }

    #[test]
    fn test_labeled_pages_span_multiple_lines() {
        let text = "Page 1: Luna woke.\nShe yawned.\n\nPage 2: The end.";
        let pages = parse_labeled_pages(text);
        assert_eq!(pages[0], "Luna woke.\nShe yawned.");
        assert_eq!(pages[1], "The end.");
    }

    #[test]
    fn test_labeled_pages_fall_back_to_lines() {
        let text = "First line\n\n  Second line  \nThird\nFourth\nFifth\nSixth\nSeventh";
        let pages = parse_labeled_pages(text);
        assert_eq!(pages.len(), PAGE_COUNT);
        assert_eq!(pages[1], "Second line");
        assert_eq!(pages[5], "Sixth");
    }

    #[test]
    fn test_labeled_pages_skip_empty_labels() {
        let text = "Page 1:\nPage 2: Only this one has text.";
        assert_eq!(parse_labeled_pages(text), vec!["Only this one has text."]);
    }
}
