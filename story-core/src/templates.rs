//! Hand-written fallback stories used when no provider produces a usable result
//!
//! Rendering is single-pass placeholder substitution and cannot fail.

use std::sync::LazyLock;

use rand::Rng;
use rand::seq::SliceRandom;
use regex::{Captures, Regex};

use crate::types::{PAGE_COUNT, Story, StoryRequest};

// one pass, so field values are never rescanned for placeholders
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(character|setting|element|themes)\}").expect("valid placeholder regex")
});

/// A six-page story skeleton with `{character}`, `{setting}`, `{element}` and
/// `{themes}` placeholders
#[derive(Debug, Clone, Copy)]
pub struct StoryTemplate {
    pub title: &'static str,
    pub pages: [&'static str; PAGE_COUNT],
}

impl StoryTemplate {
    /// Substitute the request fields into the title and every page
    pub fn render(&self, request: &StoryRequest) -> Story {
        Story::new(
            fill(self.title, request),
            self.pages.iter().map(|page| fill(page, request)).collect(),
        )
    }
}

fn fill(template: &str, request: &StoryRequest) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match &caps[1] {
            "character" => request.character.as_str(),
            "setting" => request.setting.as_str(),
            "element" => request.element.as_str(),
            _ => request.themes.as_str(),
        })
        .into_owned()
}

pub const TEMPLATES: [StoryTemplate; 2] = [
    StoryTemplate {
        title: "{character} and the Magical {element}",
        pages: [
            "In the heart of the {setting}, a curious {character} was exploring when they spotted something glowing. Hidden among the ancient trees was a beautiful {element} that sparkled like starlight.",
            "When the {character} gently touched the {element}, it began to hum with magical energy. Suddenly, the {character} could understand the language of all the creatures in the {setting}.",
            "A tiny field mouse approached and told the {character} about a problem. The animals of the {setting} had lost their way to the magical spring that kept their home beautiful and green.",
            "The {character} knew they had to help. Using the power of the {element}, they created a trail of glowing light that would guide all the lost animals safely home.",
            "One by one, rabbits, squirrels, and birds followed the magical trail. The {character} learned that helping others made the {element} glow even brighter and more beautiful.",
            "As the sun set over the {setting}, all the animals were safely home. The {character} smiled, knowing that the greatest magic comes from {themes}. The {element} would always remind them of this wonderful day.",
        ],
    },
    StoryTemplate {
        title: "The Adventure of {character} in {setting}",
        pages: [
            "Once upon a time, a brave {character} lived near the magical {setting}. Every morning, they would explore new paths and discover wonderful secrets hidden throughout the land.",
            "On this special day, the {character} found a mysterious {element} resting beside a babbling brook. The moment they picked it up, the {element} began to glow with warm, golden light.",
            "The {element} showed the {character} a vision of creatures in the {setting} who needed help. Some were lost, some were scared, and some just needed a friend to talk to.",
            "Without hesitation, the {character} set off on their mission. They used the {element}'s gentle light to comfort a frightened owl and helped a family of rabbits find their burrow.",
            "As the {character} continued helping others, they discovered something amazing. Each act of kindness made the {element} shine brighter and filled their heart with joy and warmth.",
            "When evening came, the {character} sat peacefully in the {setting}, surrounded by all their new friends. They had learned that {themes} creates the most powerful magic of all.",
        ],
    },
];

/// Pick one of the built-in templates and render it for the request
pub fn fallback_story<R: Rng + ?Sized>(request: &StoryRequest, rng: &mut R) -> Story {
    TEMPLATES
        .choose(rng)
        .unwrap_or(&TEMPLATES[0])
        .render(request)
}
