//! Static theme catalog, defined once at process start.

use crate::types::Difficulty::{Easy, Expert, Hard, Medium};
use crate::types::{Difficulty, Theme, ThemeId};
use once_cell::sync::Lazy;

/// Themes that are playable today
pub static CORE_THEMES: Lazy<Vec<Theme>> = Lazy::new(|| {
    vec![
        Theme {
            id: "football".to_string(),
            label: "World Football".to_string(),
            description: "Kits, clubs, tactics, and international legends.".to_string(),
            icon: "football".to_string(),
            accent_color: "#FF8C42".to_string(),
            difficulty_ramp: vec![
                Easy, Easy, Easy, Medium, Medium, Medium, Medium, Hard, Hard, Hard, Hard, Hard,
                Expert,
            ],
            coming_soon: false,
        },
        Theme {
            id: "anime".to_string(),
            label: "Anime Universe".to_string(),
            description: "Series lore, mangaka trivia, and iconic characters.".to_string(),
            icon: "sparkles".to_string(),
            accent_color: "#FF6FB5".to_string(),
            difficulty_ramp: vec![
                Easy, Easy, Easy, Medium, Medium, Medium, Medium, Hard, Hard, Hard, Hard, Hard,
                Expert,
            ],
            coming_soon: false,
        },
        Theme {
            id: "science".to_string(),
            label: "Science & Discovery".to_string(),
            description: "Breakthroughs, inventors, and scientific oddities.".to_string(),
            icon: "flask".to_string(),
            accent_color: "#F5A25D".to_string(),
            // Ramps a little faster than the default thresholds
            difficulty_ramp: vec![
                Easy, Easy, Medium, Medium, Medium, Hard, Hard, Hard, Hard, Expert,
            ],
            coming_soon: false,
        },
    ]
});

/// Placeholder themes shown in listings but refused by the engine
pub static UPCOMING_THEMES: Lazy<Vec<Theme>> = Lazy::new(|| {
    vec![
        Theme {
            id: "space-explorers".to_string(),
            label: "Space Explorers".to_string(),
            description: "Coming soon: missions, rockets, and galaxies to unravel.".to_string(),
            icon: "planet".to_string(),
            accent_color: "#9C6CFF".to_string(),
            difficulty_ramp: vec![Easy, Medium, Hard, Expert, Expert],
            coming_soon: true,
        },
        Theme {
            id: "street-foods".to_string(),
            label: "Street Foods".to_string(),
            description: "Planned expansion celebrating spicy bites worldwide.".to_string(),
            icon: "fast-food".to_string(),
            accent_color: "#F07F52".to_string(),
            difficulty_ramp: vec![Easy, Medium, Medium, Hard, Expert],
            coming_soon: true,
        },
    ]
});

/// Core and upcoming themes combined, for listings
pub fn all_themes() -> Vec<Theme> {
    CORE_THEMES
        .iter()
        .chain(UPCOMING_THEMES.iter())
        .cloned()
        .collect()
}

pub fn find_theme(id: &str) -> Option<&'static Theme> {
    CORE_THEMES
        .iter()
        .chain(UPCOMING_THEMES.iter())
        .find(|theme| theme.id == id)
}

/// Playable theme lookup: unknown and coming-soon ids both miss
pub fn find_playable_theme(id: &ThemeId) -> Option<&'static Theme> {
    find_theme(id).filter(|theme| !theme.coming_soon)
}
