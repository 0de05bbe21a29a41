//! Curated fallback question bank.
//!
//! Deterministic last stage of the fetch chain: filtered by theme and
//! difficulty, widened to any difficulty in the theme when the exact pool is
//! spent, empty only once every question in the theme has been shown.

use std::collections::HashSet;

use rand::Rng;

use crate::types::{
    Difficulty, Question, QuestionId, QuestionOption, QuestionProvenance, ThemeId,
};

struct RawQuestion {
    id: &'static str,
    prompt: &'static str,
    difficulty: Difficulty,
    options: &'static [RawOption],
}

struct RawOption {
    text: &'static str,
    odd: bool,
}

const fn opt(text: &'static str, odd: bool) -> RawOption {
    RawOption { text, odd }
}

const FOOTBALL: &[RawQuestion] = &[
    RawQuestion {
        id: "football-easy-1",
        prompt: "Which kit color does not belong to FC Barcelona's traditional home strip?",
        difficulty: Difficulty::Easy,
        options: &[
            opt("Deep blue", false),
            opt("Claret red", false),
            opt("Golden yellow", true),
            opt("Navy stripes", false),
        ],
    },
    RawQuestion {
        id: "football-easy-2",
        prompt: "Spot the odd one out among legendary strikers.",
        difficulty: Difficulty::Easy,
        options: &[
            opt("Thierry Henry", false),
            opt("Ronaldo Nazario", false),
            opt("Iker Casillas", true),
            opt("Didier Drogba", false),
        ],
    },
    RawQuestion {
        id: "football-medium-1",
        prompt: "Three of these clubs have won the UEFA Champions League multiple times. \
                 Which has not?",
        difficulty: Difficulty::Medium,
        options: &[
            opt("A.C. Milan", false),
            opt("Nottingham Forest", false),
            opt("Olympique Lyonnais", true),
            opt("Real Madrid", false),
        ],
    },
    RawQuestion {
        id: "football-medium-2",
        prompt: "Choose the tactical formation not commonly associated with a \
                 three-at-the-back system.",
        difficulty: Difficulty::Medium,
        options: &[
            opt("3-4-3", false),
            opt("3-5-2", false),
            opt("4-2-3-1", true),
            opt("3-1-4-2", false),
        ],
    },
    RawQuestion {
        id: "football-hard-1",
        prompt: "Identify the club that does not play in the Bundesliga.",
        difficulty: Difficulty::Hard,
        options: &[
            opt("Borussia Dortmund", false),
            opt("RB Leipzig", false),
            opt("FC Cincinnati", true),
            opt("Bayer Leverkusen", false),
        ],
    },
    RawQuestion {
        id: "football-expert-1",
        prompt: "Which football law element is not part of the offside offense criteria?",
        difficulty: Difficulty::Expert,
        options: &[
            opt("Being in line with the second-last defender", false),
            opt("Gaining advantage from a rebound", false),
            opt("Receiving the ball directly from a throw-in", true),
            opt("Interfering with an opponent", false),
        ],
    },
];

const ANIME: &[RawQuestion] = &[
    RawQuestion {
        id: "anime-easy-1",
        prompt: "Which of these is not a Studio Ghibli film?",
        difficulty: Difficulty::Easy,
        options: &[
            opt("Spirited Away", false),
            opt("Your Name", true),
            opt("Howl's Moving Castle", false),
            opt("Princess Mononoke", false),
        ],
    },
    RawQuestion {
        id: "anime-easy-2",
        prompt: "Three protagonists wield swords as their primary weapon. Who does not?",
        difficulty: Difficulty::Easy,
        options: &[
            opt("Ichigo Kurosaki", false),
            opt("Roronoa Zoro", false),
            opt("Light Yagami", true),
            opt("Tanjiro Kamado", false),
        ],
    },
    RawQuestion {
        id: "anime-medium-1",
        prompt: "Identify the series that did not originate from Shonen Jump.",
        difficulty: Difficulty::Medium,
        options: &[
            opt("Jujutsu Kaisen", false),
            opt("My Hero Academia", false),
            opt("Attack on Titan", true),
            opt("Black Clover", false),
        ],
    },
    RawQuestion {
        id: "anime-medium-2",
        prompt: "Three composers scored major shonen soundtracks. Who is the outlier?",
        difficulty: Difficulty::Medium,
        options: &[
            opt("Yuki Hayashi", false),
            opt("Hiroyuki Sawano", false),
            opt("Hans Zimmer", true),
            opt("Shiro Sagisu", false),
        ],
    },
    RawQuestion {
        id: "anime-hard-1",
        prompt: "Find the anime that premiered after 2015.",
        difficulty: Difficulty::Hard,
        options: &[
            opt("Mob Psycho 100", true),
            opt("Haikyuu!!", false),
            opt("JoJo's Bizarre Adventure: Stardust Crusaders", false),
            opt("Hunter x Hunter (2011)", false),
        ],
    },
    RawQuestion {
        id: "anime-expert-1",
        prompt: "Three of these creators won the Tezuka Osamu Cultural Prize. Which did not?",
        difficulty: Difficulty::Expert,
        options: &[
            opt("Naoki Urasawa", false),
            opt("Rumiko Takahashi", false),
            opt("Eiichiro Oda", true),
            opt("Kazuhiro Fujita", false),
        ],
    },
];

const SCIENCE: &[RawQuestion] = &[
    RawQuestion {
        id: "science-easy-1",
        prompt: "Which of these is not considered a noble gas?",
        difficulty: Difficulty::Easy,
        options: &[
            opt("Helium", false),
            opt("Neon", false),
            opt("Oxygen", true),
            opt("Argon", false),
        ],
    },
    RawQuestion {
        id: "science-easy-2",
        prompt: "Three inventions transformed electricity usage. Which did not?",
        difficulty: Difficulty::Easy,
        options: &[
            opt("Alternating current motor", false),
            opt("LED lighting", false),
            opt("Steam turbine", true),
            opt("Lithium-ion battery", false),
        ],
    },
    RawQuestion {
        id: "science-medium-1",
        prompt: "Spot the scientist who did not publish on the theory of evolution.",
        difficulty: Difficulty::Medium,
        options: &[
            opt("Charles Darwin", false),
            opt("Alfred Russel Wallace", false),
            opt("Jean-Baptiste Lamarck", false),
            opt("Gregor Mendel", true),
        ],
    },
    RawQuestion {
        id: "science-medium-2",
        prompt: "Select the spacecraft that did not explore Mars.",
        difficulty: Difficulty::Medium,
        options: &[
            opt("Viking 1", false),
            opt("Curiosity rover", false),
            opt("Cassini-Huygens", true),
            opt("Perseverance rover", false),
        ],
    },
    RawQuestion {
        id: "science-hard-1",
        prompt: "Three fields fall under classical mechanics. Which does not?",
        difficulty: Difficulty::Hard,
        options: &[
            opt("Kinematics", false),
            opt("Dynamics", false),
            opt("Thermodynamics", true),
            opt("Statics", false),
        ],
    },
    RawQuestion {
        id: "science-expert-1",
        prompt: "Which concept is not part of the Standard Model of particle physics?",
        difficulty: Difficulty::Expert,
        options: &[
            opt("Higgs boson", false),
            opt("W and Z bosons", false),
            opt("Graviton", true),
            opt("Gluons", false),
        ],
    },
];

fn theme_pool(theme_id: &str) -> Option<&'static [RawQuestion]> {
    match theme_id {
        "football" => Some(FOOTBALL),
        "anime" => Some(ANIME),
        "science" => Some(SCIENCE),
        _ => None,
    }
}

/// All question ids in a theme's pool, for exhaustion checks
pub fn theme_question_ids(theme_id: &str) -> Vec<QuestionId> {
    theme_pool(theme_id)
        .map(|pool| pool.iter().map(|q| q.id.to_string()).collect())
        .unwrap_or_default()
}

/// Draw an unseen question from the theme's pool. Prefers the requested
/// difficulty, widens to the whole theme once that pool is spent, and returns
/// None only when every question in the theme has been shown.
pub fn fallback_question(
    theme_id: &ThemeId,
    difficulty: Difficulty,
    excluded_ids: &HashSet<QuestionId>,
) -> Option<Question> {
    let pool = theme_pool(theme_id)?;

    let exact: Vec<&RawQuestion> = pool
        .iter()
        .filter(|q| q.difficulty == difficulty && !excluded_ids.contains(q.id))
        .collect();

    let available = if exact.is_empty() {
        pool.iter().filter(|q| !excluded_ids.contains(q.id)).collect()
    } else {
        exact
    };

    if available.is_empty() {
        return None;
    }

    let mut rng = rand::rng();
    let selection = available[rng.random_range(0..available.len())];

    let options: Vec<QuestionOption> = selection
        .options
        .iter()
        .enumerate()
        .map(|(index, option)| QuestionOption {
            id: format!("{}-option-{index}", selection.id),
            text: option.text.to_string(),
            is_odd_one_out: option.odd,
        })
        .collect();
    let odd_option_id = options.iter().find(|o| o.is_odd_one_out)?.id.clone();

    Some(Question {
        id: selection.id.to_string(),
        seed: ulid::Ulid::new().to_string(),
        prompt: selection.prompt.to_string(),
        theme_id: theme_id.clone(),
        difficulty: selection.difficulty,
        options,
        odd_option_id,
        provenance: QuestionProvenance::Fallback,
        created_at: chrono::Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_bank_question_has_one_odd_option() {
        for theme in ["football", "anime", "science"] {
            for question in theme_pool(theme).unwrap() {
                let odd_count = question.options.iter().filter(|o| o.odd).count();
                assert_eq!(odd_count, 1, "{} must have exactly one odd option", question.id);
                assert!(question.options.len() >= 2);
            }
        }
    }

    #[test]
    fn test_fallback_prefers_requested_difficulty() {
        let question = fallback_question(
            &"football".to_string(),
            Difficulty::Expert,
            &HashSet::new(),
        )
        .unwrap();
        assert_eq!(question.id, "football-expert-1");
        assert_eq!(question.difficulty, Difficulty::Expert);
        assert_eq!(question.provenance, QuestionProvenance::Fallback);
    }

    #[test]
    fn test_fallback_widens_when_difficulty_pool_spent() {
        let mut excluded = HashSet::new();
        excluded.insert("football-expert-1".to_string());

        let question =
            fallback_question(&"football".to_string(), Difficulty::Expert, &excluded).unwrap();
        assert_ne!(question.difficulty, Difficulty::Expert);
    }

    #[test]
    fn test_fallback_exhausts_theme() {
        let excluded: HashSet<QuestionId> =
            theme_question_ids("anime").into_iter().collect();

        let question = fallback_question(&"anime".to_string(), Difficulty::Easy, &excluded);
        assert!(question.is_none());
    }

    #[test]
    fn test_fallback_unknown_theme() {
        let question = fallback_question(
            &"space-explorers".to_string(),
            Difficulty::Easy,
            &HashSet::new(),
        );
        assert!(question.is_none());
    }

    #[test]
    fn test_option_ids_are_unique_and_stable() {
        let question =
            fallback_question(&"science".to_string(), Difficulty::Hard, &HashSet::new()).unwrap();
        let ids: HashSet<&str> = question.options.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids.len(), question.options.len());
        assert!(question.options.iter().all(|o| o.id.starts_with("science-hard-1-option-")));
        assert_eq!(question.odd_option_id, question.odd_option().unwrap().id);
    }
}
