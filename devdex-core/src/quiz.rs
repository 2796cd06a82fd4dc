//! Daily quiz generation
//!
//! A question shows one topic's description and asks which of four topic
//! titles it belongs to. The three distractors are drawn without
//! replacement from a shuffled copy of the pool, so generation always
//! terminates. Randomness is injected so callers can seed it.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::pack::{LanguagePack, Topic};

/// Options per question, and the minimum pool size
pub const QUIZ_OPTION_COUNT: usize = 4;

pub const QUIZ_QUESTION: &str = "Which concept does this description belong to?";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOption {
    pub id: String,
    pub title: String,
    pub language_name: String,
    pub language_color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub question: String,
    /// Description of the correct topic
    pub snippet: String,
    /// Display name of the correct topic's pack
    pub language: String,
    /// Display order
    pub options: Vec<QuizOption>,
    pub correct_option_id: String,
}

impl Quiz {
    pub fn is_correct(&self, option_id: &str) -> bool {
        self.correct_option_id == option_id
    }

    pub fn correct_option(&self) -> Option<&QuizOption> {
        self.options.iter().find(|o| o.id == self.correct_option_id)
    }
}

struct PoolEntry<'a> {
    pack: &'a LanguagePack,
    topic: &'a Topic,
}

impl PoolEntry<'_> {
    fn to_option(&self) -> QuizOption {
        QuizOption {
            id: self.topic.id.clone(),
            title: self.topic.title.clone(),
            language_name: self.pack.name.clone(),
            language_color: self.pack.color.clone(),
        }
    }
}

/// Build a question from every topic in the catalog
///
/// Returns `None` when the catalog has fewer than four topics, or fewer than
/// four distinct topic ids.
pub fn generate_quiz<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Option<Quiz> {
    let pool: Vec<PoolEntry<'_>> = catalog
        .iter()
        .flat_map(|pack| pack.topics.iter().map(move |topic| PoolEntry { pack, topic }))
        .collect();

    if pool.len() < QUIZ_OPTION_COUNT {
        debug!("Not enough topics for a quiz ({})", pool.len());
        return None;
    }

    let correct_index = rng.gen_range(0..pool.len());
    let correct = &pool[correct_index];

    let mut distractors: Vec<&PoolEntry<'_>> = pool
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != correct_index)
        .map(|(_, entry)| entry)
        .collect();
    distractors.shuffle(rng);

    let mut chosen: Vec<&PoolEntry<'_>> = vec![correct];
    for candidate in distractors {
        if chosen.len() == QUIZ_OPTION_COUNT {
            break;
        }
        if chosen.iter().any(|c| c.topic.id == candidate.topic.id) {
            continue;
        }
        chosen.push(candidate);
    }

    if chosen.len() < QUIZ_OPTION_COUNT {
        debug!("Not enough distinct topic ids for a quiz");
        return None;
    }

    let mut options: Vec<QuizOption> = chosen.iter().map(|entry| entry.to_option()).collect();
    options.shuffle(rng);

    Some(Quiz {
        question: QUIZ_QUESTION.to_string(),
        snippet: correct.topic.description.clone(),
        language: correct.pack.name.clone(),
        options,
        correct_option_id: correct.topic.id.clone(),
    })
}

/// [`generate_quiz`] with the thread-local RNG
pub fn generate_quiz_random(catalog: &Catalog) -> Option<Quiz> {
    generate_quiz(catalog, &mut rand::thread_rng())
}
