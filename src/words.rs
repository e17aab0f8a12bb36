//! Per-tier word lists for the word puzzle
//!
//! Lists are read from `level1.txt` .. `level9.txt` (UTF-8, one word per
//! line, blank lines and `#` comments ignored). Tiers without a file use the
//! built-in lists below.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::game::level::{MAX_TIER, MIN_TIER};

/// Supplies candidate words for a difficulty tier
pub trait WordSource: Send + Sync {
    /// Words for `tier`, `None` if the tier is unknown
    fn words(&self, tier: u8) -> Option<&[String]>;
}

/// Built-in words, roughly one extra letter per tier
static BUILTIN: [&[&str]; 9] = [
    &["cat", "dog", "sun", "hat", "cup", "pen", "box", "bus", "egg", "fox"],
    &["tree", "fish", "milk", "book", "door", "frog", "star", "moon", "cake", "bird"],
    &["apple", "house", "water", "chair", "bread", "train", "horse", "plant", "clock", "smile"],
    &["garden", "window", "pencil", "rabbit", "winter", "orange", "bridge", "castle", "flower", "rocket"],
    &["kitchen", "blanket", "library", "monster", "pumpkin", "teacher", "weather", "holiday", "chicken", "dolphin"],
    &["elephant", "umbrella", "sandwich", "dinosaur", "mountain", "hospital", "treasure", "squirrel", "calendar", "painting"],
    &["butterfly", "chocolate", "adventure", "telephone", "crocodile", "vegetable", "lightning", "astronaut", "newspaper", "quicksand"],
    &["strawberry", "watermelon", "helicopter", "playground", "restaurant", "skateboard", "television", "basketball", "microphone", "lighthouse"],
    &["grasshopper", "thunderstorm", "refrigerator", "encyclopedia", "hippopotamus", "kaleidoscope", "constellation", "extraordinary", "photographer", "architecture"],
];

/// Word lists keyed by tier
#[derive(Debug, Clone, Default)]
pub struct WordLists {
    tiers: BTreeMap<u8, Vec<String>>,
}

impl WordLists {
    /// Empty set of lists (every tier missing)
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in lists for tiers 1..=9
    pub fn builtin() -> Self {
        let tiers = BUILTIN
            .iter()
            .enumerate()
            .map(|(i, words)| {
                let tier = i as u8 + MIN_TIER;
                (tier, words.iter().map(|w| w.to_string()).collect())
            })
            .collect();
        Self { tiers }
    }

    /// Built-in lists, with tiers overridden by `level{N}.txt` files in `dir`
    pub fn from_dir(dir: &Path) -> Result<Self> {
        let mut lists = Self::builtin();
        for tier in MIN_TIER..=MAX_TIER {
            let path = dir.join(format!("level{}.txt", tier));
            if !path.exists() {
                continue;
            }
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read word list: {}", path.display()))?;
            let words = parse_word_list(&content);
            debug!(
                "[lingvo:words] Loaded {} words for tier {} from {}",
                words.len(),
                tier,
                path.display()
            );
            lists.set_tier(tier, words);
        }
        info!("[lingvo:words] Word lists ready ({} tiers)", lists.tiers.len());
        Ok(lists)
    }

    /// Replace the words of one tier
    pub fn set_tier(&mut self, tier: u8, words: Vec<String>) {
        self.tiers.insert(tier, words);
    }

    pub fn with_tier(mut self, tier: u8, words: &[&str]) -> Self {
        self.set_tier(tier, words.iter().map(|w| w.to_string()).collect());
        self
    }
}

impl WordSource for WordLists {
    fn words(&self, tier: u8) -> Option<&[String]> {
        self.tiers.get(&tier).map(Vec::as_slice)
    }
}

/// Parse one word per line, skipping blanks and `#` comments
pub fn parse_word_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}
