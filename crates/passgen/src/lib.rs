//! Password generation and strength scoring.
//!
//! Generation samples uniformly from a charset assembled from the selected
//! character classes, using the thread-local CSPRNG.

use {
    rand::Rng,
    serde::{Deserialize, Serialize},
};

const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const NUMBERS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Characters that are easy to misread (1/l/I, 0/O and friends).
const SIMILAR: &str = "il1Lo0O";

/// Knobs for [`generate_password`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordOptions {
    pub length: usize,
    pub include_uppercase: bool,
    pub include_lowercase: bool,
    pub include_numbers: bool,
    pub include_symbols: bool,
    /// Drop easily-misread characters (1/l/I, 0/O) so passwords survive
    /// being copied by hand.
    pub exclude_similar: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            length: 16,
            include_uppercase: true,
            include_lowercase: true,
            include_numbers: true,
            include_symbols: true,
            exclude_similar: false,
        }
    }
}

/// Generate a random password.
///
/// An empty charset (all classes disabled, or everything excluded as
/// similar-looking) falls back to lowercase letters rather than failing.
pub fn generate_password(options: &PasswordOptions) -> String {
    let mut charset = String::new();
    if options.include_uppercase {
        charset.push_str(UPPERCASE);
    }
    if options.include_lowercase {
        charset.push_str(LOWERCASE);
    }
    if options.include_numbers {
        charset.push_str(NUMBERS);
    }
    if options.include_symbols {
        charset.push_str(SYMBOLS);
    }

    if options.exclude_similar {
        charset.retain(|c| !SIMILAR.contains(c));
    }

    if charset.is_empty() {
        charset.push_str(LOWERCASE);
    }

    let chars: Vec<char> = charset.chars().collect();
    let mut rng = rand::rng();
    (0..options.length)
        .map(|_| chars[rng.random_range(0..chars.len())])
        .collect()
}

/// Strength label buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrengthLabel {
    Weak,
    Fair,
    Good,
    Strong,
}

/// A scored strength estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Strength {
    /// 0-7: three length tiers plus four character-class bonuses.
    pub score: u8,
    pub label: StrengthLabel,
}

/// Heuristic strength score: length tiers plus character variety.
pub fn strength(password: &str) -> Strength {
    let mut score = 0u8;

    let len = password.chars().count();
    if len >= 8 {
        score += 1;
    }
    if len >= 12 {
        score += 1;
    }
    if len >= 16 {
        score += 1;
    }

    if password.chars().any(|c| c.is_ascii_lowercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_uppercase()) {
        score += 1;
    }
    if password.chars().any(|c| c.is_ascii_digit()) {
        score += 1;
    }
    if password.chars().any(|c| !c.is_ascii_alphanumeric()) {
        score += 1;
    }

    let label = match score {
        0..=2 => StrengthLabel::Weak,
        3..=4 => StrengthLabel::Fair,
        5..=6 => StrengthLabel::Good,
        _ => StrengthLabel::Strong,
    };

    Strength { score, label }
}
