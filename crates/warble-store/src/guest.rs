use rand::Rng;

const FIRST: [&str; 8] = [
    "Super", "Ultra", "Mega", "Insanely", "Unfathomably", "Ultimately", "Extremely", "Crazy",
];
const SECOND: [&str; 6] = ["Sassy", "Punk", "Rock", "Jazzy", "Pop", "Metal"];
const THIRD: [&str; 7] = ["99", "100", "101", "002", "999", "77", "090"];

/// Composes guest display names like `SuperPunk090` from three word lists.
///
/// Every draw is independent; collisions with existing users are the
/// registry's problem.
#[derive(Debug, Clone)]
pub struct GuestNameGenerator {
    first: Vec<String>,
    second: Vec<String>,
    third: Vec<String>,
}

impl Default for GuestNameGenerator {
    fn default() -> Self {
        Self::with_words(&FIRST, &SECOND, &THIRD)
    }
}

impl GuestNameGenerator {
    pub fn with_words(first: &[&str], second: &[&str], third: &[&str]) -> Self {
        let owned = |words: &[&str]| words.iter().map(|w| w.to_string()).collect();
        Self {
            first: owned(first),
            second: owned(second),
            third: owned(third),
        }
    }

    /// Number of distinct names this generator can produce.
    pub fn name_space(&self) -> usize {
        [&self.first, &self.second, &self.third]
            .iter()
            .map(|words| words.len().max(1))
            .product()
    }

    pub fn next_name(&self) -> String {
        let mut rng = rand::rng();
        let mut name = String::new();
        for words in [&self.first, &self.second, &self.third] {
            if !words.is_empty() {
                name.push_str(&words[rng.random_range(0..words.len())]);
            }
        }
        name
    }

    /// Endless stream of fresh candidates.
    pub fn candidates(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::repeat_with(|| self.next_name())
    }
}
