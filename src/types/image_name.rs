// ABOUTME: Generated, human-readable image names used as build tags.
// ABOUTME: Produces names like "brave_hopper_3f9a" from a random UUID.

use std::fmt;
use thiserror::Error;
use uuid::Uuid;

const ADJECTIVES: &[&str] = &[
    "admiring", "adoring", "affectionate", "amazing", "awesome", "blissful", "bold", "brave",
    "charming", "clever", "compassionate", "competent", "confident", "cranky", "dazzling",
    "determined", "dreamy", "eager", "ecstatic", "elastic", "elegant", "eloquent", "epic",
    "exciting", "fervent", "festive", "flamboyant", "focused", "friendly", "frosty", "funny",
    "gallant", "gifted", "goofy", "gracious", "great", "happy", "hardcore", "heuristic",
    "hopeful", "hungry", "infallible", "inspiring", "intelligent", "interesting", "jolly",
    "jovial", "keen", "kind", "laughing", "loving", "lucid", "magical", "modest", "musing",
    "mystifying", "nervous", "nice", "nifty", "nostalgic", "objective", "optimistic",
    "peaceful", "pedantic", "pensive", "practical", "priceless", "quirky", "quizzical",
    "relaxed", "reverent", "romantic", "serene", "sharp", "silly", "sleepy", "stoic",
    "strange", "stupefied", "suspicious", "sweet", "tender", "thirsty", "trusting",
    "unruffled", "upbeat", "vibrant", "vigilant", "vigorous", "wizardly", "wonderful",
    "xenodochial", "youthful", "zealous", "zen",
];

const SURNAMES: &[&str] = &[
    "agnesi", "albattani", "allen", "almeida", "archimedes", "ardinghelli", "babbage",
    "banach", "bardeen", "bartik", "bell", "bhabha", "blackwell", "bohr", "booth", "borg",
    "bose", "brahmagupta", "brattain", "brown", "carson", "cerf", "chandrasekhar", "clarke",
    "curie", "darwin", "davinci", "dijkstra", "dubinsky", "easley", "einstein", "elion",
    "engelbart", "euclid", "euler", "fermat", "fermi", "feynman", "franklin", "galileo",
    "gates", "goldberg", "goldstine", "goodall", "hamilton", "hawking", "heisenberg",
    "hermann", "hodgkin", "hoover", "hopper", "hugle", "hypatia", "jang", "jennings",
    "johnson", "joliot", "kalam", "kepler", "khorana", "kilby", "knuth", "lalande",
    "lamarr", "lamport", "leakey", "leavitt", "lovelace", "lumiere", "mayer", "mccarthy",
    "mcclintock", "meitner", "mendel", "minsky", "mirzakhani", "morse", "napier", "newton",
    "nobel", "noether", "pare", "pascal", "pasteur", "perlman", "pike", "poincare", "ptolemy",
    "raman", "ride", "ritchie", "rosalind", "sammet", "shannon", "shockley", "sinoussi",
    "stonebraker", "swartz", "tesla", "thompson", "torvalds", "turing", "varahamihira",
    "visvesvaraya", "wescoff", "williams", "wilson", "wing", "wozniak", "wright", "yalow",
    "yonath",
];

#[derive(Debug, Error)]
pub enum ImageNameError {
    #[error("image name cannot be empty")]
    Empty,

    #[error("invalid character in image name: '{0}'")]
    InvalidChar(char),
}

/// A lowercase image tag naming one deploy attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageName(String);

impl ImageName {
    /// Generate a fresh random name.
    pub fn generate() -> Self {
        let bytes = *Uuid::new_v4().as_bytes();
        let adjective = ADJECTIVES[usize::from(bytes[0]) % ADJECTIVES.len()];
        let surname = SURNAMES[usize::from(bytes[1]) % SURNAMES.len()];
        Self(format!(
            "{}_{}_{:02x}{:02x}",
            adjective, surname, bytes[2], bytes[3]
        ))
    }

    /// Accept an existing name, checking it is usable as an image tag.
    pub fn new(value: &str) -> Result<Self, ImageNameError> {
        if value.is_empty() {
            return Err(ImageNameError::Empty);
        }

        for c in value.chars() {
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '_' && c != '-' && c != '.'
            {
                return Err(ImageNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_names_are_valid_tags() {
        for _ in 0..100 {
            let name = ImageName::generate();
            assert!(ImageName::new(name.as_str()).is_ok(), "bad name: {name}");
            assert_eq!(name.as_str().split('_').count(), 3);
        }
    }

    #[test]
    fn generated_names_rarely_repeat() {
        let names: HashSet<_> = (0..200).map(|_| ImageName::generate()).collect();
        assert!(names.len() > 190, "too many collisions: {}", names.len());
    }

    #[test]
    fn rejects_uppercase() {
        assert!(matches!(
            ImageName::new("Brave_turing"),
            Err(ImageNameError::InvalidChar('B'))
        ));
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(ImageName::new(""), Err(ImageNameError::Empty)));
    }
}
