//! Device-related input detection.
//!
//! A device-related message is answered without conversation history so the
//! model checks live state through a tool instead of repeating what it said
//! earlier. The vocabulary is a heuristic and can be replaced from config.

/// Words that mark a message as a device action or status request.
pub const DEFAULT_DEVICE_KEYWORDS: &[&str] = &[
    // Hebrew
    "תדליק",
    "תדליקי",
    "הדלק",
    "תכבה",
    "תכבי",
    "כבה",
    "כבי",
    "מנורה",
    "אור",
    "מזגן",
    "דוד",
    "תריס",
    "טמפרטורה",
    "מעלות",
    "דולק",
    "כבוי",
    "מצב",
    // English
    "turn on",
    "turn off",
    "switch on",
    "switch off",
    "toggle",
    "light",
    "lamp",
    "ac",
    "air conditioner",
    "heater",
    "boiler",
    "blinds",
    "temperature",
    "degrees",
    "brightness",
    "status",
];

/// Matches text against a fixed vocabulary.
#[derive(Debug, Clone)]
pub struct DeviceVocabulary {
    keywords: Vec<String>,
}

impl Default for DeviceVocabulary {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE_KEYWORDS.iter().copied())
    }
}

impl DeviceVocabulary {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Whether `text` mentions any vocabulary entry.
    ///
    /// Single ASCII words must match a whole word ("ac" does not match
    /// "back"); phrases and non-Latin words match as substrings so Hebrew
    /// prefixes ("המנורה") still count.
    pub fn is_device_related(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        self.keywords.iter().any(|keyword| {
            let single_ascii_word =
                keyword.is_ascii() && !keyword.contains(char::is_whitespace);
            if single_ascii_word {
                words.iter().any(|w| w == keyword)
            } else {
                lowered.contains(keyword.as_str())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_vocabulary() {
        let vocab = DeviceVocabulary::default();

        assert!(vocab.is_device_related("תדליקי את המנורה הגדולה בסלון"));
        assert!(vocab.is_device_related("Turn off the kitchen light"));
        assert!(vocab.is_device_related("is the AC on?"));
        assert!(!vocab.is_device_related("tell me a joke"));
        assert!(!vocab.is_device_related("I'll be back soon"));
    }

    #[test]
    fn test_custom_vocabulary() {
        let vocab = DeviceVocabulary::new(["Sprinkler", " ", "garage door"]);
        assert_eq!(vocab.keywords(), ["sprinkler", "garage door"]);
        assert!(vocab.is_device_related("start the sprinkler"));
        assert!(vocab.is_device_related("close the Garage Door"));
        assert!(!vocab.is_device_related("turn on the light"));
    }
}
