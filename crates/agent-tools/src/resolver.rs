//! Entity resolution: natural-language device references to canonical ids.
//!
//! A reference such as "the big lamp in the living room" is matched against
//! stored [`DeviceMapping`]s in stages, each tried only when the previous one
//! found nothing:
//!
//! 1. the reference is a substring of a nickname or entity id;
//! 2. every word of the reference (two characters or more) appears in the
//!    nickname or entity id;
//! 3. every word of the nickname appears in the reference, which handles
//!    whole sentences like "turn on the big lamp in the living room".
//!
//! When the reference names any known location, only candidates in that
//! location survive, and an empty result is not found. The longest nickname
//! wins.

use std::cmp::Reverse;

use database::DeviceMapping;

use crate::error::ToolError;

/// Whether `reference` should be used as an entity id without lookup.
///
/// Canonical ids contain a namespace separator and consist only of
/// lowercase ASCII letters, digits and ASCII punctuation.
pub fn is_canonical_id(reference: &str) -> bool {
    reference.contains('.')
        && reference.chars().all(|c| {
            c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_ascii_punctuation()
        })
}

/// Resolve a device reference to an entity id.
pub fn resolve(reference: &str, mappings: &[DeviceMapping]) -> Result<String, ToolError> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(ToolError::MissingParameter("device".to_string()));
    }
    if is_canonical_id(reference) {
        return Ok(reference.to_string());
    }

    let needle = reference.to_lowercase();
    let candidates = candidates(&needle, mappings);

    let narrowed = narrow_by_location(&needle, mappings, candidates);

    narrowed
        .into_iter()
        .min_by_key(|m| Reverse(m.nickname.chars().count()))
        .map(|m| m.entity_id.clone())
        .ok_or_else(|| ToolError::EntityNotFound(reference.to_string()))
}

fn candidates<'a>(needle: &str, mappings: &'a [DeviceMapping]) -> Vec<&'a DeviceMapping> {
    let fields = |m: &DeviceMapping| (m.nickname.to_lowercase(), m.entity_id.to_lowercase());

    let direct: Vec<_> = mappings
        .iter()
        .filter(|m| {
            let (nickname, id) = fields(m);
            nickname.contains(needle) || id.contains(needle)
        })
        .collect();
    if !direct.is_empty() {
        return direct;
    }

    let words: Vec<&str> = needle
        .split_whitespace()
        .filter(|w| w.chars().count() >= 2)
        .collect();
    if !words.is_empty() {
        let all_words: Vec<_> = mappings
            .iter()
            .filter(|m| {
                let (nickname, id) = fields(m);
                words
                    .iter()
                    .all(|w| nickname.contains(w) || id.contains(w))
            })
            .collect();
        if !all_words.is_empty() {
            return all_words;
        }
    }

    mappings
        .iter()
        .filter(|m| {
            let nickname = m.nickname.to_lowercase();
            let mut nickname_words = nickname.split_whitespace().peekable();
            nickname_words.peek().is_some() && nickname_words.all(|w| mentions(needle, w))
        })
        .collect()
}

/// Whether `text` mentions `term`.
///
/// Single ASCII words must match a whole word ("ac" is not in "back").
/// Phrases and non-Latin words match as substrings so Hebrew prefixes
/// ("בסלון") still count.
fn mentions(text: &str, term: &str) -> bool {
    if term.is_ascii() && !term.contains(char::is_whitespace) {
        text.split(|c: char| !c.is_alphanumeric())
            .any(|w| w == term)
    } else {
        text.contains(term)
    }
}

fn narrow_by_location<'a>(
    needle: &str,
    mappings: &[DeviceMapping],
    candidates: Vec<&'a DeviceMapping>,
) -> Vec<&'a DeviceMapping> {
    let mut named: Vec<String> = mappings
        .iter()
        .map(|m| m.location.trim().to_lowercase())
        .filter(|location| !location.is_empty() && mentions(needle, location))
        .collect();
    named.sort();
    named.dedup();

    if named.is_empty() {
        return candidates;
    }

    candidates
        .into_iter()
        .filter(|m| {
            let location = m.location.trim().to_lowercase();
            let nickname = m.nickname.to_lowercase();
            named
                .iter()
                .any(|n| *n == location || mentions(&nickname, n))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(entity_id: &str, nickname: &str, location: &str) -> DeviceMapping {
        DeviceMapping {
            id: 0,
            entity_id: entity_id.to_string(),
            nickname: nickname.to_string(),
            location: location.to_string(),
            category: String::new(),
            created_at: String::new(),
        }
    }

    fn living_room_lamps() -> Vec<DeviceMapping> {
        vec![
            mapping("light.a", "מנורה", "סלון"),
            mapping("light.b", "מנורה גדולה", "סלון"),
        ]
    }

    #[test]
    fn test_canonical_ids() {
        assert!(is_canonical_id("light.living_room"));
        assert!(is_canonical_id("switch.boiler-2"));
        assert!(!is_canonical_id("living room"));
        assert!(!is_canonical_id("light.big lamp"));
        assert!(!is_canonical_id("Light.Lamp"));
        assert!(!is_canonical_id("מנורה.גדולה"));
    }

    #[test]
    fn test_canonical_id_passes_through() {
        assert_eq!(resolve("light.kitchen", &[]).unwrap(), "light.kitchen");
    }

    #[test]
    fn test_sentence_resolves_to_longest_nickname() {
        let mappings = living_room_lamps();
        assert_eq!(
            resolve("תדליקי את המנורה הגדולה בסלון", &mappings).unwrap(),
            "light.b"
        );
    }

    #[test]
    fn test_substring_match_prefers_longer_nickname() {
        let mappings = living_room_lamps();
        assert_eq!(resolve("מנורה", &mappings).unwrap(), "light.b");
        assert_eq!(resolve("גדולה", &mappings).unwrap(), "light.b");
    }

    #[test]
    fn test_all_words_match() {
        let mappings = vec![
            mapping("light.desk", "Desk Lamp Office", "office"),
            mapping("light.floor", "Floor Lamp", "bedroom"),
        ];
        assert_eq!(resolve("lamp desk", &mappings).unwrap(), "light.desk");
    }

    #[test]
    fn test_location_narrows_candidates() {
        let mappings = vec![
            mapping("light.kitchen_lamp", "lamp", "kitchen"),
            mapping("light.bedroom_lamp", "lamp light", "bedroom"),
        ];
        // Without a location the longer nickname wins
        assert_eq!(resolve("lamp", &mappings).unwrap(), "light.bedroom_lamp");
        // A named location overrides nickname length
        assert_eq!(
            resolve("turn on the lamp in the kitchen", &mappings).unwrap(),
            "light.kitchen_lamp"
        );
    }

    #[test]
    fn test_named_location_without_match_is_not_found() {
        let mappings = vec![
            mapping("light.bedroom_lamp", "lamp", "bedroom"),
            mapping("switch.kettle", "kettle", "kitchen"),
        ];
        assert_eq!(
            resolve("turn on the lamp", &mappings).unwrap(),
            "light.bedroom_lamp"
        );
        let err = resolve("turn on the lamp in the kitchen", &mappings).unwrap_err();
        assert!(matches!(err, ToolError::EntityNotFound(_)));
    }

    #[test]
    fn test_location_in_nickname_counts() {
        let mappings = vec![
            mapping("light.kitchen", "kitchen light", ""),
            mapping("switch.kettle", "kettle", "kitchen"),
        ];
        assert_eq!(
            resolve("switch on the kitchen light please", &mappings).unwrap(),
            "light.kitchen"
        );
    }

    #[test]
    fn test_short_nickname_needs_whole_word() {
        let mappings = vec![
            mapping("climate.ac", "AC", "bedroom"),
            mapping("light.desk", "Desk Lamp", "office"),
        ];
        let err = resolve("the lamp in the back room", &mappings).unwrap_err();
        assert!(matches!(err, ToolError::EntityNotFound(_)));
        assert_eq!(
            resolve("is the ac on in here", &mappings).unwrap(),
            "climate.ac"
        );
    }

    #[test]
    fn test_case_insensitive() {
        let mappings = vec![mapping("fan.ceiling", "Ceiling Fan", "bedroom")];
        assert_eq!(resolve("ceiling FAN", &mappings).unwrap(), "fan.ceiling");
    }

    #[test]
    fn test_not_found_points_to_listing() {
        let err = resolve("toaster", &living_room_lamps()).unwrap_err();
        assert!(matches!(err, ToolError::EntityNotFound(_)));
        assert!(err.to_string().contains("list_devices"));
    }
}
