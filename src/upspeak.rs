use crate::phoneme;
use crate::types::{AccentPhrase, Mora};

const VOWEL_EXTENSION: f64 = 0.5;
const UPSPEAK_VOWEL_LENGTH: f64 = 0.15;
const UPSPEAK_PITCH_STEP: f64 = 0.3;
const UPSPEAK_MAX_PITCH: f64 = 6.5;

fn extendable_kana(mora: &Mora) -> Option<&'static str> {
    if phoneme::is_unvoiced_vowel(&mora.vowel) {
        None
    } else {
        phoneme::vowel_kana(&mora.vowel)
    }
}

fn make_interrogative_mora(last: &Mora, text: &str) -> Mora {
    Mora {
        text: text.to_string(),
        vowel: last.vowel.clone(),
        vowel_length: UPSPEAK_VOWEL_LENGTH,
        pitch: (last.pitch + UPSPEAK_PITCH_STEP).min(UPSPEAK_MAX_PITCH),
        consonant: None,
        consonant_length: None,
    }
}

/// Only the last phrase is inspected. Must run after prediction.
pub fn apply_interrogative_upspeak(accent_phrases: &[AccentPhrase]) -> Vec<AccentPhrase> {
    let mut accent_phrases = accent_phrases.to_vec();

    let Some(phrase) = accent_phrases.last_mut() else {
        return accent_phrases;
    };
    if !phrase.is_interrogative {
        return accent_phrases;
    }
    let Some(last) = phrase.moras.last_mut() else {
        return accent_phrases;
    };

    last.vowel_length += VOWEL_EXTENSION;

    if let Some(text) = extendable_kana(last) {
        let mora = make_interrogative_mora(last, text);
        log::debug!("Appending upspeak mora {:?} (pitch {})", mora.text, mora.pitch);
        phrase.moras.push(mora);
    }

    accent_phrases
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mora(text: &str, consonant: Option<&str>, vowel: &str, length: f64, pitch: f64) -> Mora {
        let mut mora = Mora::new(text, consonant, vowel);
        mora.vowel_length = length;
        mora.pitch = pitch;
        if consonant.is_some() {
            mora.consonant_length = Some(3.0);
        }
        mora
    }

    fn koreha_arimasuka() -> Vec<AccentPhrase> {
        vec![
            AccentPhrase::new(
                vec![
                    mora("コ", Some("k"), "o", 1.0, 16.0),
                    mora("レ", Some("r"), "e", 3.0, 8.0),
                    mora("ワ", Some("w"), "a", 2.0, 4.5),
                ],
                3,
            ),
            AccentPhrase::new(
                vec![
                    mora("ア", None, "a", 1.0, 4.5),
                    mora("リ", Some("r"), "i", 3.0, 11.5),
                    mora("マ", Some("m"), "a", 1.5, 4.5),
                    mora("ス", Some("s"), "U", 3.0, 0.0),
                    mora("カ", Some("k"), "a", 2.0, 4.5),
                ],
                3,
            )
            .interrogative(true),
        ]
    }

    #[test]
    fn test_extendable_vowel_gets_new_mora() {
        let result = apply_interrogative_upspeak(&koreha_arimasuka());
        let moras = &result[1].moras;
        assert_eq!(moras.len(), 6);
        assert_eq!(moras[4].vowel_length, 2.5);
        let added = &moras[5];
        assert_eq!(added.text, "ア");
        assert_eq!(added.vowel, "a");
        assert_eq!(added.vowel_length, 0.15);
        assert!((added.pitch - 4.8).abs() < 1e-9);
        assert!(added.consonant.is_none());
        assert!(added.consonant_length.is_none());
        assert_eq!(result[0], koreha_arimasuka()[0]);
    }

    #[test]
    fn test_glottal_stop_is_not_extended() {
        let phrases = vec![AccentPhrase::new(vec![mora("ッ", None, "cl", 2.0, 0.0)], 1).interrogative(true)];
        let result = apply_interrogative_upspeak(&phrases);
        assert_eq!(result[0].moras.len(), 1);
        assert_eq!(result[0].moras[0].vowel_length, 2.5);
    }

    #[test]
    fn test_pitch_is_capped() {
        let phrases = vec![AccentPhrase::new(vec![mora("ス", Some("s"), "u", 2.0, 21.0)], 1).interrogative(true)];
        let result = apply_interrogative_upspeak(&phrases);
        let added = &result[0].moras[1];
        assert_eq!(added.text, "ウ");
        assert_eq!(added.pitch, 6.5);
    }

    #[test]
    fn test_moraic_nasal() {
        let phrases = vec![AccentPhrase::new(vec![mora("ン", None, "N", 2.0, 3.0)], 1).interrogative(true)];
        let result = apply_interrogative_upspeak(&phrases);
        assert_eq!(result[0].moras[1].text, "ン");
        assert!((result[0].moras[1].pitch - 3.3).abs() < 1e-9);
    }

    #[test]
    fn test_declarative_is_untouched() {
        let mut phrases = koreha_arimasuka();
        phrases[1].is_interrogative = false;
        assert_eq!(apply_interrogative_upspeak(&phrases), phrases);
        assert!(apply_interrogative_upspeak(&[]).is_empty());
    }

    #[test]
    fn test_input_is_not_mutated() {
        let phrases = koreha_arimasuka();
        let _ = apply_interrogative_upspeak(&phrases);
        assert_eq!(phrases, koreha_arimasuka());
    }
}
