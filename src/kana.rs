use crate::phoneme;
use crate::types::AccentPhrase;

const ACCENT_SYMBOL: char = '\'';
const DEVOICED_SYMBOL: char = '_';
const INTERROGATIVE_SYMBOL: char = '？';
const PAUSE_DELIMITER: char = '、';
const NOPAUSE_DELIMITER: char = '/';

pub fn create_kana(accent_phrases: &[AccentPhrase]) -> String {
    let mut text = String::new();
    for (i, phrase) in accent_phrases.iter().enumerate() {
        for (j, mora) in phrase.moras.iter().enumerate() {
            if phoneme::is_unvoiced_vowel(&mora.vowel) && mora.vowel.len() == 1 {
                text.push(DEVOICED_SYMBOL);
            }
            text.push_str(&mora.text);
            if j + 1 == phrase.accent {
                text.push(ACCENT_SYMBOL);
            }
        }
        if phrase.is_interrogative {
            text.push(INTERROGATIVE_SYMBOL);
        }
        if i + 1 < accent_phrases.len() {
            text.push(if phrase.pause_mora.is_some() {
                PAUSE_DELIMITER
            } else {
                NOPAUSE_DELIMITER
            });
        }
    }
    text
}
