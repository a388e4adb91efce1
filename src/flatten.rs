use crate::accent::{self, AccentCode};
use crate::error::Result;
use crate::phoneme::Phoneme;
use crate::types::{AccentPhrase, Mora};

#[derive(Debug, Clone, PartialEq)]
pub struct FlatSequence {
    pub moras: Vec<Mora>,
    /// Phonemes with a leading and trailing silence sentinel.
    pub phonemes: Vec<Phoneme>,
    pub accent_codes: Vec<AccentCode>,
}

impl FlatSequence {
    pub fn len(&self) -> usize {
        self.phonemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moras.is_empty()
    }

    pub fn phoneme_ids(&self) -> Vec<i64> {
        self.phonemes.iter().map(Phoneme::id).collect()
    }

    pub fn accent_ids(&self) -> Vec<i64> {
        accent::to_accent_id_list(&self.accent_codes)
    }

    pub fn split(&self) -> MoraSplit {
        split_mora(&self.phonemes)
    }
}

pub fn flatten_moras(accent_phrases: &[AccentPhrase]) -> Vec<Mora> {
    accent_phrases
        .iter()
        .flat_map(AccentPhrase::moras_with_pause)
        .cloned()
        .collect()
}

fn mora_symbols(moras: &[Mora]) -> impl Iterator<Item = &str> {
    moras
        .iter()
        .flat_map(|mora| mora.consonant.as_deref().into_iter().chain(std::iter::once(mora.vowel.as_str())))
}

pub fn to_phonemes(moras: &[Mora]) -> Result<Vec<Phoneme>> {
    let mut phonemes = vec![Phoneme::silence(0)];
    for symbol in mora_symbols(moras) {
        let position = phonemes.len();
        phonemes.push(Phoneme::new(symbol, position, position + 1)?);
    }
    phonemes.push(Phoneme::silence(phonemes.len()));
    Ok(phonemes)
}

pub fn pre_process(accent_phrases: &[AccentPhrase]) -> Result<FlatSequence> {
    let moras = flatten_moras(accent_phrases);
    let phonemes = to_phonemes(&moras)?;
    let accent_codes = accent::encode(accent_phrases);
    debug_assert_eq!(phonemes.len(), accent_codes.len());

    log::debug!("Flattened {} moras into {} phonemes", moras.len(), phonemes.len());

    Ok(FlatSequence {
        moras,
        phonemes,
        accent_codes,
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoraSplit {
    pub consonant_indexes: Vec<Option<usize>>,
    pub vowel_indexes: Vec<usize>,
}

impl MoraSplit {
    pub fn consonants<'a>(&self, phonemes: &'a [Phoneme]) -> Vec<Option<&'a Phoneme>> {
        self.consonant_indexes.iter().map(|i| i.map(|i| &phonemes[i])).collect()
    }

    pub fn vowels<'a>(&self, phonemes: &'a [Phoneme]) -> Vec<&'a Phoneme> {
        self.vowel_indexes.iter().map(|&i| &phonemes[i]).collect()
    }

    pub fn is_vowel_index(&self, index: usize) -> bool {
        self.vowel_indexes.binary_search(&index).is_ok()
    }
}

/// Inverse of the flattening: a mora is a vowel optionally preceded by one
/// consonant, so consecutive vowel indexes differ by one or two.
pub fn split_mora(phonemes: &[Phoneme]) -> MoraSplit {
    let vowel_indexes = phonemes
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_vowel())
        .map(|(i, _)| i)
        .collect::<Vec<_>>();

    let consonant_indexes = std::iter::once(None)
        .chain(vowel_indexes.windows(2).map(|pair| {
            let (prev, post) = (pair[0], pair[1]);
            if post - prev == 1 {
                None
            } else {
                Some(post - 1)
            }
        }))
        .take(vowel_indexes.len())
        .collect();

    MoraSplit {
        consonant_indexes,
        vowel_indexes,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::types::Mora;

    pub(crate) fn hello_hiho() -> Vec<AccentPhrase> {
        vec![
            AccentPhrase::new(
                vec![
                    Mora::new("コ", Some("k"), "o"),
                    Mora::new("ン", None, "N"),
                    Mora::new("ニ", Some("n"), "i"),
                    Mora::new("チ", Some("ch"), "i"),
                    Mora::new("ワ", Some("w"), "a"),
                ],
                5,
            )
            .with_pause(Mora::pause()),
            AccentPhrase::new(
                vec![
                    Mora::new("ヒ", Some("h"), "i"),
                    Mora::new("ホ", Some("h"), "o"),
                    Mora::new("デ", Some("d"), "e"),
                    Mora::new("ス", Some("s"), "U"),
                ],
                1,
            ),
        ]
    }

    fn hello_hiho_phonemes() -> Vec<Phoneme> {
        let symbols = "pau k o N n i ch i w a pau h i h o d e s U pau"
            .split_whitespace()
            .collect::<Vec<_>>();
        Phoneme::convert(&symbols).unwrap()
    }

    #[test]
    fn test_flatten_moras_interleaves_pause() {
        let phrases = hello_hiho();
        let flat = flatten_moras(&phrases);
        let mut expected = phrases[0].moras.clone();
        expected.push(Mora::pause());
        expected.extend(phrases[1].moras.iter().cloned());
        assert_eq!(flat, expected);
    }

    #[test]
    fn test_pre_process_phoneme_ids() {
        let flat = pre_process(&hello_hiho()).unwrap();
        assert_eq!(
            flat.phoneme_ids(),
            vec![0, 23, 30, 4, 28, 21, 10, 21, 42, 7, 0, 19, 21, 19, 30, 12, 14, 35, 6, 0]
        );
        assert_eq!(flat.phonemes, hello_hiho_phonemes());
        assert_eq!(flat.len(), flat.accent_ids().len());
    }

    #[test]
    fn test_phoneme_count_matches_moras() {
        let flat = pre_process(&hello_hiho()).unwrap();
        let expected = 2 + flat
            .moras
            .iter()
            .map(|m| if m.consonant.is_some() { 2 } else { 1 })
            .sum::<usize>();
        assert_eq!(flat.len(), expected);
    }

    #[test]
    fn test_unknown_symbol_fails() {
        let phrases = vec![AccentPhrase::new(vec![Mora::new("?", Some("qq"), "a")], 1)];
        assert!(pre_process(&phrases).is_err());
    }

    #[test]
    fn test_split_mora_fixture() {
        let phonemes = hello_hiho_phonemes();
        let split = split_mora(&phonemes);
        assert_eq!(split.vowel_indexes, vec![0, 2, 3, 5, 7, 9, 10, 12, 14, 16, 18, 19]);
        assert_eq!(
            split.consonant_indexes,
            vec![None, Some(1), None, Some(4), Some(6), Some(8), None, Some(11), Some(13), Some(15), Some(17), None]
        );
        let vowels = split.vowels(&phonemes).iter().map(|p| p.symbol()).collect::<Vec<_>>();
        assert_eq!(vowels, vec!["pau", "o", "N", "i", "i", "a", "pau", "i", "o", "e", "U", "pau"]);
        let consonants = split
            .consonants(&phonemes)
            .iter()
            .map(|p| p.map(|p| p.symbol()))
            .collect::<Vec<_>>();
        assert_eq!(
            consonants,
            vec![None, Some("k"), None, Some("n"), Some("ch"), Some("w"), None, Some("h"), Some("h"), Some("d"), Some("s"), None]
        );
    }

    #[test]
    fn test_split_mora_reconstructs_sequence() {
        let phonemes = hello_hiho_phonemes();
        let split = split_mora(&phonemes);
        let rebuilt = split
            .consonant_indexes
            .iter()
            .zip(&split.vowel_indexes)
            .flat_map(|(c, v)| c.iter().copied().chain(std::iter::once(*v)))
            .map(|i| phonemes[i].id())
            .collect::<Vec<_>>();
        assert_eq!(rebuilt, phonemes.iter().map(Phoneme::id).collect::<Vec<_>>());
    }

    #[test]
    fn test_split_mora_empty() {
        let split = split_mora(&[]);
        assert!(split.vowel_indexes.is_empty());
        assert!(split.consonant_indexes.is_empty());
    }
}
