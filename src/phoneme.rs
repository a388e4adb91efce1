use crate::error::{Result, SynthesisError, SynthesisErrorDescription};

// ids are indexes into this list; the models were trained on this order
pub const PHONEME_LIST: [&str; 45] = [
    "pau", "A", "E", "I", "N", "O", "U", "a", "b", "by", "ch", "cl", "d", "dy", "e", "f", "g",
    "gw", "gy", "h", "hy", "i", "j", "k", "kw", "ky", "m", "my", "n", "ny", "o", "p", "py", "r",
    "ry", "s", "sh", "t", "ts", "ty", "u", "v", "w", "y", "z",
];

pub const NUM_PHONEME: usize = PHONEME_LIST.len();

pub const SILENCE: &str = "pau";

/// Sentinel spelling produced by some analyzers; rewritten to [`SILENCE`].
const SENTENCE_SILENCE: &str = "sil";

pub const UNVOICED_MORA_PHONEMES: [&str; 7] = ["A", "I", "U", "E", "O", "cl", "pau"];

pub const VOICED_MORA_PHONEMES: [&str; 6] = ["a", "i", "u", "e", "o", "N"];

pub fn id_of(symbol: &str) -> Result<i64> {
    PHONEME_LIST
        .iter()
        .position(|p| *p == symbol)
        .map(|i| i as i64)
        .ok_or_else(|| SynthesisError::new(SynthesisErrorDescription::UnknownSymbol(symbol.to_string())))
}

pub fn symbol_of(id: i64) -> Option<&'static str> {
    usize::try_from(id).ok().and_then(|i| PHONEME_LIST.get(i).copied())
}

pub fn is_vowel(symbol: &str) -> bool {
    VOICED_MORA_PHONEMES.contains(&symbol) || is_unvoiced_vowel(symbol)
}

pub fn is_unvoiced_vowel(symbol: &str) -> bool {
    UNVOICED_MORA_PHONEMES.contains(&symbol)
}

pub fn vowel_kana(symbol: &str) -> Option<&'static str> {
    match symbol {
        "a" => Some("ア"),
        "i" => Some("イ"),
        "u" => Some("ウ"),
        "e" => Some("エ"),
        "o" => Some("オ"),
        "N" => Some("ン"),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phoneme {
    symbol: &'static str,
    id: i64,
    pub start: usize,
    pub end: usize,
}

impl Phoneme {
    pub fn new(symbol: &str, start: usize, end: usize) -> Result<Self> {
        let id = id_of(symbol)?;
        Ok(Self {
            symbol: PHONEME_LIST[id as usize],
            id,
            start,
            end,
        })
    }

    pub fn silence(start: usize) -> Self {
        Self {
            symbol: SILENCE,
            id: 0,
            start,
            end: start + 1,
        }
    }

    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn is_vowel(&self) -> bool {
        is_vowel(self.symbol)
    }

    pub fn is_silence(&self) -> bool {
        self.id == 0
    }

    /// Builds positioned phonemes from symbols, treating a leading or trailing
    /// `sil` as silence.
    pub fn convert(symbols: &[&str]) -> Result<Vec<Phoneme>> {
        let last = symbols.len().saturating_sub(1);
        symbols
            .iter()
            .enumerate()
            .map(|(i, symbol)| {
                let symbol = if (i == 0 || i == last) && symbol.contains(SENTENCE_SILENCE) {
                    SILENCE
                } else {
                    symbol
                };
                Phoneme::new(symbol, i, i + 1)
            })
            .collect()
    }
}

pub fn to_phoneme_id_list(symbols: &[&str]) -> Result<Vec<i64>> {
    Ok(Phoneme::convert(symbols)?.iter().map(Phoneme::id).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_ids() {
        let expected = [
            ("pau", 0), ("N", 4), ("U", 6), ("a", 7), ("ch", 10), ("cl", 11), ("d", 12),
            ("e", 14), ("h", 19), ("i", 21), ("k", 23), ("n", 28), ("o", 30), ("s", 35),
            ("w", 42), ("z", 44),
        ];
        for (symbol, id) in expected {
            assert_eq!(id_of(symbol).unwrap(), id, "symbol {}", symbol);
        }
        assert_eq!(NUM_PHONEME, 45);
    }

    #[test]
    fn test_unknown_symbol() {
        let err = id_of("xx").unwrap_err();
        assert_eq!(err.kind(), &SynthesisErrorDescription::UnknownSymbol("xx".to_string()));
        assert!(Phoneme::new("", 0, 1).is_err());
    }

    #[test]
    fn test_vocab_uniqueness() {
        let mut seen = std::collections::HashSet::new();
        for symbol in PHONEME_LIST {
            assert!(seen.insert(symbol), "duplicate symbol {}", symbol);
        }
    }

    #[test]
    fn test_classification() {
        for symbol in ["a", "i", "u", "e", "o", "N", "A", "cl", "pau"] {
            assert!(is_vowel(symbol), "{}", symbol);
        }
        for symbol in ["k", "ch", "ny", "v"] {
            assert!(!is_vowel(symbol), "{}", symbol);
        }
        assert!(is_unvoiced_vowel("U"));
        assert!(is_unvoiced_vowel("cl"));
        assert!(!is_unvoiced_vowel("u"));
        assert!(UNVOICED_MORA_PHONEMES.iter().all(|s| vowel_kana(s).is_none()));
        assert!(VOICED_MORA_PHONEMES.iter().all(|s| vowel_kana(s).is_some()));
    }

    #[test]
    fn test_sentence_silence_is_rewritten() {
        let symbols = "sil k o N n i ch i w a pau h i h o d e s U sil"
            .split_whitespace()
            .collect::<Vec<_>>();
        let ids = to_phoneme_id_list(&symbols).unwrap();
        assert_eq!(
            ids,
            vec![0, 23, 30, 4, 28, 21, 10, 21, 42, 7, 0, 19, 21, 19, 30, 12, 14, 35, 6, 0]
        );
    }

    #[test]
    fn test_round_trip_symbol() {
        for (i, symbol) in PHONEME_LIST.iter().enumerate() {
            assert_eq!(symbol_of(i as i64), Some(*symbol));
        }
        assert_eq!(symbol_of(-1), None);
        assert_eq!(symbol_of(45), None);
    }
}
