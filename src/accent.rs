use crate::types::AccentPhrase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i64)]
pub enum AccentCode {
    /// `[`: first mora of a phrase whose nucleus lies elsewhere.
    PhraseStart = 0,
    /// `]`: mora after which the pitch falls.
    Nucleus = 1,
    /// `#`: sentence sentinel or end of a declarative phrase.
    Boundary = 2,
    /// `?`: end of an interrogative phrase.
    Interrogative = 3,
    /// `_`: everything else, consonant slots included.
    Other = 4,
}

impl AccentCode {
    pub fn id(self) -> i64 {
        self as i64
    }

    pub fn symbol(self) -> char {
        match self {
            Self::PhraseStart => '[',
            Self::Nucleus => ']',
            Self::Boundary => '#',
            Self::Interrogative => '?',
            Self::Other => '_',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '[' => Some(Self::PhraseStart),
            ']' => Some(Self::Nucleus),
            '#' => Some(Self::Boundary),
            '?' => Some(Self::Interrogative),
            '_' => Some(Self::Other),
            _ => None,
        }
    }
}

fn encode_phrase(phrase: &AccentPhrase, codes: &mut Vec<AccentCode>) {
    let first = codes.len();
    let mora_count = phrase.moras.len();
    for (i, mora) in phrase.moras.iter().enumerate() {
        if mora.consonant.is_some() {
            codes.push(AccentCode::Other);
        }
        let code = if i + 1 == phrase.accent && mora_count != phrase.accent {
            AccentCode::Nucleus
        } else if i == 0 {
            AccentCode::PhraseStart
        } else {
            AccentCode::Other
        };
        codes.push(code);
    }
    if phrase.pause_mora.is_some() {
        codes.push(AccentCode::Other);
    }
    if codes.len() > first {
        let last = codes.len() - 1;
        codes[last] = if phrase.is_interrogative {
            AccentCode::Interrogative
        } else {
            AccentCode::Boundary
        };
    }
}

pub fn encode(accent_phrases: &[AccentPhrase]) -> Vec<AccentCode> {
    let mut codes = vec![AccentCode::Boundary];
    for phrase in accent_phrases {
        encode_phrase(phrase, &mut codes);
    }
    codes.push(AccentCode::Boundary);
    codes
}

pub fn to_accent_id_list(codes: &[AccentCode]) -> Vec<i64> {
    codes.iter().map(|code| code.id()).collect()
}
