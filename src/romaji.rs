//! Romanizer: kana → Latin transliteration
//!
//! `HepburnRomanizer` implements modified Hepburn without macrons: long vowels
//! written with ー repeat the vowel (トーキョー → tookyoo), っ doubles the next
//! consonant (マッチャ → matcha), ん before a vowel or y is written `n'`.
//! Characters that are not kana pass through unchanged.

/// Kana → Latin capability
pub trait Romanizer {
    fn romanize(&self, kana: &str) -> String;
}

impl<T: Romanizer + ?Sized> Romanizer for Box<T> {
    fn romanize(&self, kana: &str) -> String {
        (**self).romanize(kana)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HepburnRomanizer;

impl HepburnRomanizer {
    pub fn new() -> Self {
        Self
    }
}

impl Romanizer for HepburnRomanizer {
    fn romanize(&self, kana: &str) -> String {
        assemble(&split(kana))
    }
}

// =============================================================================
// Syllable table
// =============================================================================

fn base_romaji(ch: char) -> Option<&'static str> {
    let romaji = match ch {
        'あ' => "a", 'い' => "i", 'う' => "u", 'え' => "e", 'お' => "o",
        'か' => "ka", 'き' => "ki", 'く' => "ku", 'け' => "ke", 'こ' => "ko",
        'が' => "ga", 'ぎ' => "gi", 'ぐ' => "gu", 'げ' => "ge", 'ご' => "go",
        'さ' => "sa", 'し' => "shi", 'す' => "su", 'せ' => "se", 'そ' => "so",
        'ざ' => "za", 'じ' => "ji", 'ず' => "zu", 'ぜ' => "ze", 'ぞ' => "zo",
        'た' => "ta", 'ち' => "chi", 'つ' => "tsu", 'て' => "te", 'と' => "to",
        'だ' => "da", 'ぢ' => "ji", 'づ' => "zu", 'で' => "de", 'ど' => "do",
        'な' => "na", 'に' => "ni", 'ぬ' => "nu", 'ね' => "ne", 'の' => "no",
        'は' => "ha", 'ひ' => "hi", 'ふ' => "fu", 'へ' => "he", 'ほ' => "ho",
        'ば' => "ba", 'び' => "bi", 'ぶ' => "bu", 'べ' => "be", 'ぼ' => "bo",
        'ぱ' => "pa", 'ぴ' => "pi", 'ぷ' => "pu", 'ぺ' => "pe", 'ぽ' => "po",
        'ま' => "ma", 'み' => "mi", 'む' => "mu", 'め' => "me", 'も' => "mo",
        'や' => "ya", 'ゆ' => "yu", 'よ' => "yo",
        'ら' => "ra", 'り' => "ri", 'る' => "ru", 'れ' => "re", 'ろ' => "ro",
        'わ' => "wa", 'ゐ' => "i", 'ゑ' => "e", 'を' => "o",
        'ゔ' => "vu",
        'ぁ' => "a", 'ぃ' => "i", 'ぅ' => "u", 'ぇ' => "e", 'ぉ' => "o",
        'ゃ' => "ya", 'ゅ' => "yu", 'ょ' => "yo", 'ゎ' => "wa",
        'ゕ' => "ka", 'ゖ' => "ke",
        _ => return None,
    };
    Some(romaji)
}

/// Katakana → hiragana so one table covers both
fn to_hiragana(ch: char) -> char {
    match ch {
        '\u{30A1}'..='\u{30F6}' => char::from_u32(ch as u32 - 0x60).unwrap_or(ch),
        _ => ch,
    }
}

fn is_vowel(ch: char) -> bool {
    matches!(ch, 'a' | 'i' | 'u' | 'e' | 'o')
}

fn yoon_vowel(ch: char) -> Option<char> {
    match ch {
        'ゃ' => Some('a'),
        'ゅ' => Some('u'),
        'ょ' => Some('o'),
        _ => None,
    }
}

fn small_vowel(ch: char) -> Option<char> {
    match ch {
        'ぁ' => Some('a'),
        'ぃ' => Some('i'),
        'ぅ' => Some('u'),
        'ぇ' => Some('e'),
        'ぉ' => Some('o'),
        _ => None,
    }
}

/// Consonant stem a following small kana attaches to
fn stem(base: &str) -> String {
    match base {
        "shi" | "chi" | "ji" => base[..base.len() - 1].to_string(),
        "fu" => "f".to_string(),
        "vu" => "v".to_string(),
        "tsu" => "ts".to_string(),
        "u" => "w".to_string(),
        "i" => "y".to_string(),
        _ => base[..base.len() - 1].to_string(),
    }
}

// =============================================================================
// Split + assemble
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Piece {
    Syllable(String),
    Sokuon,
    LongMark,
    Nasal,
    Other(char),
}

fn split(text: &str) -> Vec<Piece> {
    let chars: Vec<char> = text.chars().map(to_hiragana).collect();
    let mut pieces = Vec::with_capacity(chars.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let piece = match ch {
            'っ' => Piece::Sokuon,
            'ー' => Piece::LongMark,
            'ん' => Piece::Nasal,
            _ => match base_romaji(ch) {
                Some(base) => {
                    let next = chars.get(i + 1).copied();
                    let is_i_row = base.len() > 1 && base.ends_with('i');
                    if let Some(v) = next.and_then(yoon_vowel).filter(|_| is_i_row) {
                        i += 1;
                        match base {
                            "shi" | "chi" | "ji" => Piece::Syllable(format!("{}{}", stem(base), v)),
                            _ => Piece::Syllable(format!("{}y{}", stem(base), v)),
                        }
                    } else if let Some(v) = next.and_then(small_vowel).filter(|_| base.len() > 1 || base == "u" || base == "i") {
                        i += 1;
                        Piece::Syllable(format!("{}{}", stem(base), v))
                    } else {
                        Piece::Syllable(base.to_string())
                    }
                }
                None => Piece::Other(ch),
            },
        };
        pieces.push(piece);
        i += 1;
    }
    pieces
}

fn assemble(pieces: &[Piece]) -> String {
    let mut out = String::new();
    for (idx, piece) in pieces.iter().enumerate() {
        let next = match pieces.get(idx + 1) {
            Some(Piece::Syllable(s)) => Some(s.as_str()),
            _ => None,
        };
        match piece {
            Piece::Syllable(s) => out.push_str(s),
            Piece::Sokuon => {
                if let Some(next) = next {
                    if next.starts_with("ch") {
                        out.push('t');
                    } else if let Some(c) = next.chars().next().filter(|c| !is_vowel(*c)) {
                        out.push(c);
                    }
                }
            }
            Piece::Nasal => {
                out.push('n');
                if next.and_then(|s| s.chars().next()).is_some_and(|c| is_vowel(c) || c == 'y') {
                    out.push('\'');
                }
            }
            Piece::LongMark => {
                if let Some(v) = out.chars().last().filter(|c| is_vowel(*c)) {
                    out.push(v);
                }
            }
            Piece::Other(ch) => out.push(*ch),
        }
    }
    out
}

// =============================================================================
// Tests
// =============================================================================
