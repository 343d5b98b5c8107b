//! Script-density heuristic deciding which articles go to the translator.

/// Signature of a pluggable classifier.
pub type Classifier = fn(&str) -> bool;

fn is_japanese(c: char) -> bool {
    matches!(c, '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' | '\u{4E00}'..='\u{9FAF}')
}

/// True when `text` reads as English: no kana or kanji at all and more than
/// half of its code points are ASCII letters.
///
/// Text with more than 10% Japanese characters is never a candidate. Mixed or
/// non-Latin text falls through both checks and is left alone.
pub fn is_translation_candidate(text: &str) -> bool {
    let length = text.chars().count();
    if length == 0 {
        return false;
    }

    let japanese = text.chars().filter(|c| is_japanese(*c)).count();
    if japanese * 10 > length {
        return false;
    }

    let ascii_letters = text.chars().filter(|c| c.is_ascii_alphabetic()).count();
    japanese == 0 && ascii_letters * 2 > length
}
