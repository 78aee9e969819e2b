use crate::expand::Word;

/// One byte per word, in address order. Input is already validated.
pub fn encode_words(words: &[Word]) -> Vec<u8> {
    words.iter().map(Word::encode).collect()
}
