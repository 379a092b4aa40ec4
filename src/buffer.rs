use crate::error::BufferError;

/// Once fewer than this many characters are left ahead of the cursor, the
/// source words are replayed onto the end of the buffer.
pub const GROWTH_THRESHOLD: usize = 50;

/// Target text for a session, extended on demand so the typist never reaches
/// the end.
///
/// `target` is always the concatenation of `words` in order. Growth only
/// appends, so any character index handed out earlier stays valid for the
/// lifetime of the buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamBuffer {
    target: Vec<char>,
    words: Vec<String>,
    source_words: Vec<String>,
}

impl StreamBuffer {
    pub fn new(words: Vec<String>) -> Result<Self, BufferError> {
        let mut buffer = Self::default();
        buffer.initialize(words)?;
        Ok(buffer)
    }

    /// Replace the buffer contents with `words`. The list is kept as the
    /// replay source for later growth.
    pub fn initialize(&mut self, words: Vec<String>) -> Result<(), BufferError> {
        if words.is_empty() {
            return Err(BufferError::Empty);
        }

        self.target = words.iter().flat_map(|w| w.chars()).collect();
        self.words = words.clone();
        self.source_words = words;
        Ok(())
    }

    pub fn remaining_capacity(&self, typed_len: usize) -> isize {
        self.target.len() as isize - typed_len as isize
    }

    /// Append one copy of the source words when the cursor is within
    /// [`GROWTH_THRESHOLD`] characters of the end. Returns whether it grew.
    pub fn grow_if_needed(&mut self, typed_len: usize) -> bool {
        if self.source_words.is_empty()
            || self.remaining_capacity(typed_len) >= GROWTH_THRESHOLD as isize
        {
            return false;
        }

        self.words.extend(self.source_words.iter().cloned());
        self.target
            .extend(self.source_words.iter().flat_map(|w| w.chars()));
        true
    }

    pub fn target(&self) -> &[char] {
        &self.target
    }

    pub fn target_len(&self) -> usize {
        self.target.len()
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn source_words(&self) -> &[String] {
        &self.source_words
    }

    pub fn expected_char(&self, idx: usize) -> Option<char> {
        self.target.get(idx).copied()
    }

    /// Map a cursor position onto the word segmentation as
    /// `(word_index, char_index_in_word)`. A cursor sitting exactly at a word
    /// boundary belongs to the following word.
    pub fn locate(&self, typed_len: usize) -> (usize, usize) {
        let mut start = 0;
        for (word_idx, word) in self.words.iter().enumerate() {
            let len = word.chars().count();
            if typed_len < start + len {
                return (word_idx, typed_len - start);
            }
            start += len;
        }

        // past the end: park on the last word's tail
        match self.words.last() {
            Some(last) => (self.words.len() - 1, last.chars().count()),
            None => (0, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn target_string(buffer: &StreamBuffer) -> String {
        buffer.target().iter().collect()
    }

    #[test]
    fn initialize_concatenates_words() {
        let buffer = StreamBuffer::new(words(&["ab", "cd"])).unwrap();

        assert_eq!(target_string(&buffer), "abcd");
        assert_eq!(buffer.words(), &words(&["ab", "cd"])[..]);
        assert_eq!(buffer.source_words(), &words(&["ab", "cd"])[..]);
    }

    #[test]
    fn initialize_rejects_empty_list() {
        assert_eq!(StreamBuffer::new(vec![]), Err(BufferError::Empty));

        let mut buffer = StreamBuffer::new(words(&["keep"])).unwrap();
        assert_eq!(buffer.initialize(vec![]), Err(BufferError::Empty));
        assert_eq!(target_string(&buffer), "keep");
    }

    #[test]
    fn single_growth_replays_source_words() {
        let mut buffer = StreamBuffer::new(words(&["ab", "cd"])).unwrap();

        assert!(buffer.grow_if_needed(0));

        assert_eq!(target_string(&buffer), "abcdabcd");
        assert_eq!(buffer.words(), &words(&["ab", "cd", "ab", "cd"])[..]);
        assert_eq!(buffer.source_words(), &words(&["ab", "cd"])[..]);
    }

    #[test]
    fn remaining_capacity_can_go_negative() {
        let buffer = StreamBuffer::new(words(&["abc"])).unwrap();

        assert_eq!(buffer.remaining_capacity(1), 2);
        assert_eq!(buffer.remaining_capacity(5), -2);
    }

    #[test]
    fn no_growth_when_margin_is_large() {
        let long_word = "x".repeat(GROWTH_THRESHOLD + 10);
        let mut buffer = StreamBuffer::new(vec![long_word]).unwrap();

        assert!(!buffer.grow_if_needed(0));
        assert!(!buffer.grow_if_needed(10));
        assert!(buffer.grow_if_needed(11));
        assert_eq!(buffer.target_len(), (GROWTH_THRESHOLD + 10) * 2);
    }

    #[test]
    fn repeated_calls_grow_once_per_crossing() {
        let word = "y".repeat(GROWTH_THRESHOLD);
        let mut buffer = StreamBuffer::new(vec![word]).unwrap();

        assert!(buffer.grow_if_needed(1));
        let grown = buffer.target_len();
        assert!(!buffer.grow_if_needed(1));
        assert!(!buffer.grow_if_needed(1));
        assert_eq!(buffer.target_len(), grown);
    }

    #[test]
    fn growth_preserves_prefix() {
        let mut buffer = StreamBuffer::new(words(&["one", "two"])).unwrap();
        let before = buffer.target().to_vec();

        buffer.grow_if_needed(4);

        assert_eq!(&buffer.target()[..before.len()], &before[..]);
    }

    #[test]
    fn expected_char_is_bounded() {
        let buffer = StreamBuffer::new(words(&["hi"])).unwrap();

        assert_eq!(buffer.expected_char(1), Some('i'));
        assert_eq!(buffer.expected_char(2), None);
    }

    #[test]
    fn locate_maps_cursor_into_words() {
        let buffer = StreamBuffer::new(words(&["the", "fox", "ran"])).unwrap();

        assert_eq!(buffer.locate(0), (0, 0));
        assert_eq!(buffer.locate(2), (0, 2));
        assert_eq!(buffer.locate(3), (1, 0));
        assert_eq!(buffer.locate(8), (2, 2));
        assert_eq!(buffer.locate(9), (2, 3));
        assert_eq!(buffer.locate(42), (2, 3));
    }

    #[test]
    fn locate_on_default_buffer() {
        assert_eq!(StreamBuffer::default().locate(3), (0, 0));
    }
}
