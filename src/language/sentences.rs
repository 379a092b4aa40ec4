use super::core::Language;
use cgisf_lib::cgisf;
use itertools::Itertools;
use rand::Rng;

impl Language {
    /// `num` generated sentences with capitalization and punctuation
    pub fn get_random_sentences(&self, num: usize) -> Vec<String> {
        let rng = &mut rand::thread_rng();
        (0..num)
            .map(|_| {
                cgisf(
                    rng.gen_range(1..3),
                    rng.gen_range(1..3),
                    rng.gen_range(1..5),
                    rng.gen_bool(0.5),
                    rng.gen_range(1..3),
                    rng.gen_bool(0.5),
                )
                .trim()
                .to_string()
            })
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// A single-line paragraph of roughly `min_words` words or more
    pub fn get_paragraph(&self, min_words: usize) -> String {
        let mut sentences = Vec::new();
        let mut word_count = 0;

        // cgisf can produce empty output; cap attempts so this always ends
        for _ in 0..min_words.max(1) * 2 {
            if word_count >= min_words {
                break;
            }
            for sentence in self.get_random_sentences(1) {
                word_count += sentence.split_whitespace().count();
                sentences.push(sentence);
            }
        }

        sentences.iter().join(" ").replace('\n', " ")
    }
}
