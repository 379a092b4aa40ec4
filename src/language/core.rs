use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde_json::from_str;

use crate::error::ProviderError;

static LANG_DIR: Dir = include_dir!("src/lang");

/// Word list bundled into the binary
#[derive(Deserialize, Clone, Debug)]
pub struct Language {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

impl Language {
    pub fn new(name: &str) -> Result<Self, ProviderError> {
        read_language_from_file(&format!("{name}.json"))
    }

    pub fn english() -> Result<Self, ProviderError> {
        Self::new("english")
    }

    /// `num` words drawn with replacement; empty only when the word list is empty
    pub fn get_random(&self, num: usize) -> Vec<String> {
        let rng = &mut rand::thread_rng();

        (0..num)
            .filter_map(|_| self.words.choose(rng).cloned())
            .collect()
    }
}

fn read_language_from_file(file_name: &str) -> Result<Language, ProviderError> {
    let file = LANG_DIR
        .get_file(file_name)
        .ok_or_else(|| ProviderError::Unavailable(format!("language file {file_name} not found")))?;

    let file_as_str = file
        .contents_utf8()
        .ok_or_else(|| ProviderError::Unavailable(format!("{file_name} is not valid utf-8")))?;

    Ok(from_str(file_as_str)?)
}
