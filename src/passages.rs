use crate::config::Difficulty;
use crate::error::SessionError;
use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

static PASSAGE_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/passages");

/// Supplies the text a session is typed against
pub trait TextProvider {
    /// A non-empty passage picked uniformly at random for `difficulty`.
    fn random_text(&self, difficulty: Difficulty) -> Result<String, SessionError>;
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Passage {
    pub text: String,
}

/// One embedded pool file
#[derive(Deserialize, Debug)]
struct PassageFile {
    difficulty: Difficulty,
    passages: Vec<Passage>,
}

#[derive(Debug, Clone, Default)]
pub struct PassagePool {
    pools: HashMap<Difficulty, Vec<Passage>>,
}

impl PassagePool {
    /// The pool compiled into the binary.
    pub fn builtin() -> Result<Self, SessionError> {
        let mut pool = Self::default();
        for file in PASSAGE_DIR.files() {
            let contents = file.contents_utf8().ok_or_else(|| {
                SessionError::Passages(format!("{} is not utf-8", file.path().display()))
            })?;
            let parsed: PassageFile = serde_json::from_str(contents)
                .map_err(|e| SessionError::Passages(format!("{}: {e}", file.path().display())))?;
            pool = pool.with_passages(parsed.difficulty, parsed.passages);
        }
        Ok(pool)
    }

    /// Parses `{"easy": [{"text": ..}], "medium": [..], "hard": [..]}`.
    /// Difficulties may be omitted; asking for one later reports it unavailable.
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        let parsed: HashMap<Difficulty, Vec<Passage>> =
            serde_json::from_str(json).map_err(|e| SessionError::Passages(e.to_string()))?;
        Ok(parsed
            .into_iter()
            .fold(Self::default(), |pool, (difficulty, passages)| {
                pool.with_passages(difficulty, passages)
            }))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SessionError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SessionError::Passages(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    /// Adds passages to a difficulty, skipping blank ones.
    ///
    /// Newlines and tabs can't be typed (Tab restarts), so every whitespace
    /// run is folded into a single space.
    pub fn with_passages<I>(mut self, difficulty: Difficulty, passages: I) -> Self
    where
        I: IntoIterator<Item = Passage>,
    {
        self.pools.entry(difficulty).or_default().extend(
            passages
                .into_iter()
                .map(|passage| Passage {
                    text: passage.text.split_whitespace().collect::<Vec<_>>().join(" "),
                })
                .filter(|passage| !passage.text.is_empty()),
        );
        self
    }

    pub fn len(&self, difficulty: Difficulty) -> usize {
        self.pools.get(&difficulty).map_or(0, Vec::len)
    }

    pub fn is_empty(&self, difficulty: Difficulty) -> bool {
        self.len(difficulty) == 0
    }
}

impl TextProvider for PassagePool {
    fn random_text(&self, difficulty: Difficulty) -> Result<String, SessionError> {
        self.pools
            .get(&difficulty)
            .and_then(|pool| pool.choose(&mut rand::thread_rng()))
            .map(|passage| passage.text.clone())
            .ok_or(SessionError::DataUnavailable(difficulty))
    }
}
