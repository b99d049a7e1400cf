use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result};

const BUILTIN_ANSWERS: &[(&str, &str)] = &[
    (
        "how to reset my router",
        "Try turning your router off for 30 seconds, then back on.",
    ),
    (
        "my computer is slow",
        "Restart it first. If it is still slow, close programs you are not using and check for updates.",
    ),
    (
        "how do i clear my browser cache",
        "Open your browser settings, find Privacy or History, and choose Clear browsing data.",
    ),
    (
        "my printer is not working",
        "Check that it is switched on, has paper, and is connected to the same network as your computer.",
    ),
];

pub fn normalize(message: &str) -> String {
    message.trim().to_lowercase()
}

/// Canned replies keyed by normalized question. Read-only once built.
#[derive(Debug, Clone)]
pub struct StaticAnswers {
    answers: HashMap<String, String>,
}

impl Default for StaticAnswers {
    fn default() -> Self {
        Self::from_pairs(BUILTIN_ANSWERS.iter().copied())
    }
}

impl StaticAnswers {
    pub fn from_pairs<I, Q, A>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Q, A)>,
        Q: AsRef<str>,
        A: Into<String>,
    {
        let answers = pairs
            .into_iter()
            .map(|(q, a)| (normalize(q.as_ref()), a.into()))
            .collect();
        Self { answers }
    }

    /// Built-in answers plus the entries of a JSON object file, file entries winning.
    pub fn load_with_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read static answers from {}", path.display()))?;
        let extra: HashMap<String, String> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse static answers in {}", path.display()))?;

        let mut table = Self::default();
        table.extend(extra);
        Ok(table)
    }

    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, pairs: I) {
        for (q, a) in pairs {
            self.answers.insert(normalize(&q), a);
        }
    }

    /// Exact match on the normalized message.
    pub fn lookup(&self, message: &str) -> Option<&str> {
        self.answers.get(&normalize(message)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}
