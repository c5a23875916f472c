//! Session history of loaded pages.

/// Linear page history with a cursor, like a browser tab.
///
/// Pushing after moving back discards the forward entries.
#[derive(Debug, Clone, Default)]
pub struct SessionHistory {
    entries: Vec<String>,
    position: Option<usize>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `href` as the newest entry after the cursor.
    pub fn push(&mut self, href: impl Into<String>) {
        let next = self.position.map_or(0, |pos| pos + 1);
        self.entries.truncate(next);
        self.entries.push(href.into());
        self.position = Some(next);
    }

    /// Replace the current entry, or push one if history is empty.
    pub fn replace(&mut self, href: impl Into<String>) {
        match self.position {
            Some(pos) => self.entries[pos] = href.into(),
            None => self.push(href),
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.position.map(|pos| self.entries[pos].as_str())
    }

    /// Move the cursor back one entry.
    pub fn back(&mut self) -> Option<&str> {
        let pos = self.position.filter(|&pos| pos > 0)? - 1;
        self.position = Some(pos);
        Some(&self.entries[pos])
    }

    /// Move the cursor forward one entry.
    pub fn forward(&mut self) -> Option<&str> {
        let pos = self.position? + 1;
        if pos >= self.entries.len() {
            return None;
        }
        self.position = Some(pos);
        Some(&self.entries[pos])
    }

    pub fn can_go_back(&self) -> bool {
        self.position.is_some_and(|pos| pos > 0)
    }

    pub fn can_go_forward(&self) -> bool {
        self.position.is_some_and(|pos| pos + 1 < self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
