#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Food,
    Transport,
    Shopping,
    Entertainment,
    Bills,
    Health,
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Food => "Food",
            Self::Transport => "Transport",
            Self::Shopping => "Shopping",
            Self::Entertainment => "Entertainment",
            Self::Bills => "Bills",
            Self::Health => "Health",
            Self::Other => "Other",
        }
    }

    /// Case-insensitive lookup. Unlike account types there is no catch-all:
    /// an unknown name is `None` so callers can keep the raw string.
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|c| c.as_str().to_lowercase() == lower)
    }

    pub fn all() -> &'static [Category] {
        &[
            Self::Food,
            Self::Transport,
            Self::Shopping,
            Self::Entertainment,
            Self::Bills,
            Self::Health,
            Self::Other,
        ]
    }

    /// Next category in picker order, wrapping around.
    pub fn cycle(self, delta: i32) -> Self {
        let all = Self::all();
        let len = all.len() as i32;
        let idx = all.iter().position(|c| *c == self).unwrap_or(0) as i32;
        all[(idx + delta).rem_euclid(len) as usize]
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
