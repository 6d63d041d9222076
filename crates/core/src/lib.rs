#![forbid(unsafe_code)]

pub mod ids {
    /// Identity of a category. Positive values are persistent (issued at
    /// apply time and never reused); values <= 0 are revision-local
    /// placeholders for categories that do not exist in the base corpus yet.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct CategoryId(i64);

    impl CategoryId {
        pub fn new(value: i64) -> Self {
            Self(value)
        }

        pub fn get(self) -> i64 {
            self.0
        }

        pub fn is_placeholder(self) -> bool {
            self.0 <= 0
        }

        pub fn is_persistent(self) -> bool {
            self.0 > 0
        }
    }

    /// Identity of a card. Placeholder semantics match [`CategoryId`].
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct CardId(i64);

    impl CardId {
        pub fn new(value: i64) -> Self {
            Self(value)
        }

        pub fn get(self) -> i64 {
            self.0
        }

        pub fn is_placeholder(self) -> bool {
            self.0 <= 0
        }

        pub fn is_persistent(self) -> bool {
            self.0 > 0
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct RevisionId(i64);

    impl RevisionId {
        pub fn get(self) -> i64 {
            self.0
        }

        pub fn try_new(value: i64) -> Result<Self, IdError> {
            if value <= 0 {
                return Err(IdError::NotPositive);
            }
            Ok(Self(value))
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct PrincipalId(i64);

    impl PrincipalId {
        pub fn get(self) -> i64 {
            self.0
        }

        pub fn try_new(value: i64) -> Result<Self, IdError> {
            if value <= 0 {
                return Err(IdError::NotPositive);
            }
            Ok(Self(value))
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum IdError {
        NotPositive,
    }

    impl std::fmt::Display for IdError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::NotPositive => write!(f, "id must be positive"),
            }
        }
    }

    impl std::error::Error for IdError {}
}

pub mod model {
    /// Lifecycle of a revision. Transitions are monotonic: `Open` may move to
    /// `Applied` or `Removed`; closed revisions never reopen.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum RevisionState {
        Open,
        Applied,
        Removed,
    }

    impl RevisionState {
        pub fn as_str(self) -> &'static str {
            match self {
                RevisionState::Open => "open",
                RevisionState::Applied => "applied",
                RevisionState::Removed => "removed",
            }
        }

        pub fn parse(value: &str) -> Option<Self> {
            match value {
                "open" => Some(RevisionState::Open),
                "applied" => Some(RevisionState::Applied),
                "removed" => Some(RevisionState::Removed),
                _ => None,
            }
        }

        pub fn is_open(self) -> bool {
            matches!(self, RevisionState::Open)
        }
    }
}

pub mod access {
    /// Privilege tier derived from a principal's numeric access level:
    /// <= 0 read-only, exactly 1 editor (restricted to owned revisions),
    /// >= 2 administrator.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Access {
        ReadOnly,
        Editor,
        Administrator,
    }

    impl Access {
        pub fn from_level(level: i64) -> Self {
            match level {
                l if l <= 0 => Access::ReadOnly,
                1 => Access::Editor,
                _ => Access::Administrator,
            }
        }

        pub fn as_str(self) -> &'static str {
            match self {
                Access::ReadOnly => "read-only",
                Access::Editor => "editor",
                Access::Administrator => "administrator",
            }
        }

        pub fn can_edit(self) -> bool {
            !matches!(self, Access::ReadOnly)
        }

        pub fn is_administrator(self) -> bool {
            matches!(self, Access::Administrator)
        }
    }
}
