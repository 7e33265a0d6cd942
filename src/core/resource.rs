/// State of an asynchronous operation as seen by its observers.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    Loading { previous: Option<T> },
    Success(T),
    Error { message: String, previous: Option<T> },
}

impl<T> Resource<T> {
    pub fn loading() -> Self {
        Resource::Loading { previous: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Resource::Error {
            message: message.into(),
            previous: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading { .. })
    }

    /// The freshest data available, including a snapshot kept while loading or after an error.
    pub fn data(&self) -> Option<&T> {
        match self {
            Resource::Success(data) => Some(data),
            Resource::Loading { previous } | Resource::Error { previous, .. } => previous.as_ref(),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Resource::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resource<U> {
        match self {
            Resource::Loading { previous } => Resource::Loading {
                previous: previous.map(f),
            },
            Resource::Success(data) => Resource::Success(f(data)),
            Resource::Error { message, previous } => Resource::Error {
                message,
                previous: previous.map(f),
            },
        }
    }
}

impl<T: Clone> Resource<T> {
    /// Moves to `Loading`, keeping whatever data the current state holds.
    pub fn to_loading(&self) -> Self {
        Resource::Loading {
            previous: self.data().cloned(),
        }
    }
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Self::loading()
    }
}
