use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("invalid template id {0:?}: must start with \"itmpl_\"")]
    InvalidTemplate(String),

    #[error("session has not been started")]
    NotStarted,

    #[error("session already started")]
    AlreadyStarted,

    #[error("session already ended, {0} event rejected")]
    AlreadyTerminated(&'static str),

    #[error("duplicate {0} event")]
    DuplicateEvent(&'static str),

    #[error("widget error: {0}")]
    Widget(String),

    #[error("failed to report completion: {0}")]
    Report(String),
}
