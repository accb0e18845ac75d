use thiserror::Error;

/// Feil som kan krysse grensen til kjernen.
///
/// Datamangel (tom buffer, ingen posisjoner, ingen høyde) er aldri en feil –
/// det løses lokalt med `None`/0. Kun konfigurasjon, maskinvare og I/O havner her.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("ugyldig konfigurasjon: {0}")]
    InvalidConfig(String),

    /// Hard gyro-feil. Stopper økten, men avslutter ikke prosessen.
    #[error("sensorfeil ({sensor}): {message}")]
    SensorFailure { sensor: &'static str, message: String },

    #[error("telemetri: {0}")]
    Telemetry(#[from] prometheus::Error),

    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    /// JSON-feil med sti (fra serde_path_to_error), f.eks. `user.weight_kg`.
    #[error("JSON ved `{path}`: {message}")]
    Json { path: String, message: String },

    /// Sensorkø lukket – økten er stoppet
    #[error("økten er stoppet")]
    SessionClosed,

    #[error("økt-task feilet: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<serde_path_to_error::Error<serde_json::Error>> for EngineError {
    fn from(e: serde_path_to_error::Error<serde_json::Error>) -> Self {
        EngineError::Json {
            path: e.path().to_string(),
            message: e.inner().to_string(),
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Json {
            path: ".".to_string(),
            message: e.to_string(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
