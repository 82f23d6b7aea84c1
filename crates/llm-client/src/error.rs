use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{provider} API error ({status}): {body}")]
    Api {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Empty response from {0}")]
    EmptyResponse(&'static str),
}
