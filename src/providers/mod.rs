//! Outbound clients for the generation backends: the FAL.ai queue, the Railway scene
//! generator, and the OpenAI documentation parser. Each sits behind a trait so the
//! lifecycle can be driven against fakes.

pub mod errors;
pub mod fal;
pub mod fal_tools;
pub mod openai;
pub mod railway;

use thiserror::Error;

pub use errors::{is_nsfw_error, parse_fal_error, parse_nsfw_error, FalErrorInfo, NsfwDetails};
pub use fal::{supabase_function_url, FalGateway, FalSubmission, HttpFalGateway};
pub use fal_tools::{find_fal_tool, FalToolSpec, FAL_TOOLS};
pub use openai::{DocParser, OpenAiDocParser, ParsedDocumentation};
pub use railway::{HttpSceneGateway, SceneGateway, SceneSubmission};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} not configured")]
    NotConfigured(&'static str),

    #[error("{0} request timed out")]
    Timeout(&'static str),

    /// FAL answered with a non-2xx status
    #[error("{}", .0.technical_message)]
    Fal(FalErrorInfo),

    #[error("{0}")]
    Upstream(String),

    #[error("No request_id received from FAL.ai queue")]
    MissingRequestId,

    #[error("{0}")]
    InvalidResponse(String),

    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ProviderError {
    /// Map reqwest timeouts to the named service
    pub fn from_reqwest(service: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(service)
        } else {
            ProviderError::Transport(err)
        }
    }
}
