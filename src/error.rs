use thiserror::Error;

#[derive(Error, Debug)]
pub enum BriefAnalyzerError {
    #[error("Brief is empty")]
    EmptyInput,

    #[error("No API credential configured")]
    MissingCredential,

    #[error("Completion endpoint rejected the credential (HTTP 401)")]
    Unauthorized,

    #[error("Completion endpoint returned HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Report export failed: {0}")]
    ExportFailure(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BriefAnalyzerError {
    /// Message shown to the user next to the brief input.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyInput => "Veuillez entrer un brief à analyser".to_string(),
            Self::MissingCredential => {
                "Veuillez configurer votre clé API OpenAI dans les paramètres".to_string()
            }
            Self::Unauthorized => {
                "Erreur lors de l'analyse: Clé API invalide ou expirée. Veuillez vérifier vos paramètres API."
                    .to_string()
            }
            Self::HttpError { status, .. } => {
                format!("Erreur lors de l'analyse: Erreur HTTP: {}", status)
            }
            Self::MalformedResponse(_) | Self::SerializationError(_) => {
                "Le format de la réponse n'est pas valide. Veuillez réessayer.".to_string()
            }
            Self::ExportFailure(_) => {
                "Une erreur est survenue lors de la création du PDF. Veuillez réessayer."
                    .to_string()
            }
            Self::Transport(msg) => format!("Erreur lors de l'analyse: {}", msg),
            Self::IoError(e) => format!("Erreur d'entrée/sortie: {}", e),
        }
    }
}

#[cfg(feature = "openai")]
impl From<reqwest::Error> for BriefAnalyzerError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BriefAnalyzerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_message_mentions_credential() {
        let msg = BriefAnalyzerError::Unauthorized.user_message();
        assert!(msg.contains("Clé API invalide"));
    }

    #[test]
    fn test_http_error_message_carries_status() {
        let err = BriefAnalyzerError::HttpError {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert!(err.user_message().contains("503"));
        assert!(err.to_string().contains("overloaded"));
    }
}
