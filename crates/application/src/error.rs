use passfill_crypto::CryptoError;
use passfill_input::InputError;
use passfill_repository::RepositoryError;

/// Failures inside one engine operation. None of them is fatal; the engine
/// logs them and, where the user should know, raises a toast.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("password store error: {0}")]
    Store(#[from] RepositoryError),
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error("crypto service error {code}: {message}")]
    Service { code: i32, message: String },
    #[error("failed to deliver text: {0}")]
    Input(#[from] InputError),
}
