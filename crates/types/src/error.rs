use ethcanon_primitives::ConversionError;
use thiserror::Error;

/// Errors raised while building a ledger object from untrusted input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObjectError {
    /// The hash a transaction record declared for itself does not match
    /// the hash recomputed from its fields. Either the payload is
    /// malformed or the remote node substituted a different transaction;
    /// the full encoding is attached for forensic logging.
    #[error(
        "declared transaction hash {declared} does not match recomputed hash {computed} (rlp: {encoded})"
    )]
    Integrity {
        declared: String,
        computed: String,
        encoded: String,
    },
    /// A field value could not be converted to bytes.
    #[error("malformed input: {0}")]
    Malformed(#[from] ConversionError),
    /// A raw buffer did not decode as the canonical encoding.
    #[error("rlp decoding failed: {0}")]
    Rlp(alloy_rlp::Error),
    /// The construction input had the wrong JSON shape.
    #[error("expected {0}")]
    UnexpectedShape(&'static str),
}

impl From<alloy_rlp::Error> for ObjectError {
    fn from(err: alloy_rlp::Error) -> Self {
        Self::Rlp(err)
    }
}
