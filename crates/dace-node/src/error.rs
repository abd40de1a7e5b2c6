//! Error type for the evaluator service.
use thiserror::Error;

use dace_core::error::EvaluatorError;

#[derive(Error, Debug)]
pub enum NodeError {
    #[error(transparent)] Evaluator(#[from] EvaluatorError),
    #[error("storage: {0}")] Storage(String),
    #[error("codec: {0}")] Codec(String),
    #[error("corrupt state: {0}")] Corrupt(String),
}

impl NodeError {
    /// The rejection reason, if the core refused the operation.
    pub fn evaluator_error(&self) -> Option<&EvaluatorError> {
        match self {
            Self::Evaluator(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rocksdb::Error> for NodeError {
    fn from(e: rocksdb::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dace_core::types::CharityId;

    #[test]
    fn evaluator_errors_pass_through() {
        let err: NodeError = EvaluatorError::NotFound(CharityId(4)).into();
        assert_eq!(err.to_string(), "charity not found: 4");
        assert_eq!(
            err.evaluator_error(),
            Some(&EvaluatorError::NotFound(CharityId(4)))
        );
    }

    #[test]
    fn storage_errors_are_not_rejections() {
        let err = NodeError::Storage("disk full".into());
        assert_eq!(err.to_string(), "storage: disk full");
        assert!(err.evaluator_error().is_none());
    }
}
