use thiserror::Error;

/// Failures while pulling a user's collection.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    #[error("Collection request failed with status {status}")]
    Fetch { status: u16 },

    #[error("Collection still generating after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("Collection request failed: {0}")]
    Network(String),
}

/// Batch-level failures. Any of these aborts before a single item is attempted.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Invalid import mode")]
    InvalidMode,

    #[error("Missing required payload: {0}")]
    MissingPayload(&'static str),

    #[error(transparent)]
    Collection(#[from] CollectionError),

    #[error("Caller is not allowed to import games")]
    Forbidden,

    #[error("Capability check unavailable: {0}")]
    Unavailable(String),
}

impl ImportError {
    pub fn is_fatal_input(&self) -> bool {
        matches!(self, ImportError::InvalidMode | ImportError::MissingPayload(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_errors_convert_into_import_errors() {
        let err: ImportError = CollectionError::Timeout { attempts: 5 }.into();
        assert_eq!(err.to_string(), "Collection still generating after 5 attempts");
        assert!(!err.is_fatal_input());
    }

    #[test]
    fn fetch_error_names_status() {
        let err = CollectionError::Fetch { status: 404 };
        assert!(err.to_string().contains("404"));
    }
}
