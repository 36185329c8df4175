//! Conversions from external infrastructure errors into domain errors.

use keyring::Error as KeyringError;
use pawsit_domain::PawsitError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub PawsitError);

impl From<InfraError> for PawsitError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<PawsitError> for InfraError {
    fn from(value: PawsitError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoPawsitError {
    fn into_pawsit(self) -> PawsitError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → PawsitError */
/* -------------------------------------------------------------------------- */

impl IntoPawsitError for HttpError {
    fn into_pawsit(self) -> PawsitError {
        if self.is_builder() {
            return PawsitError::Config(format!("invalid HTTP request: {self}"));
        }

        if self.is_timeout() {
            return PawsitError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return PawsitError::Network(format!("HTTP connection failure: {self}"));
        }

        if self.is_decode() {
            return PawsitError::Serialization(format!("invalid HTTP response body: {self}"));
        }

        PawsitError::Network(format!("HTTP transport error: {self}"))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_pawsit())
    }
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → PawsitError */
/* -------------------------------------------------------------------------- */

impl IntoPawsitError for KeyringError {
    fn into_pawsit(self) -> PawsitError {
        use KeyringError::{Ambiguous, BadEncoding, NoEntry, NoStorageAccess, PlatformFailure};

        match self {
            NoEntry => PawsitError::Storage("keychain entry not found".into()),
            BadEncoding(_) => PawsitError::Storage("keychain value is not valid UTF-8".into()),
            Ambiguous(entries) => PawsitError::Storage(format!(
                "multiple keychain entries matched request ({} results)",
                entries.len()
            )),
            PlatformFailure(err) => PawsitError::Storage(format!("keychain platform error: {err}")),
            NoStorageAccess(err) => {
                PawsitError::Storage(format!("unable to access secure storage: {err}"))
            }
            other => PawsitError::Storage(other.to_string()),
        }
    }
}

impl From<KeyringError> for InfraError {
    fn from(value: KeyringError) -> Self {
        InfraError(value.into_pawsit())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io / tempfile / toml → PawsitError */
/* -------------------------------------------------------------------------- */

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(PawsitError::Storage(format!("I/O error: {value}")))
    }
}

impl From<tempfile::PersistError> for InfraError {
    fn from(value: tempfile::PersistError) -> Self {
        InfraError(PawsitError::Storage(format!("failed to persist file: {}", value.error)))
    }
}

impl From<toml::de::Error> for InfraError {
    fn from(value: toml::de::Error) -> Self {
        InfraError(PawsitError::Config(format!("Invalid TOML format: {value}")))
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
