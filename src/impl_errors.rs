//! Implementações de traits para o enum de erro do sistema
//!
//! Este módulo existe exclusivamente para desacoplar:
//! - definição de erros (enum)
//! - implementação de traits (`Display`, `Error`, `From`)

use std::error::Error as StdError;
use std::fmt;

use crate::errors::EtlError;

/* ========================================================================== */
/* Display                                                                    */
/* ========================================================================== */

impl fmt::Display for EtlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EtlError::Io(err) => {
                write!(f, "[I/O] {}", err)
            }

            EtlError::Http(err) => {
                write!(f, "[HTTP] {}", err)
            }

            EtlError::Archive(err) => {
                write!(f, "[ZIP] {}", err)
            }

            EtlError::DataFrame(msg) => {
                write!(f, "[DataFrame] {}", msg)
            }

            EtlError::Database(msg) => {
                write!(f, "[MySQL] {}", msg)
            }

            EtlError::Config(msg) => {
                write!(f, "[Config] {}", msg)
            }
        }
    }
}

/* ========================================================================== */
/* std::error::Error                                                          */
/* ========================================================================== */

impl StdError for EtlError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            EtlError::Io(err) => Some(err),
            EtlError::Http(err) => Some(err),
            EtlError::Archive(err) => Some(err),
            EtlError::DataFrame(_) => None,
            EtlError::Database(_) => None,
            EtlError::Config(_) => None,
        }
    }
}

/* ========================================================================== */
/* Conversions                                                                */
/* ========================================================================== */

impl From<std::io::Error> for EtlError {
    fn from(err: std::io::Error) -> Self {
        EtlError::Io(err)
    }
}

impl From<reqwest::Error> for EtlError {
    fn from(err: reqwest::Error) -> Self {
        EtlError::Http(err)
    }
}

impl From<zip::result::ZipError> for EtlError {
    fn from(err: zip::result::ZipError) -> Self {
        EtlError::Archive(err)
    }
}

impl From<polars::prelude::PolarsError> for EtlError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        EtlError::DataFrame(err.to_string())
    }
}

impl From<mysql_async::Error> for EtlError {
    fn from(err: mysql_async::Error) -> Self {
        EtlError::Database(err.to_string())
    }
}

/* ========================================================================== */
/* Box<dyn Error>                                                             */
/* ========================================================================== */

impl From<EtlError> for Box<dyn StdError> {
    fn from(err: EtlError) -> Self {
        Box::new(err)
    }
}
