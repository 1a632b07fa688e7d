//! Erros do catálogo de portas

use thiserror::Error;

pub type GateResult<T> = Result<T, GateError>;

/// Erros do catálogo
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    /// Nome de porta não registrado
    #[error("Unknown gate: {0}")]
    UnknownGate(String),

    /// Porta já registrada
    #[error("Gate already registered: {0}")]
    DuplicateGate(String),

    /// Definição inconsistente (dimensões, operandos, aridade)
    #[error("Invalid definition for gate {gate}: {reason}")]
    InvalidDefinition { gate: String, reason: String },

    /// Tabela comparativa ilegível
    #[error("Comparison table error: {0}")]
    Comparison(String),
}
