//! Erros de orquestração

use mpu_crossbar::CrossbarError;
use mpu_gates::GateError;
use mpu_logic::LogicError;
use thiserror::Error;

pub type OrchestrationResult<T> = Result<T, OrchestrationError>;

/// Erros de orquestração
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OrchestrationError {
    /// Erro da engine lógica
    #[error("Logic error: {0}")]
    Logic(#[from] LogicError),

    /// Erro do modelo elétrico
    #[error("Crossbar error: {0}")]
    Crossbar(#[from] CrossbarError),

    /// Erro do catálogo
    #[error("Gate error: {0}")]
    Gate(#[from] GateError),

    /// Configuração inválida
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Execução terminou sem resultado (cancelada ou substituída)
    #[error("Run interrupted: {0}")]
    RunInterrupted(String),

    /// Lock poison
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl<T> From<std::sync::PoisonError<T>> for OrchestrationError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        OrchestrationError::LockPoisoned(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = OrchestrationError::InvalidConfiguration("step_delay_ms".into());
        assert!(err.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn test_gate_error_conversion() {
        let err: OrchestrationError = GateError::UnknownGate("MAJ".into()).into();
        assert_eq!(err.to_string(), "Gate error: Unknown gate: MAJ");
    }

    #[test]
    fn test_logic_error_conversion() {
        let err: OrchestrationError = LogicError::InvalidDimensions { rows: 0, cols: 3 }.into();
        assert!(matches!(err, OrchestrationError::Logic(_)));
    }
}
