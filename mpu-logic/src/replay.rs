//! Máquina de estados do replay de instruções
//!
//! ```text
//!   Idle ──start──▶ Running{step} ──advance──▶ ... ──▶ Done
//!                        │
//!                     cancel
//!                        ▼
//!                    Cancelled
//! ```
//!
//! Cada `start` (ou `cancel`) incrementa a geração; um [`RunHandle`] de
//! geração anterior fica obsoleto e nunca altera a grade.

use crate::error::{LogicError, LogicResult};
use crate::grid::LogicGrid;
use crate::instruction::Instruction;
use serde::{Deserialize, Serialize};

/// Estado do replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayState {
    #[default]
    Idle,
    /// `step` é o índice da próxima instrução
    Running { step: usize },
    Done,
    Cancelled,
}

/// Identifica uma execução específica
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunHandle {
    generation: u64,
}

impl RunHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Resultado de um `advance`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Instrução `step` aplicada; `done` indica que era a última
    Applied { step: usize, done: bool },
    /// Handle de geração anterior; nada foi feito
    Stale,
    /// Execução atual não está em `Running`
    Inactive(ReplayState),
}

/// Replay sequencial de um programa sobre a grade
#[derive(Debug, Clone, Default)]
pub struct Replay {
    program: Vec<Instruction>,
    state: ReplayState,
    generation: u64,
    last_applied: Option<usize>,
}

impl Replay {
    /// Cria replay ocioso
    pub fn new() -> Self {
        Self::default()
    }

    /// Inicia nova execução, invalidando qualquer handle anterior
    pub fn start(&mut self, program: Vec<Instruction>) -> RunHandle {
        self.generation += 1;
        self.state = if program.is_empty() {
            ReplayState::Done
        } else {
            ReplayState::Running { step: 0 }
        };
        self.program = program;
        self.last_applied = None;
        tracing::debug!(
            generation = self.generation,
            instructions = self.program.len(),
            "replay started"
        );
        RunHandle {
            generation: self.generation,
        }
    }

    /// Aplica a próxima instrução
    ///
    /// Em caso de erro do interpretador a execução é cancelada.
    pub fn advance(&mut self, handle: RunHandle, grid: &mut LogicGrid) -> LogicResult<StepOutcome> {
        if !self.is_current(handle) {
            tracing::debug!(
                stale = handle.generation,
                current = self.generation,
                "ignoring stale run handle"
            );
            return Ok(StepOutcome::Stale);
        }

        let step = match self.state {
            ReplayState::Running { step } => step,
            other => return Ok(StepOutcome::Inactive(other)),
        };

        let instruction = self.program.get(step).ok_or_else(|| {
            LogicError::InvalidTransition(format!("step {} beyond program end", step))
        })?;

        if let Err(err) = grid.execute(instruction) {
            self.state = ReplayState::Cancelled;
            return Err(err);
        }

        self.last_applied = Some(step);
        let done = step + 1 >= self.program.len();
        self.state = if done {
            ReplayState::Done
        } else {
            ReplayState::Running { step: step + 1 }
        };
        Ok(StepOutcome::Applied { step, done })
    }

    /// Cancela a execução atual
    pub fn cancel(&mut self) {
        if matches!(self.state, ReplayState::Running { .. }) {
            tracing::debug!(generation = self.generation, "replay cancelled");
        }
        self.generation += 1;
        self.state = ReplayState::Cancelled;
    }

    /// Volta para `Idle`, descartando programa e destaque
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = ReplayState::Idle;
        self.program.clear();
        self.last_applied = None;
    }

    /// Verifica se o handle é da geração atual
    pub fn is_current(&self, handle: RunHandle) -> bool {
        handle.generation == self.generation
    }

    /// Retorna estado atual
    pub fn state(&self) -> ReplayState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Retorna programa da última execução
    pub fn program(&self) -> &[Instruction] {
        &self.program
    }

    /// Índice da última instrução aplicada (destaque no log)
    pub fn active_step(&self) -> Option<usize> {
        self.last_applied
    }

    /// Verifica se há execução em andamento
    pub fn is_running(&self) -> bool {
        matches!(self.state, ReplayState::Running { .. })
    }
}
