//! Sistema de eventos da sessão

use crate::error::OrchestrationResult;
use mpu_crossbar::ResistanceLevel;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Eventos publicados pela sessão
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    GateSelected {
        gate: String,
        rows: usize,
        cols: usize,
    },
    InputsChanged {
        a: bool,
        b: bool,
    },
    VoltageChanged {
        volts: f64,
    },
    RunStarted {
        gate: String,
        generation: u64,
        steps: usize,
    },
    StepApplied {
        generation: u64,
        step: usize,
        instruction: String,
    },
    RunFinished {
        gate: String,
        generation: u64,
        output: bool,
        interpreted: bool,
    },
    RunCancelled {
        generation: u64,
    },
    CrossbarCellChanged {
        row: usize,
        col: usize,
        resistance: ResistanceLevel,
        selector: bool,
    },
    LogicCellToggled {
        row: usize,
        col: usize,
        value: bool,
    },
    Reset,
    /// Operação recusada; o estado da sessão não mudou
    Rejected {
        operation: String,
        reason: String,
    },
}

/// Handler de eventos (callback)
pub type EventHandler = Arc<dyn Fn(&SimEvent) + Send + Sync>;

/// Filtro de eventos
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventFilter {
    All,
    /// Início, passos, fim e cancelamento de execuções
    Run,
    /// Somente passos aplicados
    Step,
    /// Mudanças no crossbar (manuais ou espelhadas)
    Crossbar,
    /// Eventos de uma porta específica
    Gate(String),
    Rejected,
}

impl EventFilter {
    /// Verifica se o evento passa pelo filtro
    pub fn matches(&self, event: &SimEvent) -> bool {
        match (self, event) {
            (EventFilter::All, _) => true,
            (
                EventFilter::Run,
                SimEvent::RunStarted { .. }
                | SimEvent::StepApplied { .. }
                | SimEvent::RunFinished { .. }
                | SimEvent::RunCancelled { .. },
            ) => true,
            (EventFilter::Step, SimEvent::StepApplied { .. }) => true,
            (
                EventFilter::Crossbar,
                SimEvent::CrossbarCellChanged { .. } | SimEvent::VoltageChanged { .. },
            ) => true,
            (EventFilter::Gate(name), SimEvent::GateSelected { gate, .. })
            | (EventFilter::Gate(name), SimEvent::RunStarted { gate, .. })
            | (EventFilter::Gate(name), SimEvent::RunFinished { gate, .. }) => {
                name.eq_ignore_ascii_case(gate)
            }
            (EventFilter::Rejected, SimEvent::Rejected { .. }) => true,
            _ => false,
        }
    }
}

/// Bus de eventos
#[derive(Clone)]
pub struct EventBus {
    handlers: Arc<Mutex<HashMap<EventFilter, Vec<EventHandler>>>>,
    history: Arc<Mutex<VecDeque<SimEvent>>>,
    max_history: usize,
}

impl EventBus {
    /// Cria bus com histórico padrão
    pub fn new() -> Self {
        Self::with_history(crate::config::DEFAULT_EVENT_HISTORY)
    }

    /// Cria bus com limite de histórico
    pub fn with_history(max_history: usize) -> Self {
        Self {
            handlers: Arc::new(Mutex::new(HashMap::new())),
            history: Arc::new(Mutex::new(VecDeque::new())),
            max_history,
        }
    }

    /// Inscreve handler para eventos
    pub fn subscribe<F>(&self, filter: EventFilter, handler: F) -> OrchestrationResult<()>
    where
        F: Fn(&SimEvent) + Send + Sync + 'static,
    {
        let mut handlers = self.handlers.lock()?;
        handlers.entry(filter).or_default().push(Arc::new(handler));
        Ok(())
    }

    /// Remove todos os handlers de um filtro
    pub fn unsubscribe(&self, filter: &EventFilter) -> OrchestrationResult<()> {
        let mut handlers = self.handlers.lock()?;
        handlers.remove(filter);
        Ok(())
    }

    /// Emite evento para handlers inscritos
    pub fn emit(&self, event: SimEvent) -> OrchestrationResult<()> {
        {
            let mut history = self.history.lock()?;
            history.push_back(event.clone());
            while history.len() > self.max_history {
                history.pop_front();
            }
        }

        // Handlers copiados para fora do lock: um handler pode se inscrever de novo
        let matching: Vec<EventHandler> = {
            let handlers = self.handlers.lock()?;
            handlers
                .iter()
                .filter(|(filter, _)| filter.matches(&event))
                .flat_map(|(_, list)| list.iter().cloned())
                .collect()
        };
        for handler in matching {
            handler(&event);
        }
        Ok(())
    }

    /// Obtém histórico de eventos
    pub fn history(&self) -> OrchestrationResult<Vec<SimEvent>> {
        let history = self.history.lock()?;
        Ok(history.iter().cloned().collect())
    }

    /// Limpa histórico
    pub fn clear_history(&self) -> OrchestrationResult<()> {
        self.history.lock()?.clear();
        Ok(())
    }

    /// Retorna número de handlers
    pub fn handler_count(&self) -> OrchestrationResult<usize> {
        let handlers = self.handlers.lock()?;
        Ok(handlers.values().map(Vec::len).sum())
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("max_history", &self.max_history)
            .field("history_len", &self.history.lock().map(|h| h.len()).unwrap_or(0))
            .finish()
    }
}
