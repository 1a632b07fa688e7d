//! # 🎭 mpu-orchestration — Sessão de Simulação
//!
//! Camada fina que alimenta as duas engines com a entrada do usuário e
//! publica o estado derivado para renderização.
//!
//! ## Arquitetura
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                        Session                          │
//! │  ┌──────────────┐   ┌──────────────┐   ┌─────────────┐  │
//! │  │ GateCatalog  │──▶│ LogicGrid +  │   │  Crossbar   │  │
//! │  │              │   │ Replay       │──▶│ (espelho)   │  │
//! │  └──────────────┘   └──────┬───────┘   └──────┬──────┘  │
//! │                            ▼ tick             ▼         │
//! │  ┌──────────────┐   ┌──────────────────────────────────┐│
//! │  │  Scheduler   │   │ derive_state() → DerivedState    ││
//! │  └──────────────┘   └──────────────────────────────────┘│
//! │                     EventBus (SimEvent)                 │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Exemplo
//!
//! ```
//! use mpu_orchestration::{Scheduler, Session, SimConfig};
//!
//! let mut session = Session::new(SimConfig::default())?;
//! session.select_gate("NAND")?;
//! session.set_inputs(true, true)?;
//! let run = session.run_to_completion(&mut Scheduler::best_effort())?;
//! assert!(!run.output);
//! # Ok::<(), mpu_orchestration::OrchestrationError>(())
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod scheduler;
pub mod session;

pub use config::SimConfig;
pub use error::{OrchestrationError, OrchestrationResult};
pub use events::{EventBus, EventFilter, EventHandler, SimEvent};
pub use scheduler::{Scheduler, SchedulerConfig, SchedulerMode, SchedulerStats, TickInfo};
pub use session::{DEFAULT_GATE, DerivedState, GateRun, Session};
