//! Sessão de simulação
//!
//! Dona exclusiva da grade lógica, do replay e do crossbar. Toda mutação
//! passa por aqui; leitores observam [`DerivedState`], recalculado a cada
//! chamada de [`Session::derive_state`].
//!
//! Protocolo de execução de uma porta:
//!
//! 1. reset da grade para as dimensões da porta;
//! 2. A em (0,0) e, para portas de duas entradas, B em (0,1);
//! 3. instancia a sequência de instruções para as entradas;
//! 4. uma instrução por tick, cada tick precedido por uma pausa do scheduler;
//! 5. após a última instrução, o valor da função-verdade é gravado na célula
//!    de saída (`REF`). O valor deixado pelo interpretador é reportado como
//!    `interpreted`.

use crate::config::SimConfig;
use crate::error::{OrchestrationError, OrchestrationResult};
use crate::events::{EventBus, SimEvent};
use crate::scheduler::Scheduler;
use mpu_crossbar::{
    Crossbar, CrossbarCell, DriveConfig, ReadoutPolicy, ResistanceLevel, SimulationResult,
    constants::CROSSBAR_SIZE,
};
use mpu_gates::{
    ComparisonFigures, ComparisonTable, GateCatalog, GateDefinition, GateInfo, GateInputs,
    INPUT_A, INPUT_B,
};
use mpu_logic::{
    Coord, Instruction, LogicGrid, Replay, ReplayState, RunHandle, Snapshot, StepOutcome,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Porta selecionada ao criar a sessão
pub const DEFAULT_GATE: &str = "AND";

/// Resultado de uma execução completa
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateRun {
    pub gate: String,
    pub inputs: GateInputs,
    /// Valor autoritativo (função-verdade)
    pub output: bool,
    /// Valor deixado pelo interpretador antes do `REF`
    pub interpreted: bool,
    pub steps: usize,
    pub generation: u64,
}

impl GateRun {
    /// A sequência de instruções chegou ao mesmo bit da função-verdade
    pub fn interpreter_agrees(&self) -> bool {
        self.output == self.interpreted
    }
}

/// Tudo que uma camada de apresentação precisa para renderizar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedState {
    pub gate: GateInfo,
    pub inputs: GateInputs,
    pub reference_output: bool,
    pub snapshot: Snapshot,
    pub instructions: Vec<Instruction>,
    /// Última instrução aplicada (destaque no log)
    pub active_step: Option<usize>,
    pub replay: ReplayState,
    pub last_run: Option<GateRun>,
    pub crossbar: [[CrossbarCell; CROSSBAR_SIZE]; CROSSBAR_SIZE],
    pub drive: DriveConfig,
    pub simulation: SimulationResult,
    pub electrical_output: bool,
    /// Referência lógica e leitura elétrica coincidem
    pub agreement: bool,
    pub comparison: Option<ComparisonFigures>,
}

/// Instância explícita do simulador
#[derive(Debug)]
pub struct Session {
    config: SimConfig,
    catalog: GateCatalog,
    comparison: ComparisonTable,
    gate: GateDefinition,
    inputs: GateInputs,
    grid: LogicGrid,
    replay: Replay,
    crossbar: Crossbar,
    drive: DriveConfig,
    policy: ReadoutPolicy,
    last_run: Option<GateRun>,
    events: EventBus,
}

impl Session {
    /// Sessão com o catálogo embutido e a porta [`DEFAULT_GATE`]
    pub fn new(config: SimConfig) -> OrchestrationResult<Self> {
        Self::with_catalog(config, GateCatalog::builtin())
    }

    /// Sessão sobre um catálogo arbitrário; seleciona [`DEFAULT_GATE`] ou a primeira porta
    pub fn with_catalog(config: SimConfig, catalog: GateCatalog) -> OrchestrationResult<Self> {
        config.validate()?;

        let gate = catalog
            .get(DEFAULT_GATE)
            .ok()
            .or_else(|| catalog.iter().next())
            .cloned()
            .ok_or_else(|| {
                OrchestrationError::InvalidConfiguration("gate catalog is empty".into())
            })?;
        let (rows, cols) = gate.dimensions();
        let inputs = GateInputs::default();

        let session = Self {
            catalog,
            comparison: ComparisonTable::builtin()?,
            grid: LogicGrid::new(rows, cols)?,
            replay: Replay::new(),
            crossbar: Crossbar::new(config.electrical)?,
            drive: DriveConfig::from_inputs(inputs.a, inputs.b, config.drive_voltage)?,
            policy: config.readout,
            last_run: None,
            events: EventBus::with_history(config.event_history),
            gate,
            inputs,
            config,
        };
        tracing::info!(gate = session.gate.name(), "session created");
        Ok(session)
    }

    /// Retorna configuração
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Retorna catálogo de portas
    pub fn catalog(&self) -> &GateCatalog {
        &self.catalog
    }

    /// Retorna porta ativa
    pub fn gate(&self) -> &GateDefinition {
        &self.gate
    }

    /// Retorna entradas atuais
    pub fn inputs(&self) -> GateInputs {
        self.inputs
    }

    /// Retorna grade lógica
    pub fn grid(&self) -> &LogicGrid {
        &self.grid
    }

    /// Retorna crossbar
    pub fn crossbar(&self) -> &Crossbar {
        &self.crossbar
    }

    /// Retorna estado do replay
    pub fn replay_state(&self) -> ReplayState {
        self.replay.state()
    }

    /// Verifica se há execução em andamento
    pub fn is_running(&self) -> bool {
        self.replay.is_running()
    }

    /// Retorna última execução concluída
    pub fn last_run(&self) -> Option<&GateRun> {
        self.last_run.as_ref()
    }

    /// Retorna bus de eventos
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // ─── Entradas ───────────────────────────────────────────────

    /// Troca a porta ativa
    ///
    /// Nome desconhecido falha fechado: porta, grade e replay não mudam.
    /// Em caso de sucesso qualquer execução em andamento é invalidada e a
    /// grade volta a zero nas dimensões da nova porta.
    pub fn select_gate(&mut self, name: &str) -> OrchestrationResult<()> {
        let gate = match self.catalog.get(name) {
            Ok(gate) => gate.clone(),
            Err(err) => return Err(self.reject("select_gate", err.into())),
        };

        let (rows, cols) = gate.dimensions();
        self.grid.reset(rows, cols)?;
        self.interrupt_run();
        self.replay.reset();
        self.last_run = None;
        self.gate = gate;
        if self.config.mirror_logic_to_crossbar {
            self.remirror_logic();
        }

        tracing::info!(gate = self.gate.name(), rows, cols, "gate selected");
        self.emit(SimEvent::GateSelected {
            gate: self.gate.name().to_string(),
            rows,
            cols,
        });
        Ok(())
    }

    /// Atualiza A/B e re-aciona o crossbar
    ///
    /// Uma execução em andamento foi instanciada para as entradas antigas e
    /// é cancelada.
    pub fn set_inputs(&mut self, a: bool, b: bool) -> OrchestrationResult<()> {
        self.drive = DriveConfig::from_inputs(a, b, self.drive.voltage())?;
        self.inputs = GateInputs::new(a, b);
        self.cancel_run();
        self.emit(SimEvent::InputsChanged { a, b });
        Ok(())
    }

    /// Altera a tensão de acionamento (não negativa)
    pub fn set_drive_voltage(&mut self, volts: f64) -> OrchestrationResult<()> {
        match DriveConfig::new(*self.drive.rows(), volts) {
            Ok(drive) => self.drive = drive,
            Err(err) => return Err(self.reject("set_drive_voltage", err.into())),
        }
        tracing::debug!(volts, "drive voltage changed");
        self.emit(SimEvent::VoltageChanged { volts });
        Ok(())
    }

    /// Alterna LRS/HRS de uma célula do crossbar
    pub fn toggle_crossbar_resistance(
        &mut self,
        row: usize,
        col: usize,
    ) -> OrchestrationResult<ResistanceLevel> {
        let level = match self.crossbar.toggle_resistance(row, col) {
            Ok(level) => level,
            Err(err) => return Err(self.reject("toggle_crossbar_resistance", err.into())),
        };
        self.emit_crossbar_cell(row, col)?;
        Ok(level)
    }

    /// Alterna o seletor de uma célula do crossbar
    pub fn toggle_crossbar_selector(&mut self, row: usize, col: usize) -> OrchestrationResult<bool> {
        let enabled = match self.crossbar.toggle_selector(row, col) {
            Ok(enabled) => enabled,
            Err(err) => return Err(self.reject("toggle_crossbar_selector", err.into())),
        };
        self.emit_crossbar_cell(row, col)?;
        Ok(enabled)
    }

    /// Toggle manual de uma célula lógica (histórico `SET`)
    pub fn toggle_logic_cell(&mut self, coord: Coord) -> OrchestrationResult<bool> {
        let value = match self.grid.toggle(coord) {
            Ok(value) => value,
            Err(err) => return Err(self.reject("toggle_logic_cell", err.into())),
        };
        if self.config.mirror_logic_to_crossbar {
            self.mirror_logic();
        }
        self.emit(SimEvent::LogicCellToggled {
            row: coord.row,
            col: coord.col,
            value,
        });
        Ok(value)
    }

    /// Cancela a execução, zera a grade e devolve o crossbar ao estado inicial
    pub fn reset(&mut self) -> OrchestrationResult<()> {
        let (rows, cols) = self.gate.dimensions();
        self.grid.reset(rows, cols)?;
        self.interrupt_run();
        self.replay.reset();
        self.crossbar.reset();
        self.last_run = None;
        tracing::info!(gate = self.gate.name(), "session reset");
        self.emit(SimEvent::Reset);
        Ok(())
    }

    // ─── Execução ───────────────────────────────────────────────

    /// Prepara a grade e inicia o replay; handles anteriores ficam obsoletos
    pub fn start_run(&mut self) -> OrchestrationResult<RunHandle> {
        let (rows, cols) = self.gate.dimensions();
        self.grid.reset(rows, cols)?;
        self.grid.set_state(INPUT_A, self.inputs.a)?;
        if self.gate.arity() >= 2 {
            self.grid.set_state(INPUT_B, self.inputs.b)?;
        }

        self.interrupt_run();
        let program = self.gate.instructions(self.inputs);
        let steps = program.len();
        let handle = self.replay.start(program);
        self.last_run = None;
        if self.config.mirror_logic_to_crossbar {
            self.remirror_logic();
        }

        tracing::info!(
            gate = self.gate.name(),
            a = self.inputs.a,
            b = self.inputs.b,
            generation = handle.generation(),
            steps,
            "run started"
        );
        self.emit(SimEvent::RunStarted {
            gate: self.gate.name().to_string(),
            generation: handle.generation(),
            steps,
        });

        if self.replay.state() == ReplayState::Done {
            self.finish_run(handle)?;
        }
        Ok(handle)
    }

    /// Aplica uma instrução da execução identificada por `handle`
    ///
    /// Handles obsoletos e execuções encerradas não alteram nada.
    pub fn tick(&mut self, handle: RunHandle) -> OrchestrationResult<StepOutcome> {
        let outcome = match self.replay.advance(handle, &mut self.grid) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.emit(SimEvent::RunCancelled {
                    generation: handle.generation(),
                });
                return Err(self.reject("tick", err.into()));
            }
        };

        if let StepOutcome::Applied { step, done } = outcome {
            if self.config.mirror_logic_to_crossbar {
                self.mirror_logic();
            }
            let instruction = self
                .replay
                .program()
                .get(step)
                .map(ToString::to_string)
                .unwrap_or_default();
            self.emit(SimEvent::StepApplied {
                generation: handle.generation(),
                step,
                instruction,
            });
            if done {
                self.finish_run(handle)?;
            }
        }
        Ok(outcome)
    }

    /// Cancela a execução em andamento; retorna se havia uma
    pub fn cancel_run(&mut self) -> bool {
        let was_running = self.interrupt_run();
        if was_running {
            self.replay.cancel();
        }
        was_running
    }

    /// Executa a porta ativa do início ao fim, pausando entre instruções
    pub fn run_to_completion(&mut self, scheduler: &mut Scheduler) -> OrchestrationResult<GateRun> {
        let handle = self.start_run()?;

        while self.replay.is_running() {
            scheduler.wait_for_next_tick();
            let started = Instant::now();
            let outcome = self.tick(handle)?;
            scheduler.record_step_time(started.elapsed());
            if !matches!(outcome, StepOutcome::Applied { .. }) {
                break;
            }
        }

        self.last_run
            .clone()
            .filter(|run| run.generation == handle.generation())
            .ok_or_else(|| {
                OrchestrationError::RunInterrupted(format!(
                    "run {} ended in state {:?}",
                    handle.generation(),
                    self.replay.state()
                ))
            })
    }

    // ─── Estado derivado ────────────────────────────────────────

    /// Recalcula tudo que é exibido a partir do estado atual
    pub fn derive_state(&self) -> DerivedState {
        let reference_output = self.gate.evaluate(self.inputs);
        let simulation = self.crossbar.simulate(&self.drive, &self.policy);

        DerivedState {
            gate: self.gate.info(),
            inputs: self.inputs,
            reference_output,
            snapshot: self.grid.snapshot(),
            instructions: self.current_instructions(),
            active_step: self.replay.active_step(),
            replay: self.replay.state(),
            last_run: self.last_run.clone(),
            crossbar: *self.crossbar.cells(),
            drive: self.drive,
            electrical_output: simulation.output,
            agreement: simulation.output == reference_output,
            simulation,
            comparison: self.comparison.get(self.gate.name()).cloned(),
        }
    }

    /// Programa em replay, ou o da porta ativa para as entradas atuais
    fn current_instructions(&self) -> Vec<Instruction> {
        if self.replay.program().is_empty() {
            self.gate.instructions(self.inputs)
        } else {
            self.replay.program().to_vec()
        }
    }

    // ─── Internos ───────────────────────────────────────────────

    fn finish_run(&mut self, handle: RunHandle) -> OrchestrationResult<()> {
        let target = self.gate.output_cell();
        let interpreted = self.grid.get_state(target)?;
        let output = self.gate.evaluate(self.inputs);
        self.grid.commit_reference(target, output)?;
        if self.config.mirror_logic_to_crossbar {
            self.mirror_logic();
        }

        let run = GateRun {
            gate: self.gate.name().to_string(),
            inputs: self.inputs,
            output,
            interpreted,
            steps: self.replay.program().len(),
            generation: handle.generation(),
        };
        if run.interpreter_agrees() {
            tracing::info!(gate = %run.gate, output, "run finished");
        } else {
            tracing::warn!(gate = %run.gate, output, interpreted, "interpreter disagrees with truth function");
        }
        self.emit(SimEvent::RunFinished {
            gate: run.gate.clone(),
            generation: run.generation,
            output,
            interpreted,
        });
        self.last_run = Some(run);
        Ok(())
    }

    /// Publica `RunCancelled` se houver execução em andamento
    fn interrupt_run(&mut self) -> bool {
        if !self.replay.is_running() {
            return false;
        }
        let generation = self.replay.generation();
        tracing::debug!(generation, "run interrupted");
        self.emit(SimEvent::RunCancelled { generation });
        true
    }

    fn mirror_logic(&mut self) {
        let snapshot = self.grid.snapshot();
        self.crossbar
            .load_bits(snapshot.iter().map(|(coord, bit)| ((coord.row, coord.col), bit)));
    }

    /// Espelha a grade a partir de um crossbar todo em HRS
    ///
    /// Células fora da grade atual não guardam bits de portas anteriores.
    fn remirror_logic(&mut self) {
        self.crossbar.clear_resistances();
        self.mirror_logic();
    }

    fn emit_crossbar_cell(&mut self, row: usize, col: usize) -> OrchestrationResult<()> {
        let cell = *self.crossbar.cell(row, col).map_err(OrchestrationError::from)?;
        self.emit(SimEvent::CrossbarCellChanged {
            row,
            col,
            resistance: cell.resistance,
            selector: cell.selector,
        });
        Ok(())
    }

    fn reject(&self, operation: &str, err: OrchestrationError) -> OrchestrationError {
        tracing::warn!(operation, error = %err, "operation rejected");
        self.emit(SimEvent::Rejected {
            operation: operation.to_string(),
            reason: err.to_string(),
        });
        err
    }

    fn emit(&self, event: SimEvent) {
        if let Err(err) = self.events.emit(event) {
            tracing::warn!(error = %err, "event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        let config = SimConfig {
            step_delay_ms: 0,
            ..SimConfig::default()
        };
        Session::new(config).unwrap()
    }

    fn run(session: &mut Session) -> GateRun {
        session.run_to_completion(&mut Scheduler::best_effort()).unwrap()
    }

    #[test]
    fn test_default_gate() {
        let s = session();
        assert_eq!(s.gate().name(), "AND");
        assert_eq!(s.grid().dimensions(), (1, 3));
        assert_eq!(s.replay_state(), ReplayState::Idle);
    }

    #[test]
    fn test_and_scenario() {
        let mut s = session();
        s.set_inputs(true, false).unwrap();
        assert!(!run(&mut s).output);
        s.set_inputs(true, true).unwrap();
        let result = run(&mut s);
        assert!(result.output);
        assert_eq!(result.steps, 4);
    }

    #[test]
    fn test_not_scenario() {
        let mut s = session();
        s.select_gate("NOT").unwrap();
        s.set_inputs(true, false).unwrap();
        assert!(!run(&mut s).output);
        s.set_inputs(false, false).unwrap();
        let result = run(&mut s);
        assert!(result.output);
        assert_eq!(result.steps, 2);
    }

    #[test]
    fn test_unknown_gate_fails_closed() {
        let mut s = session();
        s.set_inputs(true, true).unwrap();
        run(&mut s);
        let before = s.derive_state();

        let err = s.select_gate("MAJ").unwrap_err();
        assert!(matches!(err, OrchestrationError::Gate(_)));
        assert_eq!(s.derive_state(), before);
    }

    #[test]
    fn test_reselect_mid_run_resets_grid_and_stales_handle() {
        let mut s = session();
        s.set_inputs(true, true).unwrap();
        let handle = s.start_run().unwrap();
        s.tick(handle).unwrap();
        s.tick(handle).unwrap();

        s.select_gate("XOR").unwrap();
        assert_eq!(s.grid().dimensions(), (2, 4));
        assert_eq!(s.grid().snapshot().count_ones(), 0);

        assert_eq!(s.tick(handle).unwrap(), StepOutcome::Stale);
        assert_eq!(s.grid().snapshot().count_ones(), 0);
    }

    #[test]
    fn test_stale_handle_after_restart() {
        let mut s = session();
        s.set_inputs(true, true).unwrap();
        let old = s.start_run().unwrap();
        let new = s.start_run().unwrap();
        let before = s.grid().snapshot();

        assert_eq!(s.tick(old).unwrap(), StepOutcome::Stale);
        assert_eq!(s.grid().snapshot(), before);
        assert!(matches!(s.tick(new).unwrap(), StepOutcome::Applied { step: 0, .. }));
    }

    #[test]
    fn test_done_run_rejects_ticks() {
        let mut s = session();
        let handle = s.start_run().unwrap();
        while s.is_running() {
            s.tick(handle).unwrap();
        }
        assert_eq!(
            s.tick(handle).unwrap(),
            StepOutcome::Inactive(ReplayState::Done)
        );
    }

    #[test]
    fn test_cancel_run() {
        let mut s = session();
        let handle = s.start_run().unwrap();
        assert!(s.cancel_run());
        assert!(!s.cancel_run());
        assert_eq!(s.replay_state(), ReplayState::Cancelled);
        assert_eq!(s.tick(handle).unwrap(), StepOutcome::Stale);
        assert!(s.last_run().is_none());
    }

    #[test]
    fn test_output_cell_holds_reference_after_run() {
        let mut s = session();
        s.select_gate("xnor").unwrap();
        s.set_inputs(false, true).unwrap();
        let result = run(&mut s);
        assert!(!result.output);
        assert!(result.interpreter_agrees());
        let out = s.gate().output_cell();
        assert_eq!(s.grid().get_state(out).unwrap(), result.output);
        let history = s.grid().history(out).unwrap();
        assert_eq!(history.last().unwrap().op.to_string(), "REF");
    }

    #[test]
    fn test_mirror_maps_bits_to_resistance() {
        let mut s = session();
        s.set_inputs(true, true).unwrap();
        run(&mut s);
        // AND(1,1): (0,0) e (0,1) invertidas para 0, saída 1
        let cells = s.crossbar().cells();
        assert_eq!(cells[0][0].resistance, ResistanceLevel::High);
        assert_eq!(cells[0][1].resistance, ResistanceLevel::High);
        assert_eq!(cells[0][2].resistance, ResistanceLevel::Low);
    }

    #[test]
    fn test_mirror_disabled_leaves_crossbar() {
        let config = SimConfig {
            step_delay_ms: 0,
            mirror_logic_to_crossbar: false,
            ..SimConfig::default()
        };
        let mut s = Session::new(config).unwrap();
        s.set_inputs(true, true).unwrap();
        run(&mut s);
        assert_eq!(s.crossbar(), &Crossbar::default());
    }

    #[test]
    fn test_derived_state_electrical_readout() {
        let mut s = session();
        s.set_inputs(true, false).unwrap();
        let state = s.derive_state();
        // Crossbar inicial em HRS: 1 V / 100 kΩ fica abaixo do limiar
        assert!(!state.electrical_output);
        assert!(!state.reference_output);
        assert!(state.agreement);
        assert_eq!(state.instructions.len(), 4);

        s.toggle_crossbar_resistance(0, 0).unwrap();
        let state = s.derive_state();
        assert!(state.electrical_output);
        assert!(!state.agreement);
        assert!(state.comparison.is_some());
    }

    #[test]
    fn test_invalid_voltage_is_rejected() {
        let mut s = session();
        assert!(s.set_drive_voltage(-1.0).is_err());
        assert_eq!(s.derive_state().drive.voltage(), 1.0);
        s.set_drive_voltage(2.5).unwrap();
        assert_eq!(s.derive_state().simulation.v_drive, 2.5);
    }

    #[test]
    fn test_out_of_bounds_toggles_are_errors() {
        let mut s = session();
        assert!(s.toggle_crossbar_selector(4, 0).is_err());
        assert!(s.toggle_logic_cell(Coord::new(0, 3)).is_err());
        assert!(s.toggle_logic_cell(Coord::new(0, 2)).unwrap());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut s = session();
        s.set_inputs(true, true).unwrap();
        run(&mut s);
        s.toggle_crossbar_selector(3, 3).unwrap();
        s.reset().unwrap();

        assert_eq!(s.grid().snapshot().count_ones(), 0);
        assert_eq!(s.crossbar().cells(), Crossbar::default().cells());
        assert!(s.last_run().is_none());
        assert_eq!(s.replay_state(), ReplayState::Idle);
    }
}
