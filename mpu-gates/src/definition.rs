//! Definição estática de uma porta

use crate::error::{GateError, GateResult};
use mpu_logic::{Coord, Instruction};
use serde::{Deserialize, Serialize};

/// Entradas lógicas A e B (B ignorada em portas de uma entrada)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GateInputs {
    pub a: bool,
    pub b: bool,
}

impl GateInputs {
    pub const fn new(a: bool, b: bool) -> Self {
        Self { a, b }
    }

    /// As quatro combinações, em ordem binária (00, 01, 10, 11)
    pub fn all() -> [GateInputs; 4] {
        [
            Self::new(false, false),
            Self::new(false, true),
            Self::new(true, false),
            Self::new(true, true),
        ]
    }
}

/// Gera a sequência de instruções para as entradas dadas
pub type InstructionGenerator = fn(GateInputs) -> Vec<Instruction>;

/// Função-verdade de referência `(A, B) → bit`
pub type TruthFunction = fn(bool, bool) -> bool;

/// Célula onde a entrada A é semeada
pub const INPUT_A: Coord = Coord::new(0, 0);

/// Célula onde a entrada B é semeada
pub const INPUT_B: Coord = Coord::new(0, 1);

/// Porta lógica do catálogo
///
/// A sequência de instruções serve à visualização; a corretude vem
/// exclusivamente de [`GateDefinition::evaluate`].
#[derive(Debug, Clone)]
pub struct GateDefinition {
    name: &'static str,
    description: &'static str,
    arity: u8,
    rows: usize,
    cols: usize,
    output: Coord,
    program: InstructionGenerator,
    truth: TruthFunction,
}

impl GateDefinition {
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        name: &'static str,
        description: &'static str,
        arity: u8,
        rows: usize,
        cols: usize,
        output: Coord,
        program: InstructionGenerator,
        truth: TruthFunction,
    ) -> Self {
        Self {
            name,
            description,
            arity,
            rows,
            cols,
            output,
            program,
            truth,
        }
    }

    /// Retorna nome canônico
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Retorna descrição
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// Número de entradas (1 ou 2)
    pub fn arity(&self) -> u8 {
        self.arity
    }

    /// Retorna dimensões da grade (linhas, colunas)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Retorna célula de saída
    pub fn output_cell(&self) -> Coord {
        self.output
    }

    /// Células semeadas com as entradas
    pub fn input_cells(&self) -> Vec<Coord> {
        if self.arity >= 2 {
            vec![INPUT_A, INPUT_B]
        } else {
            vec![INPUT_A]
        }
    }

    /// Instancia a sequência de instruções
    pub fn instructions(&self, inputs: GateInputs) -> Vec<Instruction> {
        (self.program)(inputs)
    }

    /// Resultado autoritativo
    pub fn evaluate(&self, inputs: GateInputs) -> bool {
        let b = if self.arity >= 2 { inputs.b } else { false };
        (self.truth)(inputs.a, b)
    }

    /// Tabela-verdade completa (2 ou 4 linhas)
    pub fn truth_table(&self) -> Vec<(GateInputs, bool)> {
        GateInputs::all()
            .into_iter()
            .filter(|inputs| self.arity >= 2 || !inputs.b)
            .map(|inputs| (inputs, self.evaluate(inputs)))
            .collect()
    }

    /// Verifica aridade, limites da saída e de todos os operandos
    pub fn validate(&self) -> GateResult<()> {
        let invalid = |reason: String| GateError::InvalidDefinition {
            gate: self.name.to_string(),
            reason,
        };

        if !(1..=2).contains(&self.arity) {
            return Err(invalid(format!("arity must be 1 or 2, got {}", self.arity)));
        }
        if self.rows == 0 || self.cols == 0 {
            return Err(invalid(format!("empty grid {}x{}", self.rows, self.cols)));
        }

        let in_bounds = |c: &Coord| c.row < self.rows && c.col < self.cols;
        if !in_bounds(&self.output) {
            return Err(invalid(format!("output {} outside grid", self.output)));
        }
        if let Some(cell) = self.input_cells().iter().find(|c| !in_bounds(*c)) {
            return Err(invalid(format!("input {} outside grid", cell)));
        }

        for inputs in GateInputs::all() {
            for instruction in self.instructions(inputs) {
                instruction
                    .validate()
                    .map_err(|e| invalid(e.to_string()))?;
                if let Some(operand) = instruction.operands().iter().find(|c| !in_bounds(*c)) {
                    return Err(invalid(format!(
                        "operand {} of `{}` outside grid",
                        operand, instruction
                    )));
                }
            }
        }
        Ok(())
    }

    /// Visão serializável da porta
    pub fn info(&self) -> GateInfo {
        GateInfo {
            name: self.name.to_string(),
            description: self.description.to_string(),
            arity: self.arity,
            rows: self.rows,
            cols: self.cols,
            output: self.output,
        }
    }
}

/// Resumo serializável de uma definição
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateInfo {
    pub name: String,
    pub description: String,
    pub arity: u8,
    pub rows: usize,
    pub cols: usize,
    pub output: Coord,
}
