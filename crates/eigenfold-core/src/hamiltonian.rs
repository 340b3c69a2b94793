//! Pauli Hamiltonians and the QUBO → Ising conversion.
//!
//! A Hamiltonian is a sum of weighted Pauli strings:
//!
//! ```text
//! H = Σ_k c_k · P_k
//! ```
//!
//! Folding Hamiltonians only ever contain `I` and `Z`, so they are diagonal
//! in the computational basis and can be evaluated directly on a bitstring.
//! Binary variables map to spins through `b = (1 - Z) / 2`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{FoldError, FoldResult};
use crate::layout::{BitOrder, VariableLayout};
use crate::qubo::Qubo;

/// Coefficients with magnitude at or below this are dropped.
pub const COEFFICIENT_TOLERANCE: f64 = 1e-12;

/// Normalization is skipped when the largest coefficient is at or below this.
pub const NORMALIZE_THRESHOLD: f64 = 1e-8;

/// A single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity operator.
    I,
    /// Pauli-X operator.
    X,
    /// Pauli-Y operator.
    Y,
    /// Pauli-Z operator.
    Z,
}

impl Pauli {
    /// Single-character label.
    pub fn symbol(&self) -> char {
        match self {
            Pauli::I => 'I',
            Pauli::X => 'X',
            Pauli::Y => 'Y',
            Pauli::Z => 'Z',
        }
    }

    /// Parse a single-character label.
    pub fn from_symbol(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'I' => Some(Pauli::I),
            'X' => Some(Pauli::X),
            'Y' => Some(Pauli::Y),
            'Z' => Some(Pauli::Z),
            _ => None,
        }
    }
}

impl std::fmt::Display for Pauli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A tensor product of Pauli operators.
///
/// Stored as non-identity `(qubit, op)` pairs sorted by qubit; qubits not
/// listed are implicitly `I`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PauliString {
    ops: Vec<(usize, Pauli)>,
}

impl PauliString {
    /// Construct from `(qubit, op)` pairs, dropping identities.
    pub fn from_ops(ops: impl IntoIterator<Item = (usize, Pauli)>) -> Self {
        let mut v: Vec<(usize, Pauli)> = ops.into_iter().filter(|(_, op)| *op != Pauli::I).collect();
        v.sort_by_key(|(q, _)| *q);
        Self { ops: v }
    }

    /// The all-identity string.
    pub fn identity() -> Self {
        Self { ops: vec![] }
    }

    /// `Z` on one qubit.
    pub fn z(qubit: usize) -> Self {
        Self::from_ops([(qubit, Pauli::Z)])
    }

    /// `Z ⊗ Z` on two qubits.
    pub fn zz(q0: usize, q1: usize) -> Self {
        Self::from_ops([(q0, Pauli::Z), (q1, Pauli::Z)])
    }

    /// Non-identity `(qubit, op)` pairs, sorted by qubit.
    pub fn ops(&self) -> &[(usize, Pauli)] {
        &self.ops
    }

    /// True for the all-identity string.
    pub fn is_identity(&self) -> bool {
        self.ops.is_empty()
    }

    /// True if the string only contains `Z` operators.
    pub fn is_diagonal(&self) -> bool {
        self.ops.iter().all(|(_, op)| *op == Pauli::Z)
    }

    /// Highest qubit index referenced.
    pub fn max_qubit(&self) -> Option<usize> {
        self.ops.last().map(|(q, _)| *q)
    }

    /// Render as an `n`-character label, most significant qubit first.
    pub fn label(&self, n: usize) -> String {
        let mut chars = vec!['I'; n];
        for &(q, op) in &self.ops {
            chars[BitOrder::position(q, n)] = op.symbol();
        }
        chars.into_iter().collect()
    }

    /// Parse an `n`-character label written most significant qubit first.
    pub fn from_label(label: &str) -> FoldResult<Self> {
        let chars: Vec<char> = label.chars().collect();
        let n = chars.len();
        let mut ops = Vec::new();
        for (pos, &c) in chars.iter().enumerate() {
            let op = Pauli::from_symbol(c).ok_or(FoldError::BitstringCharacter(c))?;
            ops.push((n - 1 - pos, op));
        }
        Ok(Self::from_ops(ops))
    }

    /// Eigenvalue of a diagonal string on a basis state (`true` = `|1⟩`).
    ///
    /// Returns `None` if the string contains `X` or `Y`.
    pub fn diagonal_value(&self, bits: &[bool]) -> Option<f64> {
        let mut value = 1.0;
        for &(q, op) in &self.ops {
            match op {
                Pauli::I => {}
                Pauli::Z => {
                    if bits[q] {
                        value = -value;
                    }
                }
                Pauli::X | Pauli::Y => return None,
            }
        }
        Some(value)
    }
}

/// A single weighted term `coefficient · pauli`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauliTerm {
    /// Real coefficient.
    pub coefficient: f64,
    /// The Pauli string.
    pub pauli: PauliString,
}

impl PauliTerm {
    /// Create a new term.
    pub fn new(coefficient: f64, pauli: PauliString) -> Self {
        Self { coefficient, pauli }
    }

    /// Scalar term.
    pub fn identity(coefficient: f64) -> Self {
        Self::new(coefficient, PauliString::identity())
    }

    /// Single-qubit Z term.
    pub fn z(coefficient: f64, qubit: usize) -> Self {
        Self::new(coefficient, PauliString::z(qubit))
    }

    /// ZZ coupling term.
    pub fn zz(coefficient: f64, q0: usize, q1: usize) -> Self {
        Self::new(coefficient, PauliString::zz(q0, q1))
    }

    /// True for a scalar term.
    pub fn is_identity(&self) -> bool {
        self.pauli.is_identity()
    }
}

impl std::fmt::Display for PauliTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.coefficient >= 0.0 {
            write!(f, "+{:.6} ", self.coefficient)?;
        } else {
            write!(f, "{:.6} ", self.coefficient)?;
        }

        if self.pauli.is_identity() {
            write!(f, "I")?;
        } else {
            for (i, (qubit, pauli)) in self.pauli.ops().iter().enumerate() {
                if i > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{pauli}[{qubit}]")?;
            }
        }
        Ok(())
    }
}

/// A Hamiltonian over a fixed number of qubits.
///
/// `constant` is an energy offset kept outside the operator (it is not the
/// identity term). `scale` is the factor every coefficient and the constant
/// were divided by during normalization; `1.0` when not normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PauliHamiltonian {
    num_qubits: usize,
    terms: Vec<PauliTerm>,
    constant: f64,
    scale: f64,
}

impl PauliHamiltonian {
    /// Create a Hamiltonian from terms.
    ///
    /// Fails if any term acts on a qubit at or above `num_qubits`.
    pub fn new(num_qubits: usize, terms: Vec<PauliTerm>) -> FoldResult<Self> {
        if let Some(qubit) = terms
            .iter()
            .filter_map(|t| t.pauli.max_qubit())
            .find(|&q| q >= num_qubits)
        {
            return Err(FoldError::QubitOutOfRange { qubit, num_qubits });
        }
        Ok(Self {
            num_qubits,
            terms,
            constant: 0.0,
            scale: 1.0,
        })
    }

    /// Attach an energy offset.
    pub fn with_constant(mut self, constant: f64) -> Self {
        self.constant = constant;
        self
    }

    /// Number of qubits the labels span.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// All terms.
    pub fn terms(&self) -> &[PauliTerm] {
        &self.terms
    }

    /// Number of terms.
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// Energy offset carried next to the operator.
    pub fn constant(&self) -> f64 {
        self.constant
    }

    /// Normalization factor (`1.0` if never normalized).
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Sum of identity-term coefficients.
    pub fn identity_coefficient(&self) -> f64 {
        self.terms
            .iter()
            .filter(|t| t.is_identity())
            .map(|t| t.coefficient)
            .sum()
    }

    /// Non-identity terms.
    pub fn non_identity_terms(&self) -> impl Iterator<Item = &PauliTerm> {
        self.terms.iter().filter(|t| !t.is_identity())
    }

    /// Largest coefficient magnitude.
    pub fn max_abs_coefficient(&self) -> f64 {
        self.terms
            .iter()
            .map(|t| t.coefficient.abs())
            .fold(0.0, f64::max)
    }

    /// True if every term is built from `I` and `Z` only.
    pub fn is_diagonal(&self) -> bool {
        self.terms.iter().all(|t| t.pauli.is_diagonal())
    }

    /// Divide every coefficient and the constant by the largest coefficient
    /// magnitude, if it exceeds [`NORMALIZE_THRESHOLD`].
    ///
    /// Returns the factor applied. Repeated calls compose into [`Self::scale`].
    pub fn normalize(&mut self) -> f64 {
        let max = self.max_abs_coefficient();
        if max <= NORMALIZE_THRESHOLD {
            return 1.0;
        }
        for term in &mut self.terms {
            term.coefficient /= max;
        }
        self.constant /= max;
        self.scale *= max;
        max
    }

    /// Labels with their coefficients, most significant qubit first.
    pub fn label_map(&self) -> BTreeMap<String, f64> {
        let mut map = BTreeMap::new();
        for term in &self.terms {
            *map.entry(term.pauli.label(self.num_qubits)).or_insert(0.0) += term.coefficient;
        }
        map
    }

    /// Operator expectation on a basis state, excluding `constant`.
    ///
    /// Non-diagonal terms contribute nothing on a basis state.
    pub fn diagonal_energy(&self, bits: &[bool]) -> f64 {
        self.terms
            .iter()
            .filter_map(|t| t.pauli.diagonal_value(bits).map(|v| v * t.coefficient))
            .sum()
    }

    /// Operator expectation on a measured bitstring, excluding `constant`.
    pub fn bitstring_energy(&self, bitstring: &str) -> FoldResult<f64> {
        let bits = BitOrder::parse_bits(bitstring, self.num_qubits)?;
        Ok(self.diagonal_energy(&bits))
    }

    /// Diagonal of the operator over every basis state, indexed by basis
    /// state (bit `q` of the index is qubit `q`).
    pub fn diagonal(&self) -> Vec<f64> {
        let n = self.num_qubits;
        let mut bits = vec![false; n];
        (0..(1usize << n))
            .map(|index| {
                for (q, bit) in bits.iter_mut().enumerate() {
                    *bit = (index >> q) & 1 == 1;
                }
                self.diagonal_energy(&bits)
            })
            .collect()
    }

    /// Convert an operator eigenvalue of this (possibly normalized)
    /// Hamiltonian back to the units of the source objective, including the
    /// constant offset.
    pub fn physical_energy(&self, operator_value: f64) -> f64 {
        (operator_value + self.constant) * self.scale
    }
}

impl std::fmt::Display for PauliHamiltonian {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Hamiltonian ({} terms, {} qubits, constant {:.6}, scale {:.6}):",
            self.num_terms(),
            self.num_qubits,
            self.constant,
            self.scale
        )?;
        for term in &self.terms {
            writeln!(f, "  {term}")?;
        }
        Ok(())
    }
}

/// Accumulates Pauli coefficients by string.
#[derive(Debug, Default)]
struct PauliAccumulator {
    terms: BTreeMap<PauliString, f64>,
}

impl PauliAccumulator {
    fn add(&mut self, pauli: PauliString, coeff: f64) {
        *self.terms.entry(pauli).or_insert(0.0) += coeff;
    }

    fn into_terms(self) -> Vec<PauliTerm> {
        self.terms
            .into_iter()
            .filter(|(_, c)| c.abs() > COEFFICIENT_TOLERANCE)
            .map(|(p, c)| PauliTerm::new(c, p))
            .collect()
    }
}

/// Convert a QUBO into a Z-only Hamiltonian via `b_i = (1 - Z_i) / 2`.
///
/// The QUBO constant travels as the Hamiltonian's [`constant`]. When
/// `normalize` is set the result is rescaled so the largest coefficient has
/// magnitude 1.
///
/// [`constant`]: PauliHamiltonian::constant
pub fn qubo_to_pauli(
    qubo: &Qubo,
    layout: &VariableLayout,
    normalize: bool,
) -> FoldResult<PauliHamiltonian> {
    let n = layout.num_variables();
    if qubo.num_variables() != n {
        return Err(FoldError::LayoutMismatch(format!(
            "QUBO has {} variables, layout has {}",
            qubo.num_variables(),
            n
        )));
    }

    let mut acc = PauliAccumulator::default();

    for (&i, &c) in qubo.linear() {
        acc.add(PauliString::identity(), 0.5 * c);
        acc.add(PauliString::z(i), -0.5 * c);
    }

    for (&(i, j), &c) in qubo.quadratic() {
        acc.add(PauliString::identity(), 0.25 * c);
        acc.add(PauliString::z(i), -0.25 * c);
        acc.add(PauliString::z(j), -0.25 * c);
        acc.add(PauliString::zz(i, j), 0.25 * c);
    }

    let mut hamiltonian = PauliHamiltonian::new(n, acc.into_terms())?.with_constant(qubo.constant());
    if normalize {
        let factor = hamiltonian.normalize();
        tracing::debug!(factor, "normalized Hamiltonian");
    }
    tracing::debug!(
        qubits = n,
        terms = hamiltonian.num_terms(),
        "converted QUBO to Pauli Hamiltonian"
    );
    Ok(hamiltonian)
}
