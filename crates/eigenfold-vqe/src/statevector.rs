//! Dense statevector simulation.
//!
//! Basis index bit `q` is qubit `q`, matching the variable numbering of the
//! Hamiltonian, so `BitOrder::basis_state(index, n)` renders measurement
//! outcomes directly.

use std::collections::BTreeMap;

use eigenfold_core::{Pauli, PauliHamiltonian, PauliString};
use num_complex::Complex64;
use rand::Rng;

use crate::ansatz::Gate;
use crate::error::{VqeError, VqeResult};

/// Amplitudes of an `n`-qubit pure state.
#[derive(Debug, Clone, PartialEq)]
pub struct Statevector {
    num_qubits: usize,
    amplitudes: Vec<Complex64>,
}

impl Statevector {
    /// `|0…0⟩` on `num_qubits` qubits.
    pub fn zero_state(num_qubits: usize) -> Self {
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            num_qubits,
            amplitudes,
        }
    }

    /// Prepare `|0…0⟩` and apply `gates` in order.
    pub fn from_gates(num_qubits: usize, gates: &[Gate]) -> VqeResult<Self> {
        let mut state = Self::zero_state(num_qubits);
        for gate in gates {
            state.apply(gate)?;
        }
        Ok(state)
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Apply a single gate.
    pub fn apply(&mut self, gate: &Gate) -> VqeResult<()> {
        let q = gate.max_qubit();
        if q >= self.num_qubits {
            return Err(VqeError::QubitOutOfRange {
                qubit: q,
                num_qubits: self.num_qubits,
            });
        }

        let state = &mut self.amplitudes;
        match *gate {
            Gate::Ry(q, theta) => {
                let c = (theta / 2.0).cos();
                let s = (theta / 2.0).sin();
                let mask = 1 << q;
                for i in 0..state.len() {
                    if i & mask == 0 {
                        let j = i | mask;
                        let a = state[i];
                        let b = state[j];
                        state[i] = a * c - b * s;
                        state[j] = a * s + b * c;
                    }
                }
            }
            Gate::Rz(q, theta) => {
                let phase0 = Complex64::from_polar(1.0, -theta / 2.0);
                let phase1 = Complex64::from_polar(1.0, theta / 2.0);
                for (i, amp) in state.iter_mut().enumerate() {
                    if (i >> q) & 1 == 0 {
                        *amp *= phase0;
                    } else {
                        *amp *= phase1;
                    }
                }
            }
            Gate::Cz(q0, q1) => {
                for (i, amp) in state.iter_mut().enumerate() {
                    if (i >> q0) & 1 == 1 && (i >> q1) & 1 == 1 {
                        *amp = -*amp;
                    }
                }
            }
        }
        Ok(())
    }

    /// Measurement probability per basis index.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Squared norm; 1 for any state produced by unitary gates.
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.iter().map(|a| a.norm_sqr()).sum()
    }

    /// `⟨ψ|H|ψ⟩` for a diagonal operator given by its per-index values.
    pub fn diagonal_expectation(&self, diagonal: &[f64]) -> f64 {
        self.amplitudes
            .iter()
            .zip(diagonal)
            .map(|(a, d)| a.norm_sqr() * d)
            .sum()
    }

    /// `⟨ψ|H|ψ⟩` for an arbitrary Pauli Hamiltonian, excluding its constant.
    pub fn expectation(&self, hamiltonian: &PauliHamiltonian) -> f64 {
        hamiltonian
            .terms()
            .iter()
            .map(|term| term.coefficient * self.pauli_expectation(&term.pauli))
            .sum()
    }

    /// `⟨ψ|P|ψ⟩` for a single Pauli string.
    pub fn pauli_expectation(&self, pauli: &PauliString) -> f64 {
        let mut value = Complex64::new(0.0, 0.0);
        for (i, &amplitude) in self.amplitudes.iter().enumerate() {
            let (j, phase) = apply_pauli_string(i, pauli.ops());
            value += self.amplitudes[j].conj() * phase * amplitude;
        }
        value.re
    }

    /// Draw `shots` measurements, returning counts per basis index.
    pub fn sample<R: Rng>(&self, shots: u32, rng: &mut R) -> BTreeMap<usize, u32> {
        let mut cumulative = Vec::with_capacity(self.amplitudes.len());
        let mut total = 0.0;
        for a in &self.amplitudes {
            total += a.norm_sqr();
            cumulative.push(total);
        }

        let mut counts = BTreeMap::new();
        for _ in 0..shots {
            let r = rng.gen_range(0.0..total);
            let index = cumulative
                .partition_point(|&c| c <= r)
                .min(cumulative.len() - 1);
            *counts.entry(index).or_insert(0) += 1;
        }
        counts
    }
}

/// Apply a Pauli string to a basis state index.
/// Returns the new index and accumulated phase.
fn apply_pauli_string(index: usize, operators: &[(usize, Pauli)]) -> (usize, Complex64) {
    let mut new_index = index;
    let mut phase = Complex64::new(1.0, 0.0);

    for &(qubit, pauli) in operators {
        let bit = (index >> qubit) & 1;

        match pauli {
            Pauli::I => {}
            Pauli::X => {
                new_index ^= 1 << qubit;
            }
            Pauli::Y => {
                new_index ^= 1 << qubit;
                if bit == 0 {
                    phase *= Complex64::new(0.0, 1.0);
                } else {
                    phase *= Complex64::new(0.0, -1.0);
                }
            }
            Pauli::Z => {
                if bit == 1 {
                    phase = -phase;
                }
            }
        }
    }

    (new_index, phase)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use eigenfold_core::PauliTerm;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::f64::consts::PI;

    #[test]
    fn test_zero_state() {
        let state = Statevector::zero_state(3);
        assert_eq!(state.amplitudes().len(), 8);
        assert_eq!(state.probabilities()[0], 1.0);
    }

    #[test]
    fn test_ry_pi_flips_qubit() {
        let state = Statevector::from_gates(2, &[Gate::Ry(1, PI)]).unwrap();
        // qubit 1 set -> index 2
        assert_relative_eq!(state.probabilities()[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rz_preserves_probabilities() {
        let state = Statevector::from_gates(
            2,
            &[Gate::Ry(0, 1.1), Gate::Ry(1, -0.7), Gate::Rz(0, 0.9), Gate::Cz(0, 1)],
        )
        .unwrap();
        let before = Statevector::from_gates(2, &[Gate::Ry(0, 1.1), Gate::Ry(1, -0.7)]).unwrap();
        for (a, b) in state.probabilities().iter().zip(before.probabilities()) {
            assert_relative_eq!(*a, b, epsilon = 1e-12);
        }
        assert_relative_eq!(state.norm_sqr(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_expectation_matches_diagonal() {
        let h = PauliHamiltonian::new(
            2,
            vec![
                PauliTerm::identity(0.5),
                PauliTerm::z(1.0, 0),
                PauliTerm::zz(-2.0, 0, 1),
            ],
        )
        .unwrap();
        let state =
            Statevector::from_gates(2, &[Gate::Ry(0, 0.3), Gate::Ry(1, 2.0), Gate::Cz(0, 1)])
                .unwrap();
        assert_relative_eq!(
            state.expectation(&h),
            state.diagonal_expectation(&h.diagonal()),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_x_expectation() {
        // Ry(pi/2)|0> = |+>, <X> = 1
        let state = Statevector::from_gates(1, &[Gate::Ry(0, PI / 2.0)]).unwrap();
        let x = PauliString::from_ops([(0, Pauli::X)]);
        assert_relative_eq!(state.pauli_expectation(&x), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_range_gate() {
        let mut state = Statevector::zero_state(2);
        assert!(matches!(
            state.apply(&Gate::Cz(0, 2)),
            Err(VqeError::QubitOutOfRange { qubit: 2, .. })
        ));
    }

    #[test]
    fn test_sampling_respects_support() {
        let state = Statevector::from_gates(2, &[Gate::Ry(0, PI / 2.0)]).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let counts = state.sample(2000, &mut rng);
        assert_eq!(counts.values().sum::<u32>(), 2000);
        assert!(counts.keys().all(|&i| i == 0 || i == 1));
        let ones = counts.get(&1).copied().unwrap_or(0);
        assert!((800..1200).contains(&ones), "ones = {ones}");
    }
}
