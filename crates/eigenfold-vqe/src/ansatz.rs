//! Parameterized ansatz circuits.
//!
//! An ansatz is a parameterized circuit whose parameters are optimized
//! classically to minimize the expected energy. Both shapes here alternate
//! rotation layers with a linear chain of CZ gates.

use serde::{Deserialize, Serialize};

use crate::error::{VqeError, VqeResult};

/// A gate the statevector simulator understands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    /// Rotation about Y.
    Ry(usize, f64),
    /// Rotation about Z.
    Rz(usize, f64),
    /// Controlled-Z.
    Cz(usize, usize),
}

impl Gate {
    /// Largest qubit index the gate touches.
    pub fn max_qubit(&self) -> usize {
        match *self {
            Gate::Ry(q, _) | Gate::Rz(q, _) => q,
            Gate::Cz(a, b) => a.max(b),
        }
    }
}

/// Shape of the ansatz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnsatzKind {
    /// RY then RZ on every qubit per layer.
    #[default]
    HardwareEfficient,
    /// RY on every qubit per layer.
    TwoLocal,
}

impl AnsatzKind {
    /// Rotation parameters per qubit per layer.
    pub fn rotations_per_qubit(&self) -> usize {
        match self {
            AnsatzKind::HardwareEfficient => 2,
            AnsatzKind::TwoLocal => 1,
        }
    }

    /// Name used on the command line and in config files.
    pub fn name(&self) -> &'static str {
        match self {
            AnsatzKind::HardwareEfficient => "hardware_efficient",
            AnsatzKind::TwoLocal => "two_local",
        }
    }
}

impl std::fmt::Display for AnsatzKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for AnsatzKind {
    type Err = VqeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "hardware_efficient" | "hea" => Ok(AnsatzKind::HardwareEfficient),
            "two_local" | "twolocal" => Ok(AnsatzKind::TwoLocal),
            _ => Err(VqeError::UnknownAnsatz(s.to_string())),
        }
    }
}

/// An ansatz of a given shape, width and depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ansatz {
    pub kind: AnsatzKind,
    pub num_qubits: usize,
    /// Number of entangle-then-rotate repetitions after the first rotation layer.
    pub reps: usize,
}

impl Ansatz {
    /// Create an ansatz description.
    pub fn new(kind: AnsatzKind, num_qubits: usize, reps: usize) -> Self {
        Self {
            kind,
            num_qubits,
            reps,
        }
    }

    /// Total parameters: `rotations_per_qubit * num_qubits * (reps + 1)`.
    pub fn num_parameters(&self) -> usize {
        self.kind.rotations_per_qubit() * self.num_qubits * (self.reps + 1)
    }

    /// Bind `params` and emit the gate sequence.
    pub fn build(&self, params: &[f64]) -> VqeResult<Vec<Gate>> {
        let expected = self.num_parameters();
        if params.len() != expected {
            return Err(VqeError::ParameterCount {
                expected,
                actual: params.len(),
            });
        }

        let n = self.num_qubits;
        let per_layer = self.kind.rotations_per_qubit() * n;
        let mut gates = Vec::with_capacity(expected + self.reps * n.saturating_sub(1));
        let mut layers = params.chunks_exact(per_layer.max(1));

        // Initial rotation layer
        if let Some(layer) = layers.next() {
            self.rotation_layer(layer, &mut gates);
        }

        // Alternating entanglement and rotation layers
        for layer in layers {
            gates.extend((1..n).map(|q| Gate::Cz(q - 1, q)));
            self.rotation_layer(layer, &mut gates);
        }

        Ok(gates)
    }

    fn rotation_layer(&self, layer: &[f64], gates: &mut Vec<Gate>) {
        match self.kind {
            AnsatzKind::TwoLocal => {
                gates.extend(layer.iter().enumerate().map(|(q, &theta)| Gate::Ry(q, theta)));
            }
            AnsatzKind::HardwareEfficient => {
                for (q, pair) in layer.chunks_exact(2).enumerate() {
                    gates.push(Gate::Ry(q, pair[0]));
                    gates.push(Gate::Rz(q, pair[1]));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_counts() {
        assert_eq!(Ansatz::new(AnsatzKind::TwoLocal, 4, 2).num_parameters(), 12);
        assert_eq!(Ansatz::new(AnsatzKind::HardwareEfficient, 4, 2).num_parameters(), 24);
        assert_eq!(Ansatz::new(AnsatzKind::TwoLocal, 3, 0).num_parameters(), 3);
    }

    #[test]
    fn test_two_local_layout() {
        let ansatz = Ansatz::new(AnsatzKind::TwoLocal, 3, 1);
        let gates = ansatz.build(&[0.1, 0.2, 0.3, 0.4, 0.5, 0.6]).unwrap();
        assert_eq!(
            gates,
            vec![
                Gate::Ry(0, 0.1),
                Gate::Ry(1, 0.2),
                Gate::Ry(2, 0.3),
                Gate::Cz(0, 1),
                Gate::Cz(1, 2),
                Gate::Ry(0, 0.4),
                Gate::Ry(1, 0.5),
                Gate::Ry(2, 0.6),
            ]
        );
    }

    #[test]
    fn test_hardware_efficient_layout() {
        let ansatz = Ansatz::new(AnsatzKind::HardwareEfficient, 2, 1);
        let params: Vec<f64> = (0..8).map(f64::from).collect();
        let gates = ansatz.build(&params).unwrap();
        assert_eq!(gates.len(), 8 + 1);
        assert_eq!(gates[0], Gate::Ry(0, 0.0));
        assert_eq!(gates[1], Gate::Rz(0, 1.0));
        assert_eq!(gates[4], Gate::Cz(0, 1));
        assert_eq!(gates[8], Gate::Rz(1, 7.0));
    }

    #[test]
    fn test_single_qubit_has_no_entanglers() {
        let gates = Ansatz::new(AnsatzKind::TwoLocal, 1, 3)
            .build(&[0.0; 4])
            .unwrap();
        assert!(gates.iter().all(|g| !matches!(g, Gate::Cz(..))));
    }

    #[test]
    fn test_wrong_parameter_count() {
        let ansatz = Ansatz::new(AnsatzKind::TwoLocal, 2, 1);
        assert!(matches!(
            ansatz.build(&[0.0; 3]),
            Err(VqeError::ParameterCount { expected: 4, actual: 3 })
        ));
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!("two-local".parse::<AnsatzKind>().unwrap(), AnsatzKind::TwoLocal);
        assert_eq!(
            "HARDWARE_EFFICIENT".parse::<AnsatzKind>().unwrap(),
            AnsatzKind::HardwareEfficient
        );
        assert!("uccsd".parse::<AnsatzKind>().is_err());
    }
}
