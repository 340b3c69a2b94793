//! Tests for lattice generation, sizing and adjacency.

use eigenfold_core::lattice::{
    Lattice, LatticeDims, LatticeType, build_adjacency, build_lattice, choose_lattice_dims,
    manhattan,
};
use eigenfold_core::FoldError;
use proptest::prelude::*;

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

#[test]
fn site_counts_follow_basis_size() {
    let dims = LatticeDims::new(2, 2, 2);
    assert_eq!(build_lattice(dims, LatticeType::Sc).len(), 8);
    assert_eq!(build_lattice(dims, LatticeType::Bcc).len(), 16);
    assert_eq!(build_lattice(dims, LatticeType::Fcc).len(), 32);
    assert_eq!(build_lattice(dims, LatticeType::Hcp).len(), 16);
}

#[test]
fn generation_order_is_x_then_y_then_z() {
    let coords = build_lattice(LatticeDims::new(2, 2, 2), LatticeType::Sc);
    assert_eq!(coords[0], [0.0, 0.0, 0.0]);
    assert_eq!(coords[1], [0.0, 0.0, 1.0]);
    assert_eq!(coords[2], [0.0, 1.0, 0.0]);
    assert_eq!(coords[4], [1.0, 0.0, 0.0]);
    assert_eq!(coords[7], [1.0, 1.0, 1.0]);
}

#[test]
fn basis_offsets_are_interleaved_per_cell() {
    let coords = build_lattice(LatticeDims::new(1, 1, 2), LatticeType::Bcc);
    assert_eq!(
        coords,
        vec![
            [0.0, 0.0, 0.0],
            [0.5, 0.5, 0.5],
            [0.0, 0.0, 1.0],
            [0.5, 0.5, 1.5],
        ]
    );
}

#[test]
fn generation_is_deterministic() {
    for structure in LatticeType::ALL {
        let dims = LatticeDims::new(2, 3, 2);
        assert_eq!(build_lattice(dims, structure), build_lattice(dims, structure));
    }
}

#[test]
fn structure_tags_round_trip() {
    for structure in LatticeType::ALL {
        assert_eq!(structure.tag().parse::<LatticeType>().unwrap(), structure);
    }
    assert!(matches!(
        "diamond".parse::<LatticeType>(),
        Err(FoldError::UnknownStructure(_))
    ));
}

// ---------------------------------------------------------------------------
// Sizing
// ---------------------------------------------------------------------------

#[test]
fn dims_for_small_chains() {
    // ceil(2 * 1.3) = 3 cells -> 1 x 1 x 3
    assert_eq!(choose_lattice_dims(2, 1.3).unwrap(), LatticeDims::new(1, 1, 3));
    // ceil(3 * 1.3) = 4 cells -> 2 x 2 x 1
    assert_eq!(choose_lattice_dims(3, 1.3).unwrap(), LatticeDims::new(2, 2, 1));
    // ceil(10 * 1.3) = 13 cells -> 3 x 3 x 2
    assert_eq!(choose_lattice_dims(10, 1.3).unwrap(), LatticeDims::new(3, 3, 2));
}

#[test]
fn dims_reject_degenerate_inputs() {
    assert!(choose_lattice_dims(0, 1.3).is_err());
    assert!(choose_lattice_dims(4, 0.0).is_err());
    assert!(choose_lattice_dims(4, f64::NAN).is_err());
}

#[test]
fn chain_lattice_has_room_for_every_residue() {
    for structure in LatticeType::ALL {
        for residues in 1..12 {
            let lattice = Lattice::for_chain(residues, 1.3, structure).unwrap();
            assert!(lattice.num_sites() >= residues);
            assert_eq!(lattice.adjacency().len(), lattice.num_sites());
        }
    }
}

// ---------------------------------------------------------------------------
// Adjacency
// ---------------------------------------------------------------------------

#[test]
fn sc_center_has_six_neighbors() {
    let coords = build_lattice(LatticeDims::new(3, 3, 3), LatticeType::Sc);
    let adjacency = build_adjacency(&coords);
    let center = coords
        .iter()
        .position(|c| *c == [1.0, 1.0, 1.0])
        .unwrap();
    assert_eq!(adjacency.neighbors(center).len(), 6);
    // corner
    assert_eq!(adjacency.neighbors(0).len(), 3);
}

#[test]
fn bcc_body_center_is_not_a_manhattan_neighbor() {
    let coords = build_lattice(LatticeDims::new(1, 1, 1), LatticeType::Bcc);
    assert_eq!(manhattan(&coords[0], &coords[1]), 1.5);
    let adjacency = build_adjacency(&coords);
    assert!(!adjacency.are_adjacent(0, 1));
}

#[test]
fn fcc_face_centers_touch_the_corner() {
    let coords = build_lattice(LatticeDims::new(1, 1, 1), LatticeType::Fcc);
    let adjacency = build_adjacency(&coords);
    for face in 1..4 {
        assert!(adjacency.are_adjacent(0, face));
    }
}

fn arb_structure() -> impl Strategy<Value = LatticeType> {
    prop_oneof![
        Just(LatticeType::Sc),
        Just(LatticeType::Bcc),
        Just(LatticeType::Fcc),
        Just(LatticeType::Hcp),
    ]
}

proptest! {
    #[test]
    fn adjacency_is_symmetric_without_self_loops(
        structure in arb_structure(),
        nx in 1usize..=3,
        ny in 1usize..=3,
        nz in 1usize..=3,
    ) {
        let coords = build_lattice(LatticeDims::new(nx, ny, nz), structure);
        let adjacency = build_adjacency(&coords);
        prop_assert_eq!(adjacency.len(), coords.len());
        for (i, neighbors) in adjacency.iter() {
            prop_assert!(!neighbors.contains(&i));
            for &j in neighbors {
                prop_assert!(adjacency.neighbors(j).contains(&i));
                prop_assert!((manhattan(&coords[i], &coords[j]) - 1.0).abs() < 1e-9);
            }
        }
    }
}
