//! Fixtures shared by the unit tests

use det::{Det, HalfDet, HubbardParams, HubbardSystem, Lattice, System};

pub fn ring_params(n_sites: u32, n_up: u32, n_dn: u32) -> HubbardParams {
    HubbardParams {
        lattice: Lattice::Chain {
            n_sites,
            periodic: true,
        },
        t: 1.0,
        u: 4.0,
        v: 0.25,
        onsite: Vec::new(),
        n_up,
        n_dn,
    }
}

fn half_dets(n_sites: u32, n_elecs: u32) -> Vec<HalfDet> {
    (0u64..(1 << n_sites))
        .filter(|mask| mask.count_ones() == n_elecs)
        .map(|mask| HalfDet::from_orbs((0..n_sites).filter(|&i| mask >> i & 1 == 1)))
        .collect()
}

/// A set-up space whose basis is the whole Hilbert space.
pub fn full_system(params: HubbardParams) -> HubbardSystem {
    let n_sites = params.lattice.n_sites();
    let (n_up, n_dn) = (params.n_up, params.n_dn);
    let mut system = HubbardSystem::new(params).unwrap();
    system.setup().unwrap();
    for up in half_dets(n_sites, n_up) {
        for dn in half_dets(n_sites, n_dn) {
            system.data_mut().push_det(Det::new(up.clone(), dn), 0.0).unwrap();
        }
    }
    system.update_diag_helper();
    system
}
