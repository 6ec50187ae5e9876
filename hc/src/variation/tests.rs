//! Tests for the variational driver

#[cfg(test)]
mod tests {
    use super::super::{Variation, VariationOptions};
    use crate::coordinator::{LocalGroup, SingleProcess};
    use crate::testing::full_system;
    use det::{HubbardParams, HubbardSystem, Lattice, System};
    use nalgebra::{DMatrix, SymmetricEigen};

    fn options() -> VariationOptions {
        VariationOptions {
            eps_schedule: vec![1e-2, 1e-4, 1e-6],
            dt: 0.05,
            max_steps: 20000,
            e_tol: 1e-13,
        }
    }

    fn open_chain(n_sites: u32, n_up: u32, n_dn: u32, v: f64) -> HubbardParams {
        HubbardParams {
            lattice: Lattice::Chain {
                n_sites,
                periodic: false,
            },
            t: 1.0,
            u: 4.0,
            v,
            onsite: Vec::new(),
            n_up,
            n_dn,
        }
    }

    fn lowest_eigenvalue(params: HubbardParams) -> f64 {
        let system = full_system(params);
        let dets = system.data().dets();
        let n = dets.len();
        let h = DMatrix::from_fn(n, n, |i, j| {
            system.get_hamiltonian_elem(&dets[i], &dets[j], dets[i].n_excite(&dets[j]))
        });
        SymmetricEigen::new(h).eigenvalues.min()
    }

    #[test]
    fn test_dimer_energy() {
        let mut system = HubbardSystem::new(open_chain(2, 1, 1, 0.0)).unwrap();
        system.setup().unwrap();
        let energy = Variation::new(&SingleProcess, options())
            .run(&mut system)
            .unwrap();

        // (U - sqrt(U^2 + 16 t^2)) / 2
        let exact = (4.0 - (16.0f64 + 16.0).sqrt()) / 2.0;
        assert!((energy - exact).abs() < 1e-8, "{} vs {}", energy, exact);
        assert_eq!(system.n_dets(), 4);
        assert!((system.data().energy_var - energy).abs() < 1e-15);

        let norm: f64 = system.data().coefs().iter().map(|c| c * c).sum();
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_chain_matches_exact_diagonalisation() {
        let params = open_chain(4, 1, 1, 0.5);
        let exact = lowest_eigenvalue(params.clone());

        let mut system = HubbardSystem::new(params).unwrap();
        system.setup().unwrap();
        let energy = Variation::new(&SingleProcess, options())
            .run(&mut system)
            .unwrap();
        assert!((energy - exact).abs() < 1e-7, "{} vs {}", energy, exact);
        assert!(energy <= system.data().energy_hf);
    }

    #[test]
    fn test_large_eps_keeps_reference() {
        let mut system = HubbardSystem::new(open_chain(4, 1, 1, 0.0)).unwrap();
        system.setup().unwrap();
        let hf = system.data().energy_hf;
        let energy = Variation::new(
            &SingleProcess,
            VariationOptions {
                eps_schedule: vec![10.0],
                ..options()
            },
        )
        .run(&mut system)
        .unwrap();
        assert_eq!(system.n_dets(), 1);
        assert!((energy - hf).abs() < 1e-14);
    }

    #[test]
    fn test_ranks_agree() {
        let params = open_chain(3, 1, 1, 0.25);
        let reference = {
            let mut system = HubbardSystem::new(params.clone()).unwrap();
            system.setup().unwrap();
            Variation::new(&SingleProcess, options())
                .run(&mut system)
                .unwrap()
        };

        let energies = LocalGroup::run(2, |c| {
            let mut system = HubbardSystem::new(params.clone()).unwrap();
            system.setup().unwrap();
            let energy = Variation::new(&c, options()).run(&mut system).unwrap();
            (energy, system.n_dets())
        });
        for (energy, n_dets) in energies {
            assert!((energy - reference).abs() < 1e-12);
            assert_eq!(n_dets, 9);
        }
    }

    #[test]
    fn test_requires_setup() {
        let mut system = HubbardSystem::new(open_chain(2, 1, 1, 0.0)).unwrap();
        let result = Variation::new(&SingleProcess, options()).run(&mut system);
        assert!(result.is_err());
    }
}
