//! Tests for the coordination back ends

#[cfg(test)]
mod tests {
    use super::super::{
        all_succeeded, broadcast_chunked, broadcast_value, Coordinator, LocalGroup,
        SingleProcess,
    };
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_single_process_is_leader() {
        let coordinator = SingleProcess;
        assert_eq!(coordinator.rank(), 0);
        assert_eq!(coordinator.size(), 1);
        assert!(coordinator.is_leader());

        let mut values = vec![1.0, 2.0];
        coordinator.barrier();
        coordinator.all_reduce_sum(&mut values);
        broadcast_chunked(&coordinator, &mut values, 1);
        assert_eq!(values, vec![1.0, 2.0]);

        let mut command = String::from("Hc");
        broadcast_value(&coordinator, &mut command).unwrap();
        assert_eq!(command, "Hc");
    }

    #[test]
    fn test_local_group_ranks() {
        let ranks = LocalGroup::run(4, |c| (c.rank(), c.size(), c.is_leader()));
        assert_eq!(
            ranks,
            vec![(0, 4, true), (1, 4, false), (2, 4, false), (3, 4, false)]
        );
    }

    #[test]
    fn test_broadcast_value_reaches_every_rank() {
        let commands = LocalGroup::run(3, |c| {
            let mut command = if c.is_leader() {
                String::from("getCoefs")
            } else {
                String::new()
            };
            c.barrier();
            broadcast_value(&c, &mut command).unwrap();
            command
        });
        assert!(commands.iter().all(|cmd| cmd == "getCoefs"));
    }

    #[test]
    fn test_chunked_broadcast_is_bit_identical() {
        let chunk = 16;
        let n = 2 * chunk + 7;
        let mut rng = StdRng::seed_from_u64(2018);
        let original: Vec<f64> = (0..n).map(|_| rng.gen_range(-1e3..1e3)).collect();

        let received = LocalGroup::run(3, |c| {
            let mut values = if c.is_leader() {
                original.clone()
            } else {
                vec![0.0; n]
            };
            broadcast_chunked(&c, &mut values, chunk);
            values
        });

        for values in &received {
            assert_eq!(values.len(), original.len());
            for (a, b) in values.iter().zip(original.iter()) {
                assert_eq!(a.to_bits(), b.to_bits());
            }
        }
    }

    #[test]
    fn test_chunked_broadcast_with_exact_multiple() {
        let chunk = 8;
        let received = LocalGroup::run(2, |c| {
            let mut values: Vec<f64> = if c.is_leader() {
                (0..3 * chunk).map(|i| i as f64).collect()
            } else {
                vec![0.0; 3 * chunk]
            };
            broadcast_chunked(&c, &mut values, chunk);
            values
        });
        assert_eq!(received[0], received[1]);
        assert_eq!(received[1][3 * chunk - 1], (3 * chunk - 1) as f64);
    }

    #[test]
    fn test_all_reduce_sum() {
        let sums = LocalGroup::run(4, |c| {
            let mut values = vec![c.rank() as f64, 1.0, -0.5 * c.rank() as f64];
            c.all_reduce_sum(&mut values);
            values
        });
        for values in &sums {
            assert_eq!(values, &vec![6.0, 4.0, -3.0]);
        }
    }

    #[test]
    fn test_all_succeeded_needs_every_rank() {
        assert!(all_succeeded(&SingleProcess, true));
        assert!(!all_succeeded(&SingleProcess, false));

        let agreed = LocalGroup::run(3, |c| all_succeeded(&c, true));
        assert_eq!(agreed, vec![true; 3]);

        let agreed = LocalGroup::run(3, |c| all_succeeded(&c, c.rank() != 2));
        assert_eq!(agreed, vec![false; 3]);
    }
}
