//! Tests for the per-rank workflow

#[cfg(test)]
mod tests {
    use super::super::run_rank;
    use crate::config::Config;
    use crate::coordinator::LocalGroup;
    use std::path::PathBuf;

    const CHAIN: &str = r#"
system:
  lattice:
    type: chain
    n_sites: 2
    periodic: false
  t: 1.0
  u: 4.0
  n_up: 1
  n_dn: 1
variation:
  eps_schedule: [1.0e-4]
  max_steps: 50
"#;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("hc_app_{}_{}", name, std::process::id()))
    }

    #[test]
    fn test_save_then_stop_on_every_rank() {
        let dir = scratch("save");
        std::fs::create_dir_all(&dir).unwrap();
        let mut config = Config::from_yaml(CHAIN).unwrap();
        config.wavefunction.save = Some(dir.join("wf.dat"));

        let results = LocalGroup::run(2, |c| run_rank(&c, &config, true).is_ok());
        assert_eq!(results, vec![true, true]);
        assert!(dir.join("wf.dat").exists());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_failed_save_stops_every_rank() {
        let mut config = Config::from_yaml(CHAIN).unwrap();
        config.wavefunction.save = Some(scratch("missing").join("nested").join("wf.dat"));

        let results = LocalGroup::run(2, |c| run_rank(&c, &config, true).is_err());
        assert_eq!(results, vec![true, true]);
    }
}
