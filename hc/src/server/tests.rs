//! Tests for the Hc service and its wire format

#[cfg(test)]
mod tests {
    use super::super::protocol::{
        encode_command, read_ack, read_command, read_f64s, write_f64s, COMMAND_FRAME,
    };
    use super::super::{Command, HcClient, HcServer, ServerOptions, ServerState};
    use crate::coordinator::SingleProcess;
    use crate::hamiltonian::{Hamiltonian, SparseHamiltonian};
    use crate::testing::{full_system, ring_params};
    use det::System;
    use std::io::{self, Cursor, Read};
    use std::net::TcpListener;
    use std::path::PathBuf;
    use std::thread;

    /// Hands out at most one byte per read call.
    struct Trickle<R>(R);

    impl<R: Read> Read for Trickle<R> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(1);
            self.0.read(&mut buf[..len])
        }
    }

    fn log_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("hc_server_unit_{}_{}", name, std::process::id()))
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("getCoefs"), Command::GetCoefs);
        assert_eq!(Command::parse("Hc"), Command::Hc);
        assert_eq!(Command::parse("exit"), Command::Exit);
        assert_eq!(
            Command::parse("hc"),
            Command::Unknown("hc".to_string())
        );
        assert_eq!(Command::Hc.to_string(), "Hc");
    }

    #[test]
    fn test_command_frame() {
        let frame = encode_command("getCoefs");
        assert_eq!(frame.len(), COMMAND_FRAME);
        assert_eq!(&frame[..8], b"getCoefs");
        assert!(frame[8..].iter().all(|&b| b == 0));

        let mut reader = Trickle(Cursor::new(frame.to_vec()));
        assert_eq!(read_command(&mut reader).unwrap(), Some("getCoefs".to_string()));
        assert_eq!(read_command(&mut reader).unwrap(), None);
    }

    #[test]
    fn test_long_command_keeps_terminator() {
        let long = "x".repeat(40);
        let frame = encode_command(&long);
        assert_eq!(frame[COMMAND_FRAME - 1], 0);
        let text = read_command(&mut Cursor::new(frame.to_vec())).unwrap().unwrap();
        assert_eq!(text.len(), COMMAND_FRAME - 1);
    }

    #[test]
    fn test_truncated_frame_reads_as_closed() {
        let mut reader = Cursor::new(b"Hc\0".to_vec());
        assert_eq!(read_command(&mut reader).unwrap(), None);
    }

    #[test]
    fn test_vector_survives_short_reads() {
        let values = vec![1.5, -0.0, f64::MIN_POSITIVE, 1e300];
        let mut bytes = Vec::new();
        write_f64s(&mut bytes, &values).unwrap();
        assert_eq!(bytes.len(), 8 * values.len());

        let mut decoded = vec![0.0; values.len()];
        read_f64s(&mut Trickle(Cursor::new(bytes)), &mut decoded).unwrap();
        for (a, b) in decoded.iter().zip(values.iter()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_bad_ack_is_rejected() {
        assert!(read_ack(&mut Cursor::new(b"ACK".to_vec())).is_ok());
        assert!(read_ack(&mut Cursor::new(b"NAK".to_vec())).is_err());
    }

    #[test]
    fn test_single_process_session() {
        let mut system = full_system(ring_params(3, 1, 1));
        let n = system.n_dets();
        let coefs: Vec<f64> = (0..n).map(|i| 0.1 * (i + 1) as f64).collect();
        system.data_mut().set_coefs(coefs.clone()).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        let options = ServerOptions {
            host: "127.0.0.1".to_string(),
            port: address.port(),
            chunk_size: 4,
            log_dir: log_dir("session"),
        };

        let client = thread::spawn(move || {
            let mut client = HcClient::connect(address, n).unwrap();
            let received = client.get_coefs().unwrap();
            client.send("bogus").unwrap();
            let mut unit = vec![0.0; n];
            unit[0] = 1.0;
            let column = client.hc(&unit).unwrap();
            client.exit().unwrap();
            (received, column)
        });

        let hamiltonian = SparseHamiltonian::new(&system, &SingleProcess);
        let mut server = HcServer::new(&system, &hamiltonian, &SingleProcess, options.clone());
        assert_eq!(server.state(), ServerState::AwaitingConnection);
        server.serve(Some(listener)).unwrap();
        assert_eq!(server.state(), ServerState::Closed);

        let (received, column) = client.join().unwrap();
        assert_eq!(received, coefs);
        let mut unit = vec![0.0; n];
        unit[0] = 1.0;
        assert_eq!(column, hamiltonian.multiply(&unit));

        let log = std::fs::read_to_string(options.log_dir.join("hc_server.0.log")).unwrap();
        assert!(log.ends_with("getCoefs\nbogus\nHc\nexit\n"));
        let _ = std::fs::remove_dir_all(&options.log_dir);
    }

    #[test]
    fn test_disconnect_closes_service() {
        let system = full_system(ring_params(3, 1, 0));
        let hamiltonian = SparseHamiltonian::new(&system, &SingleProcess);
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();
        let options = ServerOptions {
            log_dir: log_dir("disconnect"),
            ..ServerOptions::default()
        };

        let client = thread::spawn(move || {
            let client = HcClient::connect(address, 3).unwrap();
            drop(client);
        });

        let mut server = HcServer::new(&system, &hamiltonian, &SingleProcess, options.clone());
        server.serve(Some(listener)).unwrap();
        assert_eq!(server.state(), ServerState::Closed);
        client.join().unwrap();
        let _ = std::fs::remove_dir_all(&options.log_dir);
    }
}
