//! Runs the `linechat` binary as two real processes talking over loopback.

use std::{
    io::{Read, Write},
    net::UdpSocket,
    process::{Child, Command, Stdio},
    thread,
    time::{Duration, Instant},
};

const BIN: &str = env!("CARGO_BIN_EXE_linechat");

// two distinct ports nothing is listening on right now.
fn free_ports() -> (u16, u16) {
    let a = UdpSocket::bind("127.0.0.1:0").unwrap();
    let b = UdpSocket::bind("127.0.0.1:0").unwrap();
    (a.local_addr().unwrap().port(), b.local_addr().unwrap().port())
}

fn spawn_peer(local: u16, remote: u16) -> Child {
    Command::new(BIN)
        .args([local.to_string(), "127.0.0.1".to_owned(), remote.to_string()])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn linechat")
}

// wait for exit, killing the child if it overstays.
fn wait_with_deadline(child: &mut Child, limit: Duration) -> i32 {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait().unwrap() {
            return status.code().expect("terminated by signal");
        }
        if Instant::now() > deadline {
            let _ = child.kill();
            panic!("linechat did not exit in time");
        }
        thread::sleep(Duration::from_millis(20));
    }
}

fn read_stdout(child: &mut Child) -> String {
    let mut out = String::new();
    child.stdout.take().unwrap().read_to_string(&mut out).unwrap();
    out
}

#[test]
fn wrong_argument_count_exits_with_1() {
    for args in [&[][..], &["5000"][..], &["5000", "localhost"][..], &["1", "2", "3", "4"][..]] {
        let output = Command::new(BIN).args(args).output().unwrap();
        assert_eq!(output.status.code(), Some(1), "args: {:?}", args);
        assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
        assert!(output.stdout.is_empty());
    }
}

#[test]
fn hello_then_sentinel_ends_both_peers() {
    let (port_a, port_b) = free_ports();
    let mut b = spawn_peer(port_b, port_a);
    // let b bind before a starts talking
    thread::sleep(Duration::from_millis(300));
    let mut a = spawn_peer(port_a, port_b);

    // keep b's stdin open but silent for the whole session
    let _b_stdin = b.stdin.take().unwrap();
    {
        let mut a_stdin = a.stdin.take().unwrap();
        a_stdin.write_all(b"hello\n").unwrap();
        thread::sleep(Duration::from_millis(100));
        a_stdin.write_all(b"!\n").unwrap();
    }

    assert_eq!(wait_with_deadline(&mut a, Duration::from_secs(10)), 0);
    assert_eq!(wait_with_deadline(&mut b, Duration::from_secs(10)), 0);
    assert_eq!(read_stdout(&mut a), "");
    assert_eq!(read_stdout(&mut b), "Received: hello\nReceived: !\n");
}
