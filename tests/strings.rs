#![cfg(feature = "strings")]

use std::io::Write;
use std::net::{TcpListener, TcpStream};
use std::os::fd::AsRawFd;

#[test]
fn read_string_drains_pending_bytes() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind listener");
    let addr = listener.local_addr().expect("failed to get local address");

    let mut peer = TcpStream::connect(addr).expect("failed to connect");
    let (local, _) = listener.accept().expect("failed to accept");

    peer.write_all(b"hello").expect("failed to write");
    peer.flush().expect("failed to flush");

    let io = eddy::Io::new(local.as_raw_fd(), false);
    assert_eq!(io.read_string(), "hello");
    assert_eq!(io.pending(), 0);
    assert_eq!(io.read_string(), "", "nothing pending reads as empty");
}

#[test]
fn write_string_reports_complete_writes() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind listener");
    let addr = listener.local_addr().expect("failed to get local address");

    let peer = TcpStream::connect(addr).expect("failed to connect");
    let (local, _) = listener.accept().expect("failed to accept");

    let io = eddy::Io::new(peer.as_raw_fd(), false);
    assert!(io.write_string("ping"));

    let remote = eddy::Io::new(local.as_raw_fd(), false);
    let mut buffer = [0u8; 8];
    // Give the loopback a moment to deliver.
    std::thread::sleep(std::time::Duration::from_millis(20));
    assert_eq!(remote.read(&mut buffer), 4);
    assert_eq!(&buffer[..4], b"ping");
}
