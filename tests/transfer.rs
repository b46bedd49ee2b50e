//! 루프백 TCP 위에서 송신자/수신자 전체 흐름 검증

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;
use std::time::{Duration, Instant};

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use transfer::{Config, ErrorKind, Peer, Receiver, SendJob, Sender, TransferStats, MIB};

fn config() -> Config {
    Config::new()
        .with_bind_ip(IpAddr::V4(Ipv4Addr::LOCALHOST))
        .with_port(0)
        .with_timeout_secs(10)
}

fn receiver(port: u16) -> Receiver {
    Receiver::new(config().with_port(port))
}

/// 송신자를 띄우고 포트를 돌려준다
async fn spawn_sender(
    job: SendJob,
    recipient: &str,
    repeat: bool,
) -> (u16, JoinHandle<transfer::Result<TransferStats>>) {
    let sender = Sender::new(config(), repeat);
    let listener = sender.listen().await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let recipient = Peer::parse(recipient).unwrap();

    let handle = tokio::spawn(async move { sender.send_on(&listener, &job, &recipient).await });
    (port, handle)
}

fn write_file(path: &Path, size: usize) -> Vec<u8> {
    let data: Vec<u8> = (0..size).map(|i| (i % 253) as u8).collect();
    std::fs::write(path, &data).unwrap();
    data
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_send_10_mib_uncapped() {
    let (port, sender) = spawn_sender(SendJob::test(10).unwrap(), "anyone", false).await;

    let report = receiver(port).receive_test(0, 0, "127.0.0.1").await.unwrap();
    assert_eq!(report.stats.bytes, 10 * MIB);
    assert_eq!(report.path, None);

    let sent = sender.await.unwrap().unwrap();
    assert_eq!(sent.bytes, 10 * MIB);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_size_cap_stops_at_exact_bytes() {
    let (port, sender) = spawn_sender(SendJob::test(10).unwrap(), "anyone", false).await;

    let report = receiver(port).receive_test(5, 0, "127.0.0.1").await.unwrap();
    assert_eq!(report.stats.bytes, 5 * MIB);

    // 송신측은 연결이 끊겨 실패할 수 있다
    sender.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_time_cap_with_endless_sender() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let endless = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let _ = tokio::io::copy(&mut tokio::io::repeat(0xAB), &mut stream).await;
    });

    let started = Instant::now();
    let report = receiver(port).receive_test(0, 1, "127.0.0.1").await.unwrap();
    let elapsed = started.elapsed();

    assert!(report.stats.bytes > 0);
    assert!(elapsed >= Duration::from_secs(1));
    assert!(elapsed < Duration::from_secs(6), "took {:?}", elapsed);

    endless.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_header_names_received_file() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    let data = write_file(&src.path().join("report.pdf"), 300_000);

    let job = SendJob::file(src.path().join("report.pdf"), true).await.unwrap();
    let (port, sender) = spawn_sender(job, "127.0.0.1", false).await;

    let report = receiver(port)
        .receive_file(dst.path().join("transfer.dat"), "127.0.0.1")
        .await
        .unwrap();

    let expected = dst.path().join("report.pdf");
    assert_eq!(report.path.as_deref(), Some(expected.as_path()));
    assert_eq!(report.stats.bytes, data.len() as u64);
    assert_eq!(std::fs::read(&expected).unwrap(), data);
    assert!(!dst.path().join("transfer.dat").exists());

    sender.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_without_header_uses_default_name() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    let data = write_file(&src.path().join("report.pdf"), 200_000);

    let job = SendJob::file(src.path().join("report.pdf"), false).await.unwrap();
    let (port, sender) = spawn_sender(job, "anyone", false).await;

    let report = receiver(port)
        .receive_file(dst.path().join("transfer.dat"), "127.0.0.1")
        .await
        .unwrap();

    let expected = dst.path().join("transfer.dat");
    assert_eq!(report.path.as_deref(), Some(expected.as_path()));
    assert_eq!(std::fs::read(&expected).unwrap(), data);
    assert!(!dst.path().join("report.pdf").exists());

    sender.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_header_like_payload_is_kept() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();

    // 헤더 없이 보내는 파일이 헤더처럼 생기지 않은 첫 줄을 가짐
    let data = b"filename   : not a header\nbody bytes\n".to_vec();
    std::fs::write(src.path().join("notes.txt"), &data).unwrap();

    let job = SendJob::file(src.path().join("notes.txt"), false).await.unwrap();
    let (port, sender) = spawn_sender(job, "anyone", false).await;

    let report = receiver(port)
        .receive_file(dst.path().join("transfer.dat"), "127.0.0.1")
        .await
        .unwrap();

    assert_eq!(report.stats.bytes, data.len() as u64);
    assert_eq!(std::fs::read(dst.path().join("transfer.dat")).unwrap(), data);

    sender.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_explicit_name_wins_over_header() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    let data = write_file(&src.path().join("report.pdf"), 5_000);

    let job = SendJob::file(src.path().join("report.pdf"), true).await.unwrap();
    let (port, sender) = spawn_sender(job, "anyone", false).await;

    let report = receiver(port)
        .receive_file(dst.path().join("mine.bin"), "127.0.0.1")
        .await
        .unwrap();

    assert_eq!(report.path, Some(dst.path().join("mine.bin")));
    // 헤더 줄은 파일에 들어가지 않는다
    assert_eq!(std::fs::read(dst.path().join("mine.bin")).unwrap(), data);
    assert!(!dst.path().join("report.pdf").exists());

    sender.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_empty_file_with_header() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    std::fs::write(src.path().join("empty.bin"), b"").unwrap();

    let job = SendJob::file(src.path().join("empty.bin"), true).await.unwrap();
    let (port, sender) = spawn_sender(job, "anyone", false).await;

    let report = receiver(port)
        .receive_file(dst.path().join("transfer.dat"), "127.0.0.1")
        .await
        .unwrap();

    assert_eq!(report.stats.bytes, 0);
    assert_eq!(std::fs::read(dst.path().join("empty.bin")).unwrap(), b"");

    sender.await.unwrap().unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_repeat_mode_is_repeatable() {
    let (port, sender) = spawn_sender(SendJob::test(2).unwrap(), "anyone", true).await;

    let mut totals = Vec::new();
    for _ in 0..3 {
        let report = receiver(port).receive_test(0, 0, "127.0.0.1").await.unwrap();
        totals.push(report.stats.bytes);
    }

    assert_eq!(totals, vec![2 * MIB; 3]);
    assert!(!sender.is_finished());
    sender.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_repeat_survives_failed_round() {
    let (port, sender) = spawn_sender(SendJob::test(10).unwrap(), "anyone", true).await;

    // 첫 회차는 수신자가 중간에 끊어서 송신측 실패
    let report = receiver(port).receive_test(1, 0, "127.0.0.1").await.unwrap();
    assert_eq!(report.stats.bytes, MIB);

    let report = receiver(port).receive_test(0, 0, "127.0.0.1").await.unwrap();
    assert_eq!(report.stats.bytes, 10 * MIB);

    sender.abort();
}

#[tokio::test]
async fn test_connection_refused_is_connection_error() {
    let port = {
        let sock = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        sock.local_addr().unwrap().port()
    };

    let err = receiver(port).receive_test(0, 0, "127.0.0.1").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
}

#[tokio::test]
async fn test_sender_times_out_without_receiver() {
    let sender = Sender::new(
        config().with_timeout_secs(1),
        false,
    );
    let started = Instant::now();
    let err = sender.send_test(1, "anyone").await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(started.elapsed() < Duration::from_secs(5));
}
