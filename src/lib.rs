//! # transfer
//!
//! 단일 TCP 연결 기반 파일/테스트 데이터 전송
//!
//! ## 핵심 특징
//! - **선택적 헤더**: 스트림 시작에 `filename:<name>\n` 한 줄
//! - **계측 복사**: 읽기/쓰기 시간과 바이트 수를 측정하며 복사
//! - **수신측 제한**: 최대 바이트 / 최대 시간 도달 시 정상 종료
//! - **플러그형 소스/싱크**: 파일, 합성 테스트 데이터, 버림(discard)
//!
//! 송신자가 포트를 열고 대기하며, 수신자가 송신자에게 접속한다.

pub mod config;
pub mod copy;
pub mod error;
pub mod header;
pub mod humanize;
pub mod peer;
pub mod receiver;
pub mod sender;
pub mod sink;
pub mod source;
pub mod stats;

pub use config::Config;
pub use copy::{copy_bounded, TransferLimits};
pub use error::{Error, ErrorKind, Result};
pub use header::{DecodedHeader, FILE_NAME_HEADER};
pub use peer::{Peer, Role, TransferEndpoint};
pub use receiver::{ReceiveReport, Receiver};
pub use sender::{SendJob, Sender};
pub use sink::DataSink;
pub use source::DataSource;
pub use stats::TransferStats;

/// 기본 포트
pub const DEFAULT_PORT: u16 = 8888;

/// 기본 수신 파일 이름 (헤더의 파일 이름으로 대체될 수 있음)
pub const DEFAULT_RECEIVE_FILE_NAME: &str = "transfer.dat";

/// 모든 피어 허용을 뜻하는 수신자 이름
pub const ANYONE: &str = "anyone";

/// 테스트 데이터 최소 크기 (MiB)
pub const MIN_TEST_SIZE_MIB: u32 = 1;

/// 테스트 데이터 최대 크기 (MiB)
pub const MAX_TEST_SIZE_MIB: u32 = 1024;

/// 테스트 데이터 기본 크기 (MiB)
pub const DEFAULT_TEST_SIZE_MIB: u32 = 10;

/// 1 KiB
pub const KIB: u64 = 1024;

/// 1 MiB
pub const MIB: u64 = KIB * KIB;

/// 1 GiB
pub const GIB: u64 = MIB * KIB;
