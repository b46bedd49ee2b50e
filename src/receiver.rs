//! 수신자
//!
//! - 송신자에게 접속
//! - 파일 수신: 헤더 검사 후 파일 이름 결정, 제한 없음
//! - 테스트 수신: 헤더 없음, 버림 싱크, 최대 크기/시간 제한

use std::path::{Path, PathBuf};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::time::Instant;
use tracing::{debug, info};

use crate::copy::{BoundedCopy, TransferLimits};
use crate::header::{self, DecodedHeader};
use crate::peer::{Peer, TransferEndpoint};
use crate::sink::DataSink;
use crate::stats::{self, TransferStats};
use crate::{Config, Error, Result, DEFAULT_RECEIVE_FILE_NAME};

/// 수신 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveReport {
    /// 최종 통계 (헤더 윈도우에 포함된 페이로드 포함)
    pub stats: TransferStats,

    /// 기록한 파일 (버림 싱크면 None)
    pub path: Option<PathBuf>,
}

/// 수신자
pub struct Receiver {
    config: Config,
}

impl Receiver {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// 파일 수신
    ///
    /// `target`의 파일 이름이 기본값이고 헤더에 이름이 있으면 같은 디렉터리의
    /// 헤더 이름 파일로 저장한다.
    pub async fn receive_file(&self, target: impl AsRef<Path>, sender: &str) -> Result<ReceiveReport> {
        let target = target.as_ref();
        if target.file_name().is_none() {
            return Err(Error::validation(format!("잘못된 파일 이름: {}", target.display())));
        }
        let sender = Peer::parse(sender)?;

        let mut endpoint = self.connect(&sender).await?;

        // 헤더 윈도우 읽기 (앞부분만 검사)
        let read_start = Instant::now();
        let window = read_header_window(endpoint.stream_mut(), self.config.header_window).await?;
        let window_read = read_start.elapsed();

        let decoded = header::decode(&window);
        let path = resolve_target(target, &decoded);
        if let Some(name) = &decoded.name {
            debug!("헤더 파일 이름: {} ({} bytes)", name, decoded.consumed);
        }

        let mut sink = DataSink::create_file(&path).await?;

        // 헤더 뒤에 남은 윈도우 바이트는 페이로드
        let prefix = decoded.payload(&window);
        let write_start = Instant::now();
        sink.write_all(prefix).await?;
        let mut base = TransferStats::new();
        base.record_chunk(window_read, write_start.elapsed(), prefix.len());

        let measured = self.config.measured;
        let stats = BoundedCopy::from_config(&self.config, TransferLimits::unbounded())
            .run(endpoint.stream_mut(), &mut sink, |s| {
                stats::report(measured, &(base + *s).summary(true))
            })
            .await?;
        let stats = base + stats;

        stats::report(
            measured,
            &format!("Total of {} into {}", stats.summary(true), path.display()),
        );
        info!("Receive complete.");

        Ok(ReceiveReport {
            stats,
            path: Some(path),
        })
    }

    /// 테스트 데이터 수신
    ///
    /// 0은 해당 제한 없음. 제한 도달은 정상 완료다.
    pub async fn receive_test(&self, max_size_mib: u64, max_time_secs: u64, sender: &str) -> Result<ReceiveReport> {
        let limits = TransferLimits::from_mib_secs(max_size_mib, max_time_secs)
            .ok_or_else(|| Error::validation("최대 크기/시간이 너무 큼"))?;
        let sender = Peer::parse(sender)?;

        let mut endpoint = self.connect(&sender).await?;
        let mut sink = DataSink::discard();

        let measured = self.config.measured;
        let stats = BoundedCopy::from_config(&self.config, limits)
            .run(endpoint.stream_mut(), &mut sink, |s| {
                stats::report(measured, &s.summary(false))
            })
            .await?;

        stats::report(measured, &format!("Total of {}", stats.summary(false)));
        info!("Receive complete.");

        Ok(ReceiveReport { stats, path: None })
    }

    async fn connect(&self, sender: &Peer) -> Result<TransferEndpoint> {
        let endpoint = TransferEndpoint::connect(sender, self.config.port, self.config.timeout).await?;
        info!(
            "connected to {}:{}; receiving data...",
            sender, self.config.port
        );
        Ok(endpoint)
    }
}

/// 헤더 윈도우 채우기
///
/// 개행을 만나거나, 헤더일 수 없다고 판정되거나, 윈도우가 가득 차거나,
/// 스트림이 끝날 때까지 읽는다.
async fn read_header_window<R>(reader: &mut R, window: usize) -> Result<Vec<u8>>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = vec![0u8; window];
    let mut filled = 0;

    while filled < window {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;

        if !header::is_incomplete(&buf[..filled]) {
            break;
        }
    }

    buf.truncate(filled);
    Ok(buf)
}

/// 저장할 파일 경로 결정
///
/// 헤더 이름은 마지막 경로 요소만 사용해 `target` 디렉터리 밖으로 나가지 않는다.
fn resolve_target(target: &Path, decoded: &DecodedHeader) -> PathBuf {
    let is_default = target
        .file_name()
        .map_or(false, |name| name == DEFAULT_RECEIVE_FILE_NAME);

    let header_name = decoded
        .name
        .as_deref()
        .and_then(|name| Path::new(name).file_name());

    match header_name {
        Some(name) if is_default => target.with_file_name(name),
        _ => target.to_path_buf(),
    }
}
