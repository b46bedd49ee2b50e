//! 제한/계측 복사 엔진
//!
//! - 고정 크기 청크 단위 읽기 (메모리 사용량 제한)
//! - 청크마다 읽기/쓰기 시간 측정
//! - 최대 바이트 / 최대 시간 도달 시 정상 종료
//! - 일정 간격으로 진행 콜백 호출

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::config::{Config, DEFAULT_CHUNK_SIZE};
use crate::stats::TransferStats;
use crate::{Result, MIB};

/// 수신측 전송 제한
///
/// 0은 해당 차원이 무제한임을 뜻한다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferLimits {
    /// 최대 바이트 수
    pub max_bytes: u64,

    /// 최대 시간 (밀리초)
    pub max_millis: u64,
}

impl TransferLimits {
    /// 제한 없음
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn new(max_bytes: u64, max_millis: u64) -> Self {
        Self {
            max_bytes,
            max_millis,
        }
    }

    /// MiB / 초 단위 제한을 바이트 / 밀리초로 변환
    ///
    /// 변환 중 오버플로우가 나면 None.
    pub fn from_mib_secs(max_mib: u64, max_secs: u64) -> Option<Self> {
        Some(Self {
            max_bytes: max_mib.checked_mul(MIB)?,
            max_millis: max_secs.checked_mul(1000)?,
        })
    }

    pub fn max_bytes(&self) -> Option<u64> {
        (self.max_bytes > 0).then_some(self.max_bytes)
    }

    pub fn max_duration(&self) -> Option<Duration> {
        (self.max_millis > 0).then(|| Duration::from_millis(self.max_millis))
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_bytes == 0 && self.max_millis == 0
    }
}

/// 제한/계측 복사기
#[derive(Debug, Clone)]
pub struct BoundedCopy {
    limits: TransferLimits,
    chunk_size: usize,
    progress_interval: Duration,
}

impl BoundedCopy {
    pub fn new(limits: TransferLimits) -> Self {
        Self {
            limits,
            chunk_size: DEFAULT_CHUNK_SIZE,
            progress_interval: Duration::from_secs(1),
        }
    }

    /// 설정의 청크 크기와 진행 간격 사용
    pub fn from_config(config: &Config, limits: TransferLimits) -> Self {
        Self {
            limits,
            chunk_size: config.chunk_size.max(1),
            progress_interval: config.progress_interval,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// `reader`에서 `writer`로 복사
    ///
    /// 제한 도달은 정상 종료이며 최종 통계를 반환한다. 읽기/쓰기 에러는
    /// 재시도 없이 그대로 반환한다.
    pub async fn run<R, W, F>(&self, reader: &mut R, writer: &mut W, mut progress: F) -> Result<TransferStats>
    where
        R: AsyncRead + Unpin + ?Sized,
        W: AsyncWrite + Unpin + ?Sized,
        F: FnMut(&TransferStats),
    {
        let started = Instant::now();
        let deadline = self.limits.max_duration().map(|d| started + d);
        let max_bytes = self.limits.max_bytes();

        let mut buf = vec![0u8; self.chunk_size];
        let mut stats = TransferStats::new();
        let mut last_progress = started;

        loop {
            let mut want = buf.len();
            if let Some(max) = max_bytes {
                let remaining = max - stats.bytes;
                if remaining == 0 {
                    debug!("최대 바이트 도달: {} bytes", max);
                    break;
                }
                want = want.min(usize::try_from(remaining).unwrap_or(usize::MAX));
            }

            let read_start = Instant::now();
            let read = match deadline {
                Some(deadline) if read_start >= deadline => {
                    debug!("최대 시간 도달: {:?}", started.elapsed());
                    break;
                }
                Some(deadline) => {
                    match tokio::time::timeout_at(deadline, reader.read(&mut buf[..want])).await {
                        Ok(read) => Some(read?),
                        Err(_) => None,
                    }
                }
                None => Some(reader.read(&mut buf[..want]).await?),
            };
            let read_time = read_start.elapsed();

            let n = match read {
                Some(0) => {
                    stats.read_time += read_time;
                    trace!("소스 종료");
                    break;
                }
                Some(n) => n,
                None => {
                    stats.read_time += read_time;
                    debug!("읽기 대기 중 최대 시간 도달: {:?}", started.elapsed());
                    break;
                }
            };

            let write_start = Instant::now();
            writer.write_all(&buf[..n]).await?;
            stats.record_chunk(read_time, write_start.elapsed(), n);

            if last_progress.elapsed() >= self.progress_interval {
                progress(&stats);
                last_progress = Instant::now();
            }
        }

        let flush_start = Instant::now();
        writer.flush().await?;
        stats.write_time += flush_start.elapsed();

        Ok(stats)
    }
}

/// 기본 청크 크기로 제한/계측 복사
pub async fn copy_bounded<R, W, F>(
    reader: &mut R,
    writer: &mut W,
    limits: TransferLimits,
    progress: F,
) -> Result<TransferStats>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
    F: FnMut(&TransferStats),
{
    BoundedCopy::new(limits).run(reader, writer, progress).await
}
