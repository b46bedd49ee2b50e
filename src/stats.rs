//! 전송 통계

use std::ops::Add;
use std::time::Duration;

use tracing::{debug, info};

use crate::humanize;

/// 전송 통계
///
/// 복사 엔진이 청크마다 누적하며 값은 단조 증가한다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    /// 읽기에 쓴 시간
    pub read_time: Duration,

    /// 쓰기에 쓴 시간 (flush 포함)
    pub write_time: Duration,

    /// 총 전송 바이트
    pub bytes: u64,
}

impl TransferStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 청크 하나 기록
    pub fn record_chunk(&mut self, read: Duration, write: Duration, bytes: usize) {
        self.read_time += read;
        self.write_time += write;
        self.bytes += bytes as u64;
    }

    /// 읽기 시간 (밀리초)
    pub fn read_ms(&self) -> u64 {
        self.read_time.as_millis() as u64
    }

    /// 쓰기 시간 (밀리초)
    pub fn write_ms(&self) -> u64 {
        self.write_time.as_millis() as u64
    }

    /// 읽기 처리율 (bits/sec)
    pub fn read_bps(&self) -> f64 {
        bits_per_sec(self.bytes, self.read_time)
    }

    /// 쓰기 처리율 (bits/sec)
    pub fn write_bps(&self) -> f64 {
        bits_per_sec(self.bytes, self.write_time)
    }

    /// 통계 요약 문자열
    ///
    /// `show_write`가 true면 쓰기 시간/속도도 포함한다.
    pub fn summary(&self, show_write: bool) -> String {
        let mut out = format!(
            "{} read in {} @ {}",
            humanize::size(self.bytes),
            humanize::time(self.read_time),
            humanize::speed(self.read_bps()),
        );

        if show_write {
            out.push_str(&format!(
                " and written in {} @ {}",
                humanize::time(self.write_time),
                humanize::speed(self.write_bps()),
            ));
        }

        out
    }
}

impl Add for TransferStats {
    type Output = TransferStats;

    fn add(self, rhs: TransferStats) -> TransferStats {
        TransferStats {
            read_time: self.read_time + rhs.read_time,
            write_time: self.write_time + rhs.write_time,
            bytes: self.bytes + rhs.bytes,
        }
    }
}

/// 측정 결과 출력
///
/// measured면 info, 아니면 debug 레벨.
pub(crate) fn report(measured: bool, message: &str) {
    if measured {
        info!("{}", message);
    } else {
        debug!("{}", message);
    }
}

fn bits_per_sec(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs == 0.0 {
        return 0.0;
    }
    (bytes as f64 * 8.0) / secs
}
