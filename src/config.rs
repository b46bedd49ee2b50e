//! 전송 설정
//!
//! 명령 실행마다 하나씩 만들어 [`Sender`](crate::Sender)/[`Receiver`](crate::Receiver)에 넘긴다.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::DEFAULT_PORT;

/// 기본 복사 청크 크기 (바이트)
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024; // 64KB

/// 헤더 검사 윈도우 크기 (바이트)
pub const DEFAULT_HEADER_WINDOW: usize = 1024;

/// 전송 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// 송신자 대기 주소
    pub bind_ip: IpAddr,

    /// 송신자가 대기하고 수신자가 접속하는 포트
    pub port: u16,

    /// 연결 수립 타임아웃
    /// None이면 무제한 대기
    pub timeout: Option<Duration>,

    /// 진행/결과 통계를 info 레벨로 출력할지 여부
    pub measured: bool,

    /// 복사 청크 크기 (바이트)
    pub chunk_size: usize,

    /// 헤더 검사 윈도우 크기 (바이트)
    /// 악의적인 송신자로부터 무제한 버퍼링을 막는다
    pub header_window: usize,

    /// 진행 콜백 최소 간격
    pub progress_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            timeout: Some(Duration::from_secs(30)),
            measured: true,
            chunk_size: DEFAULT_CHUNK_SIZE,
            header_window: DEFAULT_HEADER_WINDOW,
            progress_interval: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// 새 설정 생성
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bind_ip(mut self, ip: IpAddr) -> Self {
        self.bind_ip = ip;
        self
    }

    /// 송신자 대기 소켓 주소
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_ip, self.port)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// 초 단위 타임아웃 설정, 0이면 무제한
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }

    pub fn with_measured(mut self, measured: bool) -> Self {
        self.measured = measured;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    /// 설정 요약 문자열
    pub fn summary(&self) -> String {
        format!(
            "{}measured; port: {}; timeout: {}",
            if self.measured { "" } else { "not " },
            self.port,
            match self.timeout {
                Some(t) => format!("{}s", t.as_secs()),
                None => "none".to_string(),
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8888);
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
        assert!(config.measured);
        assert_eq!(config.header_window, 1024);
        assert_eq!(config.listen_addr().to_string(), "0.0.0.0:8888");
    }

    #[test]
    fn test_zero_timeout_is_unbounded() {
        let config = Config::new().with_timeout_secs(0);
        assert_eq!(config.timeout, None);
        assert!(config.summary().contains("timeout: none"));
    }
}
