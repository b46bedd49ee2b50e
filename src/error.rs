//! 에러 타입 정의

use std::time::Duration;

use thiserror::Error;

/// 전송 에러 타입
///
/// 제한(cap) 도달은 에러가 아니다. 복사 엔진은 제한에 도달하면
/// 정상적으로 [`TransferStats`](crate::TransferStats)를 반환한다.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO 에러: {0}")]
    Io(#[from] std::io::Error),

    #[error("잘못된 인자: {0}")]
    Validation(String),

    #[error("{peer} 연결 실패: {source}")]
    Connect {
        peer: String,
        #[source]
        source: std::io::Error,
    },

    #[error("연결 타임아웃: {peer} ({timeout:?})")]
    Timeout { peer: String, timeout: Duration },
}

/// 에러 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 연결 전에 실패한 입력 검증
    Validation,
    /// 연결 수립 실패 또는 타임아웃
    Connection,
    /// 복사 중 파일/소켓 에러
    Io,
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Connect { .. } | Error::Timeout { .. } => ErrorKind::Connection,
            Error::Io(_) => ErrorKind::Io,
        }
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind() {
        assert_eq!(Error::validation("x").kind(), ErrorKind::Validation);

        let timeout = Error::Timeout {
            peer: "host".into(),
            timeout: Duration::from_secs(1),
        };
        assert_eq!(timeout.kind(), ErrorKind::Connection);

        let io: Error = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "reset").into();
        assert_eq!(io.kind(), ErrorKind::Io);
    }
}
