//! 송신자
//!
//! - 포트를 열고 수신자의 접속을 기다림
//! - 선택적으로 파일 이름 헤더 전송
//! - 파일 또는 테스트 데이터를 제한 없이 스트리밍
//! - 반복 모드: 전송 전체를 독립적으로 계속 반복

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::copy::{BoundedCopy, TransferLimits};
use crate::header;
use crate::humanize;
use crate::peer::{Peer, TransferEndpoint};
use crate::source::DataSource;
use crate::stats::{self, TransferStats};
use crate::{Config, Error, Result, MAX_TEST_SIZE_MIB, MIB, MIN_TEST_SIZE_MIB};

/// 보낼 데이터
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendJob {
    /// 파일 (헤더에 실을 이름 포함)
    File {
        path: PathBuf,
        header_name: Option<String>,
    },

    /// 테스트 데이터 (바이트)
    Test { size: u64 },
}

impl SendJob {
    /// 파일 전송 작업
    ///
    /// 파일이 존재하고 일반 파일인지 확인한다.
    pub async fn file(path: impl AsRef<Path>, include_header: bool) -> Result<Self> {
        let path = path.as_ref();

        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|e| Error::validation(format!("파일을 읽을 수 없음: {} ({})", path.display(), e)))?;
        if !metadata.is_file() {
            return Err(Error::validation(format!("일반 파일이 아님: {}", path.display())));
        }

        let header_name = if include_header {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .filter(|n| !n.contains('\n'))
                .ok_or_else(|| Error::validation(format!("헤더에 쓸 수 없는 파일 이름: {}", path.display())))?;
            Some(name.to_string())
        } else {
            None
        };

        Ok(SendJob::File {
            path: path.to_path_buf(),
            header_name,
        })
    }

    /// 테스트 데이터 전송 작업 (MiB)
    pub fn test(size_mib: u32) -> Result<Self> {
        if !(MIN_TEST_SIZE_MIB..=MAX_TEST_SIZE_MIB).contains(&size_mib) {
            return Err(Error::validation(format!(
                "테스트 크기는 {}~{} MiB 사이여야 함: {}",
                MIN_TEST_SIZE_MIB, MAX_TEST_SIZE_MIB, size_mib
            )));
        }
        Ok(SendJob::Test {
            size: size_mib as u64 * MIB,
        })
    }

    fn header_name(&self) -> Option<&str> {
        match self {
            SendJob::File { header_name, .. } => header_name.as_deref(),
            SendJob::Test { .. } => None,
        }
    }

    async fn open(&self) -> Result<DataSource> {
        match self {
            SendJob::File { path, .. } => DataSource::open_file(path).await,
            SendJob::Test { size } => Ok(DataSource::test_data(*size)),
        }
    }

    fn describe(&self) -> String {
        match self {
            SendJob::File { path, .. } => format!("file {}", path.display()),
            SendJob::Test { size } => format!("test of {}", humanize::size(*size)),
        }
    }
}

/// 송신자
pub struct Sender {
    /// 설정
    config: Config,

    /// 반복 전송 여부
    repeat: bool,
}

impl Sender {
    /// 새 송신자 생성
    pub fn new(config: Config, repeat: bool) -> Self {
        Self { config, repeat }
    }

    /// 대기 소켓 바인딩
    pub async fn listen(&self) -> Result<TcpListener> {
        let listener = TcpListener::bind(self.config.listen_addr()).await?;
        info!("listening on {}", listener.local_addr()?);
        Ok(listener)
    }

    /// 파일 전송
    pub async fn send_file(
        &self,
        path: impl AsRef<Path>,
        include_header: bool,
        recipient: &str,
    ) -> Result<TransferStats> {
        let job = SendJob::file(path, include_header).await?;
        let recipient = Peer::parse(recipient)?;
        let listener = self.listen().await?;
        self.send_on(&listener, &job, &recipient).await
    }

    /// 테스트 데이터 전송 (MiB)
    pub async fn send_test(&self, size_mib: u32, recipient: &str) -> Result<TransferStats> {
        let job = SendJob::test(size_mib)?;
        let recipient = Peer::parse(recipient)?;
        let listener = self.listen().await?;
        self.send_on(&listener, &job, &recipient).await
    }

    /// 이미 열린 소켓에서 전송
    ///
    /// 반복 모드면 반환하지 않는다. 실패한 회차는 기록만 하고 바로 다음
    /// 회차를 시작한다.
    pub async fn send_on(
        &self,
        listener: &TcpListener,
        job: &SendJob,
        recipient: &Peer,
    ) -> Result<TransferStats> {
        let mut round = 0u64;

        loop {
            round += 1;
            let result = self.send_once(listener, job, recipient).await;

            if !self.repeat {
                return result;
            }

            if let Err(e) = result {
                warn!("전송 {} 실패: {}", round, e);
            }
        }
    }

    async fn send_once(
        &self,
        listener: &TcpListener,
        job: &SendJob,
        recipient: &Peer,
    ) -> Result<TransferStats> {
        let mut source = job.open().await?;

        info!("waiting for {} to receive {}...", recipient, job.describe());
        let mut endpoint = TransferEndpoint::accept(listener, recipient, self.config.timeout).await?;
        info!("connected to {}; sending data...", endpoint.remote_addr());

        if let Some(name) = job.header_name() {
            endpoint
                .stream_mut()
                .write_all(&header::encode(Some(name)))
                .await?;
        }

        let measured = self.config.measured;
        let stats = BoundedCopy::from_config(&self.config, TransferLimits::unbounded())
            .run(&mut source, endpoint.stream_mut(), |s| {
                stats::report(measured, &s.summary(true))
            })
            .await?;

        endpoint.shutdown().await?;

        stats::report(measured, &format!("Total of {}", stats.summary(true)));
        info!("Send complete.");

        Ok(stats)
    }
}
