//! 데이터 싱크
//!
//! 실제 파일 또는 버림(discard)

use std::io;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::fs::File;
use tokio::io::{AsyncWrite, Sink};

use crate::Result;

/// 전송 데이터 싱크
#[derive(Debug)]
pub enum DataSink {
    /// 생성/덮어쓰기로 연 파일
    File(File),

    /// 받은 바이트를 모두 버림 (처리율 측정 전용)
    Discard(Sink),
}

impl DataSink {
    /// 파일 생성 (있으면 잘라냄)
    pub async fn create_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path.as_ref()).await?;
        Ok(DataSink::File(file))
    }

    pub fn discard() -> Self {
        DataSink::Discard(tokio::io::sink())
    }

    /// 실제로 데이터를 저장하는지 여부
    pub fn is_persistent(&self) -> bool {
        matches!(self, DataSink::File(_))
    }
}

impl AsyncWrite for DataSink {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            DataSink::File(file) => Pin::new(file).poll_write(cx, buf),
            DataSink::Discard(sink) => Pin::new(sink).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            DataSink::File(file) => Pin::new(file).poll_flush(cx),
            DataSink::Discard(sink) => Pin::new(sink).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            DataSink::File(file) => Pin::new(file).poll_shutdown(cx),
            DataSink::Discard(sink) => Pin::new(sink).poll_shutdown(cx),
        }
    }
}
