//! 데이터 소스
//!
//! 실제 파일 또는 합성 테스트 데이터

use std::io;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tokio::fs::File;
use tokio::io::{AsyncRead, ReadBuf};

use crate::Result;

/// 테스트 데이터 블록 크기 (바이트)
const TEST_BLOCK_SIZE: usize = 64 * 1024;

/// 테스트 데이터 시드 (항상 같은 내용을 생성)
const TEST_DATA_SEED: u64 = 0x5452_414E_5346_4552; // "TRANSFER"

/// 전송 데이터 소스
#[derive(Debug)]
pub enum DataSource {
    /// 읽기 전용으로 연 파일
    File(File),

    /// 지정한 크기의 합성 데이터
    TestData(TestData),
}

impl DataSource {
    /// 파일 열기
    pub async fn open_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref()).await?;
        Ok(DataSource::File(file))
    }

    /// `size` 바이트 테스트 데이터
    pub fn test_data(size: u64) -> Self {
        DataSource::TestData(TestData::new(size))
    }
}

impl AsyncRead for DataSource {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            DataSource::File(file) => Pin::new(file).poll_read(cx, buf),
            DataSource::TestData(data) => Pin::new(data).poll_read(cx, buf),
        }
    }
}

/// 결정적 합성 테스트 데이터
///
/// 시드 고정 난수 블록을 반복하며 정확히 `size` 바이트를 낸 뒤 EOF.
#[derive(Debug, Clone)]
pub struct TestData {
    block: Bytes,
    offset: usize,
    remaining: u64,
}

impl TestData {
    pub fn new(size: u64) -> Self {
        let mut block = vec![0u8; TEST_BLOCK_SIZE];
        StdRng::seed_from_u64(TEST_DATA_SEED).fill_bytes(&mut block);

        Self {
            block: Bytes::from(block),
            offset: 0,
            remaining: size,
        }
    }

    /// 남은 바이트 수
    pub fn remaining(&self) -> u64 {
        self.remaining
    }
}

impl AsyncRead for TestData {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        let n = buf
            .remaining()
            .min(this.block.len() - this.offset)
            .min(usize::try_from(this.remaining).unwrap_or(usize::MAX));

        if n > 0 {
            buf.put_slice(&this.block[this.offset..this.offset + n]);
            this.offset = (this.offset + n) % this.block.len();
            this.remaining -= n as u64;
        }

        Poll::Ready(Ok(()))
    }
}
