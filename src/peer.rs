//! 피어와 전송 엔드포인트
//!
//! 송신자는 포트를 열고 수신자를 기다리며 (`accept`),
//! 수신자는 송신자에게 접속한다 (`connect`).

use std::fmt;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, warn};

use crate::{Error, Result, ANYONE};

/// 상대편 식별자
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Peer {
    /// 아무 피어나 허용 (송신자 전용)
    Anyone,

    /// 호스트 이름 또는 IP 주소
    Host(String),
}

impl Peer {
    /// 피어 이름 파싱
    ///
    /// 비어 있으면 검증 에러. `anyone`은 대소문자를 구분하지 않는다.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::validation("피어가 지정되지 않음"));
        }
        if s.eq_ignore_ascii_case(ANYONE) {
            return Ok(Peer::Anyone);
        }
        Ok(Peer::Host(s.to_string()))
    }

    /// 접속할 호스트 (Anyone이면 None)
    pub fn host(&self) -> Option<&str> {
        match self {
            Peer::Anyone => None,
            Peer::Host(host) => Some(host.as_str()),
        }
    }

    /// 허용되는 IP 목록 조회 (Anyone이면 None)
    async fn allowed_ips(&self) -> Result<Option<Vec<IpAddr>>> {
        let Peer::Host(host) = self else {
            return Ok(None);
        };

        let addrs = tokio::net::lookup_host((host.as_str(), 0))
            .await
            .map_err(|source| Error::Connect {
                peer: host.clone(),
                source,
            })?;

        Ok(Some(addrs.map(|a| canonical_ip(a.ip())).collect()))
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Peer::Anyone => f.write_str(ANYONE),
            Peer::Host(host) => f.write_str(host),
        }
    }
}

/// IPv4-mapped IPv6 주소를 IPv4로 정규화
fn canonical_ip(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
        v4 => v4,
    }
}

/// 엔드포인트 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Sender,
    Receiver,
}

/// 전송 하나에 쓰이는 TCP 연결
///
/// 전송마다 새로 만들고 재사용하지 않는다. 소켓은 drop 시 닫힌다.
#[derive(Debug)]
pub struct TransferEndpoint {
    stream: TcpStream,
    role: Role,
    peer: Peer,
    remote: SocketAddr,
}

impl TransferEndpoint {
    /// 송신자에게 접속 (수신자 역할)
    pub async fn connect(peer: &Peer, port: u16, timeout: Option<Duration>) -> Result<Self> {
        let Some(host) = peer.host() else {
            return Err(Error::validation("송신자 호스트가 지정되지 않음"));
        };

        let stream = with_timeout(peer, timeout, async {
            TcpStream::connect((host, port))
                .await
                .map_err(|source| Error::Connect {
                    peer: format!("{}:{}", host, port),
                    source,
                })
        })
        .await?;

        let remote = stream.peer_addr()?;
        let _ = stream.set_nodelay(true);
        debug!("connected to {}", remote);

        Ok(Self {
            stream,
            role: Role::Receiver,
            peer: peer.clone(),
            remote,
        })
    }

    /// 수신자 접속 대기 (송신자 역할)
    ///
    /// 허용되지 않은 피어의 접속은 끊고 계속 기다린다.
    pub async fn accept(listener: &TcpListener, peer: &Peer, timeout: Option<Duration>) -> Result<Self> {
        let allowed = peer.allowed_ips().await?;

        let (stream, remote) = with_timeout(peer, timeout, async {
            loop {
                let (stream, remote) = listener.accept().await?;
                let ip = canonical_ip(remote.ip());

                match &allowed {
                    Some(ips) if !ips.contains(&ip) => {
                        warn!("허용되지 않은 피어 접속 거부: {} (expected {})", remote, peer);
                    }
                    _ => return Ok::<_, Error>((stream, remote)),
                }
            }
        })
        .await?;

        let _ = stream.set_nodelay(true);
        debug!("accepted connection from {}", remote);

        Ok(Self {
            stream,
            role: Role::Sender,
            peer: peer.clone(),
            remote,
        })
    }

    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn peer(&self) -> &Peer {
        &self.peer
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote
    }

    /// 쓰기 방향 종료 (상대편에 EOF 전달)
    pub async fn shutdown(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

async fn with_timeout<T, F>(peer: &Peer, timeout: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout {
        Some(timeout) => match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                peer: peer.to_string(),
                timeout,
            }),
        },
        None => fut.await,
    }
}
