//! 파일 이름 헤더 코덱
//!
//! 스트림 맨 앞의 선택적 한 줄:
//!
//! ```text
//! filename:<name>\n
//! <raw payload bytes...>
//! ```
//!
//! 첫 줄이 이 형식이 아니면 그 줄을 포함한 스트림 전체가 페이로드다.

/// 헤더 키
pub const FILE_NAME_HEADER: &str = "filename";

const PREFIX: &[u8] = b"filename:";

/// 헤더 디코딩 결과
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedHeader {
    /// 헤더가 지정한 이름 (공백 제거됨)
    pub name: Option<String>,

    /// 헤더 줄이 차지한 바이트 수 (개행 포함)
    /// 유효한 헤더가 없으면 0
    pub consumed: usize,
}

impl DecodedHeader {
    /// 헤더 뒤에 남은 페이로드
    pub fn payload<'a>(&self, window: &'a [u8]) -> &'a [u8] {
        &window[self.consumed..]
    }
}

/// 헤더 인코딩
///
/// 이름이 없으면 빈 벡터를 반환한다.
pub fn encode(name: Option<&str>) -> Vec<u8> {
    match name {
        Some(name) => {
            let mut out = Vec::with_capacity(PREFIX.len() + name.len() + 1);
            out.extend_from_slice(PREFIX);
            out.extend_from_slice(name.as_bytes());
            out.push(b'\n');
            out
        }
        None => Vec::new(),
    }
}

/// 헤더 디코딩
///
/// `window`는 스트림 앞부분의 제한된 버퍼다. 첫 줄이 개행으로 끝나고
/// `filename:`으로 시작하며 이름이 비어 있지 않을 때만 헤더로 인정한다.
pub fn decode(window: &[u8]) -> DecodedHeader {
    let Some(newline) = window.iter().position(|&b| b == b'\n') else {
        return DecodedHeader::default();
    };

    let line = &window[..newline];
    let Some(rest) = line.strip_prefix(PREFIX) else {
        return DecodedHeader::default();
    };

    let name = match std::str::from_utf8(rest) {
        Ok(s) => s.trim(),
        Err(_) => return DecodedHeader::default(),
    };

    if name.is_empty() {
        return DecodedHeader::default();
    }

    DecodedHeader {
        name: Some(name.to_string()),
        consumed: newline + 1,
    }
}

/// 헤더 판정에 더 읽어야 하는지 확인
///
/// 지금까지 받은 바이트가 헤더 접두사와 일치하고 아직 개행이 없을 때만 true.
pub(crate) fn is_incomplete(window: &[u8]) -> bool {
    let n = window.len().min(PREFIX.len());
    window[..n] == PREFIX[..n] && !window.contains(&b'\n')
}
