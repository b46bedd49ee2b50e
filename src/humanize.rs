//! 사람이 읽기 쉬운 크기/속도/시간 표시

use std::time::Duration;

use crate::{GIB, KIB, MIB};

/// 바이트 수 표시
pub fn size(bytes: u64) -> String {
    let b = bytes as f64;
    match bytes {
        n if n < KIB => format!("{} byte(s)", n),
        n if n < MIB => format!("{:.3} KiB", b / KIB as f64),
        n if n < GIB => format!("{:.3} MiB", b / MIB as f64),
        _ => format!("{:.3} GiB", b / GIB as f64),
    }
}

/// 비트 전송률 표시 (이진 배수)
pub fn speed(bps: f64) -> String {
    let (kib, mib, gib) = (KIB as f64, MIB as f64, GIB as f64);
    if bps < kib {
        format!("{:.2} bit/s", bps)
    } else if bps < mib {
        format!("{:.2} Kibit/s", bps / kib)
    } else if bps < gib {
        format!("{:.2} Mibit/s", bps / mib)
    } else {
        format!("{:.2} Gibit/s", bps / gib)
    }
}

/// 경과 시간 표시
pub fn time(elapsed: Duration) -> String {
    if elapsed < Duration::from_secs(1) {
        format!("{} ms", elapsed.as_millis())
    } else {
        format!("{:.3} sec", elapsed.as_secs_f64())
    }
}
