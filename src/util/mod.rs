pub(crate) const TMP_ID_PREFIX: &str = "tmp-";

pub(crate) fn now_ms() -> i64 {
    js_sys::Date::now().round() as i64
}

/// Local id for a block whose create call has not resolved yet.
pub(crate) fn make_tmp_id(now_ms: i64, rand: u64) -> String {
    format!("{TMP_ID_PREFIX}{now_ms}-{rand:x}")
}

pub(crate) fn is_tmp_id(id: &str) -> bool {
    id.starts_with(TMP_ID_PREFIX)
}

pub(crate) fn random_u64() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(e) => {
            log::warn!("getrandom failed, falling back to clock: {e}");
            now_ms() as u64
        }
    }
}
