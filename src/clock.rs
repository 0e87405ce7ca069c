// Wall-clock helper; everything stored or compared is epoch milliseconds.

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
