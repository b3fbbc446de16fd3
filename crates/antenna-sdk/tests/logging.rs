//! 日志初始化
//!
//! 全局 subscriber 只能安装一次，因此单独放在一个测试二进制里。

#[test]
fn init_logger_is_idempotent() {
    assert!(antenna_sdk::init_logger_with_filter("debug"));
    assert!(!antenna_sdk::init_logger());

    // log 记录经 LogTracer 转发
    log::info!("log bridge active");
    tracing::info!("tracing active");
}
