pub mod cmd;
pub mod error;

pub use cmd::config::CardConfig;
pub use error::CardError;

/// 输出错误日志, 成功时返回结果
pub fn log_error<T>(x: anyhow::Result<T>) -> Option<T> {
    x.map_err(|e| {
        log::error!("{e:#}");
    })
    .ok()
}
