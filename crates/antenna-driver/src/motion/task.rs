//! 驱动任务的取消令牌
//!
//! 取消是协作式的：驱动任务在两个 tick 之间检查令牌。
//! 外部取消同时丢弃唤醒通道的发送端，使工作线程立刻从
//! `recv_timeout()` 中醒来，而不必等满一个 tick 周期。

use crossbeam_channel::{Receiver, Sender, bounded};
use parking_lot::Mutex;
use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// 取消请求来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelRequest {
    /// 未取消
    None,
    /// 由其他线程取消：取消方负责 join 并上报 motion-stopped
    External,
    /// 由运动回调内部取消：驱动任务自行结束并上报
    Internal,
}

/// 取消令牌
#[derive(Debug)]
pub struct CancelToken {
    request: AtomicU8,
    wake: Mutex<Option<Sender<()>>>,
}

impl CancelToken {
    /// 创建令牌与唤醒接收端
    pub fn new() -> (Arc<Self>, Receiver<()>) {
        let (tx, rx) = bounded(0);
        (
            Arc::new(Self {
                request: AtomicU8::new(0),
                wake: Mutex::new(Some(tx)),
            }),
            rx,
        )
    }

    /// 当前请求
    pub fn request(&self) -> CancelRequest {
        match self.request.load(Ordering::Acquire) {
            1 => CancelRequest::External,
            2 => CancelRequest::Internal,
            _ => CancelRequest::None,
        }
    }

    /// 是否已取消
    pub fn is_cancelled(&self) -> bool {
        self.request() != CancelRequest::None
    }

    /// 外部取消并唤醒工作线程
    pub fn cancel(&self) {
        let _ = self.request.compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire);
        self.wake.lock().take();
    }

    /// 从运动回调内部取消（不唤醒，当前线程就是驱动任务）
    pub fn cancel_from_task(&self) {
        let _ = self.request.compare_exchange(0, 2, Ordering::AcqRel, Ordering::Acquire);
    }
}

thread_local! {
    /// 当前线程正在执行的运动任务：(控制器标识, 令牌)
    static ACTIVE_RUN: RefCell<Option<(usize, Arc<CancelToken>)>> = const { RefCell::new(None) };
}

/// 标记当前线程正在执行某个控制器的 tick（RAII，离开作用域恢复）
pub(crate) struct ActiveRunGuard {
    previous: Option<(usize, Arc<CancelToken>)>,
}

impl ActiveRunGuard {
    pub(crate) fn enter(controller: usize, token: Arc<CancelToken>) -> Self {
        let previous = ACTIVE_RUN.with(|slot| slot.borrow_mut().replace((controller, token)));
        Self { previous }
    }
}

impl Drop for ActiveRunGuard {
    fn drop(&mut self) {
        let previous = self.previous.take();
        ACTIVE_RUN.with(|slot| *slot.borrow_mut() = previous);
    }
}

/// 当前线程是否正在执行该控制器的运动任务；是则返回其令牌
pub(crate) fn active_token(controller: usize) -> Option<Arc<CancelToken>> {
    ACTIVE_RUN.with(|slot| {
        slot.borrow()
            .as_ref()
            .filter(|(id, _)| *id == controller)
            .map(|(_, token)| token.clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::RecvTimeoutError;
    use std::time::Duration;

    #[test]
    fn test_external_cancel_wakes_receiver() {
        let (token, rx) = CancelToken::new();
        assert_eq!(rx.recv_timeout(Duration::from_millis(1)), Err(RecvTimeoutError::Timeout));

        token.cancel();
        assert_eq!(token.request(), CancelRequest::External);
        assert_eq!(
            rx.recv_timeout(Duration::from_secs(5)),
            Err(RecvTimeoutError::Disconnected)
        );
    }

    #[test]
    fn test_first_request_wins() {
        let (token, _rx) = CancelToken::new();
        token.cancel_from_task();
        token.cancel();
        assert_eq!(token.request(), CancelRequest::Internal);
    }

    #[test]
    fn test_active_run_guard_is_scoped() {
        let (token, _rx) = CancelToken::new();
        assert!(active_token(7).is_none());
        {
            let _guard = ActiveRunGuard::enter(7, token);
            assert!(active_token(7).is_some());
            assert!(active_token(8).is_none());
        }
        assert!(active_token(7).is_none());
    }
}
