//! 中间件执行器

use super::Middleware;
use infrastructure_common::DependencyResult;
use tracing::{debug, warn};

/// 按顺序执行中间件
pub struct MiddlewareApplier;

impl MiddlewareApplier {
    /// 依次执行中间件，前一个的返回值作为下一个的输入
    ///
    /// 不重试，不回滚。失败时返回中间件给出的原始错误。
    pub fn apply_middlewares<'a, T: ?Sized>(
        target: &'a T,
        middlewares: &[Box<dyn Middleware<T>>],
    ) -> DependencyResult<&'a T> {
        middlewares
            .iter()
            .enumerate()
            .try_fold(target, |current, (index, middleware)| {
                debug!(middleware = middleware.name(), index, "应用中间件");
                middleware.apply(current).map_err(|error| {
                    warn!(
                        middleware = middleware.name(),
                        index,
                        skipped = middlewares.len() - index - 1,
                        "中间件执行失败: {}",
                        error
                    );
                    error
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use infrastructure_common::DependencyError;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Recorder {
        log: Mutex<Vec<&'static str>>,
    }

    fn step(name: &'static str) -> Box<dyn Middleware<Recorder>> {
        Box::new(move |target: &Recorder| -> DependencyResult<()> {
            target.log.lock().push(name);
            Ok(())
        })
    }

    fn failing(name: &'static str) -> Box<dyn Middleware<Recorder>> {
        Box::new(move |target: &Recorder| -> DependencyResult<()> {
            target.log.lock().push(name);
            Err(DependencyError::registration(name, "失败"))
        })
    }

    #[test]
    fn applies_in_list_order() {
        let recorder = Recorder {
            log: Mutex::new(Vec::new()),
        };
        let middlewares = vec![step("A"), step("B"), step("C")];
        let result = MiddlewareApplier::apply_middlewares(&recorder, &middlewares).unwrap();
        assert!(std::ptr::eq(result, &recorder));
        assert_eq!(*recorder.log.lock(), vec!["A", "B", "C"]);
    }

    #[test]
    fn first_error_stops_the_pipeline() {
        let recorder = Recorder {
            log: Mutex::new(Vec::new()),
        };
        let middlewares = vec![step("A"), failing("B"), step("C")];
        let error = MiddlewareApplier::apply_middlewares(&recorder, &middlewares).unwrap_err();
        assert!(matches!(
            error,
            DependencyError::RegistrationError { ref type_name, .. } if type_name == "B"
        ));
        assert_eq!(*recorder.log.lock(), vec!["A", "B"]);
    }

    #[test]
    fn empty_pipeline_returns_target() {
        let recorder = Arc::new(Recorder {
            log: Mutex::new(Vec::new()),
        });
        let middlewares: Vec<Box<dyn Middleware<Recorder>>> = Vec::new();
        let result = MiddlewareApplier::apply_middlewares(recorder.as_ref(), &middlewares).unwrap();
        assert!(std::ptr::eq(result, recorder.as_ref()));
        assert!(recorder.log.lock().is_empty());
    }
}
