use crate::log::lwarn;

/// A trait for logging a warning when an `Option` chain comes up empty.
pub(crate) trait OptionLog {
    /// Log `msg` as a warning if the value is `None`.
    fn warn_none(self, msg: &str) -> Self;
}

impl<T> OptionLog for Option<T> {
    #[inline]
    fn warn_none(self, msg: &str) -> Self {
        self.or_else(|| {
            lwarn!("{}", msg);

            None
        })
    }
}
