/// Lifecycle of one view's data: every fetch starts in `Loading` and ends in
/// exactly one of the other states.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Error(String),
    Empty,
    Ready(T),
}

pub const LOADING_TEXT: &str = "Đang tải dữ liệu...";
pub const EMPTY_TEXT: &str = "Chưa có dữ liệu";

impl<T> ViewState<T> {
    /// Settles a finished fetch. `is_empty` decides whether a successful
    /// payload has anything to show; `message` localizes the failure.
    pub fn settle<E>(
        result: Result<T, E>,
        is_empty: impl FnOnce(&T) -> bool,
        message: impl FnOnce(&E) -> String,
    ) -> Self {
        match result {
            Ok(data) if is_empty(&data) => ViewState::Empty,
            Ok(data) => ViewState::Ready(data),
            Err(err) => ViewState::Error(message(&err)),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ViewState::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settle() {
        let ready: ViewState<Vec<u8>> =
            ViewState::settle(Ok::<_, ()>(vec![1]), |v| v.is_empty(), |_| String::new());
        assert_eq!(ready, ViewState::Ready(vec![1]));

        let empty: ViewState<Vec<u8>> =
            ViewState::settle(Ok::<_, ()>(vec![]), |v| v.is_empty(), |_| String::new());
        assert_eq!(empty, ViewState::Empty);

        let failed: ViewState<Vec<u8>> =
            ViewState::settle(Err("boom"), |v| v.is_empty(), |e| format!("lỗi {e}"));
        assert_eq!(failed, ViewState::Error("lỗi boom".to_string()));
        assert!(failed.is_error());
    }
}
