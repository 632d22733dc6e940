use std::cell::Cell;

/// "Operation in progress" flag owned by whoever starts a fetch.
///
/// Observers are notified on every transition. Use [`LoadingState::begin`] so the
/// flag is cleared even when the operation bails out early.
#[derive(Default)]
pub struct LoadingState {
    loading: Cell<bool>,
    observer: Option<Box<dyn Fn(bool)>>,
}

impl LoadingState {
    pub fn with_observer(observer: impl Fn(bool) + 'static) -> Self {
        Self {
            loading: Cell::new(false),
            observer: Some(Box::new(observer)),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn set_loading(&self, value: bool) {
        if self.loading.replace(value) == value {
            return;
        }
        if let Some(observer) = &self.observer {
            observer(value);
        }
    }

    pub fn begin(&self) -> LoadingGuard<'_> {
        self.set_loading(true);
        LoadingGuard { state: self }
    }
}

pub struct LoadingGuard<'a> {
    state: &'a LoadingState,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.set_loading(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn recording() -> (LoadingState, Rc<std::cell::RefCell<Vec<bool>>>) {
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let state = LoadingState::with_observer(move |value| sink.borrow_mut().push(value));
        (state, seen)
    }

    #[test]
    fn guard_clears_flag_on_drop() {
        let (state, seen) = recording();
        {
            let _guard = state.begin();
            assert!(state.is_loading());
        }
        assert!(!state.is_loading());
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn guard_clears_flag_on_early_return() {
        fn failing(state: &LoadingState) -> Result<(), &'static str> {
            let _guard = state.begin();
            let rows: Option<u32> = None;
            rows.ok_or("fetch failed")?;
            Ok(())
        }

        let (state, seen) = recording();
        assert!(failing(&state).is_err());
        assert!(!state.is_loading());
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn repeated_values_do_not_notify() {
        let (state, seen) = recording();
        state.set_loading(false);
        state.set_loading(true);
        state.set_loading(true);
        assert_eq!(*seen.borrow(), vec![true]);
    }

    #[test]
    fn works_without_observer() {
        let state = LoadingState::default();
        let guard = state.begin();
        assert!(state.is_loading());
        drop(guard);
        assert!(!state.is_loading());
    }
}
