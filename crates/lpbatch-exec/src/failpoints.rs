//! Chaos/failpoint hooks (feature: `failpoints`).
//!
//! The macro expands to nothing unless the feature is enabled. When enabled,
//! a point panics once it has been armed on the current thread and hit the
//! requested number of times, which is how tests simulate a kill mid-run.

#[cfg(feature = "failpoints")]
mod armed {
    use std::cell::RefCell;
    use std::collections::HashMap;

    thread_local! {
        static ARMED: RefCell<HashMap<String, usize>> = RefCell::new(HashMap::new());
    }

    /// Panic on the `hits`-th time `name` is reached (1 = next hit).
    pub fn arm(name: &str, hits: usize) {
        ARMED.with(|a| {
            a.borrow_mut().insert(name.to_string(), hits.max(1));
        });
    }

    pub fn disarm_all() {
        ARMED.with(|a| a.borrow_mut().clear());
    }

    pub fn check(name: &str) {
        let fire = ARMED.with(|a| {
            let mut a = a.borrow_mut();
            match a.get_mut(name) {
                Some(left) if *left <= 1 => {
                    a.remove(name);
                    true
                }
                Some(left) => {
                    *left -= 1;
                    false
                }
                None => false,
            }
        });
        if fire {
            panic!("failpoint triggered: {}", name);
        }
    }
}

#[cfg(feature = "failpoints")]
pub use armed::{arm, check, disarm_all};

#[cfg(feature = "failpoints")]
#[macro_export]
macro_rules! fail_point {
    ($name:expr) => {{
        $crate::failpoints::check($name);
    }};
}

#[cfg(not(feature = "failpoints"))]
#[macro_export]
macro_rules! fail_point {
    ($name:expr) => {
        // no-op
        let _ = $name;
    };
}
