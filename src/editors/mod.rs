//! Admin and contact form handling.
//!
//! Forms arrive as loosely typed field values and are mapped onto entity records
//! without rejecting input: bad numbers become zero and blank list entries are dropped.

mod content;
mod message;
mod trip;

pub use content::*;
pub use message::*;
pub use trip::*;

use std::sync::atomic::{AtomicBool, Ordering};

use crate::errors::AppError;

/// Split newline or comma separated text into trimmed, non-empty entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(['\n', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Coerce a loosely typed number field. Anything unparseable becomes 0.
pub fn coerce_number(value: &serde_json::Value) -> f64 {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) if s.trim().is_empty() => Some(0.0),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        serde_json::Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// Single-flight flag for a form submit.
#[derive(Debug, Default)]
pub struct BusyFlag {
    busy: AtomicBool,
}

impl BusyFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the flag. It is released when the returned guard drops.
    pub fn acquire(&self) -> Result<BusyGuard<'_>, AppError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AppError::Conflict {
                message: "A save is already in progress".to_string(),
                current_version: 0,
            })?;
        Ok(BusyGuard { flag: &self.busy })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

pub struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("Flights\n Hotel stay ,, \nGuide,"),
            vec!["Flights", "Hotel stay", "Guide"]
        );
        assert!(split_list("  \n , ").is_empty());
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(100)), 100.0);
        assert_eq!(coerce_number(&json!("12500.5")), 12500.5);
        assert_eq!(coerce_number(&json!("")), 0.0);
        assert_eq!(coerce_number(&json!("12abc")), 0.0);
        assert_eq!(coerce_number(&json!("NaN")), 0.0);
        assert_eq!(coerce_number(&json!(null)), 0.0);
    }

    #[test]
    fn test_busy_flag_released_on_drop() {
        let flag = BusyFlag::new();
        {
            let _guard = flag.acquire().unwrap();
            assert!(flag.is_busy());
            assert!(flag.acquire().is_err());
        }
        assert!(!flag.is_busy());
        assert!(flag.acquire().is_ok());
    }
}
