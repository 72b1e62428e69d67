#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Mutex;

use serde_json::json;

use property_api::models::{Offer, Property};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores variables on unwind and serializes access to process-global env
/// vars, since tests in one binary run in parallel.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Block on a future from inside a synchronous test body.
pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to build runtime")
        .block_on(future)
}

/// Listing payload as a client would send it.
pub fn property_json(title: &str, city: &str) -> serde_json::Value {
    json!({
        "title": title,
        "description": "Light-filled rooms close to transit",
        "address": "12 Test Lane",
        "city": city,
        "state": "TX",
        "price": 100000,
        "bedrooms": 1,
        "bathrooms": 1.0,
        "area_sqft": 500
    })
}

pub fn sample_property(title: &str, city: &str) -> Property {
    serde_json::from_value(property_json(title, city)).expect("valid property payload")
}

/// Offer payload as a client would send it.
pub fn offer_json(property_id: &str) -> serde_json::Value {
    json!({
        "property_id": property_id,
        "full_name": "Jane Buyer",
        "email": "jane@example.com",
        "phone": "+1 555 0100",
        "amount": 95000,
        "message": "Can close in 30 days"
    })
}

pub fn sample_offer(property_id: &str) -> Offer {
    serde_json::from_value(offer_json(property_id)).expect("valid offer payload")
}
