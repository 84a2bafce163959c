use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use hotreload::errors::Result;
use hotreload::port::ListenerResolver;

/// Resolver that reports a fixed owner for every port.
///
/// The owner can be changed while a probe holds the resolver, e.g. to make
/// the port look like it belongs to a freshly spawned fake pid.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    owner: Arc<Mutex<Option<u32>>>,
}

impl StaticResolver {
    pub fn new(owner: Option<u32>) -> Self {
        Self {
            owner: Arc::new(Mutex::new(owner)),
        }
    }

    pub fn set_owner(&self, owner: Option<u32>) {
        *self.owner.lock().unwrap() = owner;
    }
}

impl ListenerResolver for StaticResolver {
    fn listening_pid(
        &self,
        _port: u16,
    ) -> Pin<Box<dyn Future<Output = Result<Option<u32>>> + Send + '_>> {
        let owner = *self.owner.lock().unwrap();
        Box::pin(async move { Ok(owner) })
    }
}
