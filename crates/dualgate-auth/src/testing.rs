//! In-process collaborators for unit tests

use crate::directory::{DirectoryClient, DirectoryConnection, DirectoryEndpoint};
use crate::second_factor::SecondFactorClient;
use async_trait::async_trait;
use dualgate_core::types::IdentityRecord;
use dualgate_core::{DualgateConfig, Error, Result};
use dualgate_store::IdentityStore;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub fn test_config() -> DualgateConfig {
    let mut config = DualgateConfig::default();
    config.directory.host = "ad.example.com".to_string();
    config.directory.port = 389;
    config.second_factor.secret = "s3cret".to_string();
    config.second_factor.server = "radius.example.com:1812".to_string();
    config
}

pub fn alice_record() -> IdentityRecord {
    IdentityRecord::new("alice")
        .with_name("Alice", "Liddell")
        .with_email("alice@example.com")
}

/// What one directory attempt does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryStep {
    /// Connect and bind succeed
    Accept,
    /// Bind reports invalid credentials
    Reject,
    /// Bind fails with a protocol error
    Fault,
    /// Connect fails
    Unreachable,
    /// Connect succeeds, the connection drops during bind
    Dropped,
}

/// Scripted directory; the last step repeats once the script runs out
pub struct FakeDirectory {
    script: Mutex<VecDeque<DirectoryStep>>,
    last: Mutex<DirectoryStep>,
    connects: AtomicUsize,
    binds: Arc<Mutex<Vec<(String, String)>>>,
    unbinds: Arc<AtomicUsize>,
}

impl FakeDirectory {
    pub fn new(steps: impl IntoIterator<Item = DirectoryStep>) -> Self {
        Self {
            script: Mutex::new(steps.into_iter().collect()),
            last: Mutex::new(DirectoryStep::Unreachable),
            connects: AtomicUsize::new(0),
            binds: Arc::new(Mutex::new(Vec::new())),
            unbinds: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn binds(&self) -> Vec<(String, String)> {
        self.binds.lock().clone()
    }

    pub fn unbinds(&self) -> usize {
        self.unbinds.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> DirectoryStep {
        let mut last = self.last.lock();
        if let Some(step) = self.script.lock().pop_front() {
            *last = step;
        }
        *last
    }
}

#[async_trait]
impl DirectoryClient for FakeDirectory {
    async fn connect(&self, _endpoint: &DirectoryEndpoint) -> Result<Box<dyn DirectoryConnection>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        match self.next_step() {
            DirectoryStep::Unreachable => {
                Err(Error::Connectivity("Can't contact LDAP server".into()))
            }
            step => Ok(Box::new(FakeConnection {
                step,
                binds: self.binds.clone(),
                unbinds: self.unbinds.clone(),
            })),
        }
    }
}

struct FakeConnection {
    step: DirectoryStep,
    binds: Arc<Mutex<Vec<(String, String)>>>,
    unbinds: Arc<AtomicUsize>,
}

#[async_trait]
impl DirectoryConnection for FakeConnection {
    async fn bind(&mut self, bind_identity: &str, password: &str) -> Result<bool> {
        self.binds
            .lock()
            .push((bind_identity.to_string(), password.to_string()));
        match self.step {
            DirectoryStep::Accept => Ok(true),
            DirectoryStep::Reject => Ok(false),
            DirectoryStep::Fault => Err(Error::Credential("protocol error".into())),
            DirectoryStep::Dropped | DirectoryStep::Unreachable => {
                Err(Error::Connectivity("connection reset".into()))
            }
        }
    }

    async fn unbind(&mut self) {
        self.unbinds.fetch_add(1, Ordering::SeqCst);
    }
}

/// Second factor service with a fixed answer; `None` means a service fault
pub struct FakeSecondFactor {
    answer: Option<bool>,
    calls: AtomicUsize,
    last_request: Mutex<Option<(String, String, String, String)>>,
}

impl FakeSecondFactor {
    fn with_answer(answer: Option<bool>) -> Self {
        Self {
            answer,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn accepting() -> Self {
        Self::with_answer(Some(true))
    }

    pub fn rejecting() -> Self {
        Self::with_answer(Some(false))
    }

    pub fn faulting() -> Self {
        Self::with_answer(None)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<(String, String, String, String)> {
        self.last_request.lock().clone()
    }
}

#[async_trait]
impl SecondFactorClient for FakeSecondFactor {
    async fn authenticate(
        &self,
        secret: &str,
        username: &str,
        code: &str,
        server: &str,
    ) -> Result<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some((
            secret.to_string(),
            username.to_string(),
            code.to_string(),
            server.to_string(),
        ));
        self.answer
            .ok_or_else(|| Error::ServiceFault("request timed out".into()))
    }
}

/// Identity store whose backend is always down
pub struct FailingStore;

#[async_trait]
impl IdentityStore for FailingStore {
    async fn get(&self, _username: &str) -> Result<IdentityRecord> {
        Err(Error::Store("database is locked".into()))
    }
}
