use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use url::Url;

use crate::{
    capture::PNG_SIGNATURE,
    engine::{EngineInstance, RenderEngine, Resolution, Viewport},
    error::LaunchError,
};

pub(crate) fn fake_png() -> Vec<u8> {
    let mut png = PNG_SIGNATURE.to_vec();
    png.extend_from_slice(b"IHDR");
    png
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FailAt {
    Nowhere,
    MissingDependency,
    Launch,
    OpenViewport,
    Navigate,
    CloseViewport,
    Shutdown,
    Capture,
}

/// Engine double that records every call in order.
#[derive(Clone)]
pub(crate) struct FakeEngine {
    pub(crate) calls: Arc<Mutex<Vec<String>>>,
    fail_at: FailAt,
    image: Vec<u8>,
}

impl FakeEngine {
    pub(crate) fn new() -> Self {
        Self::failing_at(FailAt::Nowhere)
    }

    pub(crate) fn failing_at(fail_at: FailAt) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_at,
            image: fake_png(),
        }
    }

    pub(crate) fn returning(mut self, image: Vec<u8>) -> Self {
        self.image = image;
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn fails(&self, at: FailAt) -> anyhow::Result<()> {
        if self.fail_at == at {
            return Err(anyhow!("injected failure at {at:?}"));
        }
        Ok(())
    }
}

impl RenderEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    fn launch(&self, _resolution: Resolution) -> Result<Box<dyn EngineInstance>, LaunchError> {
        self.record("launch".into());
        match self.fail_at {
            FailAt::MissingDependency => Err(LaunchError::DependencyMissing {
                dependency: "fake engine".into(),
                remediation: "install it".into(),
            }),
            FailAt::Launch => Err(LaunchError::EngineLaunch {
                remediation: "retry".into(),
                source: anyhow!("spawn failed"),
            }),
            _ => Ok(Box::new(self.clone())),
        }
    }
}

impl EngineInstance for FakeEngine {
    fn open_viewport(&mut self, resolution: Resolution) -> anyhow::Result<Box<dyn Viewport>> {
        self.record(format!("open_viewport {resolution}"));
        self.fails(FailAt::OpenViewport)?;
        Ok(Box::new(self.clone()))
    }

    fn shutdown(&mut self) -> anyhow::Result<()> {
        self.record("shutdown".into());
        self.fails(FailAt::Shutdown)
    }
}

impl Viewport for FakeEngine {
    fn navigate(&mut self, url: &Url) -> anyhow::Result<()> {
        self.record(format!("navigate {url}"));
        self.fails(FailAt::Navigate)
    }

    fn capture(&mut self, resolution: Resolution) -> anyhow::Result<Vec<u8>> {
        self.record(format!("capture {resolution}"));
        self.fails(FailAt::Capture)?;
        Ok(self.image.clone())
    }

    fn close(&mut self) -> anyhow::Result<()> {
        self.record("close_viewport".into());
        self.fails(FailAt::CloseViewport)
    }
}
