//! Application callbacks bound to controls.
//!
//! Every variant has a callback of a fixed arity: value controls receive the
//! session and the decoded value, buttons and labels receive the session
//! only, and download buttons hand back an optional byte payload. Callbacks
//! are shared (`Arc`) so the dispatcher can release its borrow of the
//! registry before running them against the session.

use std::{fmt, sync::Arc};

use serde_json::Value;

use crate::viewer::Viewer;

/// What a value callback hands back to the dispatcher's caller.
pub type CallbackResult = anyhow::Result<Option<Value>>;

pub struct Handler<F: ?Sized>(pub(crate) Arc<F>);

impl<F: ?Sized> Clone for Handler<F> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<F: ?Sized> fmt::Debug for Handler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

pub type ValueCallback<T> = Handler<dyn Fn(&mut Viewer, T) -> CallbackResult + Send + Sync>;
pub type ActionCallback = Handler<dyn Fn(&mut Viewer) -> anyhow::Result<()> + Send + Sync>;
pub type DownloadCallback =
    Handler<dyn Fn(&mut Viewer) -> anyhow::Result<Option<Vec<u8>>> + Send + Sync>;

pub(crate) fn value_callback<T, F>(f: F) -> ValueCallback<T>
where
    F: Fn(&mut Viewer, T) -> CallbackResult + Send + Sync + 'static,
{
    let f: Arc<dyn Fn(&mut Viewer, T) -> CallbackResult + Send + Sync> = Arc::new(f);
    Handler(f)
}

pub(crate) fn action_callback<F>(f: F) -> ActionCallback
where
    F: Fn(&mut Viewer) -> anyhow::Result<()> + Send + Sync + 'static,
{
    let f: Arc<dyn Fn(&mut Viewer) -> anyhow::Result<()> + Send + Sync> = Arc::new(f);
    Handler(f)
}

pub(crate) fn download_callback<F>(f: F) -> DownloadCallback
where
    F: Fn(&mut Viewer) -> anyhow::Result<Option<Vec<u8>>> + Send + Sync + 'static,
{
    let f: Arc<dyn Fn(&mut Viewer) -> anyhow::Result<Option<Vec<u8>>> + Send + Sync> =
        Arc::new(f);
    Handler(f)
}

/// Deferred callback call produced by decode-and-apply.
///
/// Built while the control is borrowed from the registry and run afterwards,
/// once the new state is committed and the session is free to lend out.
pub(crate) enum Invocation {
    Nothing,
    Call(Box<dyn FnOnce(&mut Viewer) -> CallbackResult + Send>),
    Download {
        callback: DownloadCallback,
        filename: String,
    },
}

impl Invocation {
    pub(crate) fn with_value<T>(callback: Option<&ValueCallback<T>>, value: T) -> Self
    where
        T: Send + 'static,
    {
        match callback {
            Some(callback) => {
                let callback = callback.clone();
                Self::Call(Box::new(move |viewer| (callback.0)(viewer, value)))
            }
            None => Self::Nothing,
        }
    }

    pub(crate) fn action(callback: Option<&ActionCallback>) -> Self {
        match callback {
            Some(callback) => {
                let callback = callback.clone();
                Self::Call(Box::new(move |viewer| (callback.0)(viewer).map(|()| None)))
            }
            None => Self::Nothing,
        }
    }
}
