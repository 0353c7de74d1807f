//! Background key generation.
//!
//! RSA key generation takes long enough to stall an async executor, so these
//! futures run it on tokio's blocking pool and report through a channel.

use crate::{
    algorithms::{
        EcdsaAlgorithm, EcdsaProvider, PssAlgorithm, PssProvider, RsaAlgorithm, RsaProvider,
    },
    error::{JoseError, JoseResult},
    jwk::Jwk,
};
use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::{runtime::Handle, sync::oneshot};

/// Resolves to the result of a key generation job.
///
/// Yields [`JoseError::TaskFailed`] if the job never reports, including when
/// it was requested outside a tokio runtime.
#[derive(Debug)]
pub struct KeyGenerationFuture<T> {
    rx: oneshot::Receiver<JoseResult<T>>,
}

impl<T: Send + 'static> KeyGenerationFuture<T> {
    pub(crate) fn spawn<F>(job: F) -> Self
    where
        F: FnOnce() -> JoseResult<T> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || {
                    let _ = tx.send(job());
                });
            }
            Err(_) => tracing::warn!("key generation requested outside a tokio runtime"),
        }
        Self { rx }
    }
}

impl<T> Future for KeyGenerationFuture<T> {
    type Output = JoseResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(JoseError::TaskFailed)),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl RsaProvider {
    /// [`generate`](Self::generate) on the blocking pool.
    pub fn generate_async(algorithm: RsaAlgorithm) -> KeyGenerationFuture<(Self, Jwk)> {
        KeyGenerationFuture::spawn(move || Self::generate(algorithm))
    }
}

impl PssProvider {
    /// [`generate`](Self::generate) on the blocking pool.
    pub fn generate_async(algorithm: PssAlgorithm) -> KeyGenerationFuture<(Self, Jwk)> {
        KeyGenerationFuture::spawn(move || Self::generate(algorithm))
    }
}

impl EcdsaProvider {
    /// [`generate`](Self::generate) on the blocking pool.
    pub fn generate_async(algorithm: EcdsaAlgorithm) -> KeyGenerationFuture<(Self, Jwk)> {
        KeyGenerationFuture::spawn(move || Self::generate(algorithm))
    }
}
