//! Suppression of diagnostic output while an engine call is in flight.

use std::future::Future;

use tracing::instrument::WithSubscriber;
use tracing::subscriber::NoSubscriber;

/// Drives `future` with a no-op tracing dispatcher when `enabled`.
///
/// The dispatcher is swapped in only while `future` itself is being polled,
/// so other tasks sharing the thread keep logging in between polls, and the
/// previous dispatcher is back after every poll however it ends (ready,
/// pending, or unwinding).
pub async fn quietly<F: Future>(enabled: bool, future: F) -> F::Output {
    if enabled {
        future.with_subscriber(NoSubscriber::default()).await
    } else {
        future.await
    }
}

#[cfg(test)]
pub(crate) mod capture {
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub(crate) struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    pub(crate) fn capturing_subscriber(
        writer: SharedBuf,
    ) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish()
    }
}
