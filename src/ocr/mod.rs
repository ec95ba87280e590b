//! OCR domain — an explicitly owned handle around a text-recognition engine.
//!
//! The engine is created lazily by [`OcrHandle::acquire`], shared by every
//! later call, and torn down by [`OcrHandle::release`]. Concurrent acquires
//! wait on the same initialization instead of racing to build two engines.
//! Blocking engine work runs on tokio's blocking pool under a timeout.

pub mod tesseract;

use crate::error::OcrError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Recognition settings, adjustable between calls.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrSettings {
    /// Tesseract language codes, e.g. `["eng", "ind"]`.
    pub languages: Vec<String>,
    /// Page segmentation mode. 6 = a single uniform block of text.
    pub psm: i32,
    /// Engine mode. 1 = LSTM only.
    pub oem: i32,
    pub init_timeout: Duration,
    pub recognize_timeout: Duration,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            languages: vec!["eng".to_string(), "ind".to_string()],
            psm: 6,
            oem: 1,
            init_timeout: Duration::from_secs(60),
            recognize_timeout: Duration::from_secs(30),
        }
    }
}

impl OcrSettings {
    /// Languages joined the way tesseract expects (`eng+ind`).
    pub fn language_spec(&self) -> String {
        self.languages.join("+")
    }
}

/// A text-recognition engine. Implementations may block.
pub trait TextRecognizer: Send + Sync {
    /// Recognize text in encoded image bytes.
    fn recognize(&self, image: &[u8], settings: &OcrSettings) -> Result<String, OcrError>;

    /// Free engine resources. Called once by [`OcrHandle::release`].
    fn terminate(&self) {}
}

type EngineFactory =
    Arc<dyn Fn(&OcrSettings) -> Result<Arc<dyn TextRecognizer>, OcrError> + Send + Sync>;

/// Caller-owned handle to at most one live OCR engine.
pub struct OcrHandle {
    engine: tokio::sync::Mutex<Option<Arc<dyn TextRecognizer>>>,
    factory: EngineFactory,
    settings: Mutex<OcrSettings>,
    initializations: AtomicUsize,
}

impl OcrHandle {
    /// Handle backed by the system tesseract binary.
    pub fn tesseract(settings: OcrSettings) -> Self {
        Self::with_factory(settings, |settings| {
            let engine = tesseract::TesseractRecognizer::initialize(settings)?;
            Ok(Arc::new(engine) as Arc<dyn TextRecognizer>)
        })
    }

    /// Handle backed by a custom engine factory.
    pub fn with_factory<F>(settings: OcrSettings, factory: F) -> Self
    where
        F: Fn(&OcrSettings) -> Result<Arc<dyn TextRecognizer>, OcrError> + Send + Sync + 'static,
    {
        Self {
            engine: tokio::sync::Mutex::new(None),
            factory: Arc::new(factory),
            settings: Mutex::new(settings),
            initializations: AtomicUsize::new(0),
        }
    }

    pub fn settings(&self) -> OcrSettings {
        self.settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Change page segmentation mode and/or languages for later calls.
    pub fn reconfigure(&self, psm: Option<i32>, languages: Option<Vec<String>>) {
        let mut settings = self.settings.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(psm) = psm {
            settings.psm = psm;
        }
        if let Some(languages) = languages.filter(|l| !l.is_empty()) {
            settings.languages = languages;
        }
        log::info!(
            "[OCR] Reconfigured: psm={}, languages={}",
            settings.psm,
            settings.language_spec()
        );
    }

    /// Number of engines this handle has built so far.
    pub fn initializations(&self) -> usize {
        self.initializations.load(Ordering::SeqCst)
    }

    pub async fn is_ready(&self) -> bool {
        self.engine.lock().await.is_some()
    }

    /// Return the live engine, building it first if needed.
    ///
    /// The async lock is held across initialization, so concurrent callers
    /// queue behind the first one and then reuse its engine. A failed or
    /// timed-out initialization leaves the handle empty for a later retry.
    pub async fn acquire(&self) -> Result<Arc<dyn TextRecognizer>, OcrError> {
        let mut slot = self.engine.lock().await;
        if let Some(engine) = slot.as_ref() {
            return Ok(engine.clone());
        }

        let settings = self.settings();
        let factory = self.factory.clone();
        let init_timeout = settings.init_timeout;
        let start = std::time::Instant::now();
        log::info!("[OCR] Initializing engine ({})", settings.language_spec());

        let task = tokio::task::spawn_blocking(move || factory(&settings));
        let engine = match tokio::time::timeout(init_timeout, task).await {
            Err(_) => return Err(OcrError::InitTimeout(init_timeout)),
            Ok(Err(join)) => return Err(OcrError::Worker(join.to_string())),
            Ok(Ok(result)) => result?,
        };

        self.initializations.fetch_add(1, Ordering::SeqCst);
        log::info!("[OCR] Engine ready in {}ms", start.elapsed().as_millis());
        *slot = Some(engine.clone());
        Ok(engine)
    }

    /// Recognize text in encoded image bytes.
    pub async fn recognize(&self, image: Vec<u8>) -> Result<String, OcrError> {
        let engine = self.acquire().await?;
        let settings = self.settings();
        let recognize_timeout = settings.recognize_timeout;
        let start = std::time::Instant::now();

        let task = tokio::task::spawn_blocking(move || engine.recognize(&image, &settings));
        let text = match tokio::time::timeout(recognize_timeout, task).await {
            Err(_) => return Err(OcrError::Timeout(recognize_timeout)),
            Ok(Err(join)) => return Err(OcrError::Worker(join.to_string())),
            Ok(Ok(result)) => result?,
        };

        log::info!(
            "[OCR] Extracted {} chars in {}ms",
            text.chars().count(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }

    /// Terminate and drop the engine. The next acquire builds a new one.
    pub async fn release(&self) {
        if let Some(engine) = self.engine.lock().await.take() {
            engine.terminate();
            log::info!("[OCR] Engine released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    struct EchoRecognizer {
        terminated: Arc<AtomicBool>,
    }

    impl TextRecognizer for EchoRecognizer {
        fn recognize(&self, image: &[u8], _settings: &OcrSettings) -> Result<String, OcrError> {
            Ok(String::from_utf8_lossy(image).into_owned())
        }

        fn terminate(&self) {
            self.terminated.store(true, Ordering::SeqCst);
        }
    }

    fn echo_handle(terminated: Arc<AtomicBool>, init_delay: Duration) -> OcrHandle {
        OcrHandle::with_factory(OcrSettings::default(), move |_| {
            std::thread::sleep(init_delay);
            Ok(Arc::new(EchoRecognizer {
                terminated: terminated.clone(),
            }) as Arc<dyn TextRecognizer>)
        })
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_acquires_share_one_initialization() {
        let handle = Arc::new(echo_handle(Arc::default(), Duration::from_millis(100)));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let handle = handle.clone();
            tasks.push(tokio::spawn(async move { handle.acquire().await.map(|_| ()) }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(handle.initializations(), 1);
        assert!(handle.is_ready().await);
    }

    #[tokio::test]
    async fn release_terminates_and_allows_reacquire() {
        let terminated = Arc::new(AtomicBool::new(false));
        let handle = echo_handle(terminated.clone(), Duration::ZERO);

        assert_eq!(handle.recognize(b"hello".to_vec()).await.unwrap(), "hello");
        handle.release().await;
        assert!(terminated.load(Ordering::SeqCst));
        assert!(!handle.is_ready().await);

        handle.acquire().await.unwrap();
        assert_eq!(handle.initializations(), 2);
    }

    #[tokio::test]
    async fn slow_initialization_times_out() {
        let handle = echo_handle(Arc::default(), Duration::from_millis(500));
        handle
            .settings
            .lock()
            .unwrap()
            .init_timeout = Duration::from_millis(20);

        let err = handle.acquire().await.err().unwrap();
        assert!(matches!(err, OcrError::InitTimeout(_)));
        assert!(!handle.is_ready().await);
    }

    #[tokio::test]
    async fn slow_recognition_times_out() {
        struct Stuck;
        impl TextRecognizer for Stuck {
            fn recognize(&self, _: &[u8], _: &OcrSettings) -> Result<String, OcrError> {
                std::thread::sleep(Duration::from_millis(500));
                Ok(String::new())
            }
        }
        let settings = OcrSettings {
            recognize_timeout: Duration::from_millis(20),
            ..OcrSettings::default()
        };
        let handle = OcrHandle::with_factory(settings, |_| {
            Ok(Arc::new(Stuck) as Arc<dyn TextRecognizer>)
        });

        let err = handle.recognize(vec![1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, OcrError::Timeout(_)));
    }

    #[test]
    fn reconfigure_updates_settings() {
        let handle = echo_handle(Arc::default(), Duration::ZERO);
        handle.reconfigure(Some(11), Some(vec!["eng".to_string()]));
        let settings = handle.settings();
        assert_eq!(settings.psm, 11);
        assert_eq!(settings.language_spec(), "eng");

        handle.reconfigure(None, Some(Vec::new()));
        assert_eq!(handle.settings().language_spec(), "eng");
    }
}
