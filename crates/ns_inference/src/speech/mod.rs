use std::fmt;
use std::sync::Arc;

use ns_core::{GenerationOptions, SpeechSynthesizer, TextGenerator, Voice};
use tracing::{info, warn};

pub mod google;

pub use google::{GoogleSpeechClient, ServiceAccount};

const TRANSLATION_UNAVAILABLE: &str = "Translation not available.";

/// Turns the final narrative into spoken Hindi. Without a synthesizer the
/// whole stage is skipped.
pub struct Narrator {
    generator: Arc<dyn TextGenerator>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    voice: Voice,
}

impl fmt::Debug for Narrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Narrator")
            .field("generator", &self.generator.name())
            .field("synthesizer", &self.synthesizer.as_ref().map(|s| s.name().to_string()))
            .field("voice", &self.voice)
            .finish()
    }
}

impl Narrator {
    pub fn new(generator: Arc<dyn TextGenerator>, synthesizer: Option<Arc<dyn SpeechSynthesizer>>) -> Self {
        Self {
            generator,
            synthesizer,
            voice: Voice::default(),
        }
    }

    pub fn with_voice(mut self, voice: Voice) -> Self {
        self.voice = voice;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.synthesizer.is_some()
    }

    pub async fn translate(&self, text: &str) -> ns_core::Result<String> {
        let prompt = format!("Just Translate this text into Hindi: {}", text);
        let translated = self
            .generator
            .generate(&prompt, &GenerationOptions::default())
            .await?;
        let translated = translated.trim();
        if translated.is_empty() {
            Ok(TRANSLATION_UNAVAILABLE.to_string())
        } else {
            Ok(translated.to_string())
        }
    }

    /// Translates and speaks `text`. Any failure is logged and yields `None`.
    pub async fn narrate(&self, text: &str) -> Option<Vec<u8>> {
        let Some(synthesizer) = &self.synthesizer else {
            warn!("🔇 Speech credentials missing, skipping audio");
            return None;
        };

        let translated = match self.translate(text).await {
            Ok(translated) => translated,
            Err(e) => {
                warn!("⚠️ Translation failed: {}", e);
                return None;
            }
        };
        info!("🈯 Generated Hindi text: {}", translated);

        match synthesizer.synthesize(&translated, &self.voice).await {
            Ok(audio) if audio.is_empty() => {
                warn!("⚠️ {} returned no audio", synthesizer.name());
                None
            }
            Ok(audio) => {
                info!("🔊 Synthesized {} bytes of audio", audio.len());
                Some(audio)
            }
            Err(e) => {
                warn!("⚠️ Error generating audio: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ns_core::{Error, Result};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct Translator(Option<&'static str>);

    #[async_trait]
    impl TextGenerator for Translator {
        fn name(&self) -> &str {
            "Translator"
        }

        async fn generate(&self, prompt: &str, _options: &GenerationOptions) -> Result<String> {
            assert!(prompt.starts_with("Just Translate this text into Hindi: "));
            self.0
                .map(str::to_string)
                .ok_or_else(|| Error::Generation("offline".to_string()))
        }
    }

    #[derive(Debug, Default)]
    struct RecordingSynth {
        fail: bool,
        spoken: Mutex<Vec<(String, Voice)>>,
    }

    #[async_trait]
    impl SpeechSynthesizer for RecordingSynth {
        fn name(&self) -> &str {
            "Recording"
        }

        async fn synthesize(&self, text: &str, voice: &Voice) -> Result<Vec<u8>> {
            if self.fail {
                return Err(Error::Speech("quota exceeded".to_string()));
            }
            self.spoken.lock().unwrap().push((text.to_string(), voice.clone()));
            Ok(b"ID3".to_vec())
        }
    }

    #[tokio::test]
    async fn test_narrate_translates_then_speaks() {
        let synth = Arc::new(RecordingSynth::default());
        let speaker: Arc<dyn SpeechSynthesizer> = synth.clone();
        let narrator = Narrator::new(Arc::new(Translator(Some(" नमस्ते "))), Some(speaker));

        let audio = narrator.narrate("Hello").await;

        assert_eq!(audio, Some(b"ID3".to_vec()));
        let spoken = synth.spoken.lock().unwrap();
        assert_eq!(spoken[0].0, "नमस्ते");
        assert_eq!(spoken[0].1, Voice::default());
    }

    #[tokio::test]
    async fn test_without_synthesizer_nothing_happens() {
        let narrator = Narrator::new(Arc::new(Translator(None)), None);
        assert!(!narrator.is_enabled());
        assert_eq!(narrator.narrate("Hello").await, None);
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let failing: Arc<dyn SpeechSynthesizer> =
            Arc::new(RecordingSynth { fail: true, ..RecordingSynth::default() });
        let narrator = Narrator::new(Arc::new(Translator(Some("नमस्ते"))), Some(failing));
        assert_eq!(narrator.narrate("Hello").await, None);

        let synth = Arc::new(RecordingSynth::default());
        let speaker: Arc<dyn SpeechSynthesizer> = synth.clone();
        let narrator = Narrator::new(Arc::new(Translator(None)), Some(speaker));
        assert_eq!(narrator.narrate("Hello").await, None);
        assert!(synth.spoken.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_translation_placeholder() {
        let narrator = Narrator::new(Arc::new(Translator(Some("  "))), None);
        assert_eq!(narrator.translate("Hello").await.unwrap(), TRANSLATION_UNAVAILABLE);
    }
}
