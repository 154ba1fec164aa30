//! 音声 fragment の再生状態のユースケース
//!
//! 実際の音声出力はしない。再生対象の URL と状態だけを扱う。

use common::domain::{AudioState, Fragment, FragmentId, Memory};
use common::error::Error;
use std::sync::Mutex;

/// toggle 後の状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playback {
    pub playing: bool,
    pub src: String,
    pub name: String,
}

pub struct PlaybackUseCase {
    storage_url: Option<String>,
    audio: Mutex<AudioState>,
}

impl PlaybackUseCase {
    pub fn new(storage_url: Option<String>) -> Self {
        Self {
            storage_url,
            audio: Mutex::new(AudioState::default()),
        }
    }

    /// 音声 fragment の URL を解決し、再生中なら止め、そうでなければ再生する
    pub fn toggle(&self, memory: &Memory, fragment_id: &FragmentId) -> Result<Playback, Error> {
        let fragment = memory.get_fragment(fragment_id)?;
        let name = match fragment {
            Fragment::Audio(file) => file.name.clone(),
            other => {
                return Err(Error::invalid_argument(format!(
                    "fragment {} is {}, not audio",
                    fragment_id,
                    other.kind().as_str()
                )))
            }
        };
        let storage_url = self
            .storage_url
            .as_deref()
            .ok_or_else(|| Error::config("storage_url is not configured"))?;
        let src = fragment
            .media_url(storage_url, &memory.owner)
            .ok_or_else(|| Error::invalid_argument(format!("fragment {} has no media", fragment_id)))?;

        let playing = self.with_audio(|audio| audio.toggle(&src, &name));
        Ok(Playback { playing, src, name })
    }

    /// 再生が最後まで進んだ
    #[allow(dead_code)]
    pub fn ended(&self) {
        self.with_audio(|audio| audio.ended());
    }

    #[allow(dead_code)]
    pub fn is_playing(&self, src: &str) -> bool {
        self.with_audio(|audio| audio.is_playing_src(src))
    }

    fn with_audio<R>(&self, f: impl FnOnce(&mut AudioState) -> R) -> R {
        match self.audio.lock() {
            Ok(mut audio) => f(&mut audio),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}
