//! 音声再生の状態
//!
//! 実際の出力は持たない。「どのソースが再生中か」だけを追う。

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AudioState {
    current_src: Option<String>,
    current_name: Option<String>,
    is_playing: bool,
}

impl AudioState {
    pub fn play(&mut self, src: &str, name: &str) {
        self.current_src = Some(src.to_string());
        self.current_name = Some(name.to_string());
        self.is_playing = true;
    }

    /// 一時停止。ソースは覚えたまま。
    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    /// src が再生中なら止め、それ以外なら src を再生する。戻り値は操作後の再生状態。
    pub fn toggle(&mut self, src: &str, name: &str) -> bool {
        if self.is_playing_src(src) {
            self.pause();
        } else {
            self.play(src, name);
        }
        self.is_playing
    }

    pub fn is_playing_src(&self, src: &str) -> bool {
        self.is_playing && self.current_src.as_deref() == Some(src)
    }

    /// 再生が最後まで進んだ
    pub fn ended(&mut self) {
        self.is_playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_src(&self) -> Option<&str> {
        self.current_src.as_deref()
    }

    pub fn current_name(&self) -> Option<&str> {
        self.current_name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_same_src_pauses() {
        let mut audio = AudioState::default();
        assert!(audio.toggle("a.mp3", "a"));
        assert!(audio.is_playing_src("a.mp3"));
        assert!(!audio.toggle("a.mp3", "a"));
        assert!(!audio.is_playing());
        assert_eq!(audio.current_src(), Some("a.mp3"));
    }

    #[test]
    fn test_toggle_other_src_switches() {
        let mut audio = AudioState::default();
        audio.play("a.mp3", "a");
        assert!(audio.toggle("b.mp3", "b"));
        assert!(audio.is_playing_src("b.mp3"));
        assert!(!audio.is_playing_src("a.mp3"));
        assert_eq!(audio.current_name(), Some("b"));
    }

    #[test]
    fn test_paused_src_resumes_on_toggle() {
        let mut audio = AudioState::default();
        audio.play("a.mp3", "a");
        audio.ended();
        assert!(!audio.is_playing_src("a.mp3"));
        assert!(audio.toggle("a.mp3", "a"));
    }
}
