pub(crate) mod account;
pub(crate) mod memory;
pub(crate) mod playback;
pub(crate) mod sharing;

pub(crate) use account::AccountUseCase;
pub(crate) use memory::MemoryUseCase;
pub(crate) use playback::PlaybackUseCase;
pub(crate) use sharing::SharingUseCase;
