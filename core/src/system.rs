//! Emulated system description
//!
//! The pacing controller only needs two facts about the running title:
//! which console family is emulated and which video region it targets.

/// Video region of the running title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    /// 60 Hz class (also used for PAL60 on Wii)
    #[default]
    Ntsc,
    /// 50 Hz class
    Pal,
}

impl Region {
    /// Fixed frame rate used when the host has not negotiated frame timing.
    pub fn nominal_refresh_rate(self) -> f64 {
        match self {
            Region::Ntsc => 60.0,
            Region::Pal => 50.0,
        }
    }

    /// Frame rate reported to the host in the AV info.
    pub fn reported_fps(self) -> f64 {
        match self {
            Region::Ntsc => 60.0 / 1.001,
            Region::Pal => 50.0,
        }
    }
}

/// Console family being emulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SystemKind {
    #[default]
    GameCube,
    Wii,
}

/// Snapshot of the emulated system handed to the session at boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemInfo {
    pub kind: SystemKind,
    pub region: Region,
}

impl SystemInfo {
    pub fn new(kind: SystemKind, region: Region) -> Self {
        Self { kind, region }
    }

    pub fn is_wii(&self) -> bool {
        self.kind == SystemKind::Wii
    }
}
