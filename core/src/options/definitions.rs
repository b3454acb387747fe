//! Option table published to the host
//!
//! Each option lists its accepted values; the first one is the default.

/// One host-visible option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDefinition {
    pub key: &'static str,
    pub description: &'static str,
    pub values: &'static [&'static str],
}

impl OptionDefinition {
    pub const fn new(
        key: &'static str,
        description: &'static str,
        values: &'static [&'static str],
    ) -> Self {
        Self {
            key,
            description,
            values,
        }
    }

    /// Default value (first listed value, empty if the list is empty).
    pub fn default_value(&self) -> &'static str {
        self.values.first().copied().unwrap_or("")
    }

    /// Value string in the `SET_VARIABLES` format: `"Description; a|b|c"`.
    pub fn variable_string(&self) -> String {
        format!("{}; {}", self.description, self.values.join("|"))
    }
}

/// Option keys, grouped the way the settings are grouped in the frontend menu.
pub mod keys {
    pub mod general {
        pub const CPU_CORE: &str = "dolphin_cpu_core";
        pub const CPU_CLOCK_RATE: &str = "dolphin_cpu_clock_rate";
        pub const EMULATION_SPEED: &str = "dolphin_emulation_speed";
        pub const MAIN_CPU_THREAD: &str = "dolphin_main_cpu_thread";
        pub const PRECISION_FRAME_TIMING: &str = "dolphin_precision_frame_timing";
        pub const FASTMEM: &str = "dolphin_fastmem";
        pub const CHEATS_ENABLED: &str = "dolphin_cheats_enabled";
        pub const SKIP_GC_BIOS: &str = "dolphin_skip_gc_bios";
        pub const LANGUAGE: &str = "dolphin_language";
        pub const FAST_DISC_SPEED: &str = "dolphin_fast_disc_speed";
    }

    pub mod audio {
        pub const DSP_HLE: &str = "dolphin_dsp_hle";
        pub const DSP_JIT: &str = "dolphin_dsp_jit";
        pub const MIXER_RATE: &str = "dolphin_mixer_rate";
        pub const CALL_BACK_AUDIO: &str = "dolphin_call_back_audio_method";
    }

    pub mod interface {
        pub const OSD_ENABLED: &str = "dolphin_osd_enabled";
        pub const LOG_LEVEL: &str = "dolphin_log_level";
    }

    pub mod sysconf {
        pub const WIDESCREEN: &str = "dolphin_widescreen";
        pub const PROGRESSIVE_SCAN: &str = "dolphin_progressive_scan";
        pub const PAL60: &str = "dolphin_pal60";
        pub const SENSOR_BAR_POSITION: &str = "dolphin_sensor_bar_position";
        pub const ENABLE_RUMBLE: &str = "dolphin_enable_rumble";
        pub const WIIMOTE_CONTINUOUS_SCANNING: &str = "dolphin_wiimote_continuous_scanning";
        pub const ALT_GC_PORTS_ON_WII: &str = "dolphin_alt_gc_ports_on_wii";
    }

    pub mod gfx_settings {
        pub const RENDERER: &str = "dolphin_renderer";
        pub const WIDESCREEN_HACK: &str = "dolphin_widescreen_hack";
        pub const CROP_OVERSCAN: &str = "dolphin_crop_overscan";
        pub const EFB_SCALE: &str = "dolphin_efb_scale";
        pub const SHADER_COMPILATION_MODE: &str = "dolphin_shader_compilation_mode";
        pub const WAIT_FOR_SHADERS: &str = "dolphin_wait_for_shaders";
        pub const ANTI_ALIASING: &str = "dolphin_anti_aliasing";
        pub const TEXTURE_CACHE_ACCURACY: &str = "dolphin_texture_cache_accuracy";
        pub const GPU_TEXTURE_DECODING: &str = "dolphin_gpu_texture_decoding";
        pub const FAST_DEPTH_CALCULATION: &str = "dolphin_fast_depth_calculation";
    }

    pub mod gfx_enhancements {
        pub const MAX_ANISOTROPY: &str = "dolphin_max_anisotropy";
        pub const FORCE_TEXTURE_FILTERING_MODE: &str = "dolphin_force_texture_filtering_mode";
        pub const LOAD_CUSTOM_TEXTURES: &str = "dolphin_load_custom_textures";
        pub const CACHE_CUSTOM_TEXTURES: &str = "dolphin_cache_custom_textures";
    }

    pub mod gfx_hacks {
        pub const EFB_ACCESS_ENABLE: &str = "dolphin_efb_access_enable";
        pub const BBOX_ENABLED: &str = "dolphin_bbox_enabled";
        pub const FORCE_PROGRESSIVE: &str = "dolphin_force_progressive";
        pub const EFB_TO_TEXTURE: &str = "dolphin_efb_to_texture";
        pub const XFB_TO_TEXTURE_ENABLE: &str = "dolphin_xfb_to_texture_enable";
        pub const DEFER_EFB_COPIES: &str = "dolphin_defer_efb_copies";
        pub const IMMEDIATE_XFB: &str = "dolphin_immediate_xfb";
        pub const SKIP_DUPE_FRAMES: &str = "dolphin_skip_dupe_frames";
        pub const VI_SKIP: &str = "dolphin_vi_skip";
    }

    pub mod wiimote {
        pub const IR_MODE: &str = "dolphin_ir_mode";
        pub const IR_OFFSET: &str = "dolphin_ir_offset";
        pub const IR_YAW: &str = "dolphin_ir_yaw";
        pub const IR_PITCH: &str = "dolphin_ir_pitch";
    }
}

use keys::{audio, general, gfx_enhancements, gfx_hacks, gfx_settings, interface, sysconf, wiimote};

const BOOL_ON: &[&str] = &["enabled", "disabled"];
const BOOL_OFF: &[&str] = &["disabled", "enabled"];

/// Every option the core knows about, in menu order.
pub static DEFINITIONS: &[OptionDefinition] = &[
    OptionDefinition::new(gfx_settings::RENDERER, "Renderer", &["Hardware", "Software", "Null"]),
    OptionDefinition::new(
        general::CPU_CORE,
        "CPU Core",
        &["JIT64", "JITARM64", "Interpreter", "Cached Interpreter"],
    ),
    OptionDefinition::new(
        general::CPU_CLOCK_RATE,
        "CPU Clock Rate",
        &[
            "100%", "150%", "200%", "250%", "300%", "5%", "10%", "20%", "30%", "40%", "50%",
            "60%", "70%", "80%", "90%",
        ],
    ),
    OptionDefinition::new(general::EMULATION_SPEED, "Emulation Speed", &["100%", "unlimited"]),
    OptionDefinition::new(general::MAIN_CPU_THREAD, "Dual Core Mode", BOOL_ON),
    OptionDefinition::new(
        general::PRECISION_FRAME_TIMING,
        "Precision Frame Timing",
        BOOL_OFF,
    ),
    OptionDefinition::new(general::FASTMEM, "Fastmem", BOOL_ON),
    OptionDefinition::new(general::CHEATS_ENABLED, "Internal Cheats Enabled", BOOL_OFF),
    OptionDefinition::new(general::SKIP_GC_BIOS, "Skip GameCube BIOS", BOOL_ON),
    OptionDefinition::new(
        general::LANGUAGE,
        "Language",
        &[
            "English",
            "Japanese",
            "German",
            "French",
            "Spanish",
            "Italian",
            "Dutch",
            "Simplified Chinese",
            "Traditional Chinese",
            "Korean",
        ],
    ),
    OptionDefinition::new(general::FAST_DISC_SPEED, "Speed Up Disc Transfer Rate", BOOL_OFF),
    OptionDefinition::new(audio::DSP_HLE, "DSP HLE", BOOL_ON),
    OptionDefinition::new(audio::DSP_JIT, "DSP Enable JIT", BOOL_ON),
    OptionDefinition::new(audio::MIXER_RATE, "Audio Mixer Rate", &["32000", "48000"]),
    OptionDefinition::new(
        audio::CALL_BACK_AUDIO,
        "Audio Delivery Method",
        &["Push Samples", "Sync Per Frame", "Async Callback"],
    ),
    OptionDefinition::new(interface::OSD_ENABLED, "OSD Enabled", BOOL_ON),
    OptionDefinition::new(
        interface::LOG_LEVEL,
        "Log Level",
        &["Info", "Notice", "Error", "Warning", "Debug"],
    ),
    OptionDefinition::new(sysconf::WIDESCREEN, "Widescreen (Wii)", BOOL_ON),
    OptionDefinition::new(sysconf::PROGRESSIVE_SCAN, "Progressive Scan", BOOL_ON),
    OptionDefinition::new(sysconf::PAL60, "PAL60", BOOL_ON),
    OptionDefinition::new(sysconf::SENSOR_BAR_POSITION, "Sensor Bar Position", &["Bottom", "Top"]),
    OptionDefinition::new(sysconf::ENABLE_RUMBLE, "Rumble", BOOL_ON),
    OptionDefinition::new(
        sysconf::WIIMOTE_CONTINUOUS_SCANNING,
        "Wiimote Continuous Scanning",
        BOOL_OFF,
    ),
    OptionDefinition::new(
        sysconf::ALT_GC_PORTS_ON_WII,
        "Use ports 5-8 for GameCube controllers in Wii mode",
        BOOL_OFF,
    ),
    OptionDefinition::new(gfx_settings::WIDESCREEN_HACK, "WideScreen Hack", BOOL_OFF),
    OptionDefinition::new(gfx_settings::CROP_OVERSCAN, "Crop Overscan", BOOL_OFF),
    OptionDefinition::new(
        gfx_settings::EFB_SCALE,
        "Internal Resolution (x640 x528)",
        &["1", "2", "3", "4", "5", "6"],
    ),
    OptionDefinition::new(
        gfx_settings::SHADER_COMPILATION_MODE,
        "Shader Compilation Mode",
        &["sync", "a-sync Skip Rendering", "sync UberShaders", "a-sync UberShaders"],
    ),
    OptionDefinition::new(
        gfx_settings::WAIT_FOR_SHADERS,
        "Wait for Shaders before Starting",
        BOOL_OFF,
    ),
    OptionDefinition::new(
        gfx_settings::ANTI_ALIASING,
        "Anti-Aliasing",
        &["None", "2x MSAA", "4x MSAA", "8x MSAA", "2x SSAA", "4x SSAA", "8x SSAA"],
    ),
    OptionDefinition::new(
        gfx_settings::TEXTURE_CACHE_ACCURACY,
        "Texture Cache Accuracy",
        &["Fast", "Middle", "Safe"],
    ),
    OptionDefinition::new(
        gfx_settings::GPU_TEXTURE_DECODING,
        "GPU Texture Decoding",
        BOOL_OFF,
    ),
    OptionDefinition::new(
        gfx_settings::FAST_DEPTH_CALCULATION,
        "Fast Depth Calculation",
        BOOL_ON,
    ),
    OptionDefinition::new(
        gfx_enhancements::MAX_ANISOTROPY,
        "Max Anisotropy",
        &["1x", "2x", "4x", "8x", "16x"],
    ),
    OptionDefinition::new(
        gfx_enhancements::FORCE_TEXTURE_FILTERING_MODE,
        "Force Texture Filtering Mode",
        &["Disabled", "Nearest", "Linear"],
    ),
    OptionDefinition::new(
        gfx_enhancements::LOAD_CUSTOM_TEXTURES,
        "Load Custom Textures",
        BOOL_OFF,
    ),
    OptionDefinition::new(
        gfx_enhancements::CACHE_CUSTOM_TEXTURES,
        "Prefetch Custom Textures",
        BOOL_OFF,
    ),
    OptionDefinition::new(gfx_hacks::EFB_ACCESS_ENABLE, "EFB Access Enable", BOOL_OFF),
    OptionDefinition::new(gfx_hacks::BBOX_ENABLED, "Bounding Box Emulation", BOOL_OFF),
    OptionDefinition::new(gfx_hacks::FORCE_PROGRESSIVE, "Force Progressive", BOOL_ON),
    OptionDefinition::new(gfx_hacks::EFB_TO_TEXTURE, "Skip EFB Copy to RAM", BOOL_ON),
    OptionDefinition::new(
        gfx_hacks::XFB_TO_TEXTURE_ENABLE,
        "Skip XFB Copy to RAM",
        BOOL_ON,
    ),
    OptionDefinition::new(gfx_hacks::DEFER_EFB_COPIES, "Defer EFB Copies to RAM", BOOL_ON),
    OptionDefinition::new(gfx_hacks::IMMEDIATE_XFB, "Immediate XFB", BOOL_OFF),
    OptionDefinition::new(
        gfx_hacks::SKIP_DUPE_FRAMES,
        "Skip Presenting Duplicate Frames",
        BOOL_ON,
    ),
    OptionDefinition::new(gfx_hacks::VI_SKIP, "VI Skip", BOOL_OFF),
    OptionDefinition::new(
        wiimote::IR_MODE,
        "Wiimote IR Mode",
        &[
            "Right Stick controls pointer (relative)",
            "Right Stick controls pointer (absolute)",
            "Mouse controls pointer",
        ],
    ),
    OptionDefinition::new(wiimote::IR_OFFSET, "Wiimote IR Vertical Offset", IR_OFFSET_VALUES),
    OptionDefinition::new(wiimote::IR_YAW, "Wiimote IR Total Yaw", IR_ANGLE_VALUES),
    OptionDefinition::new(wiimote::IR_PITCH, "Wiimote IR Total Pitch", IR_ANGLE_VALUES),
];

/// Vertical offset, default 10, range -50..=50.
const IR_OFFSET_VALUES: &[&str] = &[
    "10", "11", "12", "13", "14", "15", "16", "17", "18", "19", "20", "21", "22", "23", "24",
    "25", "26", "27", "28", "29", "30", "31", "32", "33", "34", "35", "36", "37", "38", "39",
    "40", "41", "42", "43", "44", "45", "46", "47", "48", "49", "50", "-50", "-49", "-48",
    "-47", "-46", "-45", "-44", "-43", "-42", "-41", "-40", "-39", "-38", "-37", "-36", "-35",
    "-34", "-33", "-32", "-31", "-30", "-29", "-28", "-27", "-26", "-25", "-24", "-23", "-22",
    "-21", "-20", "-19", "-18", "-17", "-16", "-15", "-14", "-13", "-12", "-11", "-10", "-9",
    "-8", "-7", "-6", "-5", "-4", "-3", "-2", "-1", "0", "1", "2", "3", "4", "5", "6", "7", "8",
    "9",
];

/// Total yaw/pitch, default 15, range 0..=100.
const IR_ANGLE_VALUES: &[&str] = &[
    "15", "16", "17", "18", "19", "20", "21", "22", "23", "24", "25", "26", "27", "28", "29",
    "30", "31", "32", "33", "34", "35", "36", "37", "38", "39", "40", "41", "42", "43", "44",
    "45", "46", "47", "48", "49", "50", "51", "52", "53", "54", "55", "56", "57", "58", "59",
    "60", "61", "62", "63", "64", "65", "66", "67", "68", "69", "70", "71", "72", "73", "74",
    "75", "76", "77", "78", "79", "80", "81", "82", "83", "84", "85", "86", "87", "88", "89",
    "90", "91", "92", "93", "94", "95", "96", "97", "98", "99", "100", "0", "1", "2", "3", "4",
    "5", "6", "7", "8", "9", "10", "11", "12", "13", "14",
];

/// Look up a definition by key.
pub fn find(key: &str) -> Option<&'static OptionDefinition> {
    DEFINITIONS.iter().find(|def| def.key == key)
}

/// `(key, default)` pairs for every known option.
pub fn known_keys() -> impl Iterator<Item = (&'static str, &'static str)> {
    DEFINITIONS.iter().map(|def| (def.key, def.default_value()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashSet;

    #[test]
    fn test_keys_are_unique() {
        let mut seen = HashSet::new();
        for def in DEFINITIONS {
            assert!(seen.insert(def.key), "duplicate key {}", def.key);
        }
    }

    #[test]
    fn test_every_definition_has_a_default() {
        for def in DEFINITIONS {
            assert!(!def.values.is_empty(), "{} has no values", def.key);
            assert!(!def.default_value().is_empty());
        }
    }

    #[test]
    fn test_variable_string_format() {
        let def = find(keys::audio::MIXER_RATE).unwrap();
        assert_eq!(def.variable_string(), "Audio Mixer Rate; 32000|48000");
    }

    #[test]
    fn test_ir_value_lists_are_complete() {
        assert_eq!(IR_OFFSET_VALUES.len(), 101);
        assert_eq!(IR_ANGLE_VALUES.len(), 101);
        assert_eq!(find(keys::wiimote::IR_YAW).unwrap().default_value(), "15");
    }
}
