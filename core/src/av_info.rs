//! System AV info reported to the host.

use crate::system::Region;

/// Native embedded framebuffer width.
pub const EFB_WIDTH: u32 = 640;
/// Native embedded framebuffer height.
pub const EFB_HEIGHT: u32 = 528;
/// Visible NTSC height once overscan is cropped.
pub const NTSC_CROPPED_HEIGHT: u32 = 480;

const ASPECT_WIDESCREEN: f32 = 16.0 / 9.0;
const ASPECT_STANDARD: f32 = 4.0 / 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geometry {
    pub base_width: u32,
    pub base_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub aspect_ratio: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Timing {
    pub fps: f64,
    pub sample_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SystemAvInfo {
    pub geometry: Geometry,
    pub timing: Timing,
}

/// Inputs to [`SystemAvInfo::compute`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoParams {
    pub efb_scale: u32,
    pub crop_overscan: bool,
    pub widescreen: bool,
    pub region: Region,
    pub sample_rate: u32,
}

impl SystemAvInfo {
    pub fn compute(params: &VideoParams) -> Self {
        let scale = params.efb_scale.max(1);
        let base_height = if params.crop_overscan && params.region == Region::Ntsc {
            NTSC_CROPPED_HEIGHT
        } else {
            EFB_HEIGHT
        };

        let width = EFB_WIDTH * scale;
        let height = base_height * scale;

        Self {
            geometry: Geometry {
                base_width: width,
                base_height: height,
                max_width: width,
                max_height: height,
                aspect_ratio: if params.widescreen {
                    ASPECT_WIDESCREEN
                } else {
                    ASPECT_STANDARD
                },
            },
            timing: Timing {
                fps: params.region.reported_fps(),
                sample_rate: f64::from(params.sample_rate),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> VideoParams {
        VideoParams {
            efb_scale: 1,
            crop_overscan: false,
            widescreen: false,
            region: Region::Ntsc,
            sample_rate: 48000,
        }
    }

    #[test]
    fn test_native_geometry() {
        let info = SystemAvInfo::compute(&params());
        assert_eq!(info.geometry.base_width, 640);
        assert_eq!(info.geometry.base_height, 528);
        assert_eq!(info.geometry.max_height, 528);
        assert!((info.geometry.aspect_ratio - 4.0 / 3.0).abs() < f32::EPSILON);
        assert!((info.timing.fps - 59.94).abs() < 0.001);
        assert_eq!(info.timing.sample_rate, 48000.0);
    }

    #[test]
    fn test_scaled_and_cropped() {
        let info = SystemAvInfo::compute(&VideoParams {
            efb_scale: 3,
            crop_overscan: true,
            widescreen: true,
            ..params()
        });
        assert_eq!(info.geometry.base_width, 1920);
        assert_eq!(info.geometry.base_height, 1440);
        assert!((info.geometry.aspect_ratio - 16.0 / 9.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_pal_ignores_crop() {
        let info = SystemAvInfo::compute(&VideoParams {
            crop_overscan: true,
            region: Region::Pal,
            ..params()
        });
        assert_eq!(info.geometry.base_height, 528);
        assert_eq!(info.timing.fps, 50.0);
    }
}
