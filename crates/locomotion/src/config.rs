//! Parkour tuning.
//!
//! Values use centimetres and seconds. The defaults reproduce the reference
//! tuning (vault 120, mantle 220, slide cancel at 575 cm/s).

use std::fs;
use std::io;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from loading or validating a [`ParkourConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How far ahead and above the feet the traversal probes look.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckDistance {
    /// Forward sweep length.
    pub forward: f32,
    /// Extra height above the standing capsule top where the downward probe starts.
    pub upward: f32,
}

/// Vault and mantle detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    pub check_distance: CheckDistance,

    /// Tallest obstacle that is vaulted (inclusive).
    pub max_vault_height: f32,

    /// Tallest obstacle that is mantled (inclusive).
    pub max_mantle_height: f32,

    /// How far past the front face the downward probe lands.
    pub inward_offset: f32,

    /// Radius of the downward probe capsule.
    pub probe_radius: f32,

    /// Half-height of the downward probe capsule.
    pub probe_half_height: f32,

    /// Forward distance from the feet to the landing point.
    pub landing_distance: f32,

    /// Clip played for a vault.
    pub vault_clip: String,

    /// Clip played for a mantle.
    pub mantle_clip: String,

    /// Warp target name for the obstacle edge.
    pub start_warp_target: String,

    /// Warp target name for the landing point.
    pub end_warp_target: String,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self {
            check_distance: CheckDistance {
                forward: 100.0,
                upward: 50.0,
            },
            max_vault_height: 120.0,
            max_mantle_height: 220.0,
            inward_offset: 20.0,
            probe_radius: 10.0,
            probe_half_height: 20.0,
            landing_distance: 100.0,
            vault_clip: "Traversal.Vault".to_owned(),
            mantle_clip: "Traversal.Mantle".to_owned(),
            start_warp_target: "TraversalStart".to_owned(),
            end_warp_target: "TraversalEnd".to_owned(),
        }
    }
}

/// Launch applied by a wall-jump.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallJumpVelocity {
    /// Speed away from the wall.
    pub away: f32,
    /// Speed along the wall in the running direction.
    pub forward: f32,
    /// Upward speed.
    pub upward: f32,
}

/// Wallrun detection, camera tilt and wall-jump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WallrunConfig {
    /// Lateral probe length.
    pub check_distance: f32,

    /// How far behind the body the lateral probe ends.
    pub check_angle: f32,

    /// Camera roll while wallrunning (degrees).
    pub camera_tilt_angle: f32,

    /// Camera roll interpolation speed (1/s).
    pub camera_interp_speed: f32,

    /// Cooldown after a wallrun ends before checks re-arm (seconds).
    pub reset_time: f32,

    pub jump_velocity: WallJumpVelocity,
}

impl Default for WallrunConfig {
    fn default() -> Self {
        Self {
            check_distance: 75.0,
            check_angle: 35.0,
            camera_tilt_angle: 15.0,
            camera_interp_speed: 10.0,
            reset_time: 0.35,
            jump_velocity: WallJumpVelocity {
                away: 1000.0,
                forward: 1000.0,
                upward: 800.0,
            },
        }
    }
}

impl WallrunConfig {
    /// Wall-jump launch for a wall with `wall_normal` while running along `along_wall`.
    pub fn wall_jump_launch(&self, wall_normal: Vec3, along_wall: Vec3, up: Vec3) -> Vec3 {
        wall_normal * self.jump_velocity.away
            + along_wall * self.jump_velocity.forward
            + up * self.jump_velocity.upward
    }
}

/// Slide trigger, overrides and cancel threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideConfig {
    /// Downward probe length looking for the floor.
    pub distance_check: f32,

    /// Velocity change applied along the slope when the slide starts.
    pub force: f32,

    /// Ground friction while sliding.
    pub ground_friction: f32,

    /// Braking deceleration while sliding.
    pub braking_deceleration: f32,

    /// Crouched max speed while sliding.
    pub max_walk_speed_crouched: f32,

    /// The slide ends once speed drops to this (inclusive).
    pub cancel_speed: f32,

    /// Crouch input while airborne queues a slide for landing.
    pub slide_on_land: bool,
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            distance_check: 200.0,
            force: 800.0,
            ground_friction: 0.0,
            braking_deceleration: 1000.0,
            max_walk_speed_crouched: 0.0,
            cancel_speed: 575.0,
            slide_on_land: true,
        }
    }
}

/// Crouch resizing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrouchConfig {
    /// Resizes mirror a remote body's replicated crouch instead of deciding locally.
    pub client_simulation: bool,
}

/// Complete parkour tuning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParkourConfig {
    pub traversal: TraversalConfig,
    pub wallrun: WallrunConfig,
    pub slide: SlideConfig,
    pub crouch: CrouchConfig,
}

impl ParkourConfig {
    /// Bouncier tuning: higher vaults, longer wallruns, stronger slides.
    pub fn arcade() -> Self {
        Self {
            traversal: TraversalConfig {
                max_vault_height: 150.0,
                max_mantle_height: 260.0,
                ..Default::default()
            },
            wallrun: WallrunConfig {
                check_distance: 90.0,
                reset_time: 0.2,
                ..Default::default()
            },
            slide: SlideConfig {
                force: 1100.0,
                braking_deceleration: 700.0,
                cancel_speed: 450.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Heavier tuning: lower traversals, slow wallrun re-arm, short slides.
    pub fn grounded() -> Self {
        Self {
            traversal: TraversalConfig {
                max_vault_height: 90.0,
                max_mantle_height: 180.0,
                ..Default::default()
            },
            wallrun: WallrunConfig {
                camera_tilt_angle: 8.0,
                reset_time: 0.8,
                ..Default::default()
            },
            slide: SlideConfig {
                force: 500.0,
                braking_deceleration: 1500.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let traversal = &self.traversal;
        if traversal.check_distance.forward <= 0.0 {
            return Err(invalid("traversal.check_distance.forward must be positive"));
        }
        if traversal.check_distance.upward < 0.0 {
            return Err(invalid("traversal.check_distance.upward must not be negative"));
        }
        if traversal.max_vault_height < 0.0 {
            return Err(invalid("traversal.max_vault_height must not be negative"));
        }
        if traversal.max_mantle_height < traversal.max_vault_height {
            return Err(invalid("traversal.max_mantle_height must be at least max_vault_height"));
        }
        if traversal.probe_radius <= 0.0 || traversal.probe_half_height < traversal.probe_radius {
            return Err(invalid("traversal probe needs radius > 0 and half_height >= radius"));
        }
        if traversal.start_warp_target.is_empty() || traversal.end_warp_target.is_empty() {
            return Err(invalid("traversal warp target names must not be empty"));
        }
        if traversal.start_warp_target == traversal.end_warp_target {
            return Err(invalid("traversal warp target names must differ"));
        }

        let wallrun = &self.wallrun;
        if wallrun.check_distance <= 0.0 {
            return Err(invalid("wallrun.check_distance must be positive"));
        }
        if wallrun.reset_time < 0.0 {
            return Err(invalid("wallrun.reset_time must not be negative"));
        }
        if wallrun.camera_interp_speed < 0.0 {
            return Err(invalid("wallrun.camera_interp_speed must not be negative"));
        }

        let slide = &self.slide;
        if slide.distance_check <= 0.0 {
            return Err(invalid("slide.distance_check must be positive"));
        }
        if slide.ground_friction < 0.0 || slide.braking_deceleration < 0.0 {
            return Err(invalid("slide friction and braking must not be negative"));
        }
        if slide.cancel_speed < 0.0 {
            return Err(invalid("slide.cancel_speed must not be negative"));
        }

        Ok(())
    }
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::Invalid(message.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ParkourConfig::default();
        assert_eq!(config.traversal.check_distance.forward, 100.0);
        assert_eq!(config.traversal.check_distance.upward, 50.0);
        assert_eq!(config.traversal.max_vault_height, 120.0);
        assert_eq!(config.traversal.max_mantle_height, 220.0);
        assert_eq!(config.wallrun.check_distance, 75.0);
        assert_eq!(config.wallrun.check_angle, 35.0);
        assert_eq!(config.wallrun.reset_time, 0.35);
        assert_eq!(config.slide.force, 800.0);
        assert_eq!(config.slide.cancel_speed, 575.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_validate() {
        assert!(ParkourConfig::arcade().validate().is_ok());
        assert!(ParkourConfig::grounded().validate().is_ok());
        assert!(ParkourConfig::arcade().traversal.max_vault_height > ParkourConfig::grounded().traversal.max_vault_height);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = ParkourConfig::from_json_str(r#"{ "traversal": { "max_vault_height": 100.0 } }"#)
            .expect("valid config");
        assert_eq!(config.traversal.max_vault_height, 100.0);
        assert_eq!(config.traversal.max_mantle_height, 220.0);
        assert_eq!(config.slide, SlideConfig::default());
    }

    #[test]
    fn test_invalid_heights_rejected() {
        let err = ParkourConfig::from_json_str(
            r#"{ "traversal": { "max_vault_height": 300.0, "max_mantle_height": 200.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_parse_error() {
        let err = ParkourConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ParkourConfig::load("/nonexistent/freerun.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_wall_jump_launch() {
        let config = WallrunConfig::default();
        let launch = config.wall_jump_launch(Vec3::Z, Vec3::X, Vec3::Y);
        assert_eq!(launch, Vec3::new(1000.0, 800.0, 1000.0));
    }
}
