//! Scroll-driven presentation math. Every value here is a pure function of
//! the scroll position and viewport metrics: the same input always produces
//! the same frame, and inputs outside a ramp are clamped, never extrapolated.

use std::sync::atomic::{AtomicBool, Ordering};

/// Scroll distance in pixels over which the curtains fully open.
pub const CURTAIN_END_SCROLL: f64 = 500.0;
/// Hero copy starts fading here and is gone at `HERO_FADE_END`.
pub const HERO_FADE_START: f64 = 100.0;
pub const HERO_FADE_END: f64 = 300.0;
/// Panels reveal once the cube has faded below this opacity.
pub const REVEAL_OPACITY_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy)]
pub struct ScrollInput {
    pub scroll_y: f64,
    /// Scrollable distance: document height minus viewport height.
    pub page_height: f64,
    pub viewport_width: f64,
    pub viewport_height: f64,
}

impl ScrollInput {
    pub fn new(scroll_y: f64, page_height: f64, viewport_width: f64, viewport_height: f64) -> Self {
        Self {
            scroll_y,
            page_height,
            viewport_width,
            viewport_height,
        }
    }

    /// Overall progress through the page, clamped to [0, 1].
    pub fn progress(&self) -> f64 {
        if self.page_height <= 0.0 {
            0.0
        } else {
            (self.scroll_y / self.page_height).clamp(0.0, 1.0)
        }
    }
}

/// Transform of the floating cube. It widens, rotates, and fades as the
/// visitor scrolls; the idle float animation only runs at the very top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubePose {
    pub rotate_x_deg: f64,
    pub rotate_y_deg: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub scale_z: f64,
    pub opacity: f64,
    pub floating: bool,
}

pub fn cube_pose(input: ScrollInput) -> CubePose {
    let p = input.progress();
    CubePose {
        rotate_x_deg: p * 360.0,
        rotate_y_deg: p * 180.0,
        scale_x: (1.0 + p * 2.0).min(3.0),
        scale_y: (1.0 + p * 0.3).min(1.8),
        scale_z: (1.0 + p * 0.5).min(1.5),
        opacity: (1.0 - p).max(0.0),
        floating: input.scroll_y <= 0.0,
    }
}

/// Horizontal scale of each curtain half: 1 closed, 0 fully open.
pub fn curtain_scale(scroll_y: f64) -> f64 {
    (1.0 - scroll_y / CURTAIN_END_SCROLL).clamp(0.0, 1.0)
}

/// The background layer shows only once the curtains are fully open.
pub fn backdrop_visible(scroll_y: f64) -> bool {
    curtain_scale(scroll_y) == 0.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeroPose {
    pub opacity: f64,
    pub offset_y: f64,
    pub indicator_offset_y: f64,
}

pub fn hero_pose(scroll_y: f64) -> HeroPose {
    if scroll_y > HERO_FADE_START {
        let fade = ((scroll_y - HERO_FADE_START) / (HERO_FADE_END - HERO_FADE_START)).min(1.0);
        HeroPose {
            opacity: 1.0 - fade,
            offset_y: -50.0 * fade,
            indicator_offset_y: -20.0 * fade,
        }
    } else {
        HeroPose {
            opacity: 1.0,
            offset_y: 0.0,
            indicator_offset_y: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelPlacement {
    pub opacity: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Input panel, output panel, and trigger button placements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RevealFrame {
    pub input: PanelPlacement,
    pub output: PanelPlacement,
    pub trigger: PanelPlacement,
}

/// Panels fade in keyed off the cube's remaining opacity: the input panel
/// leads, the output panel lags by 0.3 of the ramp, the trigger sits between.
pub fn reveal_frame(input: ScrollInput) -> RevealFrame {
    let cube_opacity = cube_pose(input).opacity;
    let vw = input.viewport_width;
    let vh = input.viewport_height;

    if cube_opacity <= REVEAL_OPACITY_THRESHOLD {
        let fade = (REVEAL_OPACITY_THRESHOLD - cube_opacity) / REVEAL_OPACITY_THRESHOLD;
        RevealFrame {
            input: PanelPlacement {
                opacity: (fade * 1.5).min(1.0),
                offset_x: vw * -0.06,
                offset_y: vh * 0.25,
            },
            output: PanelPlacement {
                opacity: ((fade - 0.3).max(0.0) * 1.5).min(1.0),
                offset_x: vw * 0.057,
                offset_y: vh * 0.25,
            },
            trigger: PanelPlacement {
                opacity: (fade * 1.2).min(1.0),
                offset_x: 0.0,
                offset_y: vh * 0.06,
            },
        }
    } else {
        RevealFrame {
            input: PanelPlacement {
                opacity: 0.0,
                offset_x: vw * -0.1,
                offset_y: 0.0,
            },
            output: PanelPlacement {
                opacity: 0.0,
                offset_x: vw * 0.1,
                offset_y: 0.0,
            },
            trigger: PanelPlacement {
                opacity: 0.0,
                offset_x: 0.0,
                offset_y: vh * 0.2,
            },
        }
    }
}

/// One fully derived frame. Nothing persists between frames; callers
/// recompute from the current scroll position every time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollFrame {
    pub cube: CubePose,
    pub curtain_scale: f64,
    pub backdrop_visible: bool,
    pub hero: HeroPose,
    pub reveal: RevealFrame,
}

pub fn scroll_frame(input: ScrollInput) -> ScrollFrame {
    ScrollFrame {
        cube: cube_pose(input),
        curtain_scale: curtain_scale(input.scroll_y),
        backdrop_visible: backdrop_visible(input.scroll_y),
        hero: hero_pose(input.scroll_y),
        reveal: reveal_frame(input),
    }
}

/// Coalesces bursts of scroll events into at most one recomputation per
/// rendered frame. `try_acquire` returns true for the first caller of a
/// frame; everyone else skips until `release` marks the frame rendered.
#[derive(Debug, Default)]
pub struct FrameGate {
    ticking: AtomicBool,
}

impl FrameGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> bool {
        !self.ticking.swap(true, Ordering::AcqRel)
    }

    pub fn release(&self) {
        self.ticking.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top() -> ScrollInput {
        ScrollInput::new(0.0, 2000.0, 1280.0, 720.0)
    }

    fn at(scroll_y: f64) -> ScrollInput {
        ScrollInput::new(scroll_y, 2000.0, 1280.0, 720.0)
    }

    #[test]
    fn scroll_zero_is_the_identity_frame() {
        let frame = scroll_frame(top());

        assert_eq!(frame.cube.rotate_x_deg, 0.0);
        assert_eq!(frame.cube.rotate_y_deg, 0.0);
        assert_eq!(frame.cube.scale_x, 1.0);
        assert_eq!(frame.cube.scale_y, 1.0);
        assert_eq!(frame.cube.scale_z, 1.0);
        assert_eq!(frame.cube.opacity, 1.0);
        assert!(frame.cube.floating);

        assert_eq!(frame.curtain_scale, 1.0);
        assert!(!frame.backdrop_visible);
        assert_eq!(frame.hero.opacity, 1.0);
        assert_eq!(frame.hero.offset_y, 0.0);
        assert_eq!(frame.reveal.input.opacity, 0.0);
    }

    #[test]
    fn end_of_page_yields_the_clamped_extreme() {
        let frame = scroll_frame(at(2000.0));

        assert_eq!(frame.cube.rotate_x_deg, 360.0);
        assert_eq!(frame.cube.rotate_y_deg, 180.0);
        assert_eq!(frame.cube.scale_x, 3.0);
        assert_eq!(frame.cube.scale_z, 1.5);
        assert_eq!(frame.cube.opacity, 0.0);
        assert!(!frame.cube.floating);

        // Past the end the values stay put instead of extrapolating.
        assert_eq!(scroll_frame(at(5000.0)).cube, frame.cube);
    }

    #[test]
    fn negative_scroll_clamps_to_identity() {
        let frame = scroll_frame(at(-200.0));
        assert_eq!(frame.cube.opacity, 1.0);
        assert_eq!(frame.curtain_scale, 1.0);
        assert_eq!(frame.hero.opacity, 1.0);
    }

    #[test]
    fn curtains_open_across_their_ramp() {
        assert_eq!(curtain_scale(0.0), 1.0);
        assert_eq!(curtain_scale(250.0), 0.5);
        assert_eq!(curtain_scale(500.0), 0.0);
        assert_eq!(curtain_scale(800.0), 0.0);
        assert!(backdrop_visible(500.0));
        assert!(!backdrop_visible(499.0));
    }

    #[test]
    fn hero_fades_between_thresholds() {
        assert_eq!(hero_pose(100.0).opacity, 1.0);
        assert_eq!(hero_pose(200.0).opacity, 0.5);
        assert_eq!(hero_pose(200.0).offset_y, -25.0);
        assert_eq!(hero_pose(300.0).opacity, 0.0);
        assert_eq!(hero_pose(1000.0).opacity, 0.0);
        assert_eq!(hero_pose(1000.0).offset_y, -50.0);
    }

    #[test]
    fn panels_stay_hidden_until_the_cube_is_nearly_gone() {
        // Cube opacity at this point is 0.5, well above the threshold.
        let hidden = reveal_frame(at(1000.0));
        assert_eq!(hidden.input.opacity, 0.0);
        assert_eq!(hidden.output.opacity, 0.0);
        assert_eq!(hidden.trigger.opacity, 0.0);

        // At the bottom the cube is gone and every panel is fully shown.
        let shown = reveal_frame(at(2000.0));
        assert_eq!(shown.input.opacity, 1.0);
        assert_eq!(shown.output.opacity, 1.0);
        assert_eq!(shown.trigger.opacity, 1.0);
    }

    #[test]
    fn output_panel_lags_the_input_panel() {
        // Cube opacity 0.05 puts the ramp halfway through.
        let frame = reveal_frame(at(1900.0));
        assert!(frame.input.opacity > frame.output.opacity);
    }

    #[test]
    fn identical_input_yields_identical_frames() {
        assert_eq!(scroll_frame(at(730.0)), scroll_frame(at(730.0)));
    }

    #[test]
    fn frame_gate_admits_one_caller_per_frame() {
        let gate = FrameGate::new();
        assert!(gate.try_acquire());
        assert!(!gate.try_acquire());
        assert!(!gate.try_acquire());
        gate.release();
        assert!(gate.try_acquire());
    }
}
