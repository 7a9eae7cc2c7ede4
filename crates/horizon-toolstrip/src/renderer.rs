//! Renderer selection.

use std::fmt;
use std::sync::Arc;

use horizon_toolstrip_core::Signal;
use horizon_toolstrip_core::logging::targets;
use parking_lot::RwLock;

use crate::error::{Result, ToolStripError};

/// Which renderer strips paint with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum RenderMode {
    /// A renderer supplied by the application.
    Custom = 0,
    /// Flat system colors.
    System = 1,
    /// Gradient office-style rendering.
    Professional = 2,
}

impl TryFrom<i32> for RenderMode {
    type Error = ToolStripError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Self::Custom),
            1 => Ok(Self::System),
            2 => Ok(Self::Professional),
            other => Err(ToolStripError::InvalidRenderMode(other)),
        }
    }
}

/// Paints strips.
pub trait ToolStripRenderer: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// The built-in mode this renderer implements. Application renderers
    /// keep the default.
    fn render_mode(&self) -> RenderMode {
        RenderMode::Custom
    }
}

#[derive(Debug, Default)]
pub struct SystemRenderer;

impl ToolStripRenderer for SystemRenderer {
    fn name(&self) -> &str {
        "system"
    }

    fn render_mode(&self) -> RenderMode {
        RenderMode::System
    }
}

#[derive(Debug, Default)]
pub struct ProfessionalRenderer;

impl ToolStripRenderer for ProfessionalRenderer {
    fn name(&self) -> &str {
        "professional"
    }

    fn render_mode(&self) -> RenderMode {
        RenderMode::Professional
    }
}

fn create_renderer(mode: RenderMode) -> Arc<dyn ToolStripRenderer> {
    match mode {
        RenderMode::System => Arc::new(SystemRenderer),
        RenderMode::Professional | RenderMode::Custom => Arc::new(ProfessionalRenderer),
    }
}

#[derive(Debug)]
struct RendererState {
    renderer: Option<Arc<dyn ToolStripRenderer>>,
    default_mode: RenderMode,
    visual_styles_requested: bool,
    application_visual_styles: bool,
}

impl RendererState {
    fn effective_mode(&self) -> RenderMode {
        self.renderer
            .as_ref()
            .map_or(self.default_mode, |r| r.render_mode())
    }

    fn visual_styles_enabled(&self) -> bool {
        self.visual_styles_requested && self.application_visual_styles
    }
}

/// The shared renderer, its mode, and the visual-styles switch.
///
/// The renderer is created lazily from the current mode. Any change that
/// alters what strips paint with emits [`renderer_changed`](Self::renderer_changed).
#[derive(Debug)]
pub struct RendererSettings {
    state: RwLock<RendererState>,
    /// Emitted after the effective renderer or visual-styles flag changed.
    pub renderer_changed: Signal<()>,
}

impl Default for RendererSettings {
    /// Professional rendering with visual styles on.
    fn default() -> Self {
        Self {
            state: RwLock::new(RendererState {
                renderer: None,
                default_mode: RenderMode::Professional,
                visual_styles_requested: true,
                application_visual_styles: true,
            }),
            renderer_changed: Signal::new(),
        }
    }
}

impl RendererSettings {
    /// Create settings with `mode` as the default renderer kind.
    ///
    /// `Custom` is rejected; assign a renderer instead.
    pub fn new(mode: RenderMode, visual_styles_enabled: bool, application_visual_styles: bool) -> Result<Self> {
        if mode == RenderMode::Custom {
            return Err(ToolStripError::CustomRenderModeNotSupported);
        }
        Ok(Self {
            state: RwLock::new(RendererState {
                renderer: None,
                default_mode: mode,
                visual_styles_requested: visual_styles_enabled,
                application_visual_styles,
            }),
            renderer_changed: Signal::new(),
        })
    }

    /// The current renderer, created on first use.
    pub fn renderer(&self) -> Arc<dyn ToolStripRenderer> {
        if let Some(renderer) = self.state.read().renderer.clone() {
            return renderer;
        }
        let mut state = self.state.write();
        let mode = state.default_mode;
        state
            .renderer
            .get_or_insert_with(|| create_renderer(mode))
            .clone()
    }

    /// Replace the renderer. `None` falls back to the default mode.
    pub fn set_renderer(&self, renderer: Option<Arc<dyn ToolStripRenderer>>) {
        let changed = {
            let mut state = self.state.write();
            let same = match (&state.renderer, &renderer) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            };
            state.renderer = renderer;
            !same
        };
        if changed {
            tracing::debug!(target: targets::RENDERER, "renderer replaced");
            self.renderer_changed.emit(());
        }
    }

    /// `Custom` when an application renderer is installed, otherwise the
    /// built-in kind in use.
    pub fn render_mode(&self) -> RenderMode {
        self.state.read().effective_mode()
    }

    /// Switch to a built-in renderer kind.
    pub fn set_render_mode(&self, mode: RenderMode) -> Result<()> {
        if mode == RenderMode::Custom {
            return Err(ToolStripError::CustomRenderModeNotSupported);
        }
        let changed = {
            let mut state = self.state.write();
            let before = state.effective_mode();
            state.default_mode = mode;
            if state.renderer.as_ref().is_some_and(|r| r.render_mode() != mode) {
                state.renderer = None;
            }
            before != state.effective_mode()
        };
        if changed {
            tracing::debug!(target: targets::RENDERER, ?mode, "render mode changed");
            self.renderer_changed.emit(());
        }
        Ok(())
    }

    /// [`set_render_mode`](Self::set_render_mode) from a raw value.
    pub fn set_render_mode_value(&self, value: i32) -> Result<()> {
        self.set_render_mode(RenderMode::try_from(value)?)
    }

    /// Requested and supported by the application.
    pub fn visual_styles_enabled(&self) -> bool {
        self.state.read().visual_styles_enabled()
    }

    pub fn set_visual_styles_enabled(&self, enabled: bool) {
        let changed = {
            let mut state = self.state.write();
            let before = state.visual_styles_enabled();
            state.visual_styles_requested = enabled;
            before != state.visual_styles_enabled()
        };
        if changed {
            tracing::debug!(target: targets::RENDERER, enabled, "visual styles changed");
            self.renderer_changed.emit(());
        }
    }
}

static_assertions::assert_impl_all!(RendererSettings: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Debug)]
    struct Flat;

    impl ToolStripRenderer for Flat {
        fn name(&self) -> &str {
            "flat"
        }
    }

    fn setup() -> (RendererSettings, Arc<Mutex<usize>>) {
        let settings = RendererSettings::new(RenderMode::Professional, true, true).unwrap();
        let count = Arc::new(Mutex::new(0));
        let c = count.clone();
        settings.renderer_changed.connect(move |_| *c.lock() += 1);
        (settings, count)
    }

    #[test]
    fn test_lazy_default_renderer() {
        let (settings, count) = setup();
        assert_eq!(settings.renderer().name(), "professional");
        assert_eq!(settings.render_mode(), RenderMode::Professional);
        assert_eq!(*count.lock(), 0);
    }

    #[test]
    fn test_custom_renderer_reports_custom() {
        let (settings, count) = setup();
        settings.set_renderer(Some(Arc::new(Flat)));
        assert_eq!(settings.render_mode(), RenderMode::Custom);
        assert_eq!(*count.lock(), 1);

        settings.set_render_mode(RenderMode::System).unwrap();
        assert_eq!(settings.renderer().name(), "system");
        assert_eq!(*count.lock(), 2);
    }

    #[test]
    fn test_disconnected_handler_is_not_notified() {
        let settings = RendererSettings::new(RenderMode::Professional, true, true).unwrap();
        let count = Arc::new(Mutex::new(0));
        let c = count.clone();
        let handler = settings.renderer_changed.connect(move |_| *c.lock() += 1);
        settings.set_render_mode(RenderMode::System).unwrap();
        assert!(settings.renderer_changed.disconnect(handler));
        settings.set_render_mode(RenderMode::Professional).unwrap();
        assert_eq!(*count.lock(), 1);
    }

    #[test]
    fn test_same_renderer_does_not_notify() {
        let (settings, count) = setup();
        let renderer: Arc<dyn ToolStripRenderer> = Arc::new(Flat);
        settings.set_renderer(Some(renderer.clone()));
        settings.set_renderer(Some(renderer));
        assert_eq!(*count.lock(), 1);
    }

    #[test]
    fn test_invalid_modes() {
        let (settings, _) = setup();
        assert!(matches!(
            settings.set_render_mode(RenderMode::Custom),
            Err(ToolStripError::CustomRenderModeNotSupported)
        ));
        assert!(matches!(
            settings.set_render_mode_value(7),
            Err(ToolStripError::InvalidRenderMode(7))
        ));
        assert!(RendererSettings::new(RenderMode::Custom, true, true).is_err());
    }

    #[test]
    fn test_visual_styles_need_application_support() {
        let settings = RendererSettings::new(RenderMode::System, true, false).unwrap();
        assert!(!settings.visual_styles_enabled());

        let (settings, count) = setup();
        settings.set_visual_styles_enabled(false);
        settings.set_visual_styles_enabled(false);
        assert!(!settings.visual_styles_enabled());
        assert_eq!(*count.lock(), 1);
    }
}
