//! Per-model material state and render-mode switching.
//!
//! The manager tracks one uniform block per model. Switching the render
//! mode rewrites every tracked block before returning, so a render pass
//! never observes a half-switched registry. `with_render_mode` composites
//! a temporary pass (e.g. an effects layer) and restores the prior mode
//! without touching base appearance state.

use std::collections::HashMap;

use tracing::debug;

use crate::types::ModelIdentifier;

/// Global render mode applied to every tracked material set.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum RenderMode {
  /// Regular shaded color pass.
  Color,
  /// Translucent ghosting.
  Ghost,
  /// Effects overlay pass, composited on top of the base image.
  Effects,
  /// Depth writes only, no color output.
  DepthOnly,
}

/// Per-model appearance knobs. Survive render-mode switches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Appearance {
  pub base_color: [f32; 4],
  /// Opacity used by the ghost mode.
  pub ghost_opacity: f32,
}

impl Default for Appearance {
  fn default() -> Self {
    Self {
      base_color: [1.0, 1.0, 1.0, 1.0],
      ghost_opacity: 0.2,
    }
  }
}

/// Uniform block the renderer binds for one model's materials.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialUniforms {
  pub color: [f32; 4],
  pub opacity: f32,
  /// False in the depth-only mode.
  pub write_color: bool,
  /// True in the effects mode.
  pub effects_overlay: bool,
}

fn uniforms_for(mode: RenderMode, appearance: &Appearance) -> MaterialUniforms {
  match mode {
    RenderMode::Color => MaterialUniforms {
      color: appearance.base_color,
      opacity: 1.0,
      write_color: true,
      effects_overlay: false,
    },
    RenderMode::Ghost => MaterialUniforms {
      color: appearance.base_color,
      opacity: appearance.ghost_opacity,
      write_color: true,
      effects_overlay: false,
    },
    RenderMode::Effects => MaterialUniforms {
      color: appearance.base_color,
      opacity: 1.0,
      write_color: true,
      effects_overlay: true,
    },
    RenderMode::DepthOnly => MaterialUniforms {
      color: appearance.base_color,
      opacity: 1.0,
      write_color: false,
      effects_overlay: false,
    },
  }
}

/// One model's tracked material set.
pub struct ModelMaterials {
  /// Highest per-vertex tree index of the model; bounds picking ranges.
  pub max_tree_index: u32,
  pub appearance: Appearance,
  pub uniforms: MaterialUniforms,
  highlight: Option<(u32, u32)>,
}

impl ModelMaterials {
  /// Highlighted tree-index range, if any.
  pub fn highlight(&self) -> Option<(u32, u32)> {
    self.highlight
  }
}

/// Registry of per-model material state.
///
/// Explicitly constructed and passed down; mutated only from the polling
/// thread.
pub struct MaterialManager {
  mode: RenderMode,
  sets: HashMap<ModelIdentifier, ModelMaterials>,
}

impl MaterialManager {
  pub fn new() -> Self {
    Self {
      mode: RenderMode::Color,
      sets: HashMap::new(),
    }
  }

  pub fn mode(&self) -> RenderMode {
    self.mode
  }

  /// Register a model's materials under the current render mode.
  pub fn add_model_materials(
    &mut self,
    key: ModelIdentifier,
    max_tree_index: u32,
    appearance: Appearance,
  ) {
    self.sets.insert(
      key,
      ModelMaterials {
        max_tree_index,
        appearance,
        uniforms: uniforms_for(self.mode, &appearance),
        highlight: None,
      },
    );
  }

  /// Drop a model's materials when it leaves the viewer.
  pub fn remove_model_materials(&mut self, key: ModelIdentifier) -> bool {
    self.sets.remove(&key).is_some()
  }

  /// Switch the render mode across all tracked materials.
  ///
  /// Every uniform block reflects the new mode before this returns.
  pub fn set_render_mode(&mut self, mode: RenderMode) {
    if mode == self.mode {
      return;
    }
    debug!(?mode, models = self.sets.len(), "switching render mode");
    self.mode = mode;
    for set in self.sets.values_mut() {
      set.uniforms = uniforms_for(mode, &set.appearance);
    }
  }

  /// Run one pass under a temporary mode, then restore the prior mode.
  ///
  /// Used to composite the effects layer without permanently altering
  /// appearance state.
  pub fn with_render_mode<R>(&mut self, mode: RenderMode, f: impl FnOnce(&mut Self) -> R) -> R {
    let prior = self.mode;
    self.set_render_mode(mode);
    let result = f(self);
    self.set_render_mode(prior);
    result
  }

  /// Update a model's base appearance, rewriting its uniforms in place.
  pub fn set_appearance(&mut self, key: ModelIdentifier, appearance: Appearance) -> bool {
    let mode = self.mode;
    match self.sets.get_mut(&key) {
      Some(set) => {
        set.appearance = appearance;
        set.uniforms = uniforms_for(mode, &appearance);
        true
      }
      None => false,
    }
  }

  /// Highlight a tree-index range of a model; `None` clears.
  ///
  /// The range must lie within the model's tree indices.
  pub fn set_highlight(&mut self, key: ModelIdentifier, range: Option<(u32, u32)>) -> bool {
    match self.sets.get_mut(&key) {
      Some(set) => {
        if let Some((first, last)) = range {
          if first > last || last > set.max_tree_index {
            return false;
          }
        }
        set.highlight = range;
        true
      }
      None => false,
    }
  }

  pub fn materials(&self, key: ModelIdentifier) -> Option<&ModelMaterials> {
    self.sets.get(&key)
  }

  pub fn uniforms(&self, key: ModelIdentifier) -> Option<&MaterialUniforms> {
    self.sets.get(&key).map(|set| &set.uniforms)
  }

  pub fn len(&self) -> usize {
    self.sets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.sets.is_empty()
  }
}

impl Default for MaterialManager {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
#[path = "materials_test.rs"]
mod materials_test;
