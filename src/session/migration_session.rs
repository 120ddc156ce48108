use crate::{
    foundation::error::{RemapError, RemapResult},
    host::{MaterialHandle, ShaderHandle},
    mapping::auto::MatchKey,
    migrate::batch::{BatchOptions, BatchOutcome, migrate_batch},
    session::rule::MigrationRule,
    session::selection::MaterialSelection,
    session::view::ViewFilter,
};

/// Editing state for one shader-to-shader migration.
///
/// Holds the chosen shaders, the active [`MigrationRule`], the display key, and the material
/// selection. Every operation goes through an explicit session value; nothing is process-global.
#[derive(Clone, Debug)]
pub struct MigrationSession<S> {
    source_shader: Option<S>,
    destination_shader: Option<S>,
    rule: Option<MigrationRule>,
    display_key: MatchKey,
    selection: MaterialSelection,
    opts: BatchOptions,
}

impl<S> Default for MigrationSession<S> {
    fn default() -> Self {
        Self {
            source_shader: None,
            destination_shader: None,
            rule: None,
            display_key: MatchKey::Name,
            selection: MaterialSelection::default(),
            opts: BatchOptions::default(),
        }
    }
}

impl<S: ShaderHandle> MigrationSession<S> {
    /// Empty session that migrates with `opts`.
    pub fn new(opts: BatchOptions) -> Self {
        Self {
            opts,
            ..Self::default()
        }
    }

    /// Chosen source shader.
    pub fn source_shader(&self) -> Option<&S> {
        self.source_shader.as_ref()
    }

    /// Chosen destination shader.
    pub fn destination_shader(&self) -> Option<&S> {
        self.destination_shader.as_ref()
    }

    /// Active rule, once both shaders are chosen.
    pub fn rule(&self) -> Option<&MigrationRule> {
        self.rule.as_ref()
    }

    /// Descriptor field shown in mapping views.
    pub fn display_key(&self) -> MatchKey {
        self.display_key
    }

    /// Change the displayed descriptor field without remapping.
    pub fn set_display_key(&mut self, key: MatchKey) {
        self.display_key = key;
    }

    /// Collected materials and their selected flags.
    pub fn selection(&self) -> &MaterialSelection {
        &self.selection
    }

    /// Mutable access to the material selection.
    pub fn selection_mut(&mut self) -> &mut MaterialSelection {
        &mut self.selection
    }

    /// Batch options used by [`migrate_selected`](Self::migrate_selected).
    pub fn opts(&self) -> &BatchOptions {
        &self.opts
    }

    /// Start a migration between two distinct shaders.
    ///
    /// Extracts both schemas and seeds the mapping by name.
    pub fn begin(&mut self, source: S, destination: S) -> RemapResult<()> {
        let mut rule = MigrationRule::new(&source, &destination)?;
        let seeded = rule.auto_map(MatchKey::Name);
        tracing::info!(
            source = %source.name(),
            destination = %destination.name(),
            seeded,
            "migration session started"
        );
        self.source_shader = Some(source);
        self.destination_shader = Some(destination);
        self.rule = Some(rule);
        self.display_key = MatchKey::Name;
        self.selection = MaterialSelection::default();
        Ok(())
    }

    /// Drop the rule and both shaders.
    pub fn reset(&mut self) {
        self.source_shader = None;
        self.destination_shader = None;
        self.rule = None;
        self.selection = MaterialSelection::default();
    }

    /// Swap the source shader; both schemas are re-extracted and the mapping starts empty.
    pub fn replace_source_shader(&mut self, shader: S) -> RemapResult<()> {
        let destination = self
            .destination_shader
            .as_ref()
            .ok_or_else(|| RemapError::validation("no destination shader chosen"))?;
        self.rule = Some(MigrationRule::new(&shader, destination)?);
        self.source_shader = Some(shader);
        self.selection = MaterialSelection::default();
        Ok(())
    }

    /// Swap the destination shader; both schemas are re-extracted and the mapping starts empty.
    pub fn replace_destination_shader(&mut self, shader: S) -> RemapResult<()> {
        let source = self
            .source_shader
            .as_ref()
            .ok_or_else(|| RemapError::validation("no source shader chosen"))?;
        self.rule = Some(MigrationRule::new(source, &shader)?);
        self.destination_shader = Some(shader);
        Ok(())
    }

    fn rule_mut(&mut self) -> RemapResult<&mut MigrationRule> {
        self.rule
            .as_mut()
            .ok_or_else(|| RemapError::validation("no active migration rule"))
    }

    /// Connect `source_slot` to `destination_slot`; see [`MigrationRule::connect`].
    pub fn connect(&mut self, source_slot: usize, destination_slot: usize) -> RemapResult<()> {
        self.rule_mut()?.connect(source_slot, destination_slot)
    }

    /// Break the connection leaving `source_slot`.
    pub fn break_source(&mut self, source_slot: usize) -> RemapResult<()> {
        self.rule_mut()?.set_mapping(source_slot, None)
    }

    /// Break the connection arriving at `destination_slot`; returns the source slot it came from.
    pub fn break_destination(&mut self, destination_slot: usize) -> RemapResult<Option<usize>> {
        let rule = self.rule_mut()?;
        let owner = rule.mapping().source_for_destination(destination_slot);
        if let Some(s) = owner {
            rule.clear(s);
        }
        Ok(owner)
    }

    /// Break every connection.
    pub fn clear_mapping(&mut self) -> RemapResult<()> {
        self.rule_mut()?.reset_mapping();
        Ok(())
    }

    /// Fill gaps by `key` and show descriptors by that key from now on.
    pub fn auto_map(&mut self, key: MatchKey) -> RemapResult<usize> {
        let assigned = self.rule_mut()?.auto_map(key);
        self.display_key = key;
        Ok(assigned)
    }

    /// Recompute descriptor visibility for a view.
    pub fn apply_view_filter(&mut self, filter: &ViewFilter) -> RemapResult<()> {
        self.rule_mut()?.apply_view_filter(filter);
        Ok(())
    }

    /// Re-collect the materials that use the source shader, all selected.
    pub fn collect_materials<M>(&mut self, materials: &[M]) -> RemapResult<()>
    where
        M: MaterialHandle<Shader = S>,
    {
        let source = self
            .source_shader
            .as_ref()
            .ok_or_else(|| RemapError::validation("no source shader chosen"))?;
        self.selection = MaterialSelection::collect(materials, &source.name());
        Ok(())
    }

    /// Migrate the selected materials, then refresh the selection.
    ///
    /// Targets are matched by material id, so the slice may be reordered or grown after
    /// [`collect_materials`](Self::collect_materials). A selected material that is no longer valid
    /// or no longer uses the source shader is skipped. Migrated materials drop out of the
    /// refreshed selection.
    pub fn migrate_selected<M>(&mut self, materials: &mut [M]) -> RemapResult<BatchOutcome>
    where
        M: MaterialHandle<Shader = S> + Send,
        S: Sync,
    {
        let rule = self
            .rule
            .as_ref()
            .ok_or_else(|| RemapError::validation("no active migration rule"))?;
        let source_name = self
            .source_shader
            .as_ref()
            .ok_or_else(|| RemapError::validation("no source shader chosen"))?
            .name();
        let destination = self
            .destination_shader
            .as_ref()
            .ok_or_else(|| RemapError::validation("no destination shader chosen"))?;
        let selected = self.selection.selected_ids();
        let targets: Vec<&mut M> = materials
            .iter_mut()
            .filter(|m| {
                m.is_valid()
                    && m.shader_name().as_deref() == Some(source_name.as_str())
                    && selected.contains(m.id().as_str())
            })
            .collect();
        if targets.len() < selected.len() {
            tracing::debug!(
                selected = selected.len(),
                found = targets.len(),
                "some selected materials are gone or changed shader"
            );
        }
        let outcome = migrate_batch(targets, rule, destination, &self.opts)?;
        self.collect_materials(materials)?;
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/migration_session.rs"]
mod tests;
