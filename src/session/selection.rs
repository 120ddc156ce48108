use std::collections::BTreeSet;

use crate::{host::MaterialHandle, migrate::batch::select_candidates};

/// One collected material and whether it takes part in the next migration.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SelectionEntry {
    /// Position in the material list the selection was collected from.
    pub index: usize,
    /// [`MaterialHandle::id`] at collection time.
    pub material_id: String,
    /// Whether the material is migrated by the next run.
    pub selected: bool,
}

/// Materials using the source shader, each with a selected flag.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MaterialSelection {
    entries: Vec<SelectionEntry>,
}

impl MaterialSelection {
    /// Collect every material currently assigned `shader_name`, all selected.
    pub fn collect<M: MaterialHandle>(materials: &[M], shader_name: &str) -> Self {
        let entries = select_candidates(materials, shader_name)
            .into_iter()
            .map(|index| SelectionEntry {
                index,
                material_id: materials[index].id(),
                selected: true,
            })
            .collect();
        Self { entries }
    }

    /// Collected entries, in material list order.
    pub fn entries(&self) -> &[SelectionEntry] {
        &self.entries
    }

    /// Number of collected materials.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when no material uses the source shader.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Select or deselect every entry.
    pub fn set_all(&mut self, selected: bool) {
        for e in &mut self.entries {
            e.selected = selected;
        }
    }

    /// `true` when every entry is selected (and there is at least one).
    pub fn all_selected(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|e| e.selected)
    }

    /// Set the flag of the entry for `material_id`. Returns `false` if there is none.
    pub fn set_selected(&mut self, material_id: &str, selected: bool) -> bool {
        match self.entries.iter_mut().find(|e| e.material_id == material_id) {
            Some(e) => {
                e.selected = selected;
                true
            }
            None => false,
        }
    }

    /// Flip the flag of the entry for `material_id`.
    pub fn toggle(&mut self, material_id: &str) -> bool {
        match self.entries.iter_mut().find(|e| e.material_id == material_id) {
            Some(e) => {
                e.selected = !e.selected;
                true
            }
            None => false,
        }
    }

    /// Indices (into the collected list) of the selected materials, ascending.
    pub fn selected_indices(&self) -> Vec<usize> {
        self.entries
            .iter()
            .filter(|e| e.selected)
            .map(|e| e.index)
            .collect()
    }

    /// Identifiers of the selected materials.
    pub fn selected_ids(&self) -> BTreeSet<&str> {
        self.entries
            .iter()
            .filter(|e| e.selected)
            .map(|e| e.material_id.as_str())
            .collect()
    }
}
