use rayon::prelude::*;

use crate::{
    foundation::error::{RemapError, RemapResult},
    host::MaterialHandle,
    migrate::executor::{MigrationReport, check_destination},
    session::rule::MigrationRule,
};

#[derive(Clone, Debug, Default)]
/// Scheduling controls for multi-material migration.
pub struct BatchOptions {
    /// Migrate distinct materials on a rayon pool when `true`.
    pub parallel: bool,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
/// Aggregated batch counters.
pub struct BatchStats {
    /// Materials handed to the batch.
    pub materials_total: usize,
    /// Materials whose migration ran to completion.
    pub migrated: usize,
    /// Materials rejected before migration (invalid handle).
    pub failed: usize,
    /// Per-property warnings across all migrated materials.
    pub warnings: usize,
}

/// Result for one material of a batch.
#[derive(Debug)]
pub enum MaterialOutcome {
    /// The migration ran; the report may still carry warnings.
    Migrated(MigrationReport),
    /// The material could not be migrated at all.
    Failed {
        /// Identifier reported by the handle.
        material_id: String,
        /// Why it was skipped.
        error: RemapError,
    },
}

impl MaterialOutcome {
    /// Identifier of the material this outcome is for.
    pub fn material_id(&self) -> &str {
        match self {
            MaterialOutcome::Migrated(r) => &r.material_id,
            MaterialOutcome::Failed { material_id, .. } => material_id,
        }
    }

    /// Migration report, if the material was migrated.
    pub fn report(&self) -> Option<&MigrationReport> {
        match self {
            MaterialOutcome::Migrated(r) => Some(r),
            MaterialOutcome::Failed { .. } => None,
        }
    }
}

/// Outcomes in input order plus counters.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// One outcome per material handed to the batch.
    pub outcomes: Vec<MaterialOutcome>,
    /// Totals over `outcomes`.
    pub stats: BatchStats,
}

/// Indices of `materials` currently assigned the shader named `shader_name`.
pub fn select_candidates<M: MaterialHandle>(materials: &[M], shader_name: &str) -> Vec<usize> {
    materials
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_valid() && m.shader_name().as_deref() == Some(shader_name))
        .map(|(i, _)| i)
        .collect()
}

/// Migrate every material in `materials` with `rule`.
///
/// The rule is checked against `destination_shader` once up front; a stale rule fails the whole
/// batch before any material is modified. After that each material migrates independently and a
/// material-level failure is recorded without stopping the rest. Already migrated materials are
/// never rolled back.
#[tracing::instrument(skip_all, fields(materials = materials.len(), parallel = opts.parallel))]
pub fn migrate_batch<M>(
    materials: Vec<&mut M>,
    rule: &MigrationRule,
    destination_shader: &M::Shader,
    opts: &BatchOptions,
) -> RemapResult<BatchOutcome>
where
    M: MaterialHandle + Send,
    M::Shader: Sync,
{
    check_destination(
        rule.source(),
        rule.destination(),
        rule.mapping(),
        destination_shader,
    )?;

    let outcomes: Vec<MaterialOutcome> = if opts.parallel {
        let pool = build_thread_pool(opts.threads)?;
        let mut materials = materials;
        pool.install(|| {
            materials
                .par_iter_mut()
                .map(|m| migrate_one(&mut **m, rule, destination_shader))
                .collect()
        })
    } else {
        materials
            .into_iter()
            .map(|m| migrate_one(m, rule, destination_shader))
            .collect()
    };

    let mut stats = BatchStats {
        materials_total: outcomes.len(),
        ..BatchStats::default()
    };
    for outcome in &outcomes {
        match outcome {
            MaterialOutcome::Migrated(r) => {
                stats.migrated += 1;
                stats.warnings += r.warnings.len();
            }
            MaterialOutcome::Failed { .. } => stats.failed += 1,
        }
    }
    tracing::info!(
        migrated = stats.migrated,
        failed = stats.failed,
        warnings = stats.warnings,
        "batch finished"
    );
    Ok(BatchOutcome { outcomes, stats })
}

fn migrate_one<M: MaterialHandle>(
    material: &mut M,
    rule: &MigrationRule,
    destination_shader: &M::Shader,
) -> MaterialOutcome {
    match rule.migrate(material, destination_shader) {
        Ok(report) => MaterialOutcome::Migrated(report),
        Err(error) => {
            tracing::error!(material = %material.id(), %error, "material skipped");
            MaterialOutcome::Failed {
                material_id: material.id(),
                error,
            }
        }
    }
}

fn build_thread_pool(threads: Option<usize>) -> RemapResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(RemapError::validation("batch 'threads' must be >= 1 when set"));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| RemapError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/migrate/batch.rs"]
mod tests;
