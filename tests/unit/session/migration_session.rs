use super::*;
use crate::foundation::core::Color;
use crate::memory::{MemoryMaterial, MemoryShader};
use crate::schema::property::TypedValue;
use std::sync::Arc;

fn legacy() -> Arc<MemoryShader> {
    Arc::new(
        MemoryShader::new("Legacy/Diffuse")
            .color("_Color", "Main Color", Color::WHITE)
            .texture("_MainTex", "Albedo", None)
            .range("_Glossiness", "Smoothness", 0.5),
    )
}

fn lit() -> Arc<MemoryShader> {
    Arc::new(
        MemoryShader::new("Modern/Lit")
            .color("_BaseColor", "Main Color", Color::WHITE)
            .texture("_MainTex", "Albedo", None)
            .float("_Smoothness", "Smoothness", 0.5),
    )
}

fn toon() -> Arc<MemoryShader> {
    Arc::new(MemoryShader::new("Stylized/Toon").color("_Color", "Tint", Color::WHITE))
}

fn started() -> MigrationSession<Arc<MemoryShader>> {
    let mut s = MigrationSession::default();
    s.begin(legacy(), lit()).unwrap();
    s
}

#[test]
fn operations_without_rule_fail_cleanly() {
    let mut s: MigrationSession<Arc<MemoryShader>> = MigrationSession::default();
    assert!(s.rule().is_none());
    assert!(matches!(s.connect(0, 0), Err(RemapError::Validation(_))));
    assert!(matches!(s.clear_mapping(), Err(RemapError::Validation(_))));
    let mats: Vec<MemoryMaterial> = Vec::new();
    assert!(s.collect_materials(&mats).is_err());
}

#[test]
fn begin_seeds_mapping_by_name() {
    let s = started();
    let rule = s.rule().unwrap();
    assert_eq!(rule.mapping().entries(), &[None, Some(1), None]);
    assert_eq!(s.display_key(), MatchKey::Name);
}

#[test]
fn begin_rejects_identical_shaders() {
    let mut s = MigrationSession::default();
    assert!(matches!(
        s.begin(legacy(), legacy()),
        Err(RemapError::Validation(_))
    ));
    assert!(s.rule().is_none());
}

#[test]
fn connect_and_break_from_either_side() {
    let mut s = started();
    s.connect(0, 0).unwrap();
    s.connect(2, 2).unwrap();
    assert_eq!(s.rule().unwrap().mapping().mapped_count(), 3);

    s.break_source(0).unwrap();
    assert_eq!(s.rule().unwrap().mapping().get(0), None);

    assert_eq!(s.break_destination(2).unwrap(), Some(2));
    assert_eq!(s.break_destination(2).unwrap(), None);
    assert_eq!(s.rule().unwrap().mapping().entries(), &[None, Some(1), None]);

    s.clear_mapping().unwrap();
    assert_eq!(s.rule().unwrap().mapping().mapped_count(), 0);
}

#[test]
fn connect_errors_leave_mapping_unchanged() {
    let mut s = started();
    let before = s.rule().unwrap().mapping().clone();
    assert!(matches!(
        s.connect(0, 1),
        Err(RemapError::TypeMismatch { .. })
    ));
    s.connect(0, 0).unwrap();
    let after_connect = s.rule().unwrap().mapping().clone();
    assert_ne!(after_connect, before);
    assert!(matches!(
        s.connect(2, 1),
        Err(RemapError::TypeMismatch { .. })
    ));
    assert_eq!(s.rule().unwrap().mapping(), &after_connect);
}

#[test]
fn auto_map_sets_display_key() {
    let mut s = started();
    assert_eq!(s.auto_map(MatchKey::Description).unwrap(), 2);
    assert_eq!(s.display_key(), MatchKey::Description);
    assert_eq!(
        s.rule().unwrap().mapping().entries(),
        &[Some(0), Some(1), Some(2)]
    );
}

#[test]
fn replacing_a_shader_resets_the_mapping() {
    let mut s = started();
    s.replace_destination_shader(toon()).unwrap();
    let rule = s.rule().unwrap();
    assert_eq!(rule.destination().shader, "Stylized/Toon");
    assert_eq!(rule.mapping().source_len(), 3);
    assert_eq!(rule.mapping().mapped_count(), 0);

    s.replace_source_shader(lit()).unwrap();
    assert_eq!(s.rule().unwrap().source().shader, "Modern/Lit");
    assert_eq!(s.rule().unwrap().mapping().mapped_count(), 0);

    s.reset();
    assert!(s.rule().is_none());
    assert!(s.source_shader().is_none());
}

#[test]
fn selection_tracks_source_materials() {
    let mut s = started();
    let a = Arc::clone(s.source_shader().unwrap());
    let mats = vec![
        MemoryMaterial::new("Rock", Arc::clone(&a)),
        MemoryMaterial::new("Done", lit()),
        MemoryMaterial::new("Moss", Arc::clone(&a)),
    ];
    s.collect_materials(&mats).unwrap();
    assert_eq!(s.selection().len(), 2);
    assert!(s.selection().all_selected());

    assert!(s.selection_mut().toggle("Rock"));
    assert!(!s.selection_mut().toggle("Done"));
    assert_eq!(s.selection().selected_indices(), [2]);

    s.selection_mut().set_all(true);
    assert!(s.selection_mut().set_selected("Moss", false));
    assert_eq!(s.selection().selected_indices(), [0]);
}

#[test]
fn migrate_selected_only_touches_selected_materials() {
    let mut s = started();
    s.auto_map(MatchKey::Description).unwrap();
    let a = Arc::clone(s.source_shader().unwrap());
    let mut mats = vec![
        MemoryMaterial::new("Rock", Arc::clone(&a))
            .with_value("_Glossiness", TypedValue::Float(0.9)),
        MemoryMaterial::new("Moss", Arc::clone(&a)),
    ];
    s.collect_materials(&mats).unwrap();
    s.selection_mut().set_selected("Moss", false);

    let out = s.migrate_selected(&mut mats).unwrap();

    assert_eq!(out.stats.migrated, 1);
    assert_eq!(out.outcomes[0].material_id(), "Rock");
    assert_eq!(mats[0].value("_Smoothness"), Some(TypedValue::Float(0.9)));
    assert_eq!(mats[1].shader_name().as_deref(), Some("Legacy/Diffuse"));

    let remaining: Vec<&str> = s
        .selection()
        .entries()
        .iter()
        .map(|e| e.material_id.as_str())
        .collect();
    assert_eq!(remaining, ["Moss"]);
}

#[test]
fn migrate_selected_matches_materials_by_id_after_reorder() {
    let mut s = started();
    let a = Arc::clone(s.source_shader().unwrap());
    let mut mats = vec![
        MemoryMaterial::new("Rock", Arc::clone(&a)),
        MemoryMaterial::new("Other", toon()),
    ];
    s.collect_materials(&mats).unwrap();
    mats.swap(0, 1);

    let out = s.migrate_selected(&mut mats).unwrap();

    assert_eq!(out.stats.migrated, 1);
    assert_eq!(out.outcomes.len(), 1);
    assert_eq!(out.outcomes[0].material_id(), "Rock");
    assert_eq!(mats[0].id(), "Other");
    assert_eq!(mats[0].shader_name().as_deref(), Some("Stylized/Toon"));
    assert_eq!(mats[1].shader_name().as_deref(), Some("Modern/Lit"));
}

#[test]
fn migrate_selected_skips_materials_that_changed_shader() {
    let mut s = started();
    let a = Arc::clone(s.source_shader().unwrap());
    let mut mats = vec![
        MemoryMaterial::new("Rock", Arc::clone(&a)),
        MemoryMaterial::new("Moss", Arc::clone(&a)),
    ];
    s.collect_materials(&mats).unwrap();
    mats[1].set_shader(&toon());

    let out = s.migrate_selected(&mut mats).unwrap();

    assert_eq!(out.stats.migrated, 1);
    assert_eq!(out.outcomes[0].material_id(), "Rock");
    assert_eq!(mats[1].shader_name().as_deref(), Some("Stylized/Toon"));
    assert!(s.selection().is_empty());
}
