use super::*;
use crate::foundation::core::{Color, Vec2, Vec4};
use crate::memory::{MemoryMaterial, MemoryShader};
use crate::schema::extract::extract;
use std::sync::Arc;

fn shader_a() -> MemoryShader {
    MemoryShader::new("A")
        .color("_Color", "Main Color", Color::WHITE)
        .range("_Glossiness", "Smoothness", 0.25)
}

fn shader_b() -> MemoryShader {
    MemoryShader::new("B")
        .color("_BaseColor", "Base Color", Color::WHITE)
        .float("_Smoothness", "Smoothness", 0.1)
}

struct Setup {
    source: Schema,
    destination: Schema,
    mapping: MappingTable,
    a: Arc<MemoryShader>,
    b: Arc<MemoryShader>,
}

fn setup(a: MemoryShader, b: MemoryShader, pairs: &[(usize, usize)]) -> Setup {
    let source = extract(&a).unwrap();
    let destination = extract(&b).unwrap();
    let mut mapping = MappingTable::new(&source, &destination);
    for &(s, d) in pairs {
        mapping.set_mapping(s, Some(d)).unwrap();
    }
    Setup {
        source,
        destination,
        mapping,
        a: Arc::new(a),
        b: Arc::new(b),
    }
}

impl Setup {
    fn run(&self, m: &mut MemoryMaterial) -> RemapResult<MigrationReport> {
        migrate_material(m, &self.source, &self.destination, &self.mapping, &self.b)
    }
}

fn red_glossy(shader: Arc<MemoryShader>) -> MemoryMaterial {
    MemoryMaterial::new("Brick", shader)
        .with_value("_Color", TypedValue::Color(Color::new(1.0, 0.0, 0.0, 1.0)))
        .with_value("_Glossiness", TypedValue::Float(0.5))
}

#[test]
fn round_trip_carries_mapped_values() {
    let s = setup(shader_a(), shader_b(), &[(0, 0), (1, 1)]);
    let mut m = red_glossy(Arc::clone(&s.a));

    let report = s.run(&mut m).unwrap();

    assert!(report.is_clean());
    assert_eq!(report.material_id, "Brick");
    assert_eq!(report.succeeded_slots.iter().copied().collect::<Vec<_>>(), [0, 1]);
    assert_eq!(m.shader_name().as_deref(), Some("B"));
    assert_eq!(
        m.value("_BaseColor"),
        Some(TypedValue::Color(Color::new(1.0, 0.0, 0.0, 1.0)))
    );
    assert_eq!(m.value("_Smoothness"), Some(TypedValue::Float(0.5)));
}

#[test]
fn missing_source_property_warns_and_continues() {
    let s = setup(shader_a(), shader_b(), &[(0, 0), (1, 1)]);
    let edited = Arc::new(shader_a().without_property("_Glossiness"));
    let mut m = red_glossy(edited);

    let report = s.run(&mut m).unwrap();

    assert_eq!(report.warnings.len(), 1);
    let w = &report.warnings[0];
    assert_eq!(w.stage, MigrationStage::Read);
    assert_eq!(w.slot, 1);
    assert_eq!(w.property, "_Glossiness");
    assert_eq!(report.succeeded_slots.iter().copied().collect::<Vec<_>>(), [0]);
    assert_eq!(
        m.value("_BaseColor"),
        Some(TypedValue::Color(Color::new(1.0, 0.0, 0.0, 1.0)))
    );
    assert_eq!(m.value("_Smoothness"), Some(TypedValue::Float(0.1)));
}

#[test]
fn flags_survive_migration() {
    let s = setup(shader_a(), shader_b(), &[(0, 0)]);
    let flags = MaterialFlags {
        instancing: true,
        render_queue: 3000,
        double_sided_gi: true,
    };
    let mut m = red_glossy(Arc::clone(&s.a)).with_flags(flags);

    s.run(&mut m).unwrap();

    assert_eq!(MaterialFlags::capture(&m), flags);
}

#[test]
fn unmapped_same_named_property_is_reset_to_default() {
    let a = MemoryShader::new("A")
        .color("_Color", "Main Color", Color::WHITE)
        .float("_Cutoff", "Alpha Cutoff", 0.5);
    let b = MemoryShader::new("B")
        .color("_BaseColor", "Base Color", Color::WHITE)
        .float("_Cutoff", "Alpha Cutoff", 0.33);
    let s = setup(a, b, &[(0, 0)]);
    let mut m = MemoryMaterial::new("Leaf", Arc::clone(&s.a))
        .with_value("_Cutoff", TypedValue::Float(0.9));

    s.run(&mut m).unwrap();

    assert_eq!(m.value("_Cutoff"), Some(TypedValue::Float(0.33)));
}

#[test]
fn texture_triple_is_carried_and_unmapped_textures_reset() {
    let a = MemoryShader::new("A").texture("_MainTex", "Albedo", None);
    let b = MemoryShader::new("B")
        .texture("_BaseMap", "Albedo", None)
        .texture("_MainTex", "Legacy", Some("grey"));
    let s = setup(a, b, &[(0, 0)]);
    let tex = TextureValue {
        texture: Some("bricks".to_string()),
        scale: Vec2::new(2.0, 2.0),
        offset: Vec2::new(0.5, 0.0),
    };
    let mut m = MemoryMaterial::new("Wall", Arc::clone(&s.a))
        .with_value("_MainTex", TypedValue::Texture(tex.clone()));

    s.run(&mut m).unwrap();

    assert_eq!(m.value("_BaseMap"), Some(TypedValue::Texture(tex)));
    assert_eq!(
        m.value("_MainTex"),
        Some(TypedValue::Texture(TextureValue::new(Some("grey".to_string()))))
    );
}

#[test]
fn vector_and_int_values_are_carried() {
    let a = MemoryShader::new("A")
        .vector("_Wind", "Wind", Vec4::default())
        .int("_Mode", "Mode", 0);
    let b = MemoryShader::new("B")
        .int("_Blend", "Mode", 0)
        .vector("_WindParams", "Wind", Vec4::default());
    let s = setup(a, b, &[(0, 1), (1, 0)]);
    let mut m = MemoryMaterial::new("Grass", Arc::clone(&s.a))
        .with_value("_Wind", TypedValue::Vector(Vec4::new(1.0, 2.0, 3.0, 4.0)))
        .with_value("_Mode", TypedValue::Int(3));

    let report = s.run(&mut m).unwrap();

    assert!(report.is_clean());
    assert_eq!(
        m.value("_WindParams"),
        Some(TypedValue::Vector(Vec4::new(1.0, 2.0, 3.0, 4.0)))
    );
    assert_eq!(m.value("_Blend"), Some(TypedValue::Int(3)));
}

#[test]
fn invalid_material_is_rejected_untouched() {
    let s = setup(shader_a(), shader_b(), &[(0, 0)]);
    let mut m = red_glossy(Arc::clone(&s.a));
    m.invalidate();

    let err = s.run(&mut m).unwrap_err();

    assert!(matches!(err, RemapError::InvalidHandle(_)));
    assert_eq!(m.shader_name().as_deref(), Some("A"));
}

#[test]
fn invalid_destination_shader_is_rejected() {
    let s = setup(shader_a(), shader_b(), &[(0, 0)]);
    let gone = Arc::new(MemoryShader::missing("B"));
    let mut m = red_glossy(Arc::clone(&s.a));

    let err =
        migrate_material(&mut m, &s.source, &s.destination, &s.mapping, &gone).unwrap_err();

    assert!(matches!(err, RemapError::InvalidHandle(_)));
    assert_eq!(m.shader_name().as_deref(), Some("A"));
}

#[test]
fn edited_destination_shader_is_stale() {
    let s = setup(shader_a(), shader_b(), &[(0, 0)]);
    let edited = Arc::new(shader_b().without_property("_Smoothness"));
    let mut m = red_glossy(Arc::clone(&s.a));

    let err =
        migrate_material(&mut m, &s.source, &s.destination, &s.mapping, &edited).unwrap_err();

    assert!(matches!(err, RemapError::StaleMapping(_)));
    assert_eq!(m.shader_name().as_deref(), Some("A"));
}

#[test]
fn mapping_for_other_schemas_is_stale() {
    let s = setup(shader_a(), shader_b(), &[]);
    let wrong = MappingTable::with_lengths(5, 2);
    let mut m = red_glossy(Arc::clone(&s.a));

    let err = migrate_material(&mut m, &s.source, &s.destination, &wrong, &s.b).unwrap_err();

    assert!(matches!(err, RemapError::StaleMapping(_)));
}

#[test]
fn write_value_rejects_mismatched_representation() {
    let b = shader_b();
    let dest = extract(&b).unwrap();
    let mut m = MemoryMaterial::new("X", Arc::new(b));

    let err = write_value(&mut m, &dest[1], &TypedValue::Int(1)).unwrap_err();

    assert!(matches!(
        err,
        PropertyAccessError::IncompatibleValue {
            kind: PropertyKind::Float,
            value: "int",
            ..
        }
    ));
}

/// Material that refuses one particular texture offset.
struct PickyOffset {
    inner: MemoryMaterial,
    rejected: Vec2,
}

impl MaterialHandle for PickyOffset {
    type Shader = Arc<MemoryShader>;

    fn id(&self) -> String {
        self.inner.id()
    }
    fn shader_name(&self) -> Option<String> {
        self.inner.shader_name()
    }
    fn set_shader(&mut self, shader: &Self::Shader) {
        self.inner.set_shader(shader);
    }
    fn color(&self, name: &str) -> Result<Color, PropertyAccessError> {
        self.inner.color(name)
    }
    fn set_color(&mut self, name: &str, value: Color) -> Result<(), PropertyAccessError> {
        self.inner.set_color(name, value)
    }
    fn vector(&self, name: &str) -> Result<Vec4, PropertyAccessError> {
        self.inner.vector(name)
    }
    fn set_vector(&mut self, name: &str, value: Vec4) -> Result<(), PropertyAccessError> {
        self.inner.set_vector(name, value)
    }
    fn float(&self, name: &str) -> Result<f32, PropertyAccessError> {
        self.inner.float(name)
    }
    fn set_float(&mut self, name: &str, value: f32) -> Result<(), PropertyAccessError> {
        self.inner.set_float(name, value)
    }
    fn int(&self, name: &str) -> Result<i32, PropertyAccessError> {
        self.inner.int(name)
    }
    fn set_int(&mut self, name: &str, value: i32) -> Result<(), PropertyAccessError> {
        self.inner.set_int(name, value)
    }
    fn texture(&self, name: &str) -> Result<Option<String>, PropertyAccessError> {
        self.inner.texture(name)
    }
    fn set_texture(
        &mut self,
        name: &str,
        texture: Option<&str>,
    ) -> Result<(), PropertyAccessError> {
        self.inner.set_texture(name, texture)
    }
    fn texture_scale(&self, name: &str) -> Result<Vec2, PropertyAccessError> {
        self.inner.texture_scale(name)
    }
    fn set_texture_scale(&mut self, name: &str, value: Vec2) -> Result<(), PropertyAccessError> {
        self.inner.set_texture_scale(name, value)
    }
    fn texture_offset(&self, name: &str) -> Result<Vec2, PropertyAccessError> {
        self.inner.texture_offset(name)
    }
    fn set_texture_offset(&mut self, name: &str, value: Vec2) -> Result<(), PropertyAccessError> {
        if value == self.rejected {
            return Err(PropertyAccessError::Host("offset locked".to_string()));
        }
        self.inner.set_texture_offset(name, value)
    }
    fn instancing(&self) -> bool {
        self.inner.instancing()
    }
    fn set_instancing(&mut self, enabled: bool) {
        self.inner.set_instancing(enabled);
    }
    fn render_queue(&self) -> i32 {
        self.inner.render_queue()
    }
    fn set_render_queue(&mut self, queue: i32) {
        self.inner.set_render_queue(queue);
    }
    fn double_sided_gi(&self) -> bool {
        self.inner.double_sided_gi()
    }
    fn set_double_sided_gi(&mut self, enabled: bool) {
        self.inner.set_double_sided_gi(enabled);
    }
}

#[test]
fn failed_texture_write_keeps_previous_texture() {
    let b = MemoryShader::new("B").texture("_BaseMap", "Albedo", Some("white"));
    let dest = extract(&b).unwrap();
    let mut m = PickyOffset {
        inner: MemoryMaterial::new("Wall", Arc::new(b)),
        rejected: Vec2::new(0.5, 0.5),
    };
    let tex = TypedValue::Texture(TextureValue {
        texture: Some("bricks".to_string()),
        scale: Vec2::new(2.0, 2.0),
        offset: Vec2::new(0.5, 0.5),
    });

    let err = write_value(&mut m, &dest[0], &tex).unwrap_err();

    assert_eq!(err, PropertyAccessError::Host("offset locked".to_string()));
    assert_eq!(
        m.inner.value("_BaseMap"),
        Some(TypedValue::Texture(TextureValue::new(Some("white".to_string()))))
    );
}

#[test]
fn failed_texture_write_back_leaves_destination_default() {
    let a = MemoryShader::new("A").texture("_MainTex", "Albedo", None);
    let b = MemoryShader::new("B").texture("_BaseMap", "Albedo", Some("grey"));
    let s = setup(a, b, &[(0, 0)]);
    let mut m = PickyOffset {
        inner: MemoryMaterial::new("Wall", Arc::clone(&s.a)).with_value(
            "_MainTex",
            TypedValue::Texture(TextureValue {
                texture: Some("bricks".to_string()),
                scale: Vec2::new(2.0, 2.0),
                offset: Vec2::new(0.25, 0.0),
            }),
        ),
        rejected: Vec2::new(0.25, 0.0),
    };

    let report =
        migrate_material(&mut m, &s.source, &s.destination, &s.mapping, &s.b).unwrap();

    assert!(report.succeeded_slots.is_empty());
    assert_eq!(report.warnings_at(MigrationStage::Write).count(), 1);
    assert_eq!(
        m.inner.value("_BaseMap"),
        Some(TypedValue::Texture(TextureValue::new(Some("grey".to_string()))))
    );
}
