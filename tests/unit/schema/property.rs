use super::*;

#[test]
fn compatibility_is_symmetric() {
    for a in PropertyKind::ALL {
        for b in PropertyKind::ALL {
            assert_eq!(is_type_compatible(a, b), is_type_compatible(b, a), "{a:?} / {b:?}");
        }
    }
}

#[test]
fn compatibility_is_equality_except_scalars() {
    assert!(is_type_compatible(PropertyKind::Float, PropertyKind::Range));
    assert!(is_type_compatible(PropertyKind::Range, PropertyKind::Range));
    assert!(is_type_compatible(PropertyKind::Texture, PropertyKind::Texture));
    assert!(!is_type_compatible(PropertyKind::Color, PropertyKind::Vector));
    assert!(!is_type_compatible(PropertyKind::Int, PropertyKind::Float));
}

#[test]
fn float_values_fit_both_scalar_kinds() {
    let v = TypedValue::Float(0.5);
    assert!(v.fits(PropertyKind::Float));
    assert!(v.fits(PropertyKind::Range));
    assert!(!v.fits(PropertyKind::Int));
}

#[test]
fn zero_for_fits_its_kind() {
    for k in PropertyKind::ALL {
        assert!(TypedValue::zero_for(k).fits(k), "{k:?}");
    }
}

#[test]
fn texture_value_defaults_to_identity_tiling() {
    let t: TextureValue = serde_json::from_str(r#"{ "texture": "rock_albedo" }"#).unwrap();
    assert_eq!(t.texture.as_deref(), Some("rock_albedo"));
    assert_eq!(t.scale, Vec2::ONE);
    assert_eq!(t.offset, Vec2::ZERO);
}

#[test]
fn descriptor_key_text_selects_field() {
    let d = PropertyDescriptor {
        name: "_MainTex".to_string(),
        description: "Albedo".to_string(),
        kind: PropertyKind::Texture,
        default: TypedValue::zero_for(PropertyKind::Texture),
        visible: true,
    };
    assert_eq!(d.key_text(crate::MatchKey::Name), "_MainTex");
    assert_eq!(d.key_text(crate::MatchKey::Description), "Albedo");
}

#[test]
fn descriptor_visible_defaults_to_true_when_absent() {
    let d: PropertyDescriptor = serde_json::from_str(
        r#"{ "name": "_Cutoff", "kind": "Range", "default": { "float": 0.5 } }"#,
    )
    .unwrap();
    assert!(d.visible);
    assert_eq!(d.description, "");
    assert_eq!(d.default, TypedValue::Float(0.5));
}
